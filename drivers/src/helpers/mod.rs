//! Normalization primitives shared by the drivers.

mod bands;
mod host;
mod vendor;

pub use bands::{
    generate_bands,
    BandDecider,
};
pub use host::{
    join_host_port,
    split_host_port,
};
pub use vendor::{
    format_vendor,
    format_version,
    parse_hex,
};

use dsl_monitor_models::{
    DownUp,
    ModeType,
    Status,
};

/// Guesses how many subcarriers a device silently merged into one SNR value.
///
/// Picks the smallest power of two for which the last valid SNR index, scaled up, lies within
/// 10% of the last loaded subcarrier.
pub fn guess_snr_group_size(max_valid_snr_index: usize, max_valid_bits_index: usize, bin_count: usize) -> usize {
    if bin_count <= 512 || max_valid_snr_index == 0 {
        return 1;
    }

    let max_group_size = bin_count / max_valid_snr_index;
    let mut group_size = 1;
    while group_size < max_group_size {
        if (max_valid_snr_index * group_size) as f64 / max_valid_bits_index as f64 > 0.9 {
            break;
        }
        group_size *= 2;
    }
    group_size
}

/// Some modems report VDSL2 transmit power with swapped directions.
pub fn swap_power_if_reversed(status: &mut Status) {
    if status.mode.kind != ModeType::Vdsl2 {
        return;
    }
    if let (Some(down), Some(up)) = (status.power.downstream, status.power.upstream) {
        if down < up {
            status.power = DownUp::new(Some(up), Some(down));
        }
    }
}

/// Applies the normalizations every driver wants on a freshly parsed status.
pub fn normalize_status(status: &mut Status) {
    for olr in status.bitswap.iter_mut().chain(status.seamless_rate_adaptation.iter_mut()) {
        olr.normalize();
    }
}
