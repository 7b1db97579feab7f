use super::session::Values;
use crate::helpers::generate_bands;
use dsl_monitor_models::{
    Bins,
    BinsBits,
    DownUp,
    ModeSubtype,
    ModeType,
    Status,
};

/// Number of entries in each bit allocation list, independent of the profile.
const LIST_LENGTH: usize = 512;

pub(super) fn parse_bins(status: &Status, dsl: &Values) -> Bins {
    let mut bins = Bins::new(status.mode);

    if let (Some((down, last_down)), Some((up, last_up))) =
        (parse_bits_list(dsl, "BinallocaDown"), parse_bits_list(dsl, "BinallocaUp"))
    {
        if bins.mode.kind == ModeType::Vdsl2 {
            bins.mode.subtype = if last_up < 180 && last_down > 170 {
                ModeSubtype::Profile35b
            } else {
                ModeSubtype::Profile17a
            };
        }

        let factor = bins.mode.bin_count() / LIST_LENGTH;
        bins.bits = DownUp::new(scale(&down, factor), scale(&up, factor));
    }

    generate_bands(&mut bins);

    bins
}

/// Parses `i|b0|..|b7||...`: lines of a leading index and eight hex digits.
///
/// Returns the values and the index of the last non-zero value, or `None` unless the list has the
/// expected length.
fn parse_bits_list(values: &Values, key: &str) -> Option<(Vec<u8>, usize)> {
    let value = values.get(key)?;

    let mut out = Vec::with_capacity(LIST_LENGTH);
    let mut last_non_zero = 0;

    for line in value.split("||").filter(|line| !line.is_empty()) {
        let items: Vec<&str> = line.split('|').collect();
        if items.len() != 9 {
            return None;
        }

        for item in &items[1..] {
            let bits = u8::from_str_radix(item.trim(), 16).ok().filter(|v| *v < 16).unwrap_or(0);
            if bits > 0 {
                last_non_zero = out.len();
            }
            out.push(bits);
        }
    }

    (out.len() == LIST_LENGTH).then_some((out, last_non_zero))
}

fn scale(data: &[u8], factor: usize) -> BinsBits {
    BinsBits {
        data: data
            .iter()
            .flat_map(|bits| std::iter::repeat(*bits).take(factor))
            .collect(),
    }
}
