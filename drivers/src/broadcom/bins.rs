use crate::helpers::{
    generate_bands,
    BandDecider,
};
use dsl_monitor_models::{
    Band,
    Bins,
    BinsBits,
    BinsFloat,
    DownUp,
    Status,
    HLOG_VALID_RANGE,
    QLN_VALID_RANGE,
};

/// Hlog value reported for subcarriers without measurement.
const HLOG_NO_DATA: f64 = -96.3;
/// QLN value reported for subcarriers without measurement.
const QLN_NO_DATA: f64 = -160.0;
const MAX_GROUP_SIZE: usize = 16;

lazy_static::lazy_static! {
    static ref BAND: regex::Regex = regex::Regex::new(r"\((\d+),(\d+)\)").expect("Invalid regex");
}

pub(super) fn parse_bins(status: &Status, pb_params: &str, bits: &str, snr: &str, qln: &str, hlog: &str) -> Bins {
    let mut bins = Bins::new(status.mode);

    bins.bands = parse_pb_params(pb_params);
    let decider = BandDecider::new(&bins.bands);
    let bin_count = bins.mode.bin_count();

    let values = |text: &str, default: f64, accept: fn(f64) -> bool| {
        let mut data = DownUp::new(vec![default; bin_count], vec![default; bin_count]);
        for_each_tone(text, decider.as_ref(), bin_count, |index, value, is_downstream| {
            if let Ok(value) = value.parse::<f64>() {
                if accept(value) {
                    let target = if is_downstream { &mut data.downstream } else { &mut data.upstream };
                    target[index] = value;
                }
            }
        });
        data
    };

    let bits = values(bits, 0.0, |v| v != 0.0);
    bins.bits = bits.map(|data| BinsBits {
        data: data.into_iter().map(|v| v.clamp(0.0, 15.0) as u8).collect(),
    });

    let snr_valid = |v: f64| v != 0.0;
    bins.snr = values(snr, 0.0, snr_valid).map(|data| grouped(data, snr_valid));

    let qln_valid = |v: f64| v != 0.0 && QLN_VALID_RANGE.contains(&v);
    bins.qln = values(qln, 0.0, qln_valid).map(|data| grouped(data, |v| v != 0.0));

    let hlog_valid = |v: f64| HLOG_VALID_RANGE.contains(&v);
    bins.hlog = values(hlog, HLOG_NO_DATA, hlog_valid).map(|data| grouped(data, hlog_valid));

    generate_bands(&mut bins);

    bins
}

/// Reads the final medley band plan, e.g. `US: (32,869) (1206,1959)`.
fn parse_pb_params(pb_params: &str) -> DownUp<Vec<Band>> {
    let mut bands = DownUp::<Vec<Band>>::default();

    let lines = pb_params
        .lines()
        .skip_while(|line| {
            let lower = line.trim().to_ascii_lowercase();
            !(lower.starts_with("medley") && lower.ends_with("band plan"))
        })
        .skip(1);

    for line in lines {
        let lower = line.trim_start().to_ascii_lowercase();
        let target = if lower.starts_with("us:") {
            &mut bands.upstream
        } else if lower.starts_with("ds:") {
            &mut bands.downstream
        } else {
            continue;
        };

        for captures in BAND.captures_iter(line) {
            if let (Ok(start), Ok(end)) = (captures[1].parse(), captures[2].parse()) {
                target.push(Band::new(start, end));
            }
        }
    }

    bands
}

/// Calls `handler` for every `index value` row following the `Tone number` header.
fn for_each_tone(
    text: &str,
    decider: Option<&BandDecider>,
    bin_count: usize,
    mut handler: impl FnMut(usize, &str, bool),
) {
    let Some(decider) = decider else {
        return;
    };

    let rows = text
        .lines()
        .skip_while(|line| !line.trim_start().to_ascii_lowercase().starts_with("tone number"))
        .skip(1);

    for row in rows {
        let fields: Vec<&str> = row.split_whitespace().collect();
        if let [index, value] = fields[..] {
            match index.parse::<usize>() {
                Ok(index) if index < bin_count => handler(index, value, decider.is_downstream(index)),
                _ => {}
            }
        }
    }
}

/// Detects values repeated for groups of neighbouring tones, up to a group size of 16.
fn detect_group_size(data: &[f64], is_valid: impl Fn(f64) -> bool) -> usize {
    let mut group_size = 1;

    while group_size < MAX_GROUP_SIZE {
        let next = group_size * 2;
        if data.len() % next != 0 {
            break;
        }

        let differs = (0..data.len().saturating_sub(next)).step_by(next).any(|i| {
            let (a, b) = (data[i], data[i + group_size]);
            is_valid(a) && is_valid(b) && a != b
        });
        if differs {
            break;
        }

        group_size = next;
    }

    group_size
}

/// Collapses groups of identical values into one entry per group.
fn grouped(data: Vec<f64>, is_valid: impl Fn(f64) -> bool) -> BinsFloat {
    let group_size = detect_group_size(&data, is_valid);
    if group_size == 1 {
        return BinsFloat::new(1, data);
    }

    let data = (0..data.len() / group_size)
        .map(|i| data[i * group_size + group_size / 2])
        .collect();
    BinsFloat::new(group_size, data)
}
