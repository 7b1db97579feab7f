//! Engineer page values of a Speedport on a VDSL2 line.

use super::session::Values;
use std::fmt::Write as _;

pub(crate) fn values(pairs: &[(&str, &str)]) -> Values {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Builds a `BinallocaDown`/`BinallocaUp` value with the given `(index, bits)` set and all other
/// entries zero.
pub(crate) fn allocation(set: &[(usize, u8)]) -> String {
    let mut data = [0u8; 512];
    for (index, bits) in set {
        data[*index] = *bits;
    }

    let mut out = String::new();
    for (line, chunk) in data.chunks(8).enumerate() {
        let _ = write!(out, "{line}");
        for bits in chunk {
            let _ = write!(out, "|{bits:x}");
        }
        out.push_str("||");
    }
    out
}

pub(crate) fn version() -> Values {
    values(&[("Xdsl", "B2pvfbH045k.d26q"), ("FirmwareVersion", "050124.4.8.001.0")])
}

pub(crate) fn dsl() -> Values {
    let down = allocation(&[(150, 0xc)]);
    let up = allocation(&[(10, 5)]);
    values(&[
        ("State", "Up"),
        ("DslOperMode", "VDSL"),
        ("ActualDataDown", "100000"),
        ("ActualDataUp", "40000"),
        ("AttainDataDown", "116000"),
        ("AttainDataUp", "46000"),
        ("InterDelayDown", "0"),
        ("InterDelayUp", "1"),
        ("LineAttenDown", "135"),
        ("LineAttenUp", "120"),
        ("SnrMarginDown", "75"),
        ("SnrMarginUp", "110"),
        ("SignalLevDown", "145"),
        ("SignalLevUp", "70"),
        ("FecErrCDown", "123"),
        ("FecErrCUp", "4"),
        ("CrcErrCDown", "5"),
        ("CrcErrCUp", ""),
        ("BinallocaDown", down.as_str()),
        ("BinallocaUp", up.as_str()),
    ])
}

/// Serializes values the way the device does.
pub(crate) fn json(values: &Values) -> String {
    let mut vars: Vec<_> = values
        .iter()
        .map(|(id, value)| serde_json::json!({ "vartype": "value", "varid": id, "varvalue": value }))
        .collect();
    vars.sort_by_key(|var| var["varid"].as_str().map(str::to_string));
    serde_json::Value::Array(vars).to_string()
}
