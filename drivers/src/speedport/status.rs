use super::session::Values;
use dsl_monitor_models::{
    DownUp,
    ErrorCounter,
    Inventory,
    Mode,
    ModeSubtype,
    ModeType,
    State,
    Status,
};

pub(super) fn parse_status(version: &Values, dsl: &Values) -> Status {
    let mut status = Status {
        state: dsl.get("State").map(|v| State::parse_tr06x(v)).unwrap_or_default(),
        mode: dsl.get("DslOperMode").map(|v| parse_mode(v)).unwrap_or_default(),
        near_end_inventory: near_end_inventory(version),
        ..Default::default()
    };

    status.actual_rate = int_pair(dsl, "ActualDataDown", "ActualDataUp");
    status.attainable_rate = int_pair(dsl, "AttainDataDown", "AttainDataUp");

    status.interleaving_delay = float_pair(dsl, "InterDelayDown", "InterDelayUp", 1.0);
    status.attenuation = float_pair(dsl, "LineAttenDown", "LineAttenUp", 0.1);
    status.snr_margin = float_pair(dsl, "SnrMarginDown", "SnrMarginUp", 0.1);
    status.power = float_pair(dsl, "SignalLevDown", "SignalLevUp", 0.1);

    *status.counter_mut(ErrorCounter::Fec) = int_pair(dsl, "FecErrCDown", "FecErrCUp");
    *status.counter_mut(ErrorCounter::Crc) = int_pair(dsl, "CrcErrCDown", "CrcErrCUp");

    status
}

/// The profile is not reported, it is inferred from the bit allocation later on.
fn parse_mode(value: &str) -> Mode {
    if value == "VDSL" {
        Mode::new(ModeType::Vdsl2, ModeSubtype::Unknown)
    } else {
        Mode::parse(value)
    }
}

fn near_end_inventory(version: &Values) -> Inventory {
    let xdsl = version.get("Xdsl").map(String::as_str).unwrap_or_default();
    let vendor = if xdsl.starts_with("B2pv") { "Broadcom" } else { "Speedport" };
    Inventory::new(vendor, xdsl)
}

fn int_pair(values: &Values, down: &str, up: &str) -> DownUp<Option<i64>> {
    let get = |key: &str| values.get(key).and_then(|v| v.trim().parse().ok());
    DownUp::new(get(down), get(up))
}

fn float_pair(values: &Values, down: &str, up: &str, factor: f64) -> DownUp<Option<f64>> {
    let get = |key: &str| {
        values
            .get(key)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(|v| v * factor)
    };
    DownUp::new(get(down), get(up))
}
