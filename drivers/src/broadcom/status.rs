use crate::helpers::{
    format_vendor,
    format_version,
    parse_hex,
};
use dsl_monitor_models::{
    DownUp,
    ErrorCounter,
    Inventory,
    Mode,
    ModeType,
    State,
    Status,
};
use std::{
    collections::HashMap,
    str::FromStr,
    time::Duration,
};

/// Lower-cased key with everything but ASCII letters and digits removed.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

pub(super) fn parse_status(stats: &str, vendor: &str, version: &str) -> Status {
    let mut status = Status::default();

    interpret_basic_stats(&mut status, &parse_basic_stats(stats));
    let (extended, link_time) = parse_extended_stats(stats);
    interpret_extended_stats(&mut status, &extended);
    status.uptime = link_time.as_deref().and_then(parse_link_time);

    parse_vendor(&mut status, vendor);
    parse_version(&mut status, version);

    status
}

/// `key: value` lines before the first indented line. Only bearer 0 is kept.
fn parse_basic_stats(stats: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for line in stats.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = normalize_key(key);
            let value = value.trim();
            if !(key == "bearer" && !value.starts_with('0')) {
                values.insert(key, value.to_string());
            }
        }
        if is_indented(line) {
            break;
        }
    }

    values
}

fn interpret_basic_stats(status: &mut Status, values: &HashMap<String, String>) {
    let get = |key: &str| values.get(key).map(String::as_str).unwrap_or_default();

    let state = get("status");
    status.state = State::parse(state);

    let mode = get("mode");
    status.mode = if mode.to_ascii_uppercase().starts_with("VDSL2") {
        let mut profile = get("vdsl2profile").to_string();
        if profile.to_ascii_lowercase().ends_with("brcmpriv1") {
            profile = "35b".to_string();
        }
        Mode::parse(&format!("VDSL2 {profile}"))
    } else {
        Mode::parse(mode)
    };

    if status.mode.kind == ModeType::Unknown {
        if state.contains("G.993") {
            status.mode.kind = ModeType::Vdsl2;
        } else if state.contains("G.992") {
            status.mode.kind = ModeType::Adsl;
        }
    }

    status.attainable_rate = parse_rates(get("max"));
    status.actual_rate = parse_rates(get("bearer"));
}

/// Parses `Upstream rate = 40000 Kbps, Downstream rate = 100000 Kbps`.
fn parse_rates(value: &str) -> DownUp<Option<i64>> {
    let mut rates = DownUp::default();

    for item in value.split(',') {
        let item = item.trim().to_ascii_lowercase();
        let number = || {
            let (_, value) = item.rsplit_once('=')?;
            value.split_whitespace().next()?.parse().ok()
        };
        if item.starts_with("upstream") {
            rates.upstream = number();
        } else if item.starts_with("downstream") {
            rates.downstream = number();
        }
    }

    rates
}

/// Two column `key: down up` values of bearer 0 and of the counters since link up.
fn parse_extended_stats(stats: &str) -> (HashMap<String, (String, String)>, Option<String>) {
    let mut values = HashMap::new();
    let mut link_time = None;
    let mut ignore = true;

    for line in stats.lines() {
        if line.is_empty() || is_indented(line) || line.contains(" time") {
            let lower = line.to_ascii_lowercase();
            if lower.contains("bearer") && !lower.contains("bearer 0") {
                ignore = true;
            } else if lower.contains(" time") {
                ignore = !lower.contains("link time");
                if !ignore {
                    link_time = line.split_once('=').map(|(_, value)| value.trim().to_string());
                }
            } else {
                ignore = false;
            }
            continue;
        }

        if ignore {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let fields: Vec<&str> = value.split_whitespace().collect();
            if let [down, up] = fields[..] {
                values.insert(normalize_key(key), (down.to_string(), up.to_string()));
            }
        }
    }

    (values, link_time)
}

fn pair<T: FromStr>(values: &HashMap<String, (String, String)>, key: &str) -> DownUp<Option<T>> {
    match values.get(key) {
        Some((down, up)) => DownUp::new(down.parse().ok(), up.parse().ok()),
        None => DownUp::new(None, None),
    }
}

fn interpret_extended_stats(status: &mut Status, values: &HashMap<String, (String, String)>) {
    status.interleaving_delay = pair(values, "delay");
    status.impulse_noise_protection = pair(values, "inp");
    status.retransmission_enabled = pair::<i64>(values, "q").map(|q| q.map(|q| q != 0));

    status.attenuation = pair(values, "attndb");
    status.snr_margin = pair(values, "snrdb");
    status.power = pair(values, "pwrdbm");

    status.minimum_error_free_throughput = pair(values, "mineftr");

    for (counter, key) in [
        (ErrorCounter::Fec, "fec"),
        (ErrorCounter::Crc, "crc"),
        (ErrorCounter::Es, "es"),
        (ErrorCounter::Ses, "ses"),
        (ErrorCounter::RtxTx, "rtxtx"),
        (ErrorCounter::RtxC, "rtxc"),
        (ErrorCounter::RtxUc, "rtxuc"),
    ] {
        *status.counter_mut(counter) = pair(values, key);
    }
}

/// Parses `1 days 2 hours 3 min 4 sec`.
fn parse_link_time(link_time: &str) -> Option<Duration> {
    let fields: Vec<&str> = link_time.split_whitespace().collect();
    if fields.len() % 2 != 0 || fields.len() > 8 {
        return None;
    }

    let mut secs = 0u64;
    for chunk in fields.chunks(2) {
        let value: u64 = chunk[0].parse().ok()?;
        let unit = chunk[1].to_ascii_lowercase();
        let factor = match unit.as_str() {
            u if u.starts_with("sec") => 1,
            u if u.starts_with("min") => 60,
            u if u.starts_with("hour") => 60 * 60,
            u if u.starts_with("day") => 24 * 60 * 60,
            _ => return None,
        };
        secs = secs.checked_add(value.checked_mul(factor)?)?;
    }

    Some(Duration::from_secs(secs))
}

fn parse_vendor(status: &mut Status, vendor: &str) {
    for line in vendor.lines() {
        let lower = line.to_ascii_lowercase();
        let value = || line.split(':').nth(1).unwrap_or_default().trim();

        if lower.starts_with("chipset vendor id:") {
            status.far_end_inventory.vendor = format_vendor(value());
        } else if lower.starts_with("chipset versionnumber:") {
            let version = parse_hex(value());
            status.far_end_inventory.version = format_version(&status.far_end_inventory.vendor, &version);
        }
    }
}

fn parse_version(status: &mut Status, version: &str) {
    let Some(line) = version
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("adsl phy:"))
    else {
        return;
    };

    let separator = if line.contains('-') { '-' } else { ':' };
    let phy = line.rsplit(separator).next().unwrap_or_default().trim();
    status.near_end_inventory = Inventory::new("Broadcom", phy);
}
