use crate::{
    format::{
        format_bool,
        format_duration,
        format_float,
        format_int,
        format_milliseconds,
    },
    DownUp,
    Inventory,
    Mode,
    State,
};
use serde::{
    Serialize,
    Serializer,
};
use std::{
    fmt::Write as _,
    ops::{
        Index,
        IndexMut,
    },
    time::Duration,
};
use strum::{
    Display,
    EnumCount,
    EnumIter,
};

#[derive(Debug, Clone, Copy, Display, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VectoringState {
    Off,
    Friendly,
    Full,
}

/// Online reconfiguration (bitswap or seamless rate adaptation).
#[derive(Debug, Default, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OlrValue {
    pub enabled: Option<bool>,
    pub executed_count: Option<i64>,
}

impl OlrValue {
    /// An executed reconfiguration implies the feature is enabled.
    pub fn normalize(&mut self) {
        if self.enabled.is_none() && self.executed_count.is_some_and(|count| count > 0) {
            self.enabled = Some(true);
        }
    }

    fn format(&self) -> String {
        match (self.enabled, self.executed_count) {
            (Some(true), Some(count)) => format!("on ({count})"),
            (enabled, _) => format_bool(enabled),
        }
    }
}

/// Error counters tracked per direction.
#[derive(Debug, Clone, Copy, Display, EnumIter, EnumCount, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCounter {
    #[strum(to_string = "RTX TX")]
    RtxTx,
    #[strum(to_string = "RTX C")]
    RtxC,
    #[strum(to_string = "RTX UC")]
    RtxUc,
    #[strum(to_string = "FEC")]
    Fec,
    #[strum(to_string = "CRC")]
    Crc,
    #[strum(to_string = "ES")]
    Es,
    #[strum(to_string = "SES")]
    Ses,
}

/// One optional value per counter and direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCounts([DownUp<Option<i64>>; ErrorCounter::COUNT]);

impl Index<ErrorCounter> for ErrorCounts {
    type Output = DownUp<Option<i64>>;

    fn index(&self, counter: ErrorCounter) -> &Self::Output {
        &self.0[counter as usize]
    }
}

impl IndexMut<ErrorCounter> for ErrorCounts {
    fn index_mut(&mut self, counter: ErrorCounter) -> &mut Self::Output {
        &mut self.0[counter as usize]
    }
}

impl Serialize for ErrorCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap as _;
        use strum::IntoEnumIterator as _;

        let mut map = serializer.serialize_map(Some(ErrorCounter::COUNT))?;
        for counter in ErrorCounter::iter() {
            map.serialize_entry(&counter, &self[counter])?;
        }
        map.end()
    }
}

/// Normalized physical-layer status of a DSL line.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub state: State,
    pub mode: Mode,
    #[serde(serialize_with = "serialize_uptime")]
    pub uptime: Option<Duration>,

    pub near_end_inventory: Inventory,
    pub far_end_inventory: Inventory,

    /// kbit/s
    pub actual_rate: DownUp<Option<i64>>,
    /// kbit/s
    pub attainable_rate: DownUp<Option<i64>>,
    /// kbit/s
    pub minimum_error_free_throughput: DownUp<Option<i64>>,

    pub bitswap: DownUp<OlrValue>,
    pub seamless_rate_adaptation: DownUp<OlrValue>,

    /// ms
    pub interleaving_delay: DownUp<Option<f64>>,
    /// symbols
    pub impulse_noise_protection: DownUp<Option<f64>>,
    pub retransmission_enabled: DownUp<Option<bool>>,
    pub vectoring: DownUp<Option<VectoringState>>,

    /// dB
    pub attenuation: DownUp<Option<f64>>,
    /// dB
    pub snr_margin: DownUp<Option<f64>>,
    /// dBm
    pub power: DownUp<Option<f64>>,

    pub errors: ErrorCounts,
}

fn serialize_uptime<S: Serializer>(uptime: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    uptime.map(|uptime| uptime.as_secs()).serialize(serializer)
}

impl Status {
    pub fn counter(&self, counter: ErrorCounter) -> &DownUp<Option<i64>> {
        &self.errors[counter]
    }

    pub fn counter_mut(&mut self, counter: ErrorCounter) -> &mut DownUp<Option<i64>> {
        &mut self.errors[counter]
    }

    /// Human readable fixed-width table of all values.
    pub fn summary(&self) -> String {
        let mut b = String::new();

        let _ = writeln!(b, "{:>16}:    {}", "State", self.state);
        let _ = writeln!(b, "{:>16}:    {}", "Mode", self.mode);
        let _ = writeln!(b, "{:>16}:    {}", "Uptime", format_duration(self.uptime));
        b.push('\n');

        let _ = writeln!(b, "{:>16}:    {}", "Remote", self.far_end_inventory);
        let _ = writeln!(b, "{:>16}:    {}", "Modem", self.near_end_inventory);
        b.push('\n');

        let kbits = |v: &DownUp<Option<i64>>| v.map(format_int);
        row(&mut b, "Actual rate", kbits(&self.actual_rate), "kbit/s");
        row(&mut b, "Attainable rate", kbits(&self.attainable_rate), "kbit/s");
        row(&mut b, "MINEFTR", kbits(&self.minimum_error_free_throughput), "kbit/s");
        b.push('\n');

        row(&mut b, "Bitswap", self.bitswap.map(|v| v.format()), "");
        row(&mut b, "Rate adaptation", self.seamless_rate_adaptation.map(|v| v.format()), "");
        b.push('\n');

        row(&mut b, "Interleaving", self.interleaving_delay.map(format_milliseconds), "ms");
        row(&mut b, "INP", self.impulse_noise_protection.map(format_float), "symbols");
        row(&mut b, "Retransmission", self.retransmission_enabled.map(format_bool), "");
        b.push('\n');

        let vectoring = self
            .vectoring
            .map(|v| v.map(|state| state.to_string()).unwrap_or_else(|| "-".to_string()));
        row(&mut b, "Vectoring", vectoring, "");
        b.push('\n');

        row(&mut b, "Attenuation", self.attenuation.map(format_float), "dB");
        row(&mut b, "SNR margin", self.snr_margin.map(format_float), "dB");
        row(&mut b, "Transmit power", self.power.map(format_float), "dBm");
        b.push('\n');

        for (counter, label) in [
            (ErrorCounter::RtxTx, "RTX TX Count"),
            (ErrorCounter::RtxC, "RTX C Count"),
            (ErrorCounter::RtxUc, "RTX UC Count"),
        ] {
            row(&mut b, label, self.errors[counter].map(format_int), "");
        }
        b.push('\n');

        row(&mut b, "FEC Count", self.errors[ErrorCounter::Fec].map(format_int), "");
        row(&mut b, "CRC Count", self.errors[ErrorCounter::Crc].map(format_int), "");
        b.push('\n');

        row(&mut b, "ES Count", self.errors[ErrorCounter::Es].map(format_int), "");
        row(&mut b, "SES Count", self.errors[ErrorCounter::Ses].map(format_int), "");

        b
    }
}

fn row(b: &mut String, label: &str, values: DownUp<String>, unit: &str) {
    let _ = writeln!(
        b,
        "{:>16}:    {:>8} {:<7}  {:>8} {:<7}",
        label, values.downstream, unit, values.upstream, unit
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ModeSubtype,
        ModeType,
    };

    #[test]
    fn olr_normalize_sets_enabled() {
        let mut olr = OlrValue {
            enabled: None,
            executed_count: Some(3),
        };
        olr.normalize();
        assert_eq!(olr.enabled, Some(true));

        let mut olr = OlrValue {
            enabled: Some(false),
            executed_count: Some(3),
        };
        olr.normalize();
        assert_eq!(olr.enabled, Some(false));

        let mut olr = OlrValue {
            enabled: None,
            executed_count: Some(0),
        };
        olr.normalize();
        assert_eq!(olr.enabled, None);
    }

    #[test]
    fn summary_rows() {
        let mut status = Status {
            state: State::Showtime,
            mode: Mode::new(ModeType::Vdsl2, ModeSubtype::Profile17a),
            uptime: Some(Duration::from_secs(26 * 3600 + 60)),
            actual_rate: DownUp::new(Some(100_000), Some(40_000)),
            interleaving_delay: DownUp::new(Some(0.25), Some(4.0)),
            ..Default::default()
        };
        status.errors[ErrorCounter::Fec] = DownUp::new(Some(12), None);

        let summary = status.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "           State:    Showtime");
        assert_eq!(lines[1], "            Mode:    VDSL2 Profile 17a");
        assert_eq!(lines[2], "          Uptime:    1 day, 2 hours, 1 minute");
        assert!(summary.contains("     Actual rate:      100000 kbit/s      40000 kbit/s \n"));
        assert!(summary.contains("    Interleaving:        0.25 ms              4 ms     \n"));
        assert!(summary.contains("       FEC Count:          12                 -        \n"));
        assert!(summary.contains("          Remote:    Unknown\n"));
    }
}
