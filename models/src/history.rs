use crate::{
    format::{
        format_bool,
        format_int,
    },
    DownUp,
    ErrorCounter,
    ErrorCounts,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Serialize,
    Serializer,
};
use std::{
    fmt,
    time::Duration,
};
use strum::IntoEnumIterator as _;

/// Min/max envelope over grouped subcarriers. `0.0` means no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinsFloatMinMax {
    pub group_size: usize,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl Default for BinsFloatMinMax {
    fn default() -> Self {
        Self {
            group_size: 1,
            min: Vec::new(),
            max: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BinsHistory {
    pub snr: DownUp<BinsFloatMinMax>,
}

/// Counter increments accumulated during one period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorsPeriod {
    /// Whether the line stayed in showtime for every observation in this period.
    pub showtime: Option<bool>,
    pub counts: ErrorCounts,
}

/// Chronological view of the errors ring, oldest period first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorsHistory {
    pub end_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_secs")]
    pub period_length: Duration,
    pub period_count: usize,
    pub periods: Vec<ErrorsPeriod>,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_secs())
}

impl Default for ErrorsHistory {
    fn default() -> Self {
        Self {
            end_time: DateTime::<Utc>::UNIX_EPOCH,
            period_length: Duration::ZERO,
            period_count: 0,
            periods: Vec::new(),
        }
    }
}

impl ErrorsHistory {
    pub fn series(&self, counter: ErrorCounter) -> DownUp<Vec<Option<i64>>> {
        DownUp::new(
            self.periods.iter().map(|p| p.counts[counter].downstream).collect(),
            self.periods.iter().map(|p| p.counts[counter].upstream).collect(),
        )
    }
}

impl fmt::Display for ErrorsHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "End time: {}", self.end_time.to_rfc3339())?;
        writeln!(f, "Period length: {}s", self.period_length.as_secs())?;
        writeln!(f, "Period count: {}", self.period_count)?;
        writeln!(f)?;

        write!(f, "Showtime:")?;
        for period in &self.periods {
            write!(f, " {}", format_bool(period.showtime))?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for counter in ErrorCounter::iter() {
            let series = self.series(counter);
            for (direction, values) in [("Downstream", series.downstream), ("Upstream", series.upstream)] {
                write!(f, "{direction} {counter}:")?;
                for value in values {
                    write!(f, " {}", format_int(value))?;
                }
                writeln!(f)?;
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
