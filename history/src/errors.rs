use crate::{
    storage::{
        expect_end,
        periods_between,
        read_count,
        read_duration,
        read_header,
        read_time,
        truncate,
        write_count,
        write_duration,
        write_header,
        write_time,
    },
    HistoryError,
};
use byteorder::{
    BigEndian,
    ReadBytesExt,
    WriteBytesExt,
};
use chrono::{
    DateTime,
    SubsecRound as _,
    TimeDelta,
    Utc,
};
use dsl_monitor_models::{
    ErrorCounter,
    ErrorCounts,
    ErrorsHistory,
    ErrorsPeriod,
    State,
    Status,
};
use std::{
    io::{
        Read,
        Write,
    },
    time::Duration,
};
use strum::IntoEnumIterator as _;

const MIN_UPTIME: Duration = Duration::from_secs(60);
const COUNTER_LIMIT: i64 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorsConfig {
    pub period_length: Duration,
    pub period_count: usize,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            period_length: Duration::from_secs(5 * 60),
            period_count: 288,
        }
    }
}

/// Values from the previous update needed to compute counter increments.
#[derive(Debug, Clone)]
struct Observation {
    time: DateTime<Utc>,
    state: State,
    uptime: Option<Duration>,
    counts: ErrorCounts,
}

/// Increment between two raw counter readings.
///
/// A reading that drops from the upper half of the u32 range into the lower half is taken as a
/// 32-bit wrap. Increments of 2^31 or more are rejected.
pub fn counter_diff(prev: i64, cur: i64) -> Option<i64> {
    let diff = if prev >= COUNTER_LIMIT && cur < COUNTER_LIMIT {
        cur.checked_sub(prev)?.rem_euclid(1 << 32)
    } else {
        cur.checked_sub(prev)?
    };
    (0..COUNTER_LIMIT).contains(&diff).then_some(diff)
}

/// Ring of per-period error counter increments.
#[derive(Debug, Clone)]
pub struct Errors {
    config: ErrorsConfig,
    period_start: DateTime<Utc>,
    period_index: usize,
    data: Vec<ErrorsPeriod>,
    last: Option<Observation>,
}

impl PartialEq for Errors {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.period_start == other.period_start
            && self.chronological().eq(other.chronological())
    }
}

impl Errors {
    pub fn new(config: ErrorsConfig) -> Result<Self, HistoryError> {
        if config.period_length.is_zero() || config.period_count == 0 {
            return Err(HistoryError::InvalidConfig(
                "period length and period count must be non-zero",
            ));
        }
        Ok(Self {
            config,
            period_start: DateTime::<Utc>::UNIX_EPOCH,
            period_index: 0,
            data: Vec::new(),
            last: None,
        })
    }

    pub fn config(&self) -> ErrorsConfig {
        self.config
    }

    fn chronological(&self) -> impl Iterator<Item = ErrorsPeriod> + '_ {
        let len = self.config.period_count;
        (0..len).map(move |i| {
            self.data
                .get((self.period_index + 1 + i) % len)
                .copied()
                .unwrap_or_default()
        })
    }

    fn period_length(&self) -> TimeDelta {
        TimeDelta::from_std(self.config.period_length).unwrap_or(TimeDelta::MAX)
    }

    fn update_period(&mut self, now: DateTime<Utc>) {
        let period_time = match &self.last {
            Some(last) if now > last.time && now - last.time <= self.period_length() => {
                last.time + (now - last.time) / 2
            }
            _ => now,
        };
        let current_period_start = truncate(period_time, self.config.period_length);

        if self.data.is_empty() || self.period_start > current_period_start {
            self.data = vec![ErrorsPeriod::default(); self.config.period_count];
            self.period_start = current_period_start;
            self.period_index = 0;
        }

        let elapsed = periods_between(self.period_start, current_period_start, self.config.period_length);
        let count = self.config.period_count;
        for _ in 0..elapsed.min(count) {
            self.period_index = (self.period_index + 1) % count;
            self.data[self.period_index] = ErrorsPeriod::default();
        }
        if elapsed > count {
            self.period_index = (self.period_index + (elapsed - count) % count) % count;
        }
        self.period_start = current_period_start;
    }

    fn accepts_increment(&self, last: &Observation, status: &Status, now: DateTime<Utc>) -> bool {
        if now < last.time || now - last.time > self.period_length() {
            return false;
        }
        if !last.state.is_showtime() || !status.state.is_showtime() {
            return false;
        }
        if let (Some(prev), Some(cur)) = (last.uptime, status.uptime) {
            if cur < prev {
                return false;
            }
        }
        !status.uptime.is_some_and(|uptime| uptime < MIN_UPTIME)
    }

    /// Accounts one observation. Increments are attributed to the period in the middle of the two
    /// samples they were derived from.
    pub fn update(&mut self, status: &Status, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(0);

        self.update_period(now);

        let accept = self
            .last
            .as_ref()
            .is_some_and(|last| self.accepts_increment(last, status, now));

        let period = &mut self.data[self.period_index];
        match status.state {
            State::Unknown => {}
            State::Showtime => {
                period.showtime.get_or_insert(true);
            }
            _ => period.showtime = Some(false),
        }

        if let (true, Some(last)) = (accept, &self.last) {
            for counter in ErrorCounter::iter() {
                let prev = last.counts[counter];
                let cur = status.errors[counter];
                let slot = &mut period.counts[counter];
                for (slot, prev, cur) in [
                    (&mut slot.downstream, prev.downstream, cur.downstream),
                    (&mut slot.upstream, prev.upstream, cur.upstream),
                ] {
                    if let Some(diff) = prev.zip(cur).and_then(|(prev, cur)| counter_diff(prev, cur)) {
                        *slot = Some(slot.unwrap_or(0).saturating_add(diff));
                    }
                }
            }
        }

        self.last = Some(Observation {
            time: now,
            state: status.state,
            uptime: status.uptime,
            counts: status.errors,
        });
    }

    pub fn data(&self) -> ErrorsHistory {
        ErrorsHistory {
            end_time: self.period_start + self.period_length(),
            period_length: self.config.period_length,
            period_count: self.config.period_count,
            periods: self.chronological().collect(),
        }
    }

    pub fn save(&self, w: &mut impl Write, now: DateTime<Utc>) -> Result<(), HistoryError> {
        write_header(w, now)?;
        write_duration(w, self.config.period_length)?;
        write_count(w, self.config.period_count)?;
        write_time(w, self.period_start)?;

        for period in self.chronological() {
            w.write_u8(period.showtime.is_some() as u8)?;
            w.write_u8(period.showtime.unwrap_or(false) as u8)?;
            for counter in ErrorCounter::iter() {
                let values = period.counts[counter];
                for value in [values.downstream, values.upstream] {
                    w.write_u8(value.is_some() as u8)?;
                    w.write_i64::<BigEndian>(value.unwrap_or(0))?;
                }
            }
        }

        Ok(())
    }

    /// Replaces the state with a snapshot. On error the current state is left untouched.
    pub fn load(&mut self, r: &mut impl Read, now: DateTime<Utc>) -> Result<(), HistoryError> {
        let created = read_header(r, now)?;

        let config = ErrorsConfig {
            period_length: read_duration(r)?,
            period_count: read_count(r)?,
        };
        if config != self.config {
            return Err(HistoryError::ConfigMismatch);
        }

        let period_start = read_time(r)?;
        if period_start > created || truncate(period_start, config.period_length) != period_start {
            return Err(HistoryError::PeriodStart);
        }

        let mut data = vec![ErrorsPeriod::default(); config.period_count];
        for period in data.iter_mut() {
            let valid = r.read_u8()? != 0;
            let showtime = r.read_u8()? != 0;
            period.showtime = valid.then_some(showtime);

            for counter in ErrorCounter::iter() {
                let values = &mut period.counts[counter];
                for value in [&mut values.downstream, &mut values.upstream] {
                    let valid = r.read_u8()? != 0;
                    let int = r.read_i64::<BigEndian>()?;
                    if int < 0 {
                        return Err(HistoryError::InvalidValue);
                    }
                    *value = valid.then_some(int);
                }
            }
        }

        expect_end(r)?;

        self.period_start = period_start;
        self.period_index = config.period_count - 1;
        self.data = data;
        self.last = None;

        Ok(())
    }
}
