use crate::{
    storage::{
        expect_end,
        periods_between,
        read_count,
        read_duration,
        read_f64s,
        read_header,
        read_time,
        truncate,
        write_count,
        write_duration,
        write_f64s,
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
    Utc,
};
use dsl_monitor_models::{
    is_valid_snr,
    Bins as LineBins,
    BinsFloat,
    BinsFloatMinMax,
    BinsHistory,
    DownUp,
    Mode,
    ModeType,
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

const MODE_FIELD_LEN: usize = 64;
const MIN_UPTIME: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinsConfig {
    pub period_length: Duration,
    pub period_count: usize,
    pub max_bin_count: usize,
}

impl Default for BinsConfig {
    fn default() -> Self {
        Self {
            period_length: Duration::from_secs(3600),
            period_count: 24,
            max_bin_count: 1024,
        }
    }
}

impl BinsConfig {
    fn validate(&self) -> Result<(), HistoryError> {
        if self.period_length.is_zero() != (self.period_count == 0) {
            return Err(HistoryError::InvalidConfig(
                "period length and period count must both be zero or both be non-zero",
            ));
        }
        if self.max_bin_count == 0 {
            return Err(HistoryError::InvalidConfig("max bin count must be non-zero"));
        }
        Ok(())
    }

    fn is_total_only(&self) -> bool {
        self.period_count == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MinMax {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl MinMax {
    fn new(count: usize) -> Self {
        Self {
            min: vec![0.0; count],
            max: vec![0.0; count],
        }
    }

    fn clear(&mut self) {
        self.min.fill(0.0);
        self.max.fill(0.0);
    }

    fn fold(&mut self, index: usize, value: f64) {
        let min = &mut self.min[index];
        if *min == 0.0 || value < *min {
            *min = value;
        }
        let max = &mut self.max[index];
        if *max == 0.0 || value > *max {
            *max = value;
        }
    }

    fn fold_envelope(&mut self, other: &MinMax) {
        for (index, (min, max)) in other.min.iter().zip(&other.max).enumerate() {
            if *min != 0.0 {
                self.fold(index, *min);
            }
            if *max != 0.0 {
                self.fold(index, *max);
            }
        }
    }
}

/// Envelope for one direction, sized from the source SNR shape.
#[derive(Debug, Clone, PartialEq)]
struct SnrMinMax {
    original_group_size: usize,
    original_count: usize,
    group_size: usize,
    periods: Vec<MinMax>,
    total: MinMax,
}

impl SnrMinMax {
    fn empty() -> Self {
        Self::new(0, 0, 0, 1)
    }

    fn new(original_group_size: usize, original_count: usize, period_count: usize, max_bin_count: usize) -> Self {
        let mut factor = 1;
        while original_count.div_ceil(factor) > max_bin_count {
            factor *= 2;
        }
        let count = original_count.div_ceil(factor);

        Self {
            original_group_size,
            original_count,
            group_size: original_group_size * factor,
            periods: vec![MinMax::new(count); period_count],
            total: MinMax::new(count),
        }
    }

    fn has_data(&self) -> bool {
        self.original_group_size != 0 && self.original_count != 0
    }

    fn dimensions(snr: &BinsFloat) -> (usize, usize) {
        if snr.data.is_empty() || snr.group_size == 0 {
            (0, 0)
        } else {
            (snr.group_size, snr.data.len())
        }
    }

    /// A source that drops to nothing after a resync keeps the existing envelope.
    fn needs_reset(&self, snr: &BinsFloat) -> bool {
        let dims = Self::dimensions(snr);
        if self.has_data() && dims == (0, 0) {
            return false;
        }
        dims != (self.original_group_size, self.original_count)
    }

    fn clear_periods(&mut self, start: usize, count: usize) {
        let len = self.periods.len();
        for k in 0..count.min(len) {
            self.periods[(start + k) % len].clear();
        }
    }

    fn recalculate_total(&mut self) {
        let mut total = MinMax::new(self.total.min.len());
        for period in &self.periods {
            total.fold_envelope(period);
        }
        self.total = total;
    }

    fn fold(&mut self, snr: &BinsFloat, period_index: Option<usize>) {
        if !self.has_data() || Self::dimensions(snr) != (self.original_group_size, self.original_count) {
            return;
        }

        let factor = self.group_size / self.original_group_size;
        for (i, value) in snr.data.iter().enumerate() {
            if !is_valid_snr(*value) {
                continue;
            }
            let num = i / factor;
            self.total.fold(num, *value);
            if let Some(index) = period_index {
                self.periods[index].fold(num, *value);
            }
        }
    }

    fn data(&self) -> BinsFloatMinMax {
        BinsFloatMinMax {
            group_size: self.group_size,
            min: self.total.min.clone(),
            max: self.total.max.clone(),
        }
    }

    fn chronological(&self, period_index: usize) -> impl Iterator<Item = &MinMax> {
        let len = self.periods.len();
        (0..len).map(move |i| &self.periods[(period_index + 1 + i) % len])
    }
}

/// Rolling min/max envelope of the SNR per subcarrier group.
#[derive(Debug, Clone)]
pub struct Bins {
    config: BinsConfig,
    mode: Mode,
    period_start: DateTime<Utc>,
    period_index: usize,
    snr: DownUp<SnrMinMax>,
}

impl PartialEq for Bins {
    fn eq(&self, other: &Self) -> bool {
        let same_dir = |a: &SnrMinMax, b: &SnrMinMax| {
            a.original_group_size == b.original_group_size
                && a.original_count == b.original_count
                && a.group_size == b.group_size
                && a.total == b.total
                && a.chronological(self.period_index).eq(b.chronological(other.period_index))
        };
        self.config == other.config
            && self.mode == other.mode
            && self.period_start == other.period_start
            && same_dir(&self.snr.downstream, &other.snr.downstream)
            && same_dir(&self.snr.upstream, &other.snr.upstream)
    }
}

impl Bins {
    pub fn new(config: BinsConfig) -> Result<Self, HistoryError> {
        config.validate()?;
        Ok(Self {
            config,
            mode: Mode::default(),
            period_start: DateTime::<Utc>::UNIX_EPOCH,
            period_index: 0,
            snr: DownUp::new(SnrMinMax::empty(), SnrMinMax::empty()),
        })
    }

    pub fn config(&self) -> BinsConfig {
        self.config
    }

    fn current_period_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.config.is_total_only() {
            DateTime::<Utc>::UNIX_EPOCH
        } else {
            truncate(now, self.config.period_length)
        }
    }

    fn needs_reset(&self, bins: &LineBins) -> bool {
        self.mode != bins.mode
            || self.snr.downstream.needs_reset(&bins.snr.downstream)
            || self.snr.upstream.needs_reset(&bins.snr.upstream)
    }

    fn reset(&mut self, bins: &LineBins, period_start: DateTime<Utc>) {
        debug!(mode = %bins.mode, "Resetting bins history");
        let config = self.config;
        let make = |snr: &BinsFloat| {
            let (group_size, count) = SnrMinMax::dimensions(snr);
            SnrMinMax::new(group_size, count, config.period_count, config.max_bin_count)
        };
        self.mode = bins.mode;
        self.period_start = period_start;
        self.period_index = 0;
        self.snr = DownUp::new(make(&bins.snr.downstream), make(&bins.snr.upstream));
    }

    fn advance(&mut self, period_start: DateTime<Utc>) {
        let elapsed = periods_between(self.period_start, period_start, self.config.period_length);
        if elapsed == 0 {
            return;
        }

        let count = self.config.period_count;
        for snr in self.snr.iter_mut() {
            snr.clear_periods(self.period_index + 1, elapsed);
            snr.recalculate_total();
        }
        self.period_index = (self.period_index + elapsed % count) % count;
        self.period_start = period_start;
    }

    /// Folds one observation into the envelope.
    ///
    /// Observations outside showtime, within the first minute after sync or with an unknown mode
    /// are ignored.
    pub fn update(&mut self, status: &Status, bins: &LineBins, now: DateTime<Utc>) {
        if status.state != State::Showtime {
            return;
        }
        if status.uptime.is_some_and(|uptime| uptime < MIN_UPTIME) {
            return;
        }
        if bins.mode.kind == ModeType::Unknown {
            return;
        }

        let current_period_start = self.current_period_start(now);
        if self.needs_reset(bins) || self.period_start > current_period_start {
            self.reset(bins, current_period_start);
        }

        let period_index = if self.config.is_total_only() {
            None
        } else {
            self.advance(current_period_start);
            Some(self.period_index)
        };

        self.snr.downstream.fold(&bins.snr.downstream, period_index);
        self.snr.upstream.fold(&bins.snr.upstream, period_index);
    }

    pub fn data(&self) -> BinsHistory {
        BinsHistory {
            snr: DownUp::new(self.snr.downstream.data(), self.snr.upstream.data()),
        }
    }

    /// Writes a binary snapshot, periods in chronological order.
    pub fn save(&self, w: &mut impl Write, now: DateTime<Utc>) -> Result<(), HistoryError> {
        write_header(w, now)?;

        write_duration(w, self.config.period_length)?;
        write_count(w, self.config.period_count)?;
        write_count(w, self.config.max_bin_count)?;

        let mut mode = [0u8; MODE_FIELD_LEN];
        let mode_string = self.mode.to_string();
        let len = mode_string.len().min(MODE_FIELD_LEN);
        mode[..len].copy_from_slice(&mode_string.as_bytes()[..len]);
        w.write_all(&mode)?;
        write_time(w, self.period_start)?;

        for snr in [&self.snr.downstream, &self.snr.upstream] {
            w.write_u32::<BigEndian>(snr.original_group_size as u32)?;
            w.write_u32::<BigEndian>(snr.original_count as u32)?;
            if !snr.has_data() {
                continue;
            }
            if self.config.is_total_only() {
                write_f64s(w, &snr.total.min)?;
                write_f64s(w, &snr.total.max)?;
            } else {
                for period in snr.chronological(self.period_index) {
                    write_f64s(w, &period.min)?;
                    write_f64s(w, &period.max)?;
                }
            }
        }

        Ok(())
    }

    /// Replaces the state with a snapshot. On error the current state is left untouched.
    pub fn load(&mut self, r: &mut impl Read, now: DateTime<Utc>) -> Result<(), HistoryError> {
        let created = read_header(r, now)?;

        let config = BinsConfig {
            period_length: read_duration(r)?,
            period_count: read_count(r)?,
            max_bin_count: read_count(r)?,
        };
        if config != self.config {
            return Err(HistoryError::ConfigMismatch);
        }

        let mut mode = [0u8; MODE_FIELD_LEN];
        r.read_exact(&mut mode)?;
        let end = mode.iter().position(|b| *b == 0).unwrap_or(MODE_FIELD_LEN);
        let mode = Mode::parse(&String::from_utf8_lossy(&mode[..end]));

        let period_start = read_time(r)?;
        if period_start > created {
            return Err(HistoryError::PeriodStart);
        }
        if !config.is_total_only() && truncate(period_start, config.period_length) != period_start {
            return Err(HistoryError::PeriodStart);
        }

        let mut snr = DownUp::new(SnrMinMax::empty(), SnrMinMax::empty());
        for dir in snr.iter_mut() {
            let group_size = r.read_u32::<BigEndian>()? as usize;
            let count = r.read_u32::<BigEndian>()? as usize;
            if group_size == 0 || count == 0 {
                continue;
            }

            *dir = SnrMinMax::new(group_size, count, config.period_count, config.max_bin_count);
            if config.is_total_only() {
                read_f64s(r, &mut dir.total.min)?;
                read_f64s(r, &mut dir.total.max)?;
            } else {
                for period in dir.periods.iter_mut() {
                    read_f64s(r, &mut period.min)?;
                    read_f64s(r, &mut period.max)?;
                }
                dir.recalculate_total();
            }
        }

        expect_end(r)?;

        self.mode = mode;
        self.period_start = period_start;
        self.period_index = config.period_count.saturating_sub(1);
        self.snr = snr;

        Ok(())
    }
}
