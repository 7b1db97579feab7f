use crate::Mode;
use serde::Serialize;

/// A pair of values, one per transmission direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub struct DownUp<T> {
    pub downstream: T,
    pub upstream: T,
}

impl<T> DownUp<T> {
    pub fn new(downstream: T, upstream: T) -> Self {
        Self { downstream, upstream }
    }

    pub fn as_ref(&self) -> DownUp<&T> {
        DownUp::new(&self.downstream, &self.upstream)
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> DownUp<U> {
        DownUp::new(f(self.downstream), f(self.upstream))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        [&mut self.downstream, &mut self.upstream].into_iter()
    }
}

/// Inclusive range of subcarrier indices assigned to one direction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Band {
    pub start: usize,
    pub end: usize,
}

impl Band {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Bit allocation per subcarrier, values in `0..=15`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BinsBits {
    pub data: Vec<u8>,
}

impl BinsBits {
    pub fn max_index(&self) -> Option<usize> {
        self.data.iter().rposition(|bits| *bits > 0)
    }
}

/// Per-subcarrier float values, possibly reported for groups of `group_size` subcarriers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinsFloat {
    pub group_size: usize,
    pub data: Vec<f64>,
}

impl Default for BinsFloat {
    fn default() -> Self {
        Self {
            group_size: 1,
            data: Vec::new(),
        }
    }
}

impl BinsFloat {
    pub fn new(group_size: usize, data: Vec<f64>) -> Self {
        Self { group_size, data }
    }

    /// Highest group index whose value is accepted by `is_valid`.
    pub fn max_index(&self, is_valid: impl Fn(f64) -> bool) -> Option<usize> {
        self.data.iter().rposition(|value| is_valid(*value))
    }
}

pub const SNR_VALID_RANGE: std::ops::RangeInclusive<f64> = -32.0..=95.0;
pub const QLN_VALID_RANGE: std::ops::RangeInclusive<f64> = -150.0..=-23.0;
pub const HLOG_VALID_RANGE: std::ops::RangeInclusive<f64> = -96.2..=6.0;

pub fn is_valid_snr(value: f64) -> bool {
    value != 0.0 && SNR_VALID_RANGE.contains(&value)
}

/// Per-subcarrier line data for one observation.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bins {
    pub mode: Mode,
    pub bands: DownUp<Vec<Band>>,
    pub pilot_tones: Vec<usize>,
    pub bits: DownUp<BinsBits>,
    pub snr: DownUp<BinsFloat>,
    pub qln: DownUp<BinsFloat>,
    pub hlog: DownUp<BinsFloat>,
}

impl Bins {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}
