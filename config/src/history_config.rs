use dsl_monitor_history::{
    BinsConfig,
    ErrorsConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Duration;

/// Period layout of the rolling histories. A zero period length with a zero count keeps a single
/// total instead of periods.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    pub bins_period_secs: u64,
    pub bins_period_count: usize,
    pub bins_max_bin_count: usize,
    pub errors_period_secs: u64,
    pub errors_period_count: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let bins = BinsConfig::default();
        let errors = ErrorsConfig::default();
        Self {
            bins_period_secs: bins.period_length.as_secs(),
            bins_period_count: bins.period_count,
            bins_max_bin_count: bins.max_bin_count,
            errors_period_secs: errors.period_length.as_secs(),
            errors_period_count: errors.period_count,
        }
    }
}

impl HistoryConfig {
    pub fn bins(&self) -> BinsConfig {
        BinsConfig {
            period_length: Duration::from_secs(self.bins_period_secs),
            period_count: self.bins_period_count,
            max_bin_count: self.bins_max_bin_count,
        }
    }

    pub fn errors(&self) -> ErrorsConfig {
        ErrorsConfig {
            period_length: Duration::from_secs(self.errors_period_secs),
            period_count: self.errors_period_count,
        }
    }
}
