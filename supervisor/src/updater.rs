use crate::{
    credentials::Prompter,
    distributor::DistributorMessage,
    storage,
    LineData,
    SupervisorState,
};
use chrono::{
    DateTime,
    Utc,
};
use dsl_monitor_drivers::{
    Driver,
    DriverConfig,
    Registry,
};
use dsl_monitor_history as history;
use std::{
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::{
        mpsc::UnboundedSender,
        watch,
    },
    time::sleep,
};
use tokio_util::sync::CancellationToken;

const BACKOFF_INITIAL: Duration = Duration::from_secs(2);
const BACKOFF_MAX: Duration = Duration::from_secs(30);
const SAVE_INTERVAL: Duration = Duration::from_secs(10 * 60);
const MAX_CONSECUTIVE_ERRORS: u32 = 10;
const ATTEMPTS_PER_PERIOD: usize = 2;

enum Attempt {
    Done,
    Reconnect,
    Cancelled,
}

/// Runs the connect, acquire and wait cycle. Owns the driver session and both histories.
pub(crate) struct Updater {
    pub(crate) registry: Registry,
    pub(crate) config: DriverConfig,
    pub(crate) prompter: Arc<Prompter>,
    pub(crate) events: UnboundedSender<DistributorMessage>,
    pub(crate) interval: watch::Receiver<Duration>,
    pub(crate) token: CancellationToken,
    pub(crate) state_dir: Option<PathBuf>,
    pub(crate) bins_history: history::Bins,
    pub(crate) errors_history: history::Errors,
    pub(crate) driver: Option<Box<dyn Driver>>,
    pub(crate) has_data: bool,
    pub(crate) error_count: u32,
}

impl Updater {
    #[instrument(level = "debug", skip_all, fields(driver = %self.config.driver_type, host = %self.config.host))]
    pub(crate) async fn run(mut self) {
        if let Some(dir) = &self.state_dir {
            storage::load(dir, &mut self.bins_history, &mut self.errors_history, Utc::now());
        }
        let mut next_save = next_update(Utc::now(), SAVE_INTERVAL);

        'main: loop {
            for _ in 0..ATTEMPTS_PER_PERIOD {
                match self.attempt().await {
                    Attempt::Done => break,
                    Attempt::Reconnect => continue,
                    Attempt::Cancelled => break 'main,
                }
            }

            if self.has_data && Utc::now() >= next_save {
                self.save();
                next_save = next_update(Utc::now(), SAVE_INTERVAL);
            }

            if !self.wait().await {
                break;
            }
        }

        if self.has_data {
            self.save();
        }
        self.disconnect().await;
        let _ = self.events.send(DistributorMessage::Stop);
        debug!("Updater stopped");
    }

    async fn attempt(&mut self) -> Attempt {
        if self.driver.is_none() && !self.connect().await {
            return Attempt::Cancelled;
        }
        let Some(driver) = self.driver.as_mut() else {
            return Attempt::Cancelled;
        };

        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            result = driver.update_data() => Some(result),
        };

        match result {
            None => Attempt::Cancelled,
            Some(Ok(())) => {
                self.record();
                Attempt::Done
            }
            Some(Err(err)) => {
                warn!(%err, "Failed to update data");
                self.change_state(SupervisorState::Error(err.to_string()), None);

                self.error_count += 1;
                if err.is_connection() || self.error_count >= MAX_CONSECUTIVE_ERRORS {
                    self.disconnect().await;
                    Attempt::Reconnect
                } else {
                    Attempt::Done
                }
            }
        }
    }

    /// Connects until a session is established. Returns `false` when cancelled.
    async fn connect(&mut self) -> bool {
        let mut backoff = BACKOFF_INITIAL;

        loop {
            let result = tokio::select! {
                biased;
                _ = self.token.cancelled() => return false,
                result = self.registry.connect(self.config.clone()) => result,
            };

            let err = match result {
                Ok(driver) => {
                    debug!("Connected");
                    self.driver = Some(driver);
                    self.error_count = 0;
                    return true;
                }
                Err(err) => err,
            };

            if err.is_authentication() {
                self.prompter.clear();
                if let Some(wait_time) = err.wait_time() {
                    backoff = backoff.max(wait_time);
                }
            }

            warn!(%err, ?backoff, "Failed to connect");
            self.change_state(SupervisorState::Error(err.to_string()), None);

            tokio::select! {
                biased;
                _ = self.token.cancelled() => return false,
                _ = sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(BACKOFF_MAX);
        }
    }

    fn record(&mut self) {
        let Some(driver) = self.driver.as_ref() else {
            return;
        };

        let now = Utc::now();
        self.bins_history.update(driver.status(), driver.bins(), now);
        self.errors_history.update(driver.status(), now);

        let data = LineData {
            time: now,
            raw_data: driver.raw_data().to_vec(),
            status: driver.status().clone(),
            bins: driver.bins().clone(),
            bins_history: self.bins_history.data(),
            errors_history: self.errors_history.data(),
        };

        self.has_data = true;
        self.error_count = 0;
        self.change_state(SupervisorState::Ready, Some(Arc::new(data)));
    }

    /// Sleeps until the next poll. Returns `false` when cancelled.
    async fn wait(&mut self) -> bool {
        let mut watching = true;

        loop {
            let now = Utc::now();
            let interval = *self.interval.borrow_and_update();
            let delay = (next_update(now, interval) - now).to_std().unwrap_or_default();

            tokio::select! {
                biased;
                _ = self.token.cancelled() => return false,
                _ = sleep(delay) => return true,
                changed = self.interval.changed(), if watching => {
                    watching = changed.is_ok();
                }
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.close().await;
            debug!("Disconnected");
        }
    }

    fn save(&self) {
        if let Some(dir) = &self.state_dir {
            storage::save(dir, &self.bins_history, &self.errors_history, Utc::now());
        }
    }

    fn change_state(&self, state: SupervisorState, data: Option<Arc<LineData>>) {
        let _ = self.events.send(DistributorMessage::ChangeState { state, data });
    }
}

/// The next wall-clock multiple of `interval` after `now`, so polls line up across restarts.
pub(crate) fn next_update(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let interval = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX).max(1);
    let millis = now.timestamp_millis();
    let next = (millis - millis.rem_euclid(interval)).saturating_add(interval);
    DateTime::from_timestamp_millis(next).unwrap_or(now)
}
