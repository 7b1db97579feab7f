use crate::{
    credentials::{
        Credential,
        Prompter,
    },
    distributor::{
        Distributor,
        DistributorMessage,
    },
    updater::Updater,
    StateChange,
    SupervisorError,
};
use dsl_monitor_drivers::{
    DriverConfig,
    Registry,
};
use dsl_monitor_history::{
    self as history,
    BinsConfig,
    ErrorsConfig,
};
use std::{
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tokio::sync::{
    mpsc::{
        self,
        unbounded_channel,
        UnboundedSender,
    },
    oneshot,
    watch,
};
use tokio_util::{
    sync::CancellationToken,
    task::TaskTracker,
};

/// Poll interval while nobody is subscribed.
pub const INTERVAL_DEFAULT: Duration = Duration::from_secs(30);
/// Poll interval while at least one receiver is registered.
pub const INTERVAL_SHORT: Duration = Duration::from_secs(10);
/// Buffer size of the channels created by [`Supervisor::subscribe`].
pub const RECEIVER_CAPACITY: usize = 10;

pub struct SupervisorBuilder {
    registry: Registry,
    config: DriverConfig,
    state_dir: Option<PathBuf>,
    interval_default: Duration,
    interval_short: Duration,
    bins_config: BinsConfig,
    errors_config: ErrorsConfig,
}

impl SupervisorBuilder {
    /// Directory for the history snapshots. Without one the histories live in memory only.
    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    pub fn intervals(mut self, default: Duration, short: Duration) -> Self {
        self.interval_default = default;
        self.interval_short = short;
        self
    }

    pub fn history_configs(mut self, bins: BinsConfig, errors: ErrorsConfig) -> Self {
        self.bins_config = bins;
        self.errors_config = errors;
        self
    }

    /// Starts the distributor and updater tasks. Must be called within a tokio runtime.
    pub fn spawn(self) -> Result<Supervisor, SupervisorError> {
        let bins_history = history::Bins::new(self.bins_config)?;
        let errors_history = history::Errors::new(self.errors_config)?;

        let (events, messages) = unbounded_channel();
        let (interval_tx, interval) = watch::channel(self.interval_default);
        let token = CancellationToken::new();
        let prompter = Arc::new(Prompter::new(events.clone(), token.clone()));

        let mut config = self.config;
        if let Some(descriptor) = self.registry.descriptor(&config.driver_type) {
            prompter.install(descriptor, &mut config);
        }

        let tracker = TaskTracker::new();
        let distributor = Distributor::new(interval_tx, self.interval_default, self.interval_short);
        tracker.spawn(distributor.run(messages));

        let updater = Updater {
            registry: self.registry,
            config,
            prompter: prompter.clone(),
            events: events.clone(),
            interval: interval.clone(),
            token: token.clone(),
            state_dir: self.state_dir,
            bins_history,
            errors_history,
            driver: None,
            has_data: false,
            error_count: 0,
        };
        tracker.spawn(updater.run());

        Ok(Supervisor {
            events,
            prompter,
            token,
            tracker,
            interval,
        })
    }
}

/// Handle to a running acquisition supervisor. Clones share the same tasks.
#[derive(Clone)]
pub struct Supervisor {
    events: UnboundedSender<DistributorMessage>,
    prompter: Arc<Prompter>,
    token: CancellationToken,
    tracker: TaskTracker,
    interval: watch::Receiver<Duration>,
}

impl Supervisor {
    pub fn builder(registry: Registry, config: DriverConfig) -> SupervisorBuilder {
        SupervisorBuilder {
            registry,
            config,
            state_dir: None,
            interval_default: INTERVAL_DEFAULT,
            interval_short: INTERVAL_SHORT,
            bins_config: BinsConfig::default(),
            errors_config: ErrorsConfig::default(),
        }
    }

    /// The most recent state change.
    pub async fn state(&self) -> Result<StateChange, SupervisorError> {
        let (tx, rx) = oneshot::channel();
        self.events
            .send(DistributorMessage::Snapshot(tx))
            .map_err(|_| SupervisorError::Closed)?;
        rx.await.map_err(|_| SupervisorError::Closed)
    }

    /// Pushes every state change into `receiver`, starting with the current one. A receiver that is
    /// full when a change arrives is dropped.
    pub fn register_receiver(&self, receiver: mpsc::Sender<StateChange>) -> Result<(), SupervisorError> {
        self.events
            .send(DistributorMessage::Register(receiver))
            .map_err(|_| SupervisorError::Closed)
    }

    pub fn unregister_receiver(&self, receiver: &mpsc::Sender<StateChange>) -> Result<(), SupervisorError> {
        self.events
            .send(DistributorMessage::Unregister(receiver.clone()))
            .map_err(|_| SupervisorError::Closed)
    }

    /// Registers a receiver with [`RECEIVER_CAPACITY`] slots that unregisters itself when dropped.
    pub fn subscribe(&self) -> Result<Subscription, SupervisorError> {
        let (tx, rx) = mpsc::channel(RECEIVER_CAPACITY);
        let sender = tx.downgrade();
        self.register_receiver(tx)?;
        Ok(Subscription {
            receiver: rx,
            sender,
            events: self.events.clone(),
        })
    }

    /// The current poll interval.
    pub fn interval(&self) -> Duration {
        *self.interval.borrow()
    }

    pub fn set_password(&self, password: impl Into<String>) -> Result<(), SupervisorError> {
        self.prompter.set(Credential::Password, password.into())
    }

    pub fn set_passphrase(&self, passphrase: impl Into<String>) -> Result<(), SupervisorError> {
        self.prompter.set(Credential::Passphrase, passphrase.into())
    }

    pub fn set_encryption_passphrase(&self, passphrase: impl Into<String>) -> Result<(), SupervisorError> {
        self.prompter.set(Credential::EncryptionPassphrase, passphrase.into())
    }

    /// Stops polling, saves the histories and waits for both tasks to finish.
    pub async fn close(&self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}

/// A registered receiver. Yields `None` once the supervisor stopped or dropped it for being slow.
pub struct Subscription {
    receiver: mpsc::Receiver<StateChange>,
    sender: mpsc::WeakSender<StateChange>,
    events: UnboundedSender<DistributorMessage>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<StateChange> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.upgrade() {
            let _ = self.events.send(DistributorMessage::Unregister(sender));
        }
    }
}
