use crate::{
    LineData,
    StateChange,
    SupervisorState,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::sync::{
    mpsc::{
        self,
        error::TrySendError,
        UnboundedReceiver,
    },
    oneshot,
    watch,
};

pub(crate) enum DistributorMessage {
    /// `data` replaces the last observation when given.
    ChangeState {
        state: SupervisorState,
        data: Option<Arc<LineData>>,
    },
    Register(mpsc::Sender<StateChange>),
    Unregister(mpsc::Sender<StateChange>),
    Snapshot(oneshot::Sender<StateChange>),
    Stop,
}

/// Serializes state changes and receiver registrations. Owns the subscriber set and the poll
/// interval.
pub(crate) struct Distributor {
    receivers: Vec<mpsc::Sender<StateChange>>,
    last_state_change: StateChange,
    interval: watch::Sender<Duration>,
    interval_default: Duration,
    interval_short: Duration,
}

impl Distributor {
    pub(crate) fn new(interval: watch::Sender<Duration>, interval_default: Duration, interval_short: Duration) -> Self {
        Self {
            receivers: Vec::new(),
            last_state_change: StateChange::default(),
            interval,
            interval_default,
            interval_short,
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub(crate) async fn run(mut self, mut messages: UnboundedReceiver<DistributorMessage>) {
        while let Some(message) = messages.recv().await {
            match message {
                DistributorMessage::ChangeState { state, data } => self.change_state(state, data),
                DistributorMessage::Register(receiver) => self.register(receiver),
                DistributorMessage::Unregister(receiver) => self.unregister(&receiver),
                DistributorMessage::Snapshot(reply) => {
                    let _ = reply.send(self.last_state_change.clone());
                }
                DistributorMessage::Stop => break,
            }
        }

        debug!("Distributor stopped");
    }

    fn change_state(&mut self, state: SupervisorState, data: Option<Arc<LineData>>) {
        debug!(state = state.name(), "State changed");

        if data.is_some() {
            self.last_state_change.data = data;
        }
        self.last_state_change.state = state;

        let change = &self.last_state_change;
        let before = self.receivers.len();
        // newest state wins, a subscriber that cannot keep up is dropped
        self.receivers.retain(|receiver| match receiver.try_send(change.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Dropping slow state receiver");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        });

        if before > 0 && self.receivers.is_empty() {
            self.set_interval(self.interval_default);
        }
    }

    fn register(&mut self, receiver: mpsc::Sender<StateChange>) {
        if receiver.try_send(self.last_state_change.clone()).is_err() {
            return;
        }
        self.receivers.push(receiver);

        if self.receivers.len() == 1 {
            self.set_interval(self.interval_short);
        }
    }

    fn unregister(&mut self, receiver: &mpsc::Sender<StateChange>) {
        let before = self.receivers.len();
        self.receivers.retain(|r| !r.same_channel(receiver));

        if before > 0 && self.receivers.is_empty() {
            self.set_interval(self.interval_default);
        }
    }

    /// Wakes the updater so it recomputes its wait.
    fn set_interval(&self, interval: Duration) {
        debug!(?interval, "Poll interval changed");
        self.interval.send_replace(interval);
    }
}
