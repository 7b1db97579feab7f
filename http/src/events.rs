use crate::{
    AppError,
    AppState,
};
use axum::{
    extract::State,
    response::sse::{
        Event,
        KeepAlive,
        Sse,
    },
};
use dsl_monitor_config::WebConfig;
use dsl_monitor_supervisor::{
    LineData,
    StateChange,
    SupervisorState,
};
use futures::Stream;
use serde_json::{
    json,
    Value,
};
use std::convert::Infallible;

const ERROR_PREFIX: &str = "failed to load data from device";

/// Streams every state change as `{"state": .., "data": ..}`, starting with the current one.
pub(crate) async fn handler(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let subscription = state.supervisor.subscribe()?;
    let config = state.config.clone();
    debug!("Event stream opened");

    let stream = futures::stream::unfold(subscription, move |mut subscription| {
        let config = config.clone();
        async move {
            let change = subscription.recv().await?;
            let event = Event::default().data(message(&change, &config).to_string());
            Some((Ok(event), subscription))
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

pub(crate) fn message(change: &StateChange, config: &WebConfig) -> Value {
    let data = match &change.state {
        SupervisorState::Ready => change.data.as_deref().map(ready_data),
        SupervisorState::PassphraseRequired(fingerprint) => Some(Value::String(fingerprint.clone())),
        SupervisorState::Error(_) if config.hide_error_messages => Some(Value::String(ERROR_PREFIX.into())),
        SupervisorState::Error(err) => Some(Value::String(format!("{ERROR_PREFIX}: {err}"))),
        SupervisorState::Loading | SupervisorState::PasswordRequired | SupervisorState::EncryptionPassphraseRequired => {
            None
        }
    };

    json!({
        "state": change.state.name(),
        "data": data,
    })
}

fn ready_data(data: &LineData) -> Value {
    json!({
        "summary": data.status.summary(),
        "bins": data.bins,
        "history": history(data),
    })
}

pub(crate) fn history(data: &LineData) -> Value {
    json!({
        "bins": data.bins_history,
        "errors": data.errors_history,
    })
}
