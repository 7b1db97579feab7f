//! A scripted device and an in-process server for the handler tests.

use crate::create_router;
use async_trait::async_trait;
use dsl_monitor_config::WebConfig;
use dsl_monitor_drivers::{
    AuthTypes,
    Descriptor,
    Driver,
    DriverConfig,
    DriverError,
    Registry,
};
use dsl_monitor_models::{
    Bins,
    Mode,
    ModeSubtype,
    ModeType,
    State,
    Status,
};
use dsl_monitor_supervisor::{
    StateChange,
    Subscription,
    Supervisor,
};
use std::{
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};
use tokio::net::TcpListener;

#[derive(Default)]
pub(crate) struct Script {
    pub(crate) accept: String,
    pub(crate) passwords: Vec<String>,
    pub(crate) fail_updates: bool,
}

struct StubDriver {
    script: Arc<Mutex<Script>>,
    raw_data: Vec<u8>,
    status: Status,
    bins: Bins,
}

#[async_trait]
impl Driver for StubDriver {
    fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn bins(&self) -> &Bins {
        &self.bins
    }

    async fn update_data(&mut self) -> Result<(), DriverError> {
        if self.script.lock().unwrap().fail_updates {
            return Err(DriverError::Other("modem busy".into()));
        }
        self.raw_data = b"xdslctl: raw".to_vec();
        Ok(())
    }

    async fn close(&mut self) {}
}

pub(crate) fn script(accept: &str) -> Arc<Mutex<Script>> {
    Arc::new(Mutex::new(Script {
        accept: accept.into(),
        ..Default::default()
    }))
}

fn registry(script: &Arc<Mutex<Script>>) -> Registry {
    let mut registry = Registry::new();
    let script = script.clone();
    let descriptor = Descriptor::new("Stub").auth_types(AuthTypes::PASSWORD);
    registry.register("stub", descriptor, move |config: DriverConfig| {
        let script = script.clone();
        async move {
            let password = match &config.password {
                Some(callback) => match callback.call().await {
                    Ok(password) => password,
                    Err(err) => return Err(err),
                },
                None => String::new(),
            };

            let mut guard = script.lock().unwrap();
            guard.passwords.push(password.clone());
            if password != guard.accept {
                return Err(DriverError::authentication("wrong password"));
            }
            drop(guard);

            let status = Status {
                state: State::Showtime,
                mode: Mode::new(ModeType::Vdsl2, ModeSubtype::Profile17a),
                uptime: Some(Duration::from_secs(3600)),
                ..Default::default()
            };
            Ok(Box::new(StubDriver {
                script,
                raw_data: Vec::new(),
                status,
                bins: Bins::default(),
            }) as Box<dyn Driver>)
        }
    });
    registry
}

/// Starts a supervisor for the stub device without persisted state.
pub(crate) fn spawn_supervisor(script: &Arc<Mutex<Script>>) -> Supervisor {
    Supervisor::builder(registry(script), DriverConfig::new("stub", "modem"))
        .spawn()
        .unwrap()
}

/// Serves the router on an ephemeral port and returns its base url.
pub(crate) async fn serve(supervisor: Supervisor, config: WebConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(supervisor, config))
            .await
            .unwrap();
    });
    format!("http://{address}")
}

pub(crate) async fn wait_for(subscription: &mut Subscription, done: impl Fn(&StateChange) -> bool) -> StateChange {
    loop {
        let change = subscription.recv().await.unwrap();
        if done(&change) {
            return change;
        }
    }
}
