use crate::{
    AppError,
    AppState,
};
use axum::{
    extract::State,
    http::StatusCode,
    Form,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct CredentialForm {
    data: String,
}

pub(crate) async fn password(
    State(state): State<AppState>,
    Form(form): Form<CredentialForm>,
) -> Result<StatusCode, AppError> {
    allowed(&state)?;
    state.supervisor.set_password(form.data)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn passphrase(
    State(state): State<AppState>,
    Form(form): Form<CredentialForm>,
) -> Result<StatusCode, AppError> {
    allowed(&state)?;
    state.supervisor.set_passphrase(form.data)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn encryption_passphrase(
    State(state): State<AppState>,
    Form(form): Form<CredentialForm>,
) -> Result<StatusCode, AppError> {
    allowed(&state)?;
    state.supervisor.set_encryption_passphrase(form.data)?;
    Ok(StatusCode::NO_CONTENT)
}

fn allowed(state: &AppState) -> Result<(), AppError> {
    if state.config.disable_interactive_auth {
        return Err(AppError::InteractiveAuthDisabled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::{
        script,
        serve,
        spawn_supervisor,
        wait_for,
    };
    use dsl_monitor_config::WebConfig;
    use dsl_monitor_supervisor::SupervisorState;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn answers_password_prompt_once() {
        let script = script("good");
        let supervisor = spawn_supervisor(&script);
        let mut subscription = supervisor.subscribe().unwrap();
        let base = serve(supervisor.clone(), WebConfig::default()).await;
        let client = reqwest::Client::new();

        wait_for(&mut subscription, |change| change.state == SupervisorState::PasswordRequired).await;
        let response = client
            .post(format!("{base}/password"))
            .form(&[("data", "good")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // nothing is awaited anymore
        let response = client
            .post(format!("{base}/password"))
            .form(&[("data", "good")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = client
            .post(format!("{base}/passphrase"))
            .form(&[("data", "secret")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        wait_for(&mut subscription, |change| change.is_ready()).await;
        supervisor.close().await;
        assert_eq!(script.lock().unwrap().passwords, vec!["good"]);
    }

    #[tokio::test]
    async fn interactive_auth_can_be_disabled() {
        let script = script("good");
        let supervisor = spawn_supervisor(&script);
        let mut subscription = supervisor.subscribe().unwrap();
        let config = WebConfig {
            disable_interactive_auth: true,
            ..Default::default()
        };
        let base = serve(supervisor.clone(), config).await;

        wait_for(&mut subscription, |change| change.state == SupervisorState::PasswordRequired).await;
        let response = reqwest::Client::new()
            .post(format!("{base}/password"))
            .form(&[("data", "good")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        supervisor.close().await;
        assert!(!script.lock().unwrap().passwords.contains(&"good".to_string()));
    }
}
