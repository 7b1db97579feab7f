use crate::{
    DriverError,
    PasswordCallback,
};
use serde::Deserialize;
use sha2::{
    Digest as _,
    Sha256,
};
use std::{
    collections::HashMap,
    time::Duration,
};

const TIMEOUT: Duration = Duration::from_secs(10);
const LOGIN_PATH: &str = "/data/Login.json";

lazy_static::lazy_static! {
    static ref CHALLENGE: regex::Regex = regex::Regex::new(r#"challenge\s?=\s?"([0-9A-Za-z]+)""#).expect("Invalid regex");
}

/// `varid` to `varvalue` of a JSON response.
pub(super) type Values = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct ResponseVar {
    #[serde(rename = "varid")]
    id: String,
    #[serde(rename = "varvalue")]
    value: String,
}

pub(super) struct Session {
    base_url: String,
    client: reqwest::Client,
    challenge: String,
}

impl Session {
    #[instrument(level = "debug", skip_all, fields(%host))]
    pub(super) async fn connect(
        host: &str,
        password: Option<&PasswordCallback>,
        tls_skip_verify: bool,
    ) -> Result<Self, DriverError> {
        let base_url = base_url(host)?;

        // Redirects point to the login page once the session expired.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(tls_skip_verify)
            .build()?;

        let mut session = Self {
            base_url,
            client,
            challenge: String::new(),
        };

        let index = session.get("/html/login/index.html").await?;
        session.challenge = CHALLENGE
            .captures(&index)
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| DriverError::UnexpectedResponse("no challenge found".to_string()))?;

        let password = match password {
            Some(callback) => callback.call().await?,
            None => String::new(),
        };
        session.login(&password).await?;

        debug!("Logged in");
        Ok(session)
    }

    async fn login(&self, password: &str) -> Result<(), DriverError> {
        let hashed = hash_password(&self.challenge, password);
        let form = [
            ("csrf_token", "nulltoken"),
            ("password", hashed.as_str()),
            ("challengev", self.challenge.as_str()),
        ];
        let response = self.post_form(LOGIN_PATH, &form).await?;
        check_login(&parse_response(&response)?)
    }

    /// Returns the raw body and its parsed values.
    pub(super) async fn load_data(&self, path: &str) -> Result<(String, Values), DriverError> {
        let body = self.get(path).await?;
        let values = parse_response(&body)?;
        Ok((body, values))
    }

    async fn get(&self, path: &str) -> Result<String, DriverError> {
        let response = self.client.get(format!("{}{path}", self.base_url)).send().await?;
        read_body(path, response).await
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String, DriverError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await?;
        read_body(path, response).await
    }

    pub(super) async fn close(&self) {
        if let Err(err) = self.post_form(LOGIN_PATH, &[("logout", "byby")]).await {
            debug!(?err, "Logout failed");
        }
    }
}

async fn read_body(path: &str, response: reqwest::Response) -> Result<String, DriverError> {
    let status = response.status();
    if status == reqwest::StatusCode::FOUND {
        return Err(DriverError::Connection(format!(
            "request for {path} was redirected, session expired"
        )));
    }
    if status != reqwest::StatusCode::OK {
        return Err(DriverError::UnexpectedResponse(format!(
            "request for {path} failed with status {}",
            status.as_u16()
        )));
    }
    Ok(response.text().await?)
}

/// Prefixes `http://` if no scheme is given. Paths are not allowed.
fn base_url(host: &str) -> Result<String, DriverError> {
    let mut url = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    if url.ends_with('/') {
        url.pop();
    }
    if url.matches('/').count() != 2 {
        return Err(DriverError::InvalidHost(host.to_string()));
    }
    Ok(url)
}

fn hash_password(challenge: &str, password: &str) -> String {
    hex::encode(Sha256::digest(format!("{challenge}:{password}")))
}

fn parse_response(body: &str) -> Result<Values, DriverError> {
    let vars: Vec<ResponseVar> =
        serde_json::from_str(body).map_err(|err| DriverError::UnexpectedResponse(err.to_string()))?;
    Ok(vars.into_iter().map(|var| (var.id, var.value)).collect())
}

fn check_login(values: &Values) -> Result<(), DriverError> {
    match values.get("login").map(String::as_str) {
        Some("success") => Ok(()),
        Some("failed") => match values.get("login_locked") {
            Some(locked) => match locked.trim().parse::<u64>() {
                Ok(secs) => Err(DriverError::Authentication {
                    reason: format!("authentication failed, login locked for {secs} seconds"),
                    wait_time: Some(Duration::from_secs(secs)),
                }),
                Err(_) => Err(DriverError::authentication("authentication failed, login locked")),
            },
            None => Err(DriverError::authentication("authentication failed")),
        },
        _ => Err(DriverError::UnexpectedResponse(
            "unexpected response to login request".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, &str)]) -> Values {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn base_urls() {
        assert_eq!(base_url("192.168.2.1").unwrap(), "http://192.168.2.1");
        assert_eq!(base_url("https://speedport.ip/").unwrap(), "https://speedport.ip");
        assert!(matches!(base_url("speedport.ip/html"), Err(DriverError::InvalidHost(_))));
    }

    #[test]
    fn password_hash() {
        // sha256("abc:")
        assert_eq!(
            hash_password("abc", ""),
            "16a3ed414449413487c2735c51e0e9c1df1f869cf94d89573b99acc91ccf4c30"
        );
        assert_eq!(hash_password("abc", "secret").len(), 64);
        assert_ne!(hash_password("abc", "secret"), hash_password("abd", "secret"));
    }

    #[test]
    fn finds_challenge() {
        let page = r#"<script>var challenge = "Ab12Cd34";</script>"#;
        assert_eq!(&CHALLENGE.captures(page).unwrap()[1], "Ab12Cd34");
    }

    #[test]
    fn parses_responses() {
        let body = r#"[{"vartype":"status","varid":"login","varvalue":"success"},{"vartype":"value","varid":"x","varvalue":"1"}]"#;
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed, values(&[("login", "success"), ("x", "1")]));

        assert!(matches!(parse_response("<html>"), Err(DriverError::UnexpectedResponse(_))));
    }

    #[test]
    fn login_results() {
        assert!(check_login(&values(&[("login", "success")])).is_ok());

        let err = check_login(&values(&[("login", "failed")])).unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.wait_time(), None);

        let err = check_login(&values(&[("login", "failed"), ("login_locked", "30")])).unwrap_err();
        assert_eq!(err.wait_time(), Some(Duration::from_secs(30)));
        assert_eq!(err.to_string(), "authentication failed, login locked for 30 seconds");

        let err = check_login(&values(&[("login", "failed"), ("login_locked", "soon")])).unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.wait_time(), None);

        let err = check_login(&values(&[])).unwrap_err();
        assert!(!err.is_authentication());
    }
}
