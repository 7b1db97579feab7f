use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default)]
    pub hide_error_messages: bool,
    #[serde(default)]
    pub disable_interactive_auth: bool,
    #[serde(default)]
    pub hide_raw_data: bool,
}

fn default_listen_address() -> String {
    "[::1]:0".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            hide_error_messages: false,
            disable_interactive_auth: false,
            hide_raw_data: false,
        }
    }
}
