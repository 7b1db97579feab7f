use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
};

/// Line state as reported by the modem.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum State {
    #[default]
    Unknown,
    Idle,
    Silent,
    Handshake,
    Training,
    #[strum(to_string = "Channel discovery")]
    ChannelDiscovery,
    #[strum(to_string = "Channel analysis & exchange")]
    ChannelAnalysisExchange,
    Init,
    Showtime,
    Error,
}

impl State {
    /// Keyword based mapping of vendor state strings.
    pub fn parse(input: &str) -> Self {
        let s = input.trim().to_lowercase();

        if s.contains("idle") || s.contains("ready") {
            State::Idle
        } else if s.contains("silent") {
            State::Silent
        } else if s.contains("handshake") || s.contains("g.994") {
            State::Handshake
        } else if s.contains("discovery") {
            State::ChannelDiscovery
        } else if s.contains("analysis") || s.contains("exchange") {
            State::ChannelAnalysisExchange
        } else if s.contains("train") || s.contains("g.992") || s.contains("g.993") || s.contains("full init") {
            State::Training
        } else if s.contains("showtime") {
            State::Showtime
        } else {
            State::Unknown
        }
    }

    /// Mapping for the TR-069/TR-064 `Status` values.
    pub fn parse_tr06x(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "disabled" | "nosignal" | "initializing" => State::Idle,
            "establishinglink" => State::Init,
            "up" => State::Showtime,
            "error" => State::Error,
            _ => State::Unknown,
        }
    }

    pub fn is_showtime(self) -> bool {
        self == State::Showtime
    }
}
