//! Minimal telnet client for modems exposing a shell.
//!
//! Option negotiation is refused, ANSI escape sequences are dropped and the command prompt is used
//! to delimit command output.

use crate::{
    helpers::{
        join_host_port,
        split_host_port,
    },
    DriverError,
    PasswordCallback,
};
use regex::bytes::Regex;
use std::time::Duration;
use tokio::{
    io::{
        AsyncReadExt as _,
        AsyncWriteExt as _,
    },
    net::TcpStream,
    time::timeout,
};

const DEFAULT_PORT: u16 = 23;
const TIMEOUT: Duration = Duration::from_secs(10);

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

lazy_static::lazy_static! {
    // ECMA-48, sections 5.3 and 5.4
    static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("Invalid regex");
}

/// One set of prompts a device may use. Prompts must include trailing spaces if the device sends
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompts {
    pub account: &'static str,
    pub password: &'static str,
    pub command: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Account,
    Password,
    Command,
}

pub struct TelnetClient {
    stream: TcpStream,
    prompts: Vec<Prompts>,
    /// Received bytes not yet decoded, possibly ending in an incomplete command.
    raw: Vec<u8>,
    /// Decoded data not yet consumed.
    data: Vec<u8>,
    last_written_line: String,
    last_prompt_line: String,
}

impl TelnetClient {
    /// Connects and logs in. Asks `password` only when the device shows a password prompt.
    #[instrument(level = "debug", skip_all, fields(%host))]
    pub async fn connect(
        host: &str,
        user: &str,
        password: Option<&PasswordCallback>,
        prompts: Vec<Prompts>,
    ) -> Result<Self, DriverError> {
        let (host, port) = split_host_port(host)?;
        let address = join_host_port(&host, port.unwrap_or(DEFAULT_PORT));

        let stream = timeout(TIMEOUT, TcpStream::connect(&address))
            .await
            .map_err(|_| DriverError::Connection(format!("timed out connecting to {address}")))?
            .map_err(|err| DriverError::Connection(format!("failed to connect to {address}: {err}")))?;

        let mut client = Self {
            stream,
            prompts,
            raw: Vec::new(),
            data: Vec::new(),
            last_written_line: String::new(),
            last_prompt_line: String::new(),
        };
        client.login(user, password).await?;

        debug!("Logged in");
        Ok(client)
    }

    async fn login(&mut self, user: &str, password: Option<&PasswordCallback>) -> Result<(), DriverError> {
        let mut tried_user = false;
        let mut tried_password = false;

        loop {
            let candidates: Vec<&'static str> = self
                .prompts
                .iter()
                .flat_map(|p| [p.account, p.password, p.command])
                .collect();

            let (_, index) = timeout(TIMEOUT, self.read_until_prompt(&candidates))
                .await
                .map_err(|_| DriverError::Other("no prompt detected".to_string()))??;

            match self.handle_received_prompt(candidates[index])? {
                PromptKind::Account => {
                    if tried_user {
                        return Err(DriverError::authentication("invalid username/password"));
                    }
                    tried_user = true;
                    self.write_line(user, false).await?;
                }
                PromptKind::Password => {
                    if tried_password {
                        return Err(DriverError::authentication("invalid username/password"));
                    }
                    tried_password = true;
                    let password = match password {
                        Some(callback) => callback.call().await?,
                        None => String::new(),
                    };
                    self.write_line(&password, true).await?;
                }
                PromptKind::Command => return Ok(()),
            }
        }
    }

    /// Narrows the known prompt sets to the ones containing `prompt`.
    fn handle_received_prompt(&mut self, prompt: &str) -> Result<PromptKind, DriverError> {
        let mut kind = None;
        let mut matching = Vec::new();

        for prompts in &self.prompts {
            let this = if prompt == prompts.account {
                PromptKind::Account
            } else if prompt == prompts.password {
                PromptKind::Password
            } else if prompt == prompts.command {
                PromptKind::Command
            } else {
                continue;
            };

            match kind {
                Some(kind) if kind != this => {
                    return Err(DriverError::Other("ambiguous prompt detected".to_string()));
                }
                _ => kind = Some(this),
            }
            matching.push(*prompts);
        }

        self.prompts = matching;
        kind.ok_or_else(|| DriverError::Other("unrecognized prompt".to_string()))
    }

    /// Runs a shell command and returns its output without echo and prompt.
    #[instrument(level = "debug", skip(self))]
    pub async fn execute(&mut self, command: &str) -> Result<String, DriverError> {
        self.write_line(command, false).await?;

        let mut prompts: Vec<&'static str> = self.prompts.iter().map(|p| p.command).collect();
        prompts.dedup();

        let (data, _) = timeout(TIMEOUT, self.read_until_prompt(&prompts))
            .await
            .map_err(|_| DriverError::Connection(format!("timed out waiting for output of {command}")))??;
        Ok(data)
    }

    pub async fn close(&mut self) {
        if let Err(err) = self.stream.shutdown().await {
            trace!("Closing telnet connection: {err}");
        }
    }

    async fn write_line(&mut self, line: &str, sensitive: bool) -> Result<(), DriverError> {
        self.last_written_line = if sensitive {
            "*".repeat(line.len())
        } else {
            line.to_string()
        };

        self.stream
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .map_err(|err| DriverError::Connection(err.to_string()))
    }

    async fn fill(&mut self) -> Result<(), DriverError> {
        let mut buf = [0u8; 4096];
        let n = self
            .stream
            .read(&mut buf)
            .await
            .map_err(|err| DriverError::Connection(err.to_string()))?;
        if n == 0 {
            return Err(DriverError::Connection("connection closed by device".to_string()));
        }

        self.raw.extend_from_slice(&buf[..n]);
        let replies = decode(&mut self.raw, &mut self.data);
        if !replies.is_empty() {
            self.stream
                .write_all(&replies)
                .await
                .map_err(|err| DriverError::Connection(err.to_string()))?;
        }
        Ok(())
    }

    /// Reads up to and including the first complete prompt. Returns the data and the prompt index.
    async fn read_until_prompt_raw(&mut self, prompts: &[&str]) -> Result<(String, usize), DriverError> {
        loop {
            if let Some((end, index)) = find_prompt(&self.data, prompts) {
                let bytes: Vec<u8> = self.data.drain(..end).collect();
                let bytes = ANSI_ESCAPE.replace_all(&bytes, &b""[..]);
                return Ok((String::from_utf8_lossy(&bytes).into_owned(), index));
            }
            self.fill().await?;
        }
    }

    async fn read_until_prompt(&mut self, prompts: &[&str]) -> Result<(String, usize), DriverError> {
        let (mut data, mut index) = self.read_until_prompt_raw(prompts).await?;

        // a prompt configured without its trailing space leaves the space at the start of the data
        let strip_space = !self.last_prompt_line.is_empty() && !self.last_prompt_line.ends_with(' ');
        if strip_space && data.starts_with(' ') {
            data.remove(0);
        }

        // some devices resend the whole prompt instead of echoing the input
        if !self.last_prompt_line.is_empty() {
            if let Some(rest) = data.strip_prefix(&format!("\r{}", self.last_prompt_line)) {
                data = rest.to_string();
                if data.is_empty() {
                    (data, index) = self.read_until_prompt_raw(prompts).await?;
                }
                if strip_space && data.starts_with(' ') {
                    data.remove(0);
                }
            }
        }

        if let Some(rest) = data.strip_prefix(&format!("{}\r\n", self.last_written_line)) {
            data = rest.to_string();
        }

        // the last line is the prompt
        match data.rfind(['\r', '\n']) {
            Some(pos) => {
                self.last_prompt_line = data[pos + 1..].to_string();
                let end = data[..pos].trim_end_matches(['\r', '\n']).len();
                data.truncate(end);
            }
            None => {
                self.last_prompt_line = std::mem::take(&mut data);
            }
        }

        Ok((data, index))
    }
}

/// Position just past the earliest complete prompt, and the prompt's index.
fn find_prompt(data: &[u8], prompts: &[&str]) -> Option<(usize, usize)> {
    prompts
        .iter()
        .enumerate()
        .filter(|(_, prompt)| !prompt.is_empty())
        .filter_map(|(index, prompt)| {
            let prompt = prompt.as_bytes();
            data.windows(prompt.len())
                .position(|window| window == prompt)
                .map(|pos| (pos + prompt.len(), index))
        })
        .min()
}

/// Strips telnet commands from `raw` into `out` and returns the replies refusing every option.
/// An incomplete command at the end of `raw` is kept for the next call.
fn decode(raw: &mut Vec<u8>, out: &mut Vec<u8>) -> Vec<u8> {
    let mut replies = Vec::new();
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != IAC {
            out.push(raw[i]);
            i += 1;
            continue;
        }

        let Some(&command) = raw.get(i + 1) else {
            break;
        };
        match command {
            IAC => {
                out.push(IAC);
                i += 2;
            }
            DO | DONT | WILL | WONT => {
                let Some(&option) = raw.get(i + 2) else {
                    break;
                };
                match command {
                    DO => replies.extend([IAC, WONT, option]),
                    WILL => replies.extend([IAC, DONT, option]),
                    _ => {}
                }
                i += 3;
            }
            SB => match raw[i + 2..].windows(2).position(|w| w == [IAC, SE]) {
                Some(pos) => i += 2 + pos + 2,
                None => break,
            },
            _ => i += 2,
        }
    }

    raw.drain(..i);
    replies
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::future::Future;
    use tokio::{
        io::{
            AsyncBufReadExt as _,
            BufReader,
        },
        net::TcpListener,
    };

    const PROMPTS: [Prompts; 2] = [
        Prompts {
            account: "login: ",
            password: "Password: ",
            command: "# ",
        },
        Prompts {
            account: "Login: ",
            password: "Password: ",
            command: "> ",
        },
    ];

    async fn device<F, Fut>(script: F) -> String
    where
        F: FnOnce(BufReader<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            script(BufReader::new(stream)).await;
        });
        address
    }

    async fn read_line(conn: &mut BufReader<TcpStream>) -> Vec<u8> {
        let mut line = Vec::new();
        conn.read_until(b'\n', &mut line).await.unwrap();
        line
    }

    async fn send(conn: &mut BufReader<TcpStream>, data: &[u8]) {
        conn.get_mut().write_all(data).await.unwrap();
    }

    #[test]
    fn decodes_commands() {
        let mut raw = vec![b'a', IAC, IAC, IAC, WILL, 1, IAC, SB, 24, 1, IAC, SE, b'b', IAC, DO, 31, IAC];
        let mut out = Vec::new();
        let replies = decode(&mut raw, &mut out);
        assert_eq!(out, vec![b'a', IAC, b'b']);
        assert_eq!(replies, vec![IAC, DONT, 1, IAC, WONT, 31]);
        assert_eq!(raw, vec![IAC]);
    }

    #[test]
    fn finds_earliest_prompt() {
        assert_eq!(find_prompt(b"banner\r\nlogin: ", &["# ", "login: "]), Some((15, 1)));
        assert_eq!(find_prompt(b"a # b > ", &["> ", "# "]), Some((4, 1)));
        assert_eq!(find_prompt(b"nothing", &["# "]), None);
    }

    #[tokio::test]
    async fn logs_in_and_executes() {
        let address = device(|mut conn| async move {
            send(&mut conn, &[IAC, DO, 24]).await;
            send(&mut conn, b"\x1b[1mBusyBox\x1b[0m\r\nlogin: ").await;
            let line = read_line(&mut conn).await;
            assert_eq!(line[..3], [IAC, WONT, 24]);
            assert!(line.ends_with(b"admin\r\n"));

            send(&mut conn, b"Password: ").await;
            assert_eq!(read_line(&mut conn).await, b"secret\r\n");
            send(&mut conn, b"\r\n# ").await;

            assert_eq!(read_line(&mut conn).await, b"xdslctl info --stats\r\n");
            send(
                &mut conn,
                b"xdslctl info --stats\r\nStatus: \x1b[32mShowtime\x1b[0m\r\nMode: VDSL2\r\n# ",
            )
            .await;

            let _ = read_line(&mut conn).await;
        })
        .await;

        let password = PasswordCallback::fixed("secret");
        let mut client = TelnetClient::connect(&address, "admin", Some(&password), PROMPTS.to_vec())
            .await
            .unwrap();
        let output = client.execute("xdslctl info --stats").await.unwrap();
        assert_eq!(output, "Status: Showtime\r\nMode: VDSL2");
        client.close().await;
    }

    #[tokio::test]
    async fn repeated_prompt_is_an_authentication_error() {
        let address = device(|mut conn| async move {
            send(&mut conn, b"login: ").await;
            let _ = read_line(&mut conn).await;
            send(&mut conn, b"Password: ").await;
            let _ = read_line(&mut conn).await;
            send(&mut conn, b"\r\nLogin incorrect\r\nlogin: ").await;
            let _ = read_line(&mut conn).await;
        })
        .await;

        let password = PasswordCallback::fixed("wrong");
        let result = TelnetClient::connect(&address, "admin", Some(&password), PROMPTS.to_vec()).await;
        assert!(matches!(result, Err(DriverError::Authentication { .. })));
    }

    #[tokio::test]
    async fn closed_connection_is_a_connection_error() {
        let address = device(|conn| async move {
            drop(conn);
        })
        .await;

        let result = TelnetClient::connect(&address, "admin", None, PROMPTS.to_vec()).await;
        assert!(matches!(result, Err(DriverError::Connection(_))));
    }

    #[tokio::test]
    async fn rejects_bare_ipv6() {
        let result = TelnetClient::connect("fe80::1", "admin", None, PROMPTS.to_vec()).await;
        assert!(matches!(result, Err(DriverError::InvalidHost(_))));
    }
}
