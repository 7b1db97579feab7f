use crate::DriverError;

/// Splits `host`, `host:port`, `[v6]` or `[v6]:port`. A missing port is returned as `None`.
///
/// IPv6 addresses must be bracketed.
pub fn split_host_port(input: &str) -> Result<(String, Option<u16>), DriverError> {
    let invalid = || DriverError::InvalidHost(input.to_string());

    if let Some(rest) = input.strip_prefix('[') {
        let (host, rest) = rest.split_once(']').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        return match rest {
            "" => Ok((host.to_string(), None)),
            _ => {
                let port = rest.strip_prefix(':').ok_or_else(invalid)?;
                Ok((host.to_string(), Some(port.parse().map_err(|_| invalid())?)))
            }
        };
    }

    match input.matches(':').count() {
        0 if !input.is_empty() => Ok((input.to_string(), None)),
        1 => {
            let (host, port) = input.split_once(':').ok_or_else(invalid)?;
            if host.is_empty() {
                return Err(invalid());
            }
            Ok((host.to_string(), Some(port.parse().map_err(|_| invalid())?)))
        }
        _ => Err(invalid()),
    }
}

/// Formats a host and port for connecting, re-adding IPv6 brackets.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
