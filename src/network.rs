// Network Client
//
// Shared blocking HTTP client setup for the Plex and NiceHash adapters.
// Every request is bounded so a stalled endpoint cannot starve the loop.

use crate::error::Result;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("rigpause/", env!("CARGO_PKG_VERSION"));

/// Build a blocking client whose request timeout is `timeout`
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Join a base URL and an absolute API path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://plex:32400/", "/status/sessions"),
            "http://plex:32400/status/sessions"
        );
        assert_eq!(
            join_url("https://api2.nicehash.com", "main/api/v2/mining/rigs2"),
            "https://api2.nicehash.com/main/api/v2/mining/rigs2"
        );
    }
}
