// Plex Session Source
//
// Reads /status/sessions from a Plex Media Server

use crate::error::{MonitorError, Result};
use crate::network::{build_client, join_url};
use crate::session::{MediaKind, PlaybackSession, SessionSource};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

const SESSIONS_PATH: &str = "/status/sessions";
const IDENTITY_PATH: &str = "/identity";
const TOKEN_HEADER: &str = "X-Plex-Token";

pub struct PlexClient {
    client: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SessionsResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<SessionMetadata>,
}

#[derive(Debug, Deserialize)]
struct SessionMetadata {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    guid: String,
    #[serde(rename = "User")]
    user: Option<SessionUser>,
    #[serde(rename = "TranscodeSession")]
    transcode_session: Option<TranscodeSession>,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    id: Option<serde_json::Value>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscodeSession {
    #[allow(dead_code)]
    key: Option<String>,
}

impl PlexClient {
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: api_url.to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, path: &str) -> RequestBuilder {
        self.client
            .get(join_url(&self.api_url, path))
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn get(&self, path: &str) -> Result<Response> {
        Ok(self.request(path).send()?.error_for_status()?)
    }
}

impl SessionSource for PlexClient {
    fn list_active_sessions(&self) -> Result<Vec<PlaybackSession>> {
        let body = self.get(SESSIONS_PATH)?.text()?;
        parse_sessions(&body)
    }

    fn check_connection(&self) -> Result<()> {
        self.get(IDENTITY_PATH)?;
        Ok(())
    }
}

fn parse_sessions(body: &str) -> Result<Vec<PlaybackSession>> {
    let response: SessionsResponse = serde_json::from_str(body)
        .map_err(|e| MonitorError::Unreachable(format!("malformed Plex sessions: {}", e)))?;

    Ok(response
        .media_container
        .metadata
        .into_iter()
        .map(to_playback_session)
        .collect())
}

fn to_playback_session(meta: SessionMetadata) -> PlaybackSession {
    let user_id = meta
        .user
        .and_then(|u| {
            u.title.filter(|t| !t.is_empty()).or_else(|| {
                u.id.map(|id| match id {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
            })
        })
        .unwrap_or_default();

    PlaybackSession {
        media_kind: MediaKind::from_plex_type(&meta.kind),
        is_transcoding: meta.transcode_session.is_some(),
        user_id,
        session_guid: meta.guid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_carry_token() {
        let client =
            PlexClient::new("http://127.0.0.1:32400/", "plex-token", Duration::from_secs(5)).unwrap();
        let request = client.request(SESSIONS_PATH).build().unwrap();

        assert_eq!(request.url().as_str(), "http://127.0.0.1:32400/status/sessions");
        assert_eq!(request.headers()[TOKEN_HEADER], "plex-token");
        assert_eq!(request.headers()[reqwest::header::ACCEPT], "application/json");
    }

    #[test]
    fn test_unreachable_server() {
        let client = PlexClient::new("http://127.0.0.1:1", "t", Duration::from_secs(2)).unwrap();
        assert!(matches!(client.check_connection(), Err(MonitorError::Unreachable(_))));
        assert!(matches!(
            client.list_active_sessions(),
            Err(MonitorError::Unreachable(_))
        ));
    }

    #[test]
    fn test_parse_sessions() {
        let body = r#"{
            "MediaContainer": {
                "size": 3,
                "Metadata": [
                    {
                        "type": "episode",
                        "guid": "plex://episode/5d9c1",
                        "User": { "id": "1", "title": "alice" },
                        "TranscodeSession": { "key": "/transcode/sessions/abc" }
                    },
                    {
                        "type": "movie",
                        "guid": "plex://movie/5d776",
                        "User": { "id": 7, "title": "" }
                    },
                    {
                        "type": "track",
                        "guid": "plex://track/123",
                        "User": { "title": "carol" },
                        "TranscodeSession": {}
                    }
                ]
            }
        }"#;

        let sessions = parse_sessions(body).unwrap();
        assert_eq!(sessions.len(), 3);

        assert_eq!(sessions[0].media_kind, MediaKind::Video);
        assert!(sessions[0].is_transcoding);
        assert_eq!(sessions[0].user_id, "alice");
        assert_eq!(sessions[0].session_guid, "plex://episode/5d9c1");

        assert!(!sessions[1].is_transcoding);
        assert_eq!(sessions[1].user_id, "7");

        assert_eq!(sessions[2].media_kind, MediaKind::Audio);
        assert!(sessions[2].is_transcoding);
        assert!(!sessions[2].is_transcoding_video());
    }

    #[test]
    fn test_parse_empty_container() {
        let sessions = parse_sessions(r#"{ "MediaContainer": { "size": 0 } }"#).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_parse_malformed_is_unreachable() {
        assert!(matches!(
            parse_sessions("<MediaContainer/>"),
            Err(MonitorError::Unreachable(_))
        ));
    }
}
