// Playback Sessions
//
// Raw session records as reported by the streaming service, and the
// source contract the tracker consumes

use crate::error::Result;
use crate::types::StreamIdentity;

/// Media kind of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Photo,
    Other,
}

impl MediaKind {
    /// Classify a Plex metadata `type`
    pub fn from_plex_type(kind: &str) -> Self {
        match kind {
            "movie" | "episode" | "clip" | "video" => MediaKind::Video,
            "track" => MediaKind::Audio,
            "photo" => MediaKind::Photo,
            _ => MediaKind::Other,
        }
    }
}

/// One session from `listActiveSessions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    pub media_kind: MediaKind,
    pub is_transcoding: bool,
    pub user_id: String,
    pub session_guid: String,
}

impl PlaybackSession {
    /// Only video sessions with an active transcode count as streams
    pub fn is_transcoding_video(&self) -> bool {
        self.media_kind == MediaKind::Video && self.is_transcoding
    }

    pub fn identity(&self) -> StreamIdentity {
        StreamIdentity::new(self.user_id.clone(), self.session_guid.clone())
    }
}

/// Streaming-service session source
pub trait SessionSource {
    fn list_active_sessions(&self) -> Result<Vec<PlaybackSession>>;

    /// Startup connectivity check
    fn check_connection(&self) -> Result<()>;
}
