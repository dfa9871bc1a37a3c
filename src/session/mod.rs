// Session Module - Streaming-service session tracking
//
// This module polls the media server and reduces its sessions to the set
// of active transcoding streams

pub mod plex;
pub mod state;
pub mod tracker;

pub use plex::PlexClient;
pub use state::{MediaKind, PlaybackSession, SessionSource};
pub use tracker::SessionTracker;
