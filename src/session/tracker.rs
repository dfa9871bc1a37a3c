// Session Tracker
//
// Polls the session source and projects transcoding video sessions to
// stream identities. Holds no state between polls.

use crate::error::Result;
use crate::session::SessionSource;
use crate::types::StreamSet;

pub struct SessionTracker<S> {
    source: S,
}

impl<S: SessionSource> SessionTracker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current set of transcoding video streams
    pub fn poll(&self) -> Result<StreamSet> {
        let sessions = self.source.list_active_sessions()?;

        let streams: StreamSet = sessions
            .iter()
            .filter(|s| s.is_transcoding_video())
            .map(|s| s.identity())
            .collect();

        tracing::debug!(
            "[SessionTracker] {} sessions, {} transcoding video streams",
            sessions.len(),
            streams.len()
        );

        Ok(streams)
    }
}
