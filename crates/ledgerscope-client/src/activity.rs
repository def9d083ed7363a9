use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ClientError, ErrorKind};

/// The most recent failure, kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ClientError> for ActivityError {
    fn from(err: &ClientError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What the client did last.
///
/// Overwritten on each operation; it holds the latest activity, never a
/// history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActivityLog {
    pub connection_string: String,
    pub activity: String,
    pub remote_ip: Option<IpAddr>,
    pub connect_time: Option<DateTime<Utc>>,
    pub disconnect_time: Option<DateTime<Utc>>,
    pub last_error: Option<ActivityError>,
}

impl ActivityLog {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Self::default()
        }
    }

    /// Start a new activity, clearing the previous error.
    pub(crate) fn begin(&mut self, activity: impl Into<String>) {
        self.activity = activity.into();
        self.last_error = None;
    }

    pub(crate) fn record_error(&mut self, err: &ClientError) {
        self.last_error = Some(err.into());
    }

    pub(crate) fn mark_connected(&mut self) {
        self.connect_time = Some(Utc::now());
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.disconnect_time = Some(Utc::now());
    }

    pub fn last_error_kind(&self) -> Option<ErrorKind> {
        self.last_error.as_ref().map(|e| e.kind)
    }
}
