// Path: crates/api/src/state.rs
//! Durable storage for session snapshots, read back by status reporting.

use drone_types::error::StateSinkError;
use drone_types::stats::SessionSnapshot;

/// Persists the latest session snapshot.
pub trait StateSink: Send + Sync {
    /// Replaces the stored snapshot.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StateSinkError>;
    /// Removes the stored snapshot. Clearing an empty sink is not an error.
    fn clear(&self) -> Result<(), StateSinkError>;
    /// Returns the stored snapshot, if any.
    fn load(&self) -> Result<Option<SessionSnapshot>, StateSinkError>;
}

/// A sink that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopStateSink;

impl StateSink for NopStateSink {
    fn save(&self, _snapshot: &SessionSnapshot) -> Result<(), StateSinkError> {
        Ok(())
    }
    fn clear(&self) -> Result<(), StateSinkError> {
        Ok(())
    }
    fn load(&self) -> Result<Option<SessionSnapshot>, StateSinkError> {
        Ok(None)
    }
}
