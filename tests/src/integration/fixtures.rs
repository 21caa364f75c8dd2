//! Shared test fixtures.

use autopub_bus::{InMemoryRouter, LocalSession, RecordingSession, Session};
use autopub_sync::SyncConfig;
use std::sync::Arc;

/// Config for a container named `name` under the default base URI.
pub fn config(name: &str) -> SyncConfig {
    SyncConfig::named(name)
}

/// A recording double, plus the same session as a trait object.
pub fn recording() -> (Arc<RecordingSession>, Arc<dyn Session>) {
    let recording = Arc::new(RecordingSession::new());
    let session: Arc<dyn Session> = recording.clone();
    (recording, session)
}

/// A router session, plus the same session as a trait object.
pub fn join(router: &InMemoryRouter) -> (Arc<LocalSession>, Arc<dyn Session>) {
    let local = router.join();
    let session: Arc<dyn Session> = local.clone();
    (local, session)
}
