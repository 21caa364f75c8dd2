//! # Integration Flows
//!
//! Containers wired to each other through [`InMemoryRouter`] or observed
//! through [`RecordingSession`].
//!
//! [`InMemoryRouter`]: autopub_bus::InMemoryRouter
//! [`RecordingSession`]: autopub_bus::RecordingSession

pub mod anti_loop;
pub mod bootstrap;
pub mod disconnect;
pub mod fan_out;
pub mod fixtures;
pub mod properties;
pub mod suspension;
