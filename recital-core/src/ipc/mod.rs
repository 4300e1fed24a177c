//! Serialisable event types broadcast to the host.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so a host can
//! forward them over its own event bus.

pub mod events;
