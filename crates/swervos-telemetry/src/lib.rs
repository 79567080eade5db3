//! `swervos-telemetry` – event routing.
//!
//! Routes asynchronous data between the control loop, the vision pipeline,
//! and external consumers without caring about the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – Typed, topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
