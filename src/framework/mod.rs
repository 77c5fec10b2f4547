//! Generic actor framework for resource management.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that aggregates implement to be managed by actors
//! - [`ResourceActor`] - Generic actor that owns entities and serializes their mutations
//! - [`ResourceClient`] - Type-safe, cloneable handle for sending requests
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning full actors.

pub mod actor;
pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
