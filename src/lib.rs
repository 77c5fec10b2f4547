//! # Kitchen Display
//!
//! > **Station pipelines for restaurant kitchen displays, built on resource-oriented actors.**
//!
//! Orders arrive from an external order feed and travel through a venue's prep stations
//! (Grill, Fryer, ...) to an optional expo station. Every display of the venue sees the
//! same pipeline state: when one station bumps an order, the order disappears there and
//! shows up at the next station on every screen.
//!
//! ## 🏗️ Design
//!
//! ### One actor, one writer
//! Each venue is a single [`Kitchen`](kitchen_actor::Kitchen) entity managed by the
//! generic [`ResourceActor`](framework::ResourceActor). The station registry and the
//! progress of every active order live in that entity, so bumps, toggles, feed syncs and
//! station edits are serialized by the actor loop without locks.
//!
//! ### Derived positions
//! An order's current station is never stored. It is recomputed from the set of stations
//! that bumped it and the registry's [`Topology`](registry::Topology), see
//! [`is_visible`](pipeline::is_visible).
//!
//! ### Fan-out
//! Every committed change is published on the venue's broadcast channel
//! ([`SyncHub`](sync::SyncHub)). Displays start from a snapshot and apply deltas in
//! revision order; a display that falls behind gets a fresh snapshot.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: the generic actor, its client and the mock client for tests.
//! - [`model`]: stations, orders and pipeline progress.
//! - [`registry`]: the ordered station list and its cached topology.
//! - [`pipeline`]: visibility, bump, item toggles, reconciliation and tickets.
//! - [`urgency`]: age-based urgency and new-order alerts.
//! - [`sync`]: deltas, snapshots, subscriptions and the display mirror.
//! - [`feed`]: the order feed boundary, status pushes with retry, the feed poller.
//! - [`kitchen_actor`] and [`clients`]: the Kitchen entity and its typed client.
//! - [`config`] and [`lifecycle`]: configuration loading, wiring and shutdown.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod feed;
pub mod framework;
pub mod kitchen_actor;
pub mod lifecycle;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod sync;
pub mod urgency;
