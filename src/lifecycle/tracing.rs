//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate. The format
//! is compact and hides the module prefix (`with_target(false)`); the actor loop tags its
//! lines with `entity_type` instead.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run     # lifecycle, bumps, exhaustion, alerts
//! RUST_LOG=debug cargo run    # request payloads, published deltas, status pushes
//! ```
//!
//! ## Workflow Trace Example
//!
//! Bumping an order through Grill, Fryer and Expo with `RUST_LOG=info`:
//!
//! ```text
//! INFO Created entity_type="Kitchen" id=main size=1
//! INFO Orders synced venue=main activated=1 removed=0
//! INFO Bumped order=A station=station_1 exhausted=false
//! INFO Action ok entity_type="Kitchen" id=main
//! INFO Bumped order=A station=station_2 exhausted=true
//! INFO Exhausted venue=main order=A from=pending to=confirmed
//! INFO Action ok entity_type="Kitchen" id=main
//! ```
//!
//! With `RUST_LOG=debug` each request also logs its action payload, and every published
//! delta logs its revision and how many displays received it.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - we use entity_type instead
        .compact()
        .init();
}
