//! # System Lifecycle
//!
//! Starting, wiring and shutting down the kitchen runtime.
//!
//! ## Dependency Injection via Context
//!
//! The Kitchen actor is created without dependencies and receives them when its loop
//! starts:
//!
//! ```rust,ignore
//! impl ActorEntity for Kitchen {
//!     type Context = KitchenContext; // sync hub, order feed, retry policy
//! }
//!
//! let (actor, client) = kitchen_actor::new(mailbox_size, hub.clone());
//! tokio::spawn(actor.run(KitchenContext { hub, feed, retry }));
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Signal pollers** - a broadcast tells every [`FeedPoller`](crate::feed::FeedPoller) to stop
//! 2. **Drop the client** - the actor's channel closes once no clone remains
//! 3. **Await completion** - the actor logs its final state and exits
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the subscriber; see the [`tracing`] module.

pub mod kitchen_system;
pub mod tracing;

pub use kitchen_system::*;
pub use tracing::*;
