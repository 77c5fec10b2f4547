//! # ActorEntity Trait
//!
//! The contract every aggregate managed by a [`ResourceActor`](crate::framework::ResourceActor)
//! implements. It names the id, the DTOs, the action enum, the injected context and the
//! error type, and provides the lifecycle hooks the actor calls while it owns the entity.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! Both default to `Ok(())`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any aggregate must implement to be managed by `ResourceActor`.
///
/// Ids are chosen by the caller (a venue is addressed by its own slug), so unlike a
/// counter-backed store the actor never invents them.
///
/// # Async & Context
/// Hooks are `#[async_trait]` and receive the `Context` that was handed to
/// [`ResourceActor::run`](crate::framework::ResourceActor::run). Dependencies are bound
/// when the loop starts, not when the actor is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum of resource-specific operations.
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    type Context: Send + Sync;

    /// One error enum for the whole actor rather than one per action.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the entity from its id and payload. Called before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after the entity is built and before it is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom resource-specific action.
    ///
    /// The entity must validate before mutating: if this returns `Err`, the stored state
    /// is whatever `self` holds at that point.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
