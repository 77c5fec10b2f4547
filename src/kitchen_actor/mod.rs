//! Kitchen-specific resource logic: one [`Kitchen`] entity per venue, holding the
//! station registry and the pipeline board behind a single actor loop.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::{Kitchen, KitchenContext, KitchenCreate, KitchenUpdate};
pub use error::*;

use crate::clients::KitchenClient;
use crate::framework::ResourceActor;
use crate::sync::SyncHub;

/// Creates a new Kitchen actor and its client.
pub fn new(buffer_size: usize, hub: SyncHub) -> (ResourceActor<Kitchen>, KitchenClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = KitchenClient::new(generic_client, hub);

    (actor, client)
}
