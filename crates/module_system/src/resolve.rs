//! Guid-to-entity resolution, supplied by the host.
//!
//! Guid-based hooks cannot fire until the opaque identifier is turned into a
//! live, typed entity. The host implements [`EntityResolver`] over whatever
//! interaction rules it enforces (range checks, NPC flags, item ownership);
//! the registry only pattern-matches on the outcome.

use crate::types::{Creature, GameObject, Guid, Item};

/// Outcome of resolving a [`Guid`] against the live world.
///
/// `Unresolved` covers every failure: dangling guid, despawned entity, or an
/// entity the acting player is not allowed to interact with. The dispatcher
/// treats it as "fire nothing", not as an error.
#[derive(Debug)]
pub enum Resolved<'a> {
    Creature(&'a mut Creature),
    GameObject(&'a mut GameObject),
    Item(&'a mut Item),
    Unresolved,
}

impl Resolved<'_> {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolved::Unresolved)
    }
}

/// Host collaborator that looks up live entities by guid.
pub trait EntityResolver {
    /// Resolves `guid` to a typed mutable handle, or [`Resolved::Unresolved`]
    /// if nothing interactable answers to it.
    fn resolve(&mut self, guid: Guid) -> Resolved<'_>;
}
