//! Host-side entity handles passed through hook dispatch.
//!
//! The world server owns all of these; the registry only relays them to
//! modules, which may mutate them in place. None of the game mechanics behind
//! them (combat math, loot tables, battleground scoring) live here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind discriminant carried by every [`Guid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidKind {
    Player,
    Creature,
    GameObject,
    Item,
}

/// Opaque server-assigned identifier for a world entity.
///
/// A guid on its own proves nothing about liveness: it has to be resolved
/// through an [`EntityResolver`](crate::resolve::EntityResolver) before any
/// type-specific hook can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guid {
    kind: GuidKind,
    counter: u64,
}

impl Guid {
    pub fn new(kind: GuidKind, counter: u64) -> Self {
        Self { kind, counter }
    }

    pub fn player(counter: u64) -> Self {
        Self::new(GuidKind::Player, counter)
    }

    pub fn creature(counter: u64) -> Self {
        Self::new(GuidKind::Creature, counter)
    }

    pub fn game_object(counter: u64) -> Self {
        Self::new(GuidKind::GameObject, counter)
    }

    pub fn item(counter: u64) -> Self {
        Self::new(GuidKind::Item, counter)
    }

    pub fn kind(&self) -> GuidKind {
        self.kind
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn is_creature(&self) -> bool {
        self.kind == GuidKind::Creature
    }

    pub fn is_game_object(&self) -> bool {
        self.kind == GuidKind::GameObject
    }

    pub fn is_item(&self) -> bool {
        self.kind == GuidKind::Item
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{}", self.kind, self.counter)
    }
}

/// A connected player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub guid: Guid,
    pub name: String,
    pub level: u32,
    pub xp: u32,
    pub money: i64,
    pub health: u32,
    pub max_health: u32,
    pub area_id: u32,
}

impl Player {
    pub fn new(counter: u64, name: impl Into<String>) -> Self {
        Self {
            guid: Guid::player(counter),
            name: name.into(),
            level: 1,
            xp: 0,
            money: 0,
            health: 100,
            max_health: 100,
            area_id: 0,
        }
    }
}

/// Base stats the host computed for a player's race/class/level combination.
/// Modules may adjust them before they are applied.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerLevelInfo {
    pub strength: u32,
    pub agility: u32,
    pub stamina: u32,
    pub intellect: u32,
    pub spirit: u32,
}

/// An NPC the server spawned into the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    pub guid: Guid,
    pub entry: u32,
    pub name: String,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
}

/// A static interactable object (chest, door, mailbox, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub guid: Guid,
    pub entry: u32,
    pub name: String,
}

/// An item instance held by some container or player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub guid: Guid,
    pub entry: u32,
    pub count: u32,
}

/// Generic combat-capable handle. The host hands this out where either a
/// player or a creature can appear (killers, heal targets, attackers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub guid: Guid,
    pub name: String,
    pub level: u32,
    pub health: u32,
}

/// One row of a generated loot table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootItem {
    pub item_id: u32,
    pub count: u32,
}

/// Loot generated for a corpse, chest or pickpocket attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loot {
    pub source: Guid,
    pub gold: u32,
    pub items: Vec<LootItem>,
}

/// A running battleground instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battleground {
    pub id: u32,
    pub map_id: u32,
}

/// One auction house listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionEntry {
    pub id: u32,
    pub item_id: u32,
    pub owner: Guid,
    pub bid: u32,
    pub buyout: u32,
}

/// An outgoing mail before the host commits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailDraft {
    pub subject: String,
    pub body: String,
    pub money: u32,
}

/// A delivered mail sitting in a mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mail {
    pub id: u32,
    pub sender: Guid,
    pub money: u32,
}

/// Quest template data, read-only from a module's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: u32,
    pub title: String,
}

/// Movement sample the host captured for a fall or teleport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MovementInfo {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub fall_time_ms: u32,
}

/// Graveyard location used when a spirit is released.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldSafeLoc {
    pub id: u32,
    pub map_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A taxi flight between two nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxiRoute {
    pub path_id: u32,
    pub source_node: u32,
    pub dest_node: u32,
}

/// One side of a trade window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeData {
    pub money: u32,
    pub items: Vec<Guid>,
}

/// Faction template row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionEntry {
    pub id: u32,
    pub name: String,
}

/// Spell template row. Only identity and school mask cross the hook boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpellEntry {
    pub id: u32,
    pub school_mask: u32,
}

/// A player group (party or raid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub leader: Guid,
}

/// One action bar button.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionButton {
    pub action: u32,
    pub button_type: u8,
}

/// Action bar state keyed by slot index.
pub type ActionButtons = BTreeMap<u8, ActionButton>;

/// The account session behind a connected player. Security level gates chat
/// command access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub account_id: u32,
    pub player_guid: Guid,
    pub security_level: u32,
}

impl Session {
    pub fn new(account_id: u32, player_guid: Guid, security_level: u32) -> Self {
        Self {
            account_id,
            player_guid,
            security_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_kind_predicates() {
        assert!(Guid::creature(7).is_creature());
        assert!(Guid::game_object(7).is_game_object());
        assert!(Guid::item(7).is_item());
        assert!(!Guid::player(7).is_creature());
    }

    #[test]
    fn guid_equality_covers_kind_and_counter() {
        assert_eq!(Guid::creature(1), Guid::creature(1));
        assert_ne!(Guid::creature(1), Guid::creature(2));
        assert_ne!(Guid::creature(1), Guid::game_object(1));
    }

    #[test]
    fn guid_display_is_readable() {
        assert_eq!(Guid::creature(42).to_string(), "Creature-42");
    }
}
