//! The module capability interface.
//!
//! A module is one pluggable extension unit. It overrides only the hooks it
//! cares about; every hook here has a safe default body (no-op, or `false`
//! meaning "did not override"), so the trait is a capability set rather than
//! an obligation.
//!
//! Override hooks return `bool`: `true` means "I computed the authoritative
//! result, suppress the default server logic" (and, for hooks with an out
//! parameter, the module has written it). Notification hooks return nothing
//! and fire after the action is final.

use crate::config::ModuleConfig;
use crate::types::{
    ActionButtons, AuctionEntry, Battleground, Creature, FactionEntry, GameObject, Group, Guid,
    Item, Loot, LootItem, Mail, MailDraft, MovementInfo, Player, PlayerLevelInfo, Quest, Session,
    SpellEntry, TaxiRoute, TradeData, Unit, WorldSafeLoc,
};

/// One entry of a module's chat command table.
///
/// The registry matches `name` against the subcommand of an incoming line and
/// gates it on the session's security level before routing the invocation to
/// [`Module::on_chat_command`].
#[derive(Debug, Clone, Copy)]
pub struct ChatCommandSpec {
    pub name: &'static str,
    pub security_level: u32,
    pub help: &'static str,
}

/// One pluggable extension unit.
///
/// Modules are constructed during startup, registered exactly once with the
/// [`ModuleRegistry`](crate::registry::ModuleRegistry) (which takes
/// ownership), and live until process teardown.
#[allow(unused_variables)]
pub trait Module: Send {
    /// Display name, also the registry key. Must be unique per process.
    fn name(&self) -> &str;

    /// The module's on-disk settings, if it has any. Loaded once during
    /// world pre-initialization.
    fn config_mut(&mut self) -> Option<&mut dyn ModuleConfig> {
        None
    }

    // Module lifecycle

    /// Called once when the world has finished initializing.
    fn on_initialize(&mut self) {}
    /// Called every world update tick.
    fn on_update(&mut self, elapsed_ms: u32) {}

    // World hooks

    /// Called before the world loads, after this module's config was loaded.
    fn on_world_pre_initialized(&mut self) {}
    /// Called after the world has loaded completely.
    fn on_world_initialized(&mut self) {}
    /// Called every time the world updates.
    fn on_world_updated(&mut self, elapsed_ms: u32) {}

    // Item hooks

    /// Called when a player uses an item. Return true to override the default handling.
    fn on_use_item(&mut self, player: &mut Player, item: &mut Item) -> bool {
        false
    }
    /// Called when the visible equipment of a player is updated.
    fn on_set_visible_item_slot(&mut self, player: &mut Player, slot: u8, item: &Item) {}
    /// Called when a player moves an item out of the inventory.
    fn on_move_item_from_inventory(&mut self, player: &mut Player, item: &mut Item) {}
    /// Called when a player moves an item into the inventory.
    fn on_move_item_to_inventory(&mut self, player: &mut Player, item: &mut Item) {}
    /// Called when a player stores an item from a loot window.
    fn on_store_loot_item(&mut self, player: &mut Player, loot: &mut Loot, item: &mut Item) {}
    /// Called when a player stores an item into the inventory.
    fn on_store_item(&mut self, player: &mut Player, item: &mut Item) {}
    /// Called when a player equips an item.
    fn on_equip_item(&mut self, player: &mut Player, item: &mut Item) {}
    /// Called when a player sells an item to a vendor.
    fn on_sell_item(&mut self, player: &mut Player, item: &mut Item, money: u32) {}
    /// Called when a player buys back a previously sold item.
    fn on_buy_back_item(&mut self, player: &mut Player, item: &mut Item, money: u32) {}
    /// Called when an item is created for a player.
    fn on_create_item(&mut self, player: &mut Player, item: &mut Item, amount: u32) {}

    // Gossip hooks

    /// Called before a creature gossip menu is generated. Return true to override.
    fn on_pre_gossip_hello_creature(&mut self, player: &mut Player, creature: &mut Creature) -> bool {
        false
    }
    /// Called before a game object gossip menu is generated. Return true to override.
    fn on_pre_gossip_hello_game_object(
        &mut self,
        player: &mut Player,
        game_object: &mut GameObject,
    ) -> bool {
        false
    }
    /// Called after a creature gossip menu was generated, just before sending.
    fn on_gossip_hello_creature(&mut self, player: &mut Player, creature: &mut Creature) {}
    /// Called after a game object gossip menu was generated, just before sending.
    fn on_gossip_hello_game_object(&mut self, player: &mut Player, game_object: &mut GameObject) {}
    /// Called when a player selects a creature dialog option. Return true to override.
    fn on_gossip_select_creature(
        &mut self,
        player: &mut Player,
        creature: &mut Creature,
        sender: u32,
        action: u32,
        code: &str,
        menu_id: u32,
    ) -> bool {
        false
    }
    /// Called when a player selects a game object dialog option. Return true to override.
    fn on_gossip_select_game_object(
        &mut self,
        player: &mut Player,
        game_object: &mut GameObject,
        sender: u32,
        action: u32,
        code: &str,
        menu_id: u32,
    ) -> bool {
        false
    }
    /// Called when a player selects an item dialog option. Return true to override.
    fn on_gossip_select_item(
        &mut self,
        player: &mut Player,
        item: &mut Item,
        sender: u32,
        action: u32,
        code: &str,
        menu_id: u32,
    ) -> bool {
        false
    }
    /// Called when quest details are shown to a player.
    fn on_gossip_quest_details(&mut self, player: &mut Player, quest: &Quest, quest_giver: Guid) {}
    /// Called when the quest reward dialog is shown to a player.
    fn on_gossip_quest_reward(&mut self, player: &mut Player, quest: &Quest, quest_giver: Guid) {}

    // Talent hooks

    /// Called when a player learns a talent.
    fn on_learn_talent(&mut self, player: &mut Player, spell_id: u32) {}
    /// Called when a player resets their talents.
    fn on_reset_talents(&mut self, player: &mut Player, cost: u32) {}

    // Persistence hooks

    /// Called before a player is loaded from the database.
    fn on_pre_load_from_db(&mut self, player_id: u32) {}
    /// Called after a player has been loaded from the database.
    fn on_load_from_db(&mut self, player: &mut Player) {}
    /// Called when a player is saved to the database.
    fn on_save_to_db(&mut self, player: &mut Player) {}
    /// Called when a character is deleted from the database.
    fn on_delete_from_db(&mut self, player_id: u32) {}

    // Session hooks

    /// Called when a player logs out.
    fn on_log_out(&mut self, player: &mut Player) {}
    /// Called before a new character is created.
    fn on_pre_character_created(&mut self, player: &mut Player) {}
    /// Called when a new character has been created.
    fn on_character_created(&mut self, player: &mut Player) {}
    /// Called when a character has been deleted.
    fn on_character_deleted(&mut self, player_id: u32) {}

    // Action button hooks

    /// Called when a character's action buttons are loaded. Return true to override.
    fn on_load_action_buttons(&mut self, player: &mut Player, buttons: &mut ActionButtons) -> bool {
        false
    }
    /// Called when a character's action buttons are saved. Return true to override.
    fn on_save_action_buttons(&mut self, player: &mut Player, buttons: &mut ActionButtons) -> bool {
        false
    }

    // Player action hooks

    /// Called before fall damage is computed. Write `out_damage` and return
    /// true to override the computation.
    fn on_pre_handle_fall(
        &mut self,
        player: &mut Player,
        movement: &MovementInfo,
        last_fall_z: f32,
        out_damage: &mut u32,
    ) -> bool {
        false
    }
    /// Called after fall damage has been applied.
    fn on_handle_fall(
        &mut self,
        player: &mut Player,
        movement: &MovementInfo,
        last_fall_z: f32,
        damage: u32,
    ) {
    }
    /// Called before a player resurrects. Return true to veto the default handling.
    fn on_pre_resurrect(&mut self, player: &mut Player) -> bool {
        false
    }
    /// Called when a player has been resurrected.
    fn on_resurrect(&mut self, player: &mut Player) {}
    /// Called when a player releases their spirit.
    fn on_release_spirit(&mut self, player: &mut Player, closest_grave: Option<&WorldSafeLoc>) {}
    /// Called when a player has died. `killer` is absent for deaths without one.
    fn on_death(&mut self, player: &mut Player, killer: Option<&Unit>) {}
    /// Called when a player has died from environmental damage.
    fn on_environmental_death(&mut self, player: &mut Player, damage_type: u8) {}
    /// Called before experience is granted. Mutate `xp` and return true to override.
    fn on_pre_give_xp(&mut self, player: &mut Player, xp: &mut u32, victim: Option<&Creature>) -> bool {
        false
    }
    /// Called when a player receives experience.
    fn on_give_xp(&mut self, player: &mut Player, xp: u32, victim: Option<&Creature>) {}
    /// Called when a player reaches a new level.
    fn on_give_level(&mut self, player: &mut Player, level: u32) {}
    /// Called when base level stats are computed for a player. Mutate `info` to adjust them.
    fn on_get_player_level_info(&mut self, player: &mut Player, info: &mut PlayerLevelInfo) {}
    /// Called when a player gains or spends money (positive/negative diff).
    fn on_modify_money(&mut self, player: &mut Player, diff: i32) {}
    /// Called when a player's reputation with a faction changes.
    fn on_set_reputation(
        &mut self,
        player: &mut Player,
        faction: &FactionEntry,
        standing: i32,
        incremental: bool,
    ) {
    }
    /// Called when a player receives a quest reward.
    fn on_reward_quest(&mut self, player: &mut Player, quest: &Quest) {}
    /// Called when a player learns a spell.
    fn on_add_spell(&mut self, player: &mut Player, spell_id: u32) {}
    /// Called when a duel has completed.
    fn on_duel_complete(&mut self, player: &mut Player, opponent: &mut Player, complete_type: u8) {}
    /// Called when a player receives kill credit for a creature entry.
    fn on_killed_monster_credit(&mut self, player: &mut Player, entry: u32, guid: Guid) {}
    /// Called before the kill reward is processed. Return true to veto it.
    fn on_pre_reward_player_at_kill(&mut self, player: &mut Player, victim: &Unit) -> bool {
        false
    }
    /// Called when the kill reward is processed.
    fn on_reward_player_at_kill(&mut self, player: &mut Player, victim: &Unit) {}
    /// Called when a player queries a page text. Return true to override the response.
    fn on_handle_page_text_query(&mut self, player: &mut Player, page_id: u32) -> bool {
        false
    }
    /// Called when a player skill changes.
    fn on_update_skill(&mut self, player: &mut Player, skill_id: u16) {}
    /// Called when a player kills a unit that rewards honor.
    fn on_reward_honor(&mut self, player: &mut Player, victim: Option<&Unit>) {}
    /// Called when a player's honor is recalculated.
    fn on_update_honor(&mut self, player: &mut Player) {}
    /// Called when a player starts a taxi flight route.
    fn on_taxi_flight_route_start(&mut self, player: &mut Player, route: &TaxiRoute, initial: bool) {}
    /// Called when a player finishes a taxi flight route.
    fn on_taxi_flight_route_end(&mut self, player: &mut Player, route: &TaxiRoute, is_final: bool) {}
    /// Called when a player performs an emote.
    fn on_emote(&mut self, player: &mut Player, target: Option<&Unit>, emote_id: u32) {}
    /// Called when a player buys a bank slot.
    fn on_buy_bank_slot(&mut self, player: &mut Player, slot: u32, price: u32) {}
    /// Called before a player is summoned.
    fn on_summoned(&mut self, player: &mut Player, summoner: Guid) {}
    /// Called when a player explores a new area.
    fn on_area_explored(&mut self, player: &mut Player, area_id: u32) {}
    /// Called when a player accepts a quest.
    fn on_accept_quest(&mut self, player: &mut Player, quest_id: u32, quest_giver: Option<Guid>) {}
    /// Called when a player abandons a quest.
    fn on_abandon_quest(&mut self, player: &mut Player, quest_id: u32) {}
    /// Called before a trade window opens. Return true to veto the trade.
    fn on_pre_initialize_trade(&mut self, player: &mut Player, trader: &mut Player) -> bool {
        false
    }
    /// Called when both sides have accepted a trade.
    fn on_trade_accepted(
        &mut self,
        player: &mut Player,
        trader: &mut Player,
        player_trade: &TradeData,
        trader_trade: &TradeData,
    ) {
    }

    // Mail hooks

    /// Called when a player tries to open a mailbox. Write `out_result` and
    /// return true to override the reachability check.
    fn on_can_check_mailbox(&mut self, player: &mut Player, mailbox: Guid, out_result: &mut bool) -> bool {
        false
    }
    /// Called when a player sends a mail.
    fn on_send_mail(&mut self, draft: &MailDraft, player: &mut Player, receiver: Guid, cost: u32) {}
    /// Called when a player takes an item out of a mail.
    fn on_mail_take_item(&mut self, mail: &mut Mail, player: &mut Player, item: &mut Item, sender: Guid) {}
    /// Called when a player takes money out of a mail.
    fn on_mail_take_money(&mut self, mail: &mut Mail, player: &mut Player, amount: u32, sender: Guid) {}

    // Creature hooks

    /// Called when a creature is added to the world.
    fn on_creature_add_to_world(&mut self, creature: &mut Creature) {}
    /// Called before a creature respawns. Mutate `respawn_time` and return true to override.
    fn on_creature_respawn(&mut self, creature: &mut Creature, respawn_time: &mut i64) -> bool {
        false
    }
    /// Called when a manual creature respawn is requested.
    fn on_creature_respawn_request(&mut self, creature: &mut Creature) {}

    // Game object hooks

    /// Called when a unit uses a game object. Return true to override the default handling.
    fn on_use_game_object(&mut self, game_object: &mut GameObject, user: &mut Unit) -> bool {
        false
    }

    // Unit hooks

    /// Called when computing effective dodge chance. Write `out_chance` and return true to override.
    fn on_calculate_dodge_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        false
    }
    /// Called when computing effective block chance. Write `out_chance` and return true to override.
    fn on_calculate_block_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        false
    }
    /// Called when computing effective parry chance. Write `out_chance` and return true to override.
    fn on_calculate_parry_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        false
    }
    /// Called when computing effective crit chance. Write `out_chance` and return true to override.
    fn on_calculate_crit_chance(
        &mut self,
        unit: &Unit,
        victim: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        false
    }
    /// Called when computing spell miss chance. Write `out_chance` and return true to override.
    fn on_calculate_spell_miss_chance(
        &mut self,
        unit: &Unit,
        victim: &Unit,
        school_mask: u32,
        spell: &SpellEntry,
        out_chance: &mut f32,
    ) -> bool {
        false
    }
    /// Called when computing attack distance. Write `out_distance` and return true to override.
    fn on_get_attack_distance(&mut self, unit: &Unit, target: &Unit, out_distance: &mut f32) -> bool {
        false
    }
    /// Called when a unit deals damage to another unit.
    fn on_deal_damage(&mut self, unit: &mut Unit, victim: &mut Unit, health: u32, damage: u32) {}
    /// Called when a unit kills another unit.
    fn on_kill(&mut self, unit: &mut Unit, victim: &mut Unit) {}
    /// Called when a unit heals another unit.
    fn on_deal_heal(&mut self, unit: &mut Unit, victim: &mut Unit, gain: i32, added_health: u32) {}

    // Spell hooks

    /// Called when a spell hits a unit.
    fn on_spell_hit(&mut self, spell: &SpellEntry, caster: &mut Unit, victim: &mut Unit) {}
    /// Called when a spell is cast.
    fn on_spell_cast(&mut self, spell: &SpellEntry, caster: &mut Unit, victim: &mut Unit) {}

    // Loot hooks

    /// Called when the loot table is generated. Return true to override generation.
    fn on_fill_loot(&mut self, loot: &mut Loot, owner: &mut Player) -> bool {
        false
    }
    /// Called when loot money is generated. Write `out_money` and return true to override.
    fn on_generate_money_loot(&mut self, loot: &mut Loot, out_money: &mut u32) -> bool {
        false
    }
    /// Called when an item is added to a loot table.
    fn on_add_loot_item(&mut self, loot: &mut Loot, item: &LootItem) {}
    /// Called when gold is taken from a loot.
    fn on_send_gold(&mut self, loot: &mut Loot, player: &mut Player, gold: u32, loot_method: u8) {}
    /// Called when a loot master hands an item to a player.
    fn on_loot_master_give(&mut self, loot: &mut Loot, target: &mut Player, item: &LootItem) {}
    /// Called when a player rolls for a loot item.
    fn on_player_roll(&mut self, loot: &Loot, player: &mut Player, item_slot: u32, roll_type: u8) {}
    /// Called when a player wins a loot roll.
    fn on_player_win_roll(
        &mut self,
        loot: &Loot,
        player: &mut Player,
        roll_type: u8,
        roll_amount: u8,
        item_slot: u32,
        inventory_result: u8,
    ) {
    }

    // Battleground hooks

    /// Called when a battleground starts.
    fn on_start_battleground(&mut self, battleground: &mut Battleground) {}
    /// Called when a battleground ends.
    fn on_end_battleground(&mut self, battleground: &mut Battleground, winner_team: u32) {}
    /// Called when a battleground score is updated for a player.
    fn on_update_player_score(
        &mut self,
        battleground: &mut Battleground,
        player: &mut Player,
        score_type: u8,
        value: u32,
    ) {
    }
    /// Called when a player leaves a battleground.
    fn on_leave_battleground(&mut self, battleground: &mut Battleground, player: &mut Player) {}
    /// Called when a player joins a battleground.
    fn on_join_battleground(&mut self, battleground: &mut Battleground, player: &mut Player) {}
    /// Called when a player picks up a battleground flag.
    fn on_pick_up_flag(&mut self, battleground: &mut Battleground, player: &mut Player, team: u32) {}

    // Group hooks

    /// Called when a player is added to a group.
    fn on_group_add_member(&mut self, group: &mut Group, player: &mut Player, method: u8) {}
    /// Called when a player is removed from a group.
    fn on_group_remove_member(&mut self, group: &mut Group, player: &mut Player, method: u8) {}
    /// Called before a group invite is sent. Return true to veto the invite.
    fn on_pre_invite_member(&mut self, group: &mut Group, player: &mut Player, recipient: &mut Player) -> bool {
        false
    }

    // Auction house hooks

    /// Called when a player lists an item on the auction house.
    fn on_auction_sell_item(&mut self, auction: &mut AuctionEntry, player: &mut Player) {}
    /// Called when a player bids on an auction.
    fn on_auction_update_bid(&mut self, auction: &mut AuctionEntry, player: &mut Player, new_bid: u32) {}
    /// Called when an auction closes with a winning bid.
    fn on_auction_bid_winning(&mut self, auction: &mut AuctionEntry, owner: Guid, bidder: Guid) {}

    // Player dump hooks

    /// Called when a character dump is written. Append module-owned rows to `dump`.
    fn on_write_dump(&mut self, player_id: u32, dump: &mut String) {}
    /// Return true if `table_name` is a dump table owned by this module.
    fn is_module_dump_table(&self, table_name: &str) -> bool {
        false
    }

    // Chat commands

    /// Prefix this module answers to in chat, or `None` for no commands.
    fn chat_command_prefix(&self) -> Option<&str> {
        None
    }
    /// The module's command table. Matching and security gating happen in the registry.
    fn chat_commands(&self) -> &[ChatCommandSpec] {
        &[]
    }
    /// Executes a command previously matched against [`Module::chat_commands`].
    fn on_chat_command(&mut self, session: &mut Session, name: &str, args: &str) -> bool {
        false
    }
}
