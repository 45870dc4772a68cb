//! The module registry: roster ownership and hook dispatch.
//!
//! The host constructs exactly one [`ModuleRegistry`] at startup, registers
//! every module into it, and calls one dispatch method per extension point at
//! the matching moment of its simulation loop. Dispatch is synchronous on the
//! host's simulation thread: the roster is only mutated during startup and
//! only iterated afterwards, so the registry holds no locks.
//!
//! Two aggregation rules exist for boolean override hooks, chosen per hook:
//!
//! - first-wins with short-circuit: iteration stops at the first module that
//!   returns `true`; its result (and anything it wrote to an out parameter)
//!   is authoritative. Earlier-registered modules take priority.
//! - OR-of-all without short-circuit: every module is invoked regardless of
//!   earlier results; the dispatch returns `true` if any module did. Used for
//!   veto hooks where every module must observe the attempt.
//!
//! Module panics are not caught: the registry performs no isolation between
//! modules.

use crate::module::Module;
use crate::resolve::{EntityResolver, Resolved};
use crate::types::{
    ActionButtons, AuctionEntry, Battleground, Creature, FactionEntry, GameObject, Group, Guid,
    Item, Loot, LootItem, Mail, MailDraft, MovementInfo, Player, PlayerLevelInfo, Quest, Session,
    SpellEntry, TaxiRoute, TradeData, Unit, WorldSafeLoc,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Process-wide roster of registered modules and the dispatch fan-out.
pub struct ModuleRegistry {
    /// Registration order is dispatch order.
    modules: Vec<Box<dyn Module>>,
    /// Base directory for module configuration files.
    config_dir: PathBuf,
}

impl ModuleRegistry {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            modules: Vec::new(),
            config_dir: config_dir.into(),
        }
    }

    /// Registers a module, taking ownership for the rest of the process
    /// lifetime.
    ///
    /// Names are unique: a second registration under an already-used name is
    /// dropped (first registration wins), with a warning. That situation is
    /// almost always a deployment mistake worth surfacing in the log.
    pub fn register(&mut self, module: Box<dyn Module>) {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            warn!(
                module = module.name(),
                "duplicate module registration dropped, first registration wins"
            );
            return;
        }
        info!(module = module.name(), "registered module");
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered module names, in dispatch order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    // Aggregation helpers

    fn dispatch(&mut self, mut hook: impl FnMut(&mut dyn Module)) {
        for module in self.modules.iter_mut() {
            hook(module.as_mut());
        }
    }

    fn dispatch_first(&mut self, mut hook: impl FnMut(&mut dyn Module) -> bool) -> bool {
        self.modules.iter_mut().any(|module| hook(module.as_mut()))
    }

    fn dispatch_any(&mut self, mut hook: impl FnMut(&mut dyn Module) -> bool) -> bool {
        let mut handled = false;
        for module in self.modules.iter_mut() {
            handled |= hook(module.as_mut());
        }
        handled
    }

    // World lifecycle

    /// Fired before the world loads. Loads every module's config first; a
    /// failed load keeps that module on its defaults and never aborts
    /// startup.
    pub fn on_world_pre_initialized(&mut self) {
        for module in self.modules.iter_mut() {
            let loaded = match module.config_mut() {
                Some(config) => config.load(&self.config_dir),
                None => true,
            };
            if !loaded {
                warn!(
                    module = module.name(),
                    "config load failed, module continues with defaults"
                );
            }
            module.on_world_pre_initialized();
        }
    }

    /// Fired once the world has loaded completely.
    pub fn on_world_initialized(&mut self) {
        for module in self.modules.iter_mut() {
            info!("Initializing {} module", module.name());
            module.on_initialize();
            module.on_world_initialized();
        }
    }

    /// Fired every world tick.
    pub fn on_world_updated(&mut self, elapsed_ms: u32) {
        for module in self.modules.iter_mut() {
            module.on_update(elapsed_ms);
            module.on_world_updated(elapsed_ms);
        }
    }

    // Item hooks

    pub fn on_use_item(&mut self, player: &mut Player, item: &mut Item) -> bool {
        self.dispatch_first(|m| m.on_use_item(player, item))
    }

    pub fn on_set_visible_item_slot(&mut self, player: &mut Player, slot: u8, item: &Item) {
        self.dispatch(|m| m.on_set_visible_item_slot(player, slot, item));
    }

    pub fn on_move_item_from_inventory(&mut self, player: &mut Player, item: &mut Item) {
        self.dispatch(|m| m.on_move_item_from_inventory(player, item));
    }

    pub fn on_move_item_to_inventory(&mut self, player: &mut Player, item: &mut Item) {
        self.dispatch(|m| m.on_move_item_to_inventory(player, item));
    }

    pub fn on_store_loot_item(&mut self, player: &mut Player, loot: &mut Loot, item: &mut Item) {
        self.dispatch(|m| m.on_store_loot_item(player, loot, item));
    }

    pub fn on_store_item(&mut self, player: &mut Player, item: &mut Item) {
        self.dispatch(|m| m.on_store_item(player, item));
    }

    pub fn on_equip_item(&mut self, player: &mut Player, item: &mut Item) {
        self.dispatch(|m| m.on_equip_item(player, item));
    }

    pub fn on_sell_item(&mut self, player: &mut Player, item: &mut Item, money: u32) {
        self.dispatch(|m| m.on_sell_item(player, item, money));
    }

    pub fn on_buy_back_item(&mut self, player: &mut Player, item: &mut Item, money: u32) {
        self.dispatch(|m| m.on_buy_back_item(player, item, money));
    }

    pub fn on_create_item(&mut self, player: &mut Player, item: &mut Item, amount: u32) {
        self.dispatch(|m| m.on_create_item(player, item, amount));
    }

    // Gossip hooks
    //
    // These are guid-based: the opaque identifier is resolved once through the
    // host's entity resolver and the type-matching module overload fires. An
    // unresolved guid (or a kind the hook has no overload for) dispatches
    // nothing and yields the hook default.

    /// Veto hook before a gossip menu is generated.
    pub fn on_pre_gossip_hello(
        &mut self,
        player: &mut Player,
        guid: Guid,
        resolver: &mut dyn EntityResolver,
    ) -> bool {
        match resolver.resolve(guid) {
            Resolved::Creature(creature) => {
                self.dispatch_any(|m| m.on_pre_gossip_hello_creature(player, creature))
            }
            Resolved::GameObject(game_object) => {
                self.dispatch_any(|m| m.on_pre_gossip_hello_game_object(player, game_object))
            }
            Resolved::Item(_) | Resolved::Unresolved => {
                debug!(%guid, "pre-gossip-hello target did not resolve, skipping dispatch");
                false
            }
        }
    }

    /// Notification after a gossip menu was generated.
    pub fn on_gossip_hello(
        &mut self,
        player: &mut Player,
        guid: Guid,
        resolver: &mut dyn EntityResolver,
    ) {
        match resolver.resolve(guid) {
            Resolved::Creature(creature) => {
                self.dispatch(|m| m.on_gossip_hello_creature(player, creature));
            }
            Resolved::GameObject(game_object) => {
                self.dispatch(|m| m.on_gossip_hello_game_object(player, game_object));
            }
            Resolved::Item(_) | Resolved::Unresolved => {
                debug!(%guid, "gossip-hello target did not resolve, skipping dispatch");
            }
        }
    }

    pub fn on_gossip_select(
        &mut self,
        player: &mut Player,
        guid: Guid,
        sender: u32,
        action: u32,
        code: &str,
        menu_id: u32,
        resolver: &mut dyn EntityResolver,
    ) -> bool {
        match resolver.resolve(guid) {
            Resolved::Creature(creature) => self.dispatch_first(|m| {
                m.on_gossip_select_creature(player, creature, sender, action, code, menu_id)
            }),
            Resolved::GameObject(game_object) => self.dispatch_first(|m| {
                m.on_gossip_select_game_object(player, game_object, sender, action, code, menu_id)
            }),
            Resolved::Item(item) => self.dispatch_first(|m| {
                m.on_gossip_select_item(player, item, sender, action, code, menu_id)
            }),
            Resolved::Unresolved => {
                debug!(%guid, "gossip-select target did not resolve, skipping dispatch");
                false
            }
        }
    }

    pub fn on_gossip_quest_details(&mut self, player: &mut Player, quest: &Quest, quest_giver: Guid) {
        self.dispatch(|m| m.on_gossip_quest_details(player, quest, quest_giver));
    }

    pub fn on_gossip_quest_reward(&mut self, player: &mut Player, quest: &Quest, quest_giver: Guid) {
        self.dispatch(|m| m.on_gossip_quest_reward(player, quest, quest_giver));
    }

    // Talent hooks

    pub fn on_learn_talent(&mut self, player: &mut Player, spell_id: u32) {
        self.dispatch(|m| m.on_learn_talent(player, spell_id));
    }

    pub fn on_reset_talents(&mut self, player: &mut Player, cost: u32) {
        self.dispatch(|m| m.on_reset_talents(player, cost));
    }

    // Persistence hooks

    pub fn on_pre_load_from_db(&mut self, player_id: u32) {
        self.dispatch(|m| m.on_pre_load_from_db(player_id));
    }

    pub fn on_load_from_db(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_load_from_db(player));
    }

    pub fn on_save_to_db(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_save_to_db(player));
    }

    pub fn on_delete_from_db(&mut self, player_id: u32) {
        self.dispatch(|m| m.on_delete_from_db(player_id));
    }

    // Session hooks

    pub fn on_log_out(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_log_out(player));
    }

    pub fn on_pre_character_created(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_pre_character_created(player));
    }

    pub fn on_character_created(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_character_created(player));
    }

    pub fn on_character_deleted(&mut self, player_id: u32) {
        self.dispatch(|m| m.on_character_deleted(player_id));
    }

    // Action button hooks

    pub fn on_load_action_buttons(&mut self, player: &mut Player, buttons: &mut ActionButtons) -> bool {
        self.dispatch_first(|m| m.on_load_action_buttons(player, buttons))
    }

    pub fn on_save_action_buttons(&mut self, player: &mut Player, buttons: &mut ActionButtons) -> bool {
        self.dispatch_first(|m| m.on_save_action_buttons(player, buttons))
    }

    // Player action hooks

    pub fn on_pre_handle_fall(
        &mut self,
        player: &mut Player,
        movement: &MovementInfo,
        last_fall_z: f32,
        out_damage: &mut u32,
    ) -> bool {
        self.dispatch_first(|m| m.on_pre_handle_fall(player, movement, last_fall_z, out_damage))
    }

    pub fn on_handle_fall(
        &mut self,
        player: &mut Player,
        movement: &MovementInfo,
        last_fall_z: f32,
        damage: u32,
    ) {
        self.dispatch(|m| m.on_handle_fall(player, movement, last_fall_z, damage));
    }

    /// Veto hook: every module observes the resurrection attempt, any `true`
    /// suppresses the default handling.
    pub fn on_pre_resurrect(&mut self, player: &mut Player) -> bool {
        self.dispatch_any(|m| m.on_pre_resurrect(player))
    }

    pub fn on_resurrect(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_resurrect(player));
    }

    pub fn on_release_spirit(&mut self, player: &mut Player, closest_grave: Option<&WorldSafeLoc>) {
        self.dispatch(|m| m.on_release_spirit(player, closest_grave));
    }

    pub fn on_death(&mut self, player: &mut Player, killer: Option<&Unit>) {
        self.dispatch(|m| m.on_death(player, killer));
    }

    pub fn on_environmental_death(&mut self, player: &mut Player, damage_type: u8) {
        self.dispatch(|m| m.on_environmental_death(player, damage_type));
    }

    pub fn on_pre_give_xp(&mut self, player: &mut Player, xp: &mut u32, victim: Option<&Creature>) -> bool {
        self.dispatch_first(|m| m.on_pre_give_xp(player, xp, victim))
    }

    pub fn on_give_xp(&mut self, player: &mut Player, xp: u32, victim: Option<&Creature>) {
        self.dispatch(|m| m.on_give_xp(player, xp, victim));
    }

    pub fn on_give_level(&mut self, player: &mut Player, level: u32) {
        self.dispatch(|m| m.on_give_level(player, level));
    }

    pub fn on_get_player_level_info(&mut self, player: &mut Player, info: &mut PlayerLevelInfo) {
        self.dispatch(|m| m.on_get_player_level_info(player, info));
    }

    pub fn on_modify_money(&mut self, player: &mut Player, diff: i32) {
        self.dispatch(|m| m.on_modify_money(player, diff));
    }

    pub fn on_set_reputation(
        &mut self,
        player: &mut Player,
        faction: &FactionEntry,
        standing: i32,
        incremental: bool,
    ) {
        self.dispatch(|m| m.on_set_reputation(player, faction, standing, incremental));
    }

    pub fn on_reward_quest(&mut self, player: &mut Player, quest: &Quest) {
        self.dispatch(|m| m.on_reward_quest(player, quest));
    }

    pub fn on_add_spell(&mut self, player: &mut Player, spell_id: u32) {
        self.dispatch(|m| m.on_add_spell(player, spell_id));
    }

    pub fn on_duel_complete(&mut self, player: &mut Player, opponent: &mut Player, complete_type: u8) {
        self.dispatch(|m| m.on_duel_complete(player, opponent, complete_type));
    }

    pub fn on_killed_monster_credit(&mut self, player: &mut Player, entry: u32, guid: Guid) {
        self.dispatch(|m| m.on_killed_monster_credit(player, entry, guid));
    }

    /// Veto hook, OR-of-all: see [`Self::on_pre_resurrect`].
    pub fn on_pre_reward_player_at_kill(&mut self, player: &mut Player, victim: &Unit) -> bool {
        self.dispatch_any(|m| m.on_pre_reward_player_at_kill(player, victim))
    }

    pub fn on_reward_player_at_kill(&mut self, player: &mut Player, victim: &Unit) {
        self.dispatch(|m| m.on_reward_player_at_kill(player, victim));
    }

    pub fn on_handle_page_text_query(&mut self, player: &mut Player, page_id: u32) -> bool {
        self.dispatch_first(|m| m.on_handle_page_text_query(player, page_id))
    }

    pub fn on_update_skill(&mut self, player: &mut Player, skill_id: u16) {
        self.dispatch(|m| m.on_update_skill(player, skill_id));
    }

    pub fn on_reward_honor(&mut self, player: &mut Player, victim: Option<&Unit>) {
        self.dispatch(|m| m.on_reward_honor(player, victim));
    }

    pub fn on_update_honor(&mut self, player: &mut Player) {
        self.dispatch(|m| m.on_update_honor(player));
    }

    pub fn on_taxi_flight_route_start(&mut self, player: &mut Player, route: &TaxiRoute, initial: bool) {
        self.dispatch(|m| m.on_taxi_flight_route_start(player, route, initial));
    }

    pub fn on_taxi_flight_route_end(&mut self, player: &mut Player, route: &TaxiRoute, is_final: bool) {
        self.dispatch(|m| m.on_taxi_flight_route_end(player, route, is_final));
    }

    pub fn on_emote(&mut self, player: &mut Player, target: Option<&Unit>, emote_id: u32) {
        self.dispatch(|m| m.on_emote(player, target, emote_id));
    }

    pub fn on_buy_bank_slot(&mut self, player: &mut Player, slot: u32, price: u32) {
        self.dispatch(|m| m.on_buy_bank_slot(player, slot, price));
    }

    pub fn on_summoned(&mut self, player: &mut Player, summoner: Guid) {
        self.dispatch(|m| m.on_summoned(player, summoner));
    }

    pub fn on_area_explored(&mut self, player: &mut Player, area_id: u32) {
        self.dispatch(|m| m.on_area_explored(player, area_id));
    }

    pub fn on_accept_quest(&mut self, player: &mut Player, quest_id: u32, quest_giver: Option<Guid>) {
        self.dispatch(|m| m.on_accept_quest(player, quest_id, quest_giver));
    }

    pub fn on_abandon_quest(&mut self, player: &mut Player, quest_id: u32) {
        self.dispatch(|m| m.on_abandon_quest(player, quest_id));
    }

    /// Veto hook, OR-of-all: see [`Self::on_pre_resurrect`].
    pub fn on_pre_initialize_trade(&mut self, player: &mut Player, trader: &mut Player) -> bool {
        self.dispatch_any(|m| m.on_pre_initialize_trade(player, trader))
    }

    pub fn on_trade_accepted(
        &mut self,
        player: &mut Player,
        trader: &mut Player,
        player_trade: &TradeData,
        trader_trade: &TradeData,
    ) {
        self.dispatch(|m| m.on_trade_accepted(player, trader, player_trade, trader_trade));
    }

    // Mail hooks

    pub fn on_can_check_mailbox(&mut self, player: &mut Player, mailbox: Guid, out_result: &mut bool) -> bool {
        self.dispatch_first(|m| m.on_can_check_mailbox(player, mailbox, out_result))
    }

    pub fn on_send_mail(&mut self, draft: &MailDraft, player: &mut Player, receiver: Guid, cost: u32) {
        self.dispatch(|m| m.on_send_mail(draft, player, receiver, cost));
    }

    pub fn on_mail_take_item(&mut self, mail: &mut Mail, player: &mut Player, item: &mut Item, sender: Guid) {
        self.dispatch(|m| m.on_mail_take_item(mail, player, item, sender));
    }

    pub fn on_mail_take_money(&mut self, mail: &mut Mail, player: &mut Player, amount: u32, sender: Guid) {
        self.dispatch(|m| m.on_mail_take_money(mail, player, amount, sender));
    }

    // Creature hooks

    pub fn on_creature_add_to_world(&mut self, creature: &mut Creature) {
        self.dispatch(|m| m.on_creature_add_to_world(creature));
    }

    pub fn on_creature_respawn(&mut self, creature: &mut Creature, respawn_time: &mut i64) -> bool {
        self.dispatch_first(|m| m.on_creature_respawn(creature, respawn_time))
    }

    pub fn on_creature_respawn_request(&mut self, creature: &mut Creature) {
        self.dispatch(|m| m.on_creature_respawn_request(creature));
    }

    // Game object hooks

    pub fn on_use_game_object(&mut self, game_object: &mut GameObject, user: &mut Unit) -> bool {
        self.dispatch_first(|m| m.on_use_game_object(game_object, user))
    }

    // Unit hooks

    pub fn on_calculate_dodge_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        self.dispatch_first(|m| {
            m.on_calculate_dodge_chance(unit, attacker, attack_type, ability, out_chance)
        })
    }

    pub fn on_calculate_block_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        self.dispatch_first(|m| {
            m.on_calculate_block_chance(unit, attacker, attack_type, ability, out_chance)
        })
    }

    pub fn on_calculate_parry_chance(
        &mut self,
        unit: &Unit,
        attacker: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        self.dispatch_first(|m| {
            m.on_calculate_parry_chance(unit, attacker, attack_type, ability, out_chance)
        })
    }

    pub fn on_calculate_crit_chance(
        &mut self,
        unit: &Unit,
        victim: &Unit,
        attack_type: u8,
        ability: Option<&SpellEntry>,
        out_chance: &mut f32,
    ) -> bool {
        self.dispatch_first(|m| {
            m.on_calculate_crit_chance(unit, victim, attack_type, ability, out_chance)
        })
    }

    pub fn on_calculate_spell_miss_chance(
        &mut self,
        unit: &Unit,
        victim: &Unit,
        school_mask: u32,
        spell: &SpellEntry,
        out_chance: &mut f32,
    ) -> bool {
        self.dispatch_first(|m| {
            m.on_calculate_spell_miss_chance(unit, victim, school_mask, spell, out_chance)
        })
    }

    pub fn on_get_attack_distance(&mut self, unit: &Unit, target: &Unit, out_distance: &mut f32) -> bool {
        self.dispatch_first(|m| m.on_get_attack_distance(unit, target, out_distance))
    }

    pub fn on_deal_damage(&mut self, unit: &mut Unit, victim: &mut Unit, health: u32, damage: u32) {
        self.dispatch(|m| m.on_deal_damage(unit, victim, health, damage));
    }

    pub fn on_kill(&mut self, unit: &mut Unit, victim: &mut Unit) {
        self.dispatch(|m| m.on_kill(unit, victim));
    }

    pub fn on_deal_heal(&mut self, unit: &mut Unit, victim: &mut Unit, gain: i32, added_health: u32) {
        self.dispatch(|m| m.on_deal_heal(unit, victim, gain, added_health));
    }

    // Spell hooks

    pub fn on_spell_hit(&mut self, spell: &SpellEntry, caster: &mut Unit, victim: &mut Unit) {
        self.dispatch(|m| m.on_spell_hit(spell, caster, victim));
    }

    pub fn on_spell_cast(&mut self, spell: &SpellEntry, caster: &mut Unit, victim: &mut Unit) {
        self.dispatch(|m| m.on_spell_cast(spell, caster, victim));
    }

    // Loot hooks

    pub fn on_fill_loot(&mut self, loot: &mut Loot, owner: &mut Player) -> bool {
        self.dispatch_first(|m| m.on_fill_loot(loot, owner))
    }

    pub fn on_generate_money_loot(&mut self, loot: &mut Loot, out_money: &mut u32) -> bool {
        self.dispatch_first(|m| m.on_generate_money_loot(loot, out_money))
    }

    pub fn on_add_loot_item(&mut self, loot: &mut Loot, item: &LootItem) {
        self.dispatch(|m| m.on_add_loot_item(loot, item));
    }

    pub fn on_send_gold(&mut self, loot: &mut Loot, player: &mut Player, gold: u32, loot_method: u8) {
        self.dispatch(|m| m.on_send_gold(loot, player, gold, loot_method));
    }

    pub fn on_loot_master_give(&mut self, loot: &mut Loot, target: &mut Player, item: &LootItem) {
        self.dispatch(|m| m.on_loot_master_give(loot, target, item));
    }

    pub fn on_player_roll(&mut self, loot: &Loot, player: &mut Player, item_slot: u32, roll_type: u8) {
        self.dispatch(|m| m.on_player_roll(loot, player, item_slot, roll_type));
    }

    pub fn on_player_win_roll(
        &mut self,
        loot: &Loot,
        player: &mut Player,
        roll_type: u8,
        roll_amount: u8,
        item_slot: u32,
        inventory_result: u8,
    ) {
        self.dispatch(|m| {
            m.on_player_win_roll(loot, player, roll_type, roll_amount, item_slot, inventory_result)
        });
    }

    // Battleground hooks

    pub fn on_start_battleground(&mut self, battleground: &mut Battleground) {
        self.dispatch(|m| m.on_start_battleground(battleground));
    }

    pub fn on_end_battleground(&mut self, battleground: &mut Battleground, winner_team: u32) {
        self.dispatch(|m| m.on_end_battleground(battleground, winner_team));
    }

    pub fn on_update_player_score(
        &mut self,
        battleground: &mut Battleground,
        player: &mut Player,
        score_type: u8,
        value: u32,
    ) {
        self.dispatch(|m| m.on_update_player_score(battleground, player, score_type, value));
    }

    pub fn on_leave_battleground(&mut self, battleground: &mut Battleground, player: &mut Player) {
        self.dispatch(|m| m.on_leave_battleground(battleground, player));
    }

    pub fn on_join_battleground(&mut self, battleground: &mut Battleground, player: &mut Player) {
        self.dispatch(|m| m.on_join_battleground(battleground, player));
    }

    pub fn on_pick_up_flag(&mut self, battleground: &mut Battleground, player: &mut Player, team: u32) {
        self.dispatch(|m| m.on_pick_up_flag(battleground, player, team));
    }

    // Group hooks

    pub fn on_group_add_member(&mut self, group: &mut Group, player: &mut Player, method: u8) {
        self.dispatch(|m| m.on_group_add_member(group, player, method));
    }

    pub fn on_group_remove_member(&mut self, group: &mut Group, player: &mut Player, method: u8) {
        self.dispatch(|m| m.on_group_remove_member(group, player, method));
    }

    /// Veto hook, OR-of-all: see [`Self::on_pre_resurrect`].
    pub fn on_pre_invite_member(&mut self, group: &mut Group, player: &mut Player, recipient: &mut Player) -> bool {
        self.dispatch_any(|m| m.on_pre_invite_member(group, player, recipient))
    }

    // Auction house hooks

    pub fn on_auction_sell_item(&mut self, auction: &mut AuctionEntry, player: &mut Player) {
        self.dispatch(|m| m.on_auction_sell_item(auction, player));
    }

    pub fn on_auction_update_bid(&mut self, auction: &mut AuctionEntry, player: &mut Player, new_bid: u32) {
        self.dispatch(|m| m.on_auction_update_bid(auction, player, new_bid));
    }

    pub fn on_auction_bid_winning(&mut self, auction: &mut AuctionEntry, owner: Guid, bidder: Guid) {
        self.dispatch(|m| m.on_auction_bid_winning(auction, owner, bidder));
    }

    // Player dump hooks

    pub fn on_write_dump(&mut self, player_id: u32, dump: &mut String) {
        self.dispatch(|m| m.on_write_dump(player_id, dump));
    }

    pub fn is_module_dump_table(&self, table_name: &str) -> bool {
        self.modules.iter().any(|m| m.is_module_dump_table(table_name))
    }

    // Chat commands

    /// Routes one raw chat line through the module command tables.
    ///
    /// The line is split on the first and second space into prefix,
    /// subcommand and trailing args. Modules are scanned in registration
    /// order for a matching prefix, then the module's command table for a
    /// matching name the session is allowed to run. The first matching
    /// module+command wins and its result is returned; no match anywhere
    /// yields `false` and the host falls back to its default unknown-command
    /// handling.
    pub fn on_execute_command(&mut self, session: &mut Session, raw: &str) -> bool {
        let line = raw.trim();
        let mut parts = line.splitn(3, ' ');
        let prefix = parts.next().unwrap_or("");
        let subcommand = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("");
        if prefix.is_empty() || subcommand.is_empty() {
            return false;
        }

        for module in self.modules.iter_mut() {
            if module.chat_command_prefix() != Some(prefix) {
                continue;
            }
            let matched = module
                .chat_commands()
                .iter()
                .find(|c| c.name == subcommand && c.security_level <= session.security_level)
                .map(|c| c.name);
            if let Some(name) = matched {
                debug!(module = module.name(), command = name, "dispatching chat command");
                return module.on_chat_command(session, name, args);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValues, ModuleConfig};
    use crate::error::ConfigError;
    use crate::module::ChatCommandSpec;
    use crate::types::GuidKind;
    use std::sync::{Arc, Mutex};

    /// Shared invocation log the probe modules append to.
    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct Probe {
        name: &'static str,
        log: CallLog,
        handle_use_item: bool,
        veto_resurrect: bool,
        loot_money: Option<u32>,
    }

    impl Probe {
        fn new(name: &'static str, log: &CallLog) -> Self {
            Self {
                name,
                log: log.clone(),
                handle_use_item: false,
                veto_resurrect: false,
                loot_money: None,
            }
        }

        fn boxed(name: &'static str, log: &CallLog) -> Box<dyn Module> {
            Box::new(Self::new(name, log))
        }
    }

    impl Module for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_world_updated(&mut self, elapsed_ms: u32) {
            self.log.push(format!("{}:world_updated:{}", self.name, elapsed_ms));
        }

        fn on_death(&mut self, _player: &mut Player, _killer: Option<&Unit>) {
            self.log.push(format!("{}:death", self.name));
        }

        fn on_use_item(&mut self, _player: &mut Player, _item: &mut Item) -> bool {
            self.log.push(format!("{}:use_item", self.name));
            self.handle_use_item
        }

        fn on_pre_resurrect(&mut self, _player: &mut Player) -> bool {
            self.log.push(format!("{}:pre_resurrect", self.name));
            self.veto_resurrect
        }

        fn on_gossip_select_creature(
            &mut self,
            _player: &mut Player,
            creature: &mut Creature,
            _sender: u32,
            _action: u32,
            code: &str,
            _menu_id: u32,
        ) -> bool {
            self.log.push(format!("{}:gossip_select:{}:{}", self.name, creature.entry, code));
            false
        }

        fn on_gossip_select_item(
            &mut self,
            _player: &mut Player,
            item: &mut Item,
            _sender: u32,
            _action: u32,
            _code: &str,
            _menu_id: u32,
        ) -> bool {
            self.log.push(format!("{}:gossip_select_item:{}", self.name, item.entry));
            true
        }

        fn on_generate_money_loot(&mut self, _loot: &mut Loot, out_money: &mut u32) -> bool {
            self.log.push(format!("{}:money_loot", self.name));
            match self.loot_money {
                Some(money) => {
                    *out_money = money;
                    true
                }
                None => false,
            }
        }

        fn chat_command_prefix(&self) -> Option<&str> {
            Some("probe")
        }

        fn chat_commands(&self) -> &[ChatCommandSpec] {
            const COMMANDS: &[ChatCommandSpec] = &[
                ChatCommandSpec { name: "help", security_level: 0, help: "show help" },
                ChatCommandSpec { name: "reset", security_level: 3, help: "reset state" },
            ];
            COMMANDS
        }

        fn on_chat_command(&mut self, _session: &mut Session, name: &str, args: &str) -> bool {
            self.log.push(format!("{}:cmd:{}:{}", self.name, name, args));
            true
        }
    }

    /// Minimal world the resolver tests run against.
    struct TestWorld {
        creature: Creature,
        item: Item,
    }

    impl TestWorld {
        fn new() -> Self {
            Self {
                creature: Creature {
                    guid: Guid::creature(1),
                    entry: 100,
                    name: "Innkeeper".to_string(),
                    level: 30,
                    health: 1000,
                    max_health: 1000,
                },
                item: Item {
                    guid: Guid::item(5),
                    entry: 200,
                    count: 1,
                },
            }
        }
    }

    impl EntityResolver for TestWorld {
        fn resolve(&mut self, guid: Guid) -> Resolved<'_> {
            if guid == self.creature.guid {
                Resolved::Creature(&mut self.creature)
            } else if guid == self.item.guid {
                Resolved::Item(&mut self.item)
            } else {
                Resolved::Unresolved
            }
        }
    }

    fn registry_with(modules: Vec<Box<dyn Module>>) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new("conf");
        for module in modules {
            registry.register(module);
        }
        registry
    }

    #[test]
    fn notification_fires_in_registration_order_every_call() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![
            Probe::boxed("a", &log),
            Probe::boxed("b", &log),
            Probe::boxed("c", &log),
        ]);

        let mut player = Player::new(1, "Tester");
        registry.on_death(&mut player, None);
        assert_eq!(log.take(), vec!["a:death", "b:death", "c:death"]);

        // Same order, no omissions, on every subsequent call.
        registry.on_death(&mut player, None);
        assert_eq!(log.take(), vec!["a:death", "b:death", "c:death"]);
    }

    #[test]
    fn first_wins_short_circuits_remaining_modules() {
        let log = CallLog::default();
        let mut first = Probe::new("a", &log);
        first.handle_use_item = true;
        let mut registry = registry_with(vec![
            Box::new(first),
            Probe::boxed("b", &log),
            Probe::boxed("c", &log),
        ]);

        let mut player = Player::new(1, "Tester");
        let mut item = Item { guid: Guid::item(1), entry: 42, count: 1 };
        assert!(registry.on_use_item(&mut player, &mut item));
        assert_eq!(log.take(), vec!["a:use_item"]);
    }

    #[test]
    fn or_of_all_keeps_iterating_past_a_true() {
        let log = CallLog::default();
        let mut first = Probe::new("a", &log);
        first.veto_resurrect = true;
        let mut registry = registry_with(vec![
            Box::new(first),
            Probe::boxed("b", &log),
            Probe::boxed("c", &log),
        ]);

        let mut player = Player::new(1, "Tester");
        assert!(registry.on_pre_resurrect(&mut player));
        assert_eq!(
            log.take(),
            vec!["a:pre_resurrect", "b:pre_resurrect", "c:pre_resurrect"]
        );
    }

    #[test]
    fn unresolved_guid_dispatches_nothing() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        let mut world = TestWorld::new();
        let mut player = Player::new(1, "Tester");

        let handled = registry.on_gossip_select(
            &mut player,
            Guid::new(GuidKind::Creature, 999),
            0,
            0,
            "",
            0,
            &mut world,
        );
        assert!(!handled);
        assert!(log.take().is_empty());
    }

    #[test]
    fn resolved_guid_dispatches_typed_overload() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        let mut world = TestWorld::new();
        let mut player = Player::new(1, "Tester");

        let handled =
            registry.on_gossip_select(&mut player, Guid::creature(1), 0, 3, "code", 7, &mut world);
        assert!(!handled);
        assert_eq!(log.take(), vec!["a:gossip_select:100:code"]);

        let handled = registry.on_gossip_select(&mut player, Guid::item(5), 0, 0, "", 0, &mut world);
        assert!(handled);
        assert_eq!(log.take(), vec!["a:gossip_select_item:200"]);
    }

    #[test]
    fn duplicate_registration_is_dropped_first_wins() {
        let log = CallLog::default();
        let mut second = Probe::new("a", &log);
        second.handle_use_item = true;
        let mut registry = registry_with(vec![Probe::boxed("a", &log), Box::new(second)]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.module_names(), vec!["a"]);

        // The surviving module is the first one: it declines item use.
        let mut player = Player::new(1, "Tester");
        let mut item = Item { guid: Guid::item(1), entry: 42, count: 1 };
        assert!(!registry.on_use_item(&mut player, &mut item));
    }

    #[test]
    fn empty_registry_dispatch_is_a_no_op() {
        let mut registry = ModuleRegistry::new("conf");
        assert!(registry.is_empty());

        registry.on_world_updated(16);
        let mut player = Player::new(1, "Tester");
        let mut item = Item { guid: Guid::item(1), entry: 1, count: 1 };
        assert!(!registry.on_use_item(&mut player, &mut item));
    }

    #[test]
    fn override_output_parameter_reaches_the_caller() {
        let log = CallLog::default();
        let mut first = Probe::new("a", &log);
        first.loot_money = Some(5000);
        let mut registry = registry_with(vec![Box::new(first), Probe::boxed("b", &log)]);

        let mut loot = Loot { source: Guid::creature(1), gold: 0, items: vec![] };
        let mut money = 0;
        assert!(registry.on_generate_money_loot(&mut loot, &mut money));
        assert_eq!(money, 5000);
        assert_eq!(log.take(), vec!["a:money_loot"]);
    }

    #[test]
    fn level_info_adjustments_accumulate_across_modules() {
        struct StaminaBoost(u32);
        impl Module for StaminaBoost {
            fn name(&self) -> &str {
                "stamina_boost"
            }
            fn on_get_player_level_info(&mut self, _player: &mut Player, info: &mut PlayerLevelInfo) {
                info.stamina += self.0;
            }
        }

        let mut registry = ModuleRegistry::new("conf");
        registry.register(Box::new(StaminaBoost(5)));
        registry.register(Box::new(StaminaBoost(3)));
        // Second registration under the same name is dropped, so only one
        // boost applies. A differently named module stacks on top.
        struct SpiritBoost;
        impl Module for SpiritBoost {
            fn name(&self) -> &str {
                "spirit_boost"
            }
            fn on_get_player_level_info(&mut self, _player: &mut Player, info: &mut PlayerLevelInfo) {
                info.spirit += 2;
            }
        }
        registry.register(Box::new(SpiritBoost));

        let mut player = Player::new(1, "Tester");
        let mut info = PlayerLevelInfo {
            strength: 20,
            agility: 20,
            stamina: 20,
            intellect: 20,
            spirit: 20,
        };
        registry.on_get_player_level_info(&mut player, &mut info);
        assert_eq!(info.stamina, 25);
        assert_eq!(info.spirit, 22);
        assert_eq!(info.strength, 20);
    }

    #[test]
    fn world_tick_reaches_every_module() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log), Probe::boxed("b", &log)]);
        registry.on_world_updated(16);
        assert_eq!(log.take(), vec!["a:world_updated:16", "b:world_updated:16"]);
    }

    #[test]
    fn chat_command_routes_to_matching_module() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        let mut session = Session::new(1, Guid::player(1), 0);

        assert!(registry.on_execute_command(&mut session, "probe help"));
        assert_eq!(log.take(), vec!["a:cmd:help:"]);
    }

    #[test]
    fn chat_command_passes_trailing_args_through() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        let mut session = Session::new(1, Guid::player(1), 0);

        assert!(registry.on_execute_command(&mut session, "probe help me with this"));
        assert_eq!(log.take(), vec!["a:cmd:help:me with this"]);
    }

    #[test]
    fn chat_command_respects_security_level() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);

        let mut low = Session::new(1, Guid::player(1), 0);
        assert!(!registry.on_execute_command(&mut low, "probe reset"));
        assert!(log.take().is_empty());

        let mut gm = Session::new(2, Guid::player(2), 3);
        assert!(registry.on_execute_command(&mut gm, "probe reset"));
        assert_eq!(log.take(), vec!["a:cmd:reset:"]);
    }

    #[test]
    fn chat_command_without_subcommand_or_prefix_match_falls_through() {
        let log = CallLog::default();
        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        let mut session = Session::new(1, Guid::player(1), 0);

        assert!(!registry.on_execute_command(&mut session, "probe"));
        assert!(!registry.on_execute_command(&mut session, "other help"));
        assert!(!registry.on_execute_command(&mut session, ""));
        assert!(log.take().is_empty());
    }

    #[test]
    fn dump_table_query_checks_every_module() {
        let log = CallLog::default();
        struct DumpModule;
        impl Module for DumpModule {
            fn name(&self) -> &str {
                "dump"
            }
            fn is_module_dump_table(&self, table_name: &str) -> bool {
                table_name == "module_playtime"
            }
        }

        let mut registry = registry_with(vec![Probe::boxed("a", &log)]);
        registry.register(Box::new(DumpModule));
        assert!(registry.is_module_dump_table("module_playtime"));
        assert!(!registry.is_module_dump_table("characters"));
    }

    // Config lifecycle

    struct FlagConfig {
        enabled: bool,
    }

    impl ModuleConfig for FlagConfig {
        fn filename(&self) -> &str {
            "flagged.conf.toml"
        }

        fn on_load(&mut self, values: &ConfigValues) -> Result<(), ConfigError> {
            self.enabled = values.get_bool_or("Enabled", false);
            Ok(())
        }
    }

    struct ConfiguredModule {
        name: &'static str,
        log: CallLog,
        config: FlagConfig,
    }

    impl Module for ConfiguredModule {
        fn name(&self) -> &str {
            self.name
        }

        fn config_mut(&mut self) -> Option<&mut dyn ModuleConfig> {
            Some(&mut self.config)
        }

        fn on_world_pre_initialized(&mut self) {
            self.log.push(format!("{}:pre_init:{}", self.name, self.config.enabled));
        }

        fn on_initialize(&mut self) {
            self.log.push(format!("{}:initialize", self.name));
        }
    }

    #[test]
    fn failed_config_load_does_not_stop_initialization() {
        let dir = tempfile::TempDir::new().unwrap();
        // Only the second module's config file exists.
        std::fs::write(dir.path().join("flagged.conf.toml"), "Enabled = true\n").unwrap();

        let log = CallLog::default();
        let mut registry = ModuleRegistry::new(dir.path());
        registry.register(Box::new(ConfiguredModule {
            name: "first",
            log: log.clone(),
            config: FlagConfig { enabled: false },
        }));
        // Same filename, so this second module loads the file that exists.
        registry.register(Box::new(ConfiguredModule {
            name: "second",
            log: log.clone(),
            config: FlagConfig { enabled: false },
        }));

        // Make the first module's load fail by pointing it at a filename
        // that is not there.
        struct MissingConfig;
        impl ModuleConfig for MissingConfig {
            fn filename(&self) -> &str {
                "not_there.conf.toml"
            }
            fn on_load(&mut self, _values: &ConfigValues) -> Result<(), ConfigError> {
                Ok(())
            }
        }
        struct MissingConfigModule {
            log: CallLog,
            config: MissingConfig,
        }
        impl Module for MissingConfigModule {
            fn name(&self) -> &str {
                "missing"
            }
            fn config_mut(&mut self) -> Option<&mut dyn ModuleConfig> {
                Some(&mut self.config)
            }
            fn on_world_pre_initialized(&mut self) {
                self.log.push("missing:pre_init".to_string());
            }
            fn on_initialize(&mut self) {
                self.log.push("missing:initialize".to_string());
            }
        }
        registry.register(Box::new(MissingConfigModule {
            log: log.clone(),
            config: MissingConfig,
        }));

        registry.on_world_pre_initialized();
        registry.on_world_initialized();

        let entries = log.take();
        // Every module reached pre-init and initialize, including the one
        // whose config failed to load.
        assert!(entries.contains(&"first:pre_init:true".to_string()));
        assert!(entries.contains(&"second:pre_init:true".to_string()));
        assert!(entries.contains(&"missing:pre_init".to_string()));
        assert!(entries.contains(&"first:initialize".to_string()));
        assert!(entries.contains(&"second:initialize".to_string()));
        assert!(entries.contains(&"missing:initialize".to_string()));
    }
}
