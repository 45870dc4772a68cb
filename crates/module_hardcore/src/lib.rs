//! Permadeath ruleset: death is final and the world pays out more for the
//! risk.
//!
//! While enabled, resurrection attempts are vetoed, deaths are counted per
//! character, and corpse money loot is scaled by a configurable multiplier.
//! `hardcore status` reports a character's recorded death count.

use module_system::{
    ChatCommandSpec, ConfigError, ConfigValues, Loot, Module, ModuleConfig, Player, Session, Unit,
};
use std::collections::HashMap;
use tracing::info;

const CONFIG_FILE: &str = "hardcore.conf.toml";

const COMMANDS: &[ChatCommandSpec] = &[ChatCommandSpec {
    name: "status",
    security_level: 0,
    help: "show hardcore death count",
}];

pub struct HardcoreConfig {
    pub enabled: bool,
    /// Scale applied to generated money loot. 1.0 leaves the host value
    /// untouched.
    pub loot_money_multiplier: f64,
}

impl Default for HardcoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            loot_money_multiplier: 1.5,
        }
    }
}

impl ModuleConfig for HardcoreConfig {
    fn filename(&self) -> &str {
        CONFIG_FILE
    }

    fn on_load(&mut self, values: &ConfigValues) -> Result<(), ConfigError> {
        self.enabled = values.get_bool_or("Hardcore.Enable", true);
        self.loot_money_multiplier = values.get_f64_or("Hardcore.LootMoneyMultiplier", 1.5);
        if self.loot_money_multiplier < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "Hardcore.LootMoneyMultiplier".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

pub struct HardcoreModule {
    config: HardcoreConfig,
    deaths: HashMap<u64, u32>,
}

impl HardcoreModule {
    pub fn new() -> Self {
        Self {
            config: HardcoreConfig::default(),
            deaths: HashMap::new(),
        }
    }

    pub fn death_count(&self, player_counter: u64) -> u32 {
        self.deaths.get(&player_counter).copied().unwrap_or(0)
    }
}

impl Default for HardcoreModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for HardcoreModule {
    fn name(&self) -> &str {
        "hardcore"
    }

    fn config_mut(&mut self) -> Option<&mut dyn ModuleConfig> {
        Some(&mut self.config)
    }

    fn on_death(&mut self, player: &mut Player, killer: Option<&Unit>) {
        if !self.config.enabled {
            return;
        }
        let count = self.deaths.entry(player.guid.counter()).or_insert(0);
        *count += 1;
        match killer {
            Some(killer) => info!(
                "{} has fallen to {} (death #{})",
                player.name, killer.name, count
            ),
            None => info!("{} has fallen (death #{})", player.name, count),
        }
    }

    /// Dead is dead: suppress the host's resurrection handling.
    fn on_pre_resurrect(&mut self, player: &mut Player) -> bool {
        if !self.config.enabled {
            return false;
        }
        info!("{} may not resurrect under hardcore rules", player.name);
        true
    }

    fn on_generate_money_loot(&mut self, loot: &mut Loot, out_money: &mut u32) -> bool {
        if !self.config.enabled || (self.config.loot_money_multiplier - 1.0).abs() < f64::EPSILON {
            return false;
        }
        *out_money = (f64::from(loot.gold) * self.config.loot_money_multiplier) as u32;
        true
    }

    fn on_character_deleted(&mut self, player_id: u32) {
        self.deaths.remove(&u64::from(player_id));
    }

    fn is_module_dump_table(&self, table_name: &str) -> bool {
        table_name == "module_hardcore"
    }

    fn on_write_dump(&mut self, player_id: u32, dump: &mut String) {
        if let Some(count) = self.deaths.get(&u64::from(player_id)) {
            dump.push_str(&format!("module_hardcore:{}:{}\n", player_id, count));
        }
    }

    fn chat_command_prefix(&self) -> Option<&str> {
        Some("hardcore")
    }

    fn chat_commands(&self) -> &[ChatCommandSpec] {
        COMMANDS
    }

    fn on_chat_command(&mut self, session: &mut Session, name: &str, _args: &str) -> bool {
        match name {
            "status" => {
                let counter = session.player_guid.counter();
                info!(
                    player = counter,
                    deaths = self.death_count(counter),
                    "hardcore status"
                );
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use module_system::{Guid, ModuleRegistry};

    #[test]
    fn death_is_counted_per_character() {
        let mut module = HardcoreModule::new();
        let mut first = Player::new(1, "Aldor");
        let mut second = Player::new(2, "Belan");

        module.on_death(&mut first, None);
        module.on_death(&mut first, None);
        module.on_death(&mut second, None);
        assert_eq!(module.death_count(1), 2);
        assert_eq!(module.death_count(2), 1);
    }

    #[test]
    fn resurrection_is_vetoed_while_enabled() {
        let mut module = HardcoreModule::new();
        let mut player = Player::new(1, "Aldor");
        assert!(module.on_pre_resurrect(&mut player));

        module.config.enabled = false;
        assert!(!module.on_pre_resurrect(&mut player));
    }

    #[test]
    fn money_loot_is_scaled_by_the_multiplier() {
        let mut module = HardcoreModule::new();
        module.config.loot_money_multiplier = 2.0;

        let mut loot = Loot {
            source: Guid::creature(1),
            gold: 150,
            items: vec![],
        };
        let mut money = 0;
        assert!(module.on_generate_money_loot(&mut loot, &mut money));
        assert_eq!(money, 300);
    }

    #[test]
    fn identity_multiplier_defers_to_the_host() {
        let mut module = HardcoreModule::new();
        module.config.loot_money_multiplier = 1.0;

        let mut loot = Loot {
            source: Guid::creature(1),
            gold: 150,
            items: vec![],
        };
        let mut money = 0;
        assert!(!module.on_generate_money_loot(&mut loot, &mut money));
        assert_eq!(money, 0);
    }

    #[test]
    fn config_load_applies_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "\"Hardcore.Enable\" = false\n\"Hardcore.LootMoneyMultiplier\" = 2.5\n",
        )
        .unwrap();

        let mut config = HardcoreConfig::default();
        assert!(config.load(dir.path()));
        assert!(!config.enabled);
        assert_eq!(config.loot_money_multiplier, 2.5);
    }

    #[test]
    fn registry_veto_suppresses_resurrection() {
        let mut registry = ModuleRegistry::new("conf");
        registry.register(Box::new(HardcoreModule::new()));

        let mut player = Player::new(1, "Aldor");
        assert!(registry.on_pre_resurrect(&mut player));
    }

    #[test]
    fn status_command_answers_for_any_security_level() {
        let mut registry = ModuleRegistry::new("conf");
        registry.register(Box::new(HardcoreModule::new()));

        let mut session = Session::new(1, Guid::player(1), 0);
        assert!(registry.on_execute_command(&mut session, "hardcore status"));
    }
}
