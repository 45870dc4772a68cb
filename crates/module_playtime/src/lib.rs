//! Tracks how long each character stays logged in.
//!
//! Time accumulates from the world tick while a character is online, is
//! announced to the log at a configurable cadence, and is reported on
//! logout. Players query their own total with `playtime played`; game
//! masters can zero a session counter with `playtime reset`.

use module_system::{
    ChatCommandSpec, ConfigError, ConfigValues, Module, ModuleConfig, Player, Session,
};
use std::collections::HashMap;
use tracing::{debug, info};

const CONFIG_FILE: &str = "playtime.conf.toml";

const COMMANDS: &[ChatCommandSpec] = &[
    ChatCommandSpec {
        name: "played",
        security_level: 0,
        help: "show time played this session",
    },
    ChatCommandSpec {
        name: "reset",
        security_level: 3,
        help: "reset the session playtime counter",
    },
];

pub struct PlaytimeConfig {
    pub enabled: bool,
    /// Cadence of the periodic playtime announcement, in seconds.
    pub announce_secs: i64,
}

impl Default for PlaytimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            announce_secs: 600,
        }
    }
}

impl ModuleConfig for PlaytimeConfig {
    fn filename(&self) -> &str {
        CONFIG_FILE
    }

    fn on_load(&mut self, values: &ConfigValues) -> Result<(), ConfigError> {
        self.enabled = values.get_bool_or("Playtime.Enable", true);
        self.announce_secs = values.get_i64_or("Playtime.AnnounceSecs", 600);
        if self.announce_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "Playtime.AnnounceSecs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct SessionTime {
    elapsed_ms: u64,
    announced_ms: u64,
}

pub struct PlaytimeModule {
    config: PlaytimeConfig,
    /// Keyed by player guid counter; an entry exists while that character is
    /// online.
    sessions: HashMap<u64, SessionTime>,
}

impl PlaytimeModule {
    pub fn new() -> Self {
        Self {
            config: PlaytimeConfig::default(),
            sessions: HashMap::new(),
        }
    }

    pub fn session_ms(&self, player_counter: u64) -> Option<u64> {
        self.sessions.get(&player_counter).map(|s| s.elapsed_ms)
    }

    fn format_played(elapsed_ms: u64) -> String {
        let total_secs = elapsed_ms / 1000;
        format!(
            "{}h {}m {}s",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        )
    }
}

impl Default for PlaytimeModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for PlaytimeModule {
    fn name(&self) -> &str {
        "playtime"
    }

    fn config_mut(&mut self) -> Option<&mut dyn ModuleConfig> {
        Some(&mut self.config)
    }

    fn on_update(&mut self, elapsed_ms: u32) {
        if !self.config.enabled {
            return;
        }
        let announce_ms = self.config.announce_secs as u64 * 1000;
        for (counter, session) in self.sessions.iter_mut() {
            session.elapsed_ms += u64::from(elapsed_ms);
            if session.elapsed_ms - session.announced_ms >= announce_ms {
                session.announced_ms = session.elapsed_ms;
                info!(
                    player = counter,
                    "session playtime: {}",
                    Self::format_played(session.elapsed_ms)
                );
            }
        }
    }

    fn on_load_from_db(&mut self, player: &mut Player) {
        if !self.config.enabled {
            return;
        }
        debug!(player = %player.guid, "playtime tracking started");
        self.sessions.insert(player.guid.counter(), SessionTime::default());
    }

    fn on_log_out(&mut self, player: &mut Player) {
        if let Some(session) = self.sessions.remove(&player.guid.counter()) {
            info!(
                "{} played {} this session",
                player.name,
                Self::format_played(session.elapsed_ms)
            );
        }
    }

    fn on_character_deleted(&mut self, player_id: u32) {
        self.sessions.remove(&u64::from(player_id));
    }

    fn is_module_dump_table(&self, table_name: &str) -> bool {
        table_name == "module_playtime"
    }

    fn on_write_dump(&mut self, player_id: u32, dump: &mut String) {
        if let Some(session) = self.sessions.get(&u64::from(player_id)) {
            dump.push_str(&format!(
                "module_playtime:{}:{}\n",
                player_id, session.elapsed_ms
            ));
        }
    }

    fn chat_command_prefix(&self) -> Option<&str> {
        Some("playtime")
    }

    fn chat_commands(&self) -> &[ChatCommandSpec] {
        COMMANDS
    }

    fn on_chat_command(&mut self, session: &mut Session, name: &str, _args: &str) -> bool {
        let counter = session.player_guid.counter();
        match name {
            "played" => {
                let elapsed = self.session_ms(counter).unwrap_or(0);
                info!(player = counter, "played {}", Self::format_played(elapsed));
                true
            }
            "reset" => {
                if let Some(entry) = self.sessions.get_mut(&counter) {
                    entry.elapsed_ms = 0;
                    entry.announced_ms = 0;
                }
                info!(player = counter, "playtime counter reset");
                true
            }
            _ => false,
        }
    }
}
