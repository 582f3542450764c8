use std::sync::RwLock;

use tracing::warn;

use crate::packet::ServerInfoSnapshot;

const MAX_STRING_BYTES: usize = 255;

/// The mutable ServerInfo fields the fleet queries for. All mutation
/// goes through setters that enforce the wire limits (`spec.md` §4.2);
/// out-of-range writes are logged and ignored rather than raised, so a
/// misbehaving caller can never break the query responder.
pub struct ServerInfo {
    state: RwLock<ServerInfoSnapshot>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        ServerInfo {
            state: RwLock::new(ServerInfoSnapshot {
                current_players: 0,
                max_players: 0,
                server_name: String::new(),
                game_type: String::new(),
                build_id: String::new(),
                map: String::new(),
                game_port: 0,
            }),
        }
    }
}

impl ServerInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a consistent, immutable snapshot under a short read lock so
    /// serialization never holds the lock across the write.
    pub fn snapshot(&self) -> ServerInfoSnapshot {
        self.state.read().unwrap().clone()
    }

    pub fn set_current_players(&self, value: u32) {
        self.set_u16_field("currentPlayers", value, |s, v| s.current_players = v);
    }

    pub fn set_max_players(&self, value: u32) {
        self.set_u16_field("maxPlayers", value, |s, v| s.max_players = v);
    }

    /// Atomically increment `currentPlayers`, for a player join. Clamps
    /// at `u16::MAX` with a warning rather than rejecting the call, the
    /// saturating alternative to [`Self::set_current_players`].
    pub fn increment_current_players(&self) {
        let mut state = self.state.write().unwrap();
        if state.current_players < u16::MAX {
            state.current_players += 1;
        } else {
            warn!("cannot increment currentPlayers above u16::MAX, ignoring");
        }
    }

    /// Atomically decrement `currentPlayers`, for a player leave. Clamps
    /// at `u16::MIN` with a warning rather than rejecting the call, the
    /// saturating alternative to [`Self::set_current_players`].
    pub fn decrement_current_players(&self) {
        let mut state = self.state.write().unwrap();
        if state.current_players > u16::MIN {
            state.current_players -= 1;
        } else {
            warn!("cannot decrement currentPlayers below u16::MIN, ignoring");
        }
    }

    pub fn set_game_port(&self, value: u32) {
        self.set_u16_field("gamePort", value, |s, v| s.game_port = v);
    }

    pub fn set_server_name(&self, value: impl Into<String>) {
        self.set_string_field("serverName", value.into(), |s, v| s.server_name = v);
    }

    pub fn set_game_type(&self, value: impl Into<String>) {
        self.set_string_field("gameType", value.into(), |s, v| s.game_type = v);
    }

    pub fn set_build_id(&self, value: impl Into<String>) {
        self.set_string_field("buildId", value.into(), |s, v| s.build_id = v);
    }

    pub fn set_map(&self, value: impl Into<String>) {
        self.set_string_field("map", value.into(), |s, v| s.map = v);
    }

    fn set_u16_field(&self, field: &'static str, value: u32, apply: impl FnOnce(&mut ServerInfoSnapshot, u16)) {
        match u16::try_from(value) {
            Ok(v) => apply(&mut self.state.write().unwrap(), v),
            Err(_) => warn!(field, value, "value does not fit u16, ignoring"),
        }
    }

    fn set_string_field(
        &self,
        field: &'static str,
        value: String,
        apply: impl FnOnce(&mut ServerInfoSnapshot, String),
    ) {
        if value.len() > MAX_STRING_BYTES {
            warn!(field, len = value.len(), "string exceeds 255 bytes, ignoring");
            return;
        }
        apply(&mut self.state.write().unwrap(), value);
    }
}
