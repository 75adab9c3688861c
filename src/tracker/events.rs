use serde::{Deserialize, Serialize};

/// Permission flags the host's permission system grants a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPermissions {
    pub fakerank: bool,
    pub fakerank_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub nickname: String,
    pub is_npc: bool,
    pub is_host: bool,
    pub permissions: PlayerPermissions,
}

impl Player {
    pub fn new(user_id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
            is_npc: false,
            is_host: false,
            permissions: PlayerPermissions::default(),
        }
    }

    pub fn with_permissions(mut self, permissions: PlayerPermissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// NPCs and the dedicated host have no stable id worth recording.
    pub fn is_tracked(&self) -> bool {
        !self.is_npc && !self.is_host && !self.user_id.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Adrenaline,
    Medkit,
    Painkillers,
    Other,
}

/// Everything the host server reports to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted,
    RoundEnded,
    PlayerJoined(Player),
    PlayerLeft(Player),
    PlayerDied {
        attacker: Option<Player>,
        target: Player,
    },
    UsedItem {
        player: Player,
        item: ItemKind,
    },
    PlayerEscaped(Player),
    SnakeGameOver {
        player: Player,
        score: i64,
    },
    PointsAwarded {
        player: Player,
        points: i64,
    },
}
