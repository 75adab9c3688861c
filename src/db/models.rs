use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name the plugin reports when a death has no player behind it.
pub const ANONYMOUS_ATTACKER: &str = "anonymous";

/// How long a granted fake-rank permission lasts.
pub const FAKERANK_GRANT_SECS: i64 = 14 * 24 * 60 * 60;

/// Numeric `playerdata` columns that uploads may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Playtime,
    RoundsPlayed,
    UsedAdrenaline,
    Escapes,
    Experience,
    SnakeHighscore,
    Kills,
    Deaths,
}

impl Counter {
    pub fn column(self) -> &'static str {
        match self {
            Counter::Playtime => "playtime",
            Counter::RoundsPlayed => "roundsplayed",
            Counter::UsedAdrenaline => "usedadrenaline",
            Counter::Escapes => "escapecount",
            Counter::Experience => "experience",
            Counter::SnakeHighscore => "snakehighscore",
            Counter::Kills => "killcount",
            Counter::Deaths => "deathcount",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlayerData {
    pub id: String,
    pub username: Option<String>,
    pub experience: Option<i64>,
    pub playtime: Option<i64>,
    pub roundsplayed: Option<i64>,
    pub usedadrenaline: Option<i64>,
    pub escapecount: Option<i64>,
    pub killcount: Option<i64>,
    pub deathcount: Option<i64>,
    pub snakehighscore: Option<i64>,
    pub fakerank_until: Option<i64>,
    pub fakerankadmin_until: Option<i64>,
}

impl PlayerData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn counter(&self, counter: Counter) -> i64 {
        self.counter_slot(counter).unwrap_or(0)
    }

    pub(crate) fn counter_mut(&mut self, counter: Counter) -> &mut Option<i64> {
        match counter {
            Counter::Playtime => &mut self.playtime,
            Counter::RoundsPlayed => &mut self.roundsplayed,
            Counter::UsedAdrenaline => &mut self.usedadrenaline,
            Counter::Escapes => &mut self.escapecount,
            Counter::Experience => &mut self.experience,
            Counter::SnakeHighscore => &mut self.snakehighscore,
            Counter::Kills => &mut self.killcount,
            Counter::Deaths => &mut self.deathcount,
        }
    }

    fn counter_slot(&self, counter: Counter) -> Option<i64> {
        match counter {
            Counter::Playtime => self.playtime,
            Counter::RoundsPlayed => self.roundsplayed,
            Counter::UsedAdrenaline => self.usedadrenaline,
            Counter::Escapes => self.escapecount,
            Counter::Experience => self.experience,
            Counter::SnakeHighscore => self.snakehighscore,
            Counter::Kills => self.killcount,
            Counter::Deaths => self.deathcount,
        }
    }
}

/// One death as the plugin reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct KillRecord {
    pub attacker: String,
    pub target: String,
    pub timestamp: i64,
}

impl KillRecord {
    /// Attackers that should be credited with a kill.
    pub fn credits_attacker(&self) -> bool {
        let attacker = self.attacker.trim();
        !attacker.is_empty() && !attacker.eq_ignore_ascii_case(ANONYMOUS_ATTACKER)
    }

    pub fn credits_target(&self) -> bool {
        !self.target.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub user_id: String,
    pub experience: i64,
}
