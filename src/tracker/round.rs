use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::db::models::ANONYMOUS_ATTACKER;
use crate::db::KillRecord;
use crate::tracker::events::{GameEvent, ItemKind, Player, PlayerPermissions};

/// Upload categories, one backend path each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Times,
    Rounds,
    Kills,
    Adrenaline,
    Escapes,
    Snake,
    PlayerPoints,
    Username,
    FakerankAllowed,
    FakerankAdmin,
}

impl Category {
    pub fn path(self) -> &'static str {
        match self {
            Category::Times => "upload/times",
            Category::Rounds => "upload/rounds",
            Category::Kills => "upload/kills",
            Category::Adrenaline => "upload/adrenaline",
            Category::Escapes => "upload/escapes",
            Category::Snake => "upload/snake",
            Category::PlayerPoints => "upload/playerpoints",
            Category::Username => "upload/username",
            Category::FakerankAllowed => "upload/fakerankallowed",
            Category::FakerankAdmin => "upload/fakerankadmin",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Everything one finished round produced, keyed by player id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSnapshot {
    pub times: HashMap<String, i64>,
    pub rounds: HashMap<String, i64>,
    pub kills: Vec<KillRecord>,
    pub adrenaline: HashMap<String, i64>,
    pub escapes: HashMap<String, i64>,
    pub snake: HashMap<String, i64>,
    pub player_points: HashMap<String, i64>,
    pub usernames: HashMap<String, String>,
    pub fakerank_allowed: HashMap<String, bool>,
    pub fakerank_admin: HashMap<String, bool>,
}

impl RoundSnapshot {
    /// Request bodies for every category that has something to say.
    pub fn uploads(&self) -> Vec<(Category, Value)> {
        let mut uploads = Vec::new();
        if !self.times.is_empty() {
            uploads.push((Category::Times, json!(self.times)));
        }
        if !self.rounds.is_empty() {
            uploads.push((Category::Rounds, json!(self.rounds)));
        }
        if !self.kills.is_empty() {
            uploads.push((Category::Kills, json!(self.kills)));
        }
        if !self.adrenaline.is_empty() {
            uploads.push((Category::Adrenaline, json!(self.adrenaline)));
        }
        if !self.escapes.is_empty() {
            uploads.push((Category::Escapes, json!(self.escapes)));
        }
        if !self.snake.is_empty() {
            uploads.push((Category::Snake, json!(self.snake)));
        }
        if !self.player_points.is_empty() {
            uploads.push((Category::PlayerPoints, json!(self.player_points)));
        }
        if !self.usernames.is_empty() {
            uploads.push((Category::Username, json!(self.usernames)));
        }
        if !self.fakerank_allowed.is_empty() {
            uploads.push((Category::FakerankAllowed, json!(self.fakerank_allowed)));
        }
        if !self.fakerank_admin.is_empty() {
            uploads.push((Category::FakerankAdmin, json!(self.fakerank_admin)));
        }
        uploads
    }

    pub fn is_empty(&self) -> bool {
        self.uploads().is_empty()
    }
}

#[derive(Debug, Clone)]
struct Session {
    since: DateTime<Utc>,
    nickname: String,
    permissions: PlayerPermissions,
}

#[derive(Debug, Default)]
struct RoundStats {
    playtime: HashMap<String, i64>,
    kills: Vec<KillRecord>,
    adrenaline: HashMap<String, i64>,
    escapes: HashMap<String, i64>,
    snake: HashMap<String, i64>,
    player_points: HashMap<String, i64>,
    /// Nicknames of players who left during the round.
    departed: HashMap<String, String>,
}

/// Per-round counters fed by host events.
///
/// Not thread-safe on its own; `StatsPlugin` wraps it in a mutex.
#[derive(Debug, Default)]
pub struct RoundTracker {
    sessions: HashMap<String, Session>,
    stats: RoundStats,
}

fn elapsed_secs(since: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at - since).num_seconds().max(0)
}

impl RoundTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Returns the finished round on `RoundEnded`.
    pub fn handle(&mut self, event: GameEvent, at: DateTime<Utc>) -> Option<RoundSnapshot> {
        match event {
            GameEvent::RoundStarted => {
                self.start_round(at);
                None
            }
            GameEvent::RoundEnded => Some(self.end_round(at)),
            GameEvent::PlayerJoined(player) => {
                self.joined(&player, at);
                None
            }
            GameEvent::PlayerLeft(player) => {
                self.left(&player, at);
                None
            }
            GameEvent::PlayerDied { attacker, target } => {
                self.died(attacker.as_ref(), &target, at);
                None
            }
            GameEvent::UsedItem { player, item } => {
                if player.is_tracked() && item == ItemKind::Adrenaline {
                    *self.stats.adrenaline.entry(player.user_id).or_insert(0) += 1;
                }
                None
            }
            GameEvent::PlayerEscaped(player) => {
                if player.is_tracked() {
                    *self.stats.escapes.entry(player.user_id).or_insert(0) += 1;
                }
                None
            }
            GameEvent::SnakeGameOver { player, score } => {
                if player.is_tracked() {
                    let best = self.stats.snake.entry(player.user_id).or_insert(score);
                    *best = (*best).max(score);
                }
                None
            }
            GameEvent::PointsAwarded { player, points } => {
                if player.is_tracked() {
                    *self.stats.player_points.entry(player.user_id).or_insert(0) += points;
                }
                None
            }
        }
    }

    pub fn connected_players(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn playtime(&self, user_id: &str) -> Option<i64> {
        self.stats.playtime.get(user_id).copied()
    }

    fn joined(&mut self, player: &Player, at: DateTime<Utc>) {
        if !player.is_tracked() {
            return;
        }

        self.sessions.insert(
            player.user_id.clone(),
            Session {
                since: at,
                nickname: player.nickname.clone(),
                permissions: player.permissions,
            },
        );
        self.stats.playtime.entry(player.user_id.clone()).or_insert(0);
    }

    fn left(&mut self, player: &Player, at: DateTime<Utc>) {
        let Some(session) = self.sessions.remove(&player.user_id) else {
            debug!("{} left without a recorded join", player.user_id);
            return;
        };

        *self.stats.playtime.entry(player.user_id.clone()).or_insert(0) +=
            elapsed_secs(session.since, at);
        self.stats.departed.insert(player.user_id.clone(), session.nickname);
    }

    fn died(&mut self, attacker: Option<&Player>, target: &Player, at: DateTime<Utc>) {
        if !target.is_tracked() {
            return;
        }

        // Self-inflicted, NPC and environmental deaths credit nobody.
        let attacker = attacker
            .filter(|a| a.is_tracked() && a.user_id != target.user_id)
            .map(|a| a.user_id.clone())
            .unwrap_or_else(|| ANONYMOUS_ATTACKER.to_string());

        self.stats.kills.push(KillRecord {
            attacker,
            target: target.user_id.clone(),
            timestamp: at.timestamp(),
        });
    }

    fn start_round(&mut self, at: DateTime<Utc>) {
        self.stats = RoundStats::default();
        for (user_id, session) in self.sessions.iter_mut() {
            session.since = at;
            self.stats.playtime.insert(user_id.clone(), 0);
        }
        info!("Round started with {} player(s)", self.sessions.len());
    }

    fn end_round(&mut self, at: DateTime<Utc>) -> RoundSnapshot {
        for (user_id, session) in self.sessions.iter_mut() {
            *self.stats.playtime.entry(user_id.clone()).or_insert(0) += elapsed_secs(session.since, at);
            session.since = at;
        }

        let stats = std::mem::take(&mut self.stats);
        let rounds = stats.playtime.keys().map(|id| (id.clone(), 1)).collect();

        let mut usernames = stats.departed;
        usernames.extend(
            self.sessions
                .iter()
                .map(|(id, s)| (id.clone(), s.nickname.clone())),
        );

        let fakerank_allowed = self
            .sessions
            .iter()
            .filter(|(_, s)| s.permissions.fakerank)
            .map(|(id, _)| (id.clone(), true))
            .collect();
        let fakerank_admin = self
            .sessions
            .iter()
            .map(|(id, s)| (id.clone(), s.permissions.fakerank_admin))
            .collect();

        info!(
            "Round ended: {} player(s), {} kill(s)",
            stats.playtime.len(),
            stats.kills.len()
        );

        RoundSnapshot {
            times: stats.playtime,
            rounds,
            kills: stats.kills,
            adrenaline: stats.adrenaline,
            escapes: stats.escapes,
            snake: stats.snake,
            player_points: stats.player_points,
            usernames,
            fakerank_allowed,
            fakerank_admin,
        }
    }
}
