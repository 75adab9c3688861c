use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::models::{Counter, KillRecord, PlayerData};
use crate::db::PlayerStore;
use crate::error::DatabaseError;

#[derive(Debug, Clone, Default)]
struct Tables {
    players: HashMap<String, PlayerData>,
    kills: Vec<KillRecord>,
}

/// A row as Postgres inserts it: every numeric column defaults to 0.
fn new_row(id: &str) -> PlayerData {
    PlayerData {
        id: id.to_string(),
        username: None,
        experience: Some(0),
        playtime: Some(0),
        roundsplayed: Some(0),
        usedadrenaline: Some(0),
        escapecount: Some(0),
        killcount: Some(0),
        deathcount: Some(0),
        snakehighscore: Some(0),
        fakerank_until: Some(0),
        fakerankadmin_until: Some(0),
    }
}

fn add_to(slot: &mut Option<i64>, value: i64, column: &str) -> Result<(), DatabaseError> {
    let total = slot
        .unwrap_or(0)
        .checked_add(value)
        .ok_or_else(|| DatabaseError::QueryError(format!("{} out of range", column)))?;
    *slot = Some(total);
    Ok(())
}

/// `INSERT ... ON CONFLICT DO UPDATE SET col = GREATEST(col, value)`: a new
/// row takes the value as is, an existing one keeps the larger.
fn raise_to(slot: &mut Option<i64>, value: i64, inserted: bool) {
    *slot = Some(if inserted {
        value
    } else {
        slot.unwrap_or(0).max(value)
    });
}

impl Tables {
    /// Returns the row for `id`, creating it if needed, and whether it was new.
    fn upsert(&mut self, id: &str) -> (&mut PlayerData, bool) {
        match self.players.entry(id.to_string()) {
            Entry::Occupied(row) => (row.into_mut(), false),
            Entry::Vacant(row) => (row.insert(new_row(id)), true),
        }
    }

    fn player(&mut self, id: &str) -> &mut PlayerData {
        self.upsert(id).0
    }
}

/// Process-local `PlayerStore` with the same upsert rules as `PgStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn player(&self, id: &str) -> Option<PlayerData> {
        self.tables.read().await.players.get(id).cloned()
    }

    pub async fn kills(&self) -> Vec<KillRecord> {
        self.tables.read().await.kills.clone()
    }

    pub async fn player_count(&self) -> usize {
        self.tables.read().await.players.len()
    }

    /// Runs `apply` against a copy and keeps it only on success, so a failed
    /// upload leaves nothing behind.
    async fn write<T>(
        &self,
        apply: impl FnOnce(&mut Tables) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let result = apply(&mut staged)?;
        *tables = staged;
        Ok(result)
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn add_counter(&self, counter: Counter, entries: Vec<(String, i64)>) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            for (id, value) in &entries {
                add_to(tables.player(id).counter_mut(counter), *value, counter.column())?;
            }
            Ok(entries.len() as u64)
        })
        .await
    }

    async fn max_counter(&self, counter: Counter, entries: Vec<(String, i64)>) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            for (id, value) in &entries {
                let (player, inserted) = tables.upsert(id);
                raise_to(player.counter_mut(counter), *value, inserted);
            }
            Ok(entries.len() as u64)
        })
        .await
    }

    async fn set_usernames(&self, entries: Vec<(String, String)>) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            let updated = entries.len() as u64;
            for (id, username) in entries {
                tables.player(&id).username = Some(username);
            }
            Ok(updated)
        })
        .await
    }

    async fn record_kills(&self, kills: Vec<KillRecord>) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            let recorded = kills.len() as u64;
            for kill in kills {
                if kill.credits_attacker() {
                    let slot = tables.player(&kill.attacker).counter_mut(Counter::Kills);
                    add_to(slot, 1, Counter::Kills.column())?;
                }
                if kill.credits_target() {
                    let slot = tables.player(&kill.target).counter_mut(Counter::Deaths);
                    add_to(slot, 1, Counter::Deaths.column())?;
                }
                tables.kills.push(kill);
            }
            Ok(recorded)
        })
        .await
    }

    async fn grant_fakerank(&self, ids: Vec<String>, until: i64) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            for id in &ids {
                let (player, inserted) = tables.upsert(id);
                raise_to(&mut player.fakerank_until, until, inserted);
            }
            Ok(ids.len() as u64)
        })
        .await
    }

    async fn set_fakerank_admin(&self, entries: Vec<(String, bool)>, until: i64) -> Result<u64, DatabaseError> {
        self.write(|tables| {
            for (id, granted) in &entries {
                let (player, inserted) = tables.upsert(id);
                if *granted {
                    raise_to(&mut player.fakerankadmin_until, until, inserted);
                } else {
                    player.fakerankadmin_until = Some(0);
                }
            }
            Ok(entries.len() as u64)
        })
        .await
    }

    async fn experience(&self, id: &str) -> Result<i64, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .players
            .get(id)
            .map(|p| p.counter(Counter::Experience))
            .unwrap_or(0))
    }

    async fn experience_many(&self, ids: Vec<String>) -> Result<HashMap<String, i64>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(ids
            .into_iter()
            .map(|id| {
                let experience = tables
                    .players
                    .get(&id)
                    .map(|p| p.counter(Counter::Experience))
                    .unwrap_or(0);
                (id, experience)
            })
            .collect())
    }
}
