//! Database module for the stats backend
//!
//! `PlayerStore` is the seam every upload handler writes through. `PgStore`
//! backs production deployments, `MemoryStore` backs tests and local runs.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::DatabaseError;

pub use memory::MemoryStore;
pub use models::{Counter, ExperienceEntry, KillRecord, PlayerData};
pub use operations::{DbPoolStatus, PgStore};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Adds each value onto the counter, treating a missing row or column as 0.
    async fn add_counter(&self, counter: Counter, entries: Vec<(String, i64)>) -> Result<u64, DatabaseError>;

    /// Keeps the larger of the stored and the uploaded value.
    async fn max_counter(&self, counter: Counter, entries: Vec<(String, i64)>) -> Result<u64, DatabaseError>;

    async fn set_usernames(&self, entries: Vec<(String, String)>) -> Result<u64, DatabaseError>;

    /// Logs the kills and bumps kill/death counters of the players involved.
    async fn record_kills(&self, kills: Vec<KillRecord>) -> Result<u64, DatabaseError>;

    /// Extends fake-rank permission to at least `until` (unix seconds).
    async fn grant_fakerank(&self, ids: Vec<String>, until: i64) -> Result<u64, DatabaseError>;

    /// `true` extends admin fake-rank to at least `until`, `false` revokes it.
    async fn set_fakerank_admin(&self, entries: Vec<(String, bool)>, until: i64) -> Result<u64, DatabaseError>;

    async fn experience(&self, id: &str) -> Result<i64, DatabaseError>;

    /// Experience of every requested id, 0 for unknown ids.
    async fn experience_many(&self, ids: Vec<String>) -> Result<HashMap<String, i64>, DatabaseError>;
}
