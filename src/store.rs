//! User accounts, per-user match statistics and the leaderboard.
//!
//! [`StatsDb`] keeps everything in one serde_json document. File-backed
//! databases rewrite the document after every mutation; in-memory ones (tests)
//! never touch disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::write_atomic;
use crate::error::StoreError;

pub type UserId = u32;

pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub modified: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub high_score: u32,
    pub high_score_date: Option<NaiveDate>,
    pub max_combo: u32,
    pub games_played: u32,
}

/// One match worth of changes for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsUpdate {
    pub won: bool,
    pub score: u32,
    pub max_combo: u32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub high_score: u32,
    pub date: Option<NaiveDate>,
}

/// Usernames need more than 3 characters, passwords more than 6, and both
/// must be ASCII letters and digits only.
pub fn validate_credentials(username: &str, password: &str) -> bool {
    username.chars().count() >= MIN_USERNAME_LEN
        && password.chars().count() >= MIN_PASSWORD_LEN
        && username.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().all(|c| c.is_ascii_alphanumeric())
}

pub trait StatsStore {
    fn find_user(&self, username: &str) -> Option<UserRecord>;

    /// Id of the user whose name and password both match.
    fn authenticate(&self, username: &str, password: &str) -> Option<UserId> {
        self.find_user(username)
            .filter(|u| u.password == password)
            .map(|u| u.id)
    }

    fn create_user(&mut self, username: &str, password: &str) -> Result<UserId, StoreError>;

    fn get_stats(&self, user: UserId) -> Result<StatsRecord, StoreError>;

    fn update_stats(&mut self, user: UserId, update: &StatsUpdate) -> Result<(), StoreError>;

    /// Every user, best high score first.
    fn get_leaderboard(&self) -> Vec<LeaderboardEntry>;

    fn update_password(&mut self, username: &str, password: &str) -> Result<(), StoreError>;
}

// ── StatsDb ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    next_id: UserId,
    users: Vec<UserRecord>,
    stats: BTreeMap<UserId, StatsRecord>,
}

#[derive(Debug, Default)]
pub struct StatsDb {
    doc: Document,
    path: Option<PathBuf>,
}

impl StatsDb {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the document at `path`, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), users = doc.users.len(), "stats store opened");
        Ok(Self { doc, path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            write_atomic(path, &serde_json::to_vec_pretty(&self.doc)?)?;
            debug!(path = %path.display(), "stats store written");
        }
        Ok(())
    }

    fn user_mut(&mut self, username: &str) -> Option<&mut UserRecord> {
        self.doc.users.iter_mut().find(|u| u.username == username)
    }
}

impl StatsStore for StatsDb {
    fn find_user(&self, username: &str) -> Option<UserRecord> {
        self.doc.users.iter().find(|u| u.username == username).cloned()
    }

    fn create_user(&mut self, username: &str, password: &str) -> Result<UserId, StoreError> {
        if self.find_user(username).is_some() {
            return Err(StoreError::UserExists(username.to_string()));
        }
        if !validate_credentials(username, password) {
            return Err(StoreError::InvalidCredentials);
        }

        self.doc.next_id += 1;
        let id = self.doc.next_id;
        self.doc.users.push(UserRecord {
            id,
            username: username.to_string(),
            password: password.to_string(),
            modified: Local::now().date_naive(),
        });
        self.doc.stats.insert(id, StatsRecord { username: username.to_string(), ..Default::default() });
        self.flush()?;
        info!(user = id, "registered user");
        Ok(id)
    }

    fn get_stats(&self, user: UserId) -> Result<StatsRecord, StoreError> {
        self.doc.stats.get(&user).cloned().ok_or(StoreError::UnknownUser(user))
    }

    fn update_stats(&mut self, user: UserId, update: &StatsUpdate) -> Result<(), StoreError> {
        let stats = self.doc.stats.get_mut(&user).ok_or(StoreError::UnknownUser(user))?;
        if update.won {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        if update.score > stats.high_score {
            stats.high_score = update.score;
            stats.high_score_date = Some(update.date);
        }
        stats.max_combo = stats.max_combo.max(update.max_combo);
        stats.games_played += 1;
        self.flush()?;
        info!(user, won = update.won, score = update.score, "saved match stats");
        Ok(())
    }

    fn get_leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut board: Vec<LeaderboardEntry> = self
            .doc
            .stats
            .values()
            .map(|s| LeaderboardEntry {
                username: s.username.clone(),
                high_score: s.high_score,
                date: s.high_score_date,
            })
            .collect();
        board.sort_by(|a, b| b.high_score.cmp(&a.high_score));
        board
    }

    fn update_password(&mut self, username: &str, password: &str) -> Result<(), StoreError> {
        if !validate_credentials(username, password) {
            return Err(StoreError::InvalidCredentials);
        }
        let user = self
            .user_mut(username)
            .ok_or_else(|| StoreError::UnknownUsername(username.to_string()))?;
        user.password = password.to_string();
        user.modified = Local::now().date_naive();
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_boundaries() {
        assert!(!validate_credentials("abc", "password1"));
        assert!(validate_credentials("abcd", "passwo1"));
        assert!(!validate_credentials("abcd", "passw1"));
        assert!(!validate_credentials("ab_cd", "password1"));
        assert!(!validate_credentials("abcd", "pass word"));
    }
}
