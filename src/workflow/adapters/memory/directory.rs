//! In-memory user directory.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{TeamId, UserId},
    ports::{DirectoryError, DirectoryResult, UserDirectory},
};

/// Team membership table held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    teams: Arc<RwLock<HashMap<TeamId, HashSet<UserId>>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user` to `team`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn add_member(&self, team: TeamId, user: UserId) -> DirectoryResult<()> {
        let mut teams = self.teams.write().map_err(poisoned)?;
        teams.entry(team).or_default().insert(user);
        Ok(())
    }

    /// Removes `user` from `team`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the lock is poisoned.
    pub fn remove_member(&self, team: TeamId, user: UserId) -> DirectoryResult<()> {
        let mut teams = self.teams.write().map_err(poisoned)?;
        if let Some(members) = teams.get_mut(&team) {
            members.remove(&user);
        }
        Ok(())
    }
}

fn poisoned(err: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::unavailable(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn is_member(&self, team: TeamId, user: UserId) -> DirectoryResult<bool> {
        let teams = self.teams.read().map_err(poisoned)?;
        Ok(teams
            .get(&team)
            .is_some_and(|members| members.contains(&user)))
    }
}
