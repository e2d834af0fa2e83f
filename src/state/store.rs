//! State store trait definition.
//!
//! This module defines the interface the CLI uses to persist provider state
//! between runs.

use async_trait::async_trait;

use crate::error::Result;
use super::lock::LockInfo;
use super::types::ProviderState;

/// Trait for state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Loads the provider state.
    ///
    /// Returns `None` if no state exists yet.
    async fn load(&self) -> Result<Option<ProviderState>>;

    /// Saves the provider state.
    async fn save(&self, state: &ProviderState) -> Result<()>;

    /// Acquires the state lock for `holder` running `operation`; an empty
    /// holder gets a generated id.
    async fn acquire_lock(&self, holder: &str, operation: &str) -> Result<LockInfo>;

    /// Releases the lock if `lock_id` still owns it.
    async fn release_lock(&self, lock_id: &str) -> Result<()>;

    /// Gets current lock information, expired or not.
    async fn get_lock_info(&self) -> Result<Option<LockInfo>>;

    /// Loads the state, starting from an empty one when none exists.
    async fn load_or_default(&self) -> Result<ProviderState> {
        Ok(self.load().await?.unwrap_or_default())
    }

    /// Checks if the state is locked by a live lock.
    async fn is_locked(&self) -> Result<bool> {
        Ok(self
            .get_lock_info()
            .await?
            .is_some_and(|lock| !lock.is_expired()))
    }
}
