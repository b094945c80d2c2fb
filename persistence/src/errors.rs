//! `persistence::StoreError` (SPEC_FULL.md §B): the store-layer error kinds
//! the game manager maps into its own `ManagerError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// `saveSnapshot`'s optimistic-lock check failed (§4.D) — the caller's
    /// in-memory state is ahead of or divergent from the store and must
    /// not retry blindly.
    #[error("snapshot version conflict for game")]
    VersionConflict,
    #[error("no snapshot found for game")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}
