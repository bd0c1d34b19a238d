//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The controller
//! depends only on these traits, not on concrete implementations.

mod storage;
mod task_api;

pub use storage::KeyValueStore;
pub use task_api::TaskApi;

/// Explicit user confirmation before a destructive action
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}

/// Fixed answer, for `--force` flags and tests
pub struct AlwaysConfirm(pub bool);

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> anyhow::Result<bool> {
        Ok(self.0)
    }
}
