// Collaborator stores - policies and analysis history

pub mod history_store;
pub mod policy_store;

pub use history_store::{HistoryStore, InMemoryHistoryStore};
pub use policy_store::{CachedPolicyStore, PolicyStore, YamlPolicyStore};
