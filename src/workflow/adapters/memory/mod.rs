//! In-memory adapters for tests and single-process deployments.

mod directory;
mod notifier;
mod task;

pub use directory::InMemoryUserDirectory;
pub use notifier::InMemoryNotifier;
pub use task::InMemoryTaskRepository;
