pub mod executor_store;
pub mod job_token_store;
pub mod worker_store;

pub use executor_store::InMemoryExecutorStore;
pub use job_token_store::InMemoryJobTokenStore;
pub use worker_store::{InMemoryWorkerStore, RecordState};
