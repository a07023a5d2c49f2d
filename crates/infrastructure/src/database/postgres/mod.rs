pub mod postgres_executor_store;
pub mod postgres_job_token_store;

pub use postgres_executor_store::*;
pub use postgres_job_token_store::*;
