//! # Executor Queue Testing Utils
//!
//! Shared testing utilities for the executor queue workspace: recording
//! mocks of every collaborator trait and builders for test data.
//!
//! ## Usage
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! executor-queue-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! Then use the mocks in your tests:
//!
//! ```rust
//! use executor_queue_testing_utils::mocks::*;
//!
//! let store = MockJobTokenStore::new();
//! store.create.push_return(Ok("sometoken".to_string()));
//! ```

pub mod builders;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use mocks::*;
