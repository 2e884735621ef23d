//! Retry policy for RPC calls against the endpoint pool.
//!
//! ```text
//! Request → [RetryEngine] → EndpointPool::current() → NodeRpc
//!                ▲                     │
//!                └── rotate on failure ┘
//! ```

pub mod retry;

pub use retry::{RetryConfig, RetryEngine};
