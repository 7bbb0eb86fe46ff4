#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # retry-call
//!
//! Run a fallible call, classify its failure, and maybe run it again.
//!
//! This crate is the control-flow primitive only: no backoff, jitter, timeouts, or metrics. The
//! caller supplies the policy as plain closures:
//!
//! - **operation**: the fallible work, `FnMut() -> Result<T, E>`
//! - **is_retryable**: optional predicate over the failure (unset means "retry everything")
//! - **on_retry**: optional hook run before each retry (a natural place to sleep)
//! - **max_retry**: how many additional attempts may follow the first one
//!
//! The failure returned is always the last attempt's own error; nothing is wrapped.
//!
//! ## Quick Start
//!
//! ```rust
//! use retry_call::Call;
//! use std::time::Duration;
//!
//! fn fetch() -> Result<&'static str, std::io::Error> {
//!     Ok("payload")
//! }
//!
//! let result = Call::new(fetch)
//!     .max_retry(2)
//!     .is_retryable(|e| e.kind() == std::io::ErrorKind::TimedOut)
//!     .on_retry(|| std::thread::sleep(Duration::from_millis(10)))
//!     .run();
//! assert_eq!(result.unwrap(), "payload");
//! ```
//!
//! For async services, [`RetryLayer`] applies the same rules as a `tower` layer.

pub mod call;
pub mod layer;
pub mod prelude;

// Re-exports
pub use call::{Call, CallExt};
pub use layer::{RetryLayer, RetryService};
