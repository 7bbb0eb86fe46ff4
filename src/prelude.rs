//! Convenient re-exports for common retry-call types.
pub use crate::{
    call::{Call, CallExt},
    layer::{RetryLayer, RetryService},
};
