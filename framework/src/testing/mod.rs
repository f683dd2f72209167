//! Testing utilities for servicekit
//!
//! - `TestContainer` builds ready containers without running providers
//! - `TestContainer::fake` overrides the `App` facade for the current thread

pub use crate::container::testing::{TestContainer, TestContainerGuard};
