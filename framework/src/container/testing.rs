//! Test helpers for the service container
//!
//! [`TestContainer`] builds containers without running providers and swaps the
//! [`App`](super::App) facade's container for the current thread.
//!
//! # Example
//!
//! ```rust,ignore
//! use servicekit::testing::TestContainer;
//!
//! #[test]
//! fn resolves_fake_log() {
//!     let mut services = Services::new();
//!     services.register::<FakeLog>();
//!
//!     let _guard = TestContainer::fake(TestContainer::build(Config::new(), services));
//!     assert!(App::make::<dyn Log>().is_ok());
//! }
//! ```

use super::{Container, Services, TEST_CONTAINER};
use crate::config::{Config, Environment, EnvironmentName};
use std::sync::Arc;

/// Test container helpers
pub struct TestContainer;

impl TestContainer {
    /// A ready container in the testing environment
    pub fn build(config: Config, services: Services) -> Arc<Container> {
        Arc::new(Container::new(
            config,
            Environment::new(EnvironmentName::Testing),
            services,
        ))
    }

    /// Make `container` the [`App`](super::App) container on this thread
    ///
    /// The previous override comes back when the guard is dropped.
    pub fn fake(container: Arc<Container>) -> TestContainerGuard {
        let previous = TEST_CONTAINER.with(|c| c.borrow_mut().replace(container));
        TestContainerGuard { previous }
    }
}

/// Restores the previous thread-local container when dropped
pub struct TestContainerGuard {
    previous: Option<Arc<Container>>,
}

impl Drop for TestContainerGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        TEST_CONTAINER.with(|c| {
            *c.borrow_mut() = previous;
        });
    }
}
