//! Integration test infrastructure for Armory.
//!
//! Everything runs in-process: an in-memory [`StaticSource`] stands in for the
//! upstream catalog and a [`ManualClock`] drives cache expiry.
//!
//! # Usage
//!
//! ```ignore
//! use armory_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestContext::new();
//!     let (addr, _handle) = ctx.start_server().await.unwrap();
//!     // Use ctx.service, ctx.source, ApiTestClient::new(addr), etc.
//! }
//! ```

pub mod context;
pub mod fixtures;
pub mod helpers;
pub mod sources;

pub use context::TestContext;
pub use fixtures::*;
pub use helpers::*;
pub use sources::{ManualClock, StaticSource};

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,armory_tests=debug")),
        )
        .with_test_writer()
        .try_init();
}
