//! Runtime integration layer.
//!
//! Drives relay invocations on a polling schedule so that backoff, cancellation and
//! shutdown deadlines stay out of the batch protocol itself.
//!
//! ```
//! use std::time::Duration;
//! use channel_relay::RunnerConfig;
//!
//! let config = RunnerConfig::default();
//! assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
//! assert_eq!(config.backoff_delay(9), Duration::from_secs(5));
//! ```

pub(crate) mod relay_runner;
