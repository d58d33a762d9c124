//! Routing layer.
//!
//! Derives where each event goes: the destination topic (header or body pattern) and
//! the optional target partition (header override or static configuration). The
//! allow-list check against the current policy happens in the batch relay, which owns
//! the policy snapshot for the invocation.
//!
//! ```
//! use channel_relay::{Event, PartitionResolver, TopicResolver};
//!
//! let event = Event::new("1.3|1000|orders|1512716506169|".as_bytes().to_vec())
//!     .with_header("partition", "7");
//!
//! assert_eq!(TopicResolver::default().resolve(&event).as_deref(), Some("orders"));
//!
//! let partitions = PartitionResolver::new(Some(3), Some("partition".to_string()));
//! assert_eq!(partitions.resolve(&event).unwrap(), Some(7));
//! ```

pub(crate) mod partition_resolution;
pub(crate) mod topic_resolution;
