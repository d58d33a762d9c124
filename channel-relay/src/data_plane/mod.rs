//! Data-plane layer.
//!
//! Owns the per-invocation batch protocol: pulling events out of a channel
//! transaction, resolving their destination, encoding payloads, publishing them and
//! committing or rolling back the whole batch.
//!
//! ```
//! use channel_relay::{Channel, Event, MemoryChannel};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let channel = MemoryChannel::new(4);
//! channel.put(Event::new(b"first".to_vec())).await.unwrap();
//!
//! // Events taken by a transaction that is never committed go back to the channel.
//! let mut transaction = channel.begin_transaction().await.unwrap();
//! assert!(transaction.take().await.unwrap().is_some());
//! transaction.end();
//!
//! assert_eq!(channel.len().await, 1);
//! # });
//! ```

pub(crate) mod batch_relay;
pub(crate) mod memory_channel;
pub(crate) mod serializer;
