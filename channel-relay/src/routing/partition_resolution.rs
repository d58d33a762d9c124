//! Target partition derivation per event.

use crate::{Event, RoutingError};

/// Resolves the partition a record is published to.
///
/// A per-event header override (when a header name is configured and the event carries
/// it) wins over the statically configured partition; with neither, the broker client
/// chooses.
#[derive(Clone, Debug, Default)]
pub struct PartitionResolver {
    static_partition: Option<i32>,
    partition_header: Option<String>,
}

impl PartitionResolver {
    pub fn new(static_partition: Option<i32>, partition_header: Option<String>) -> Self {
        Self {
            static_partition,
            partition_header,
        }
    }

    pub fn resolve(&self, event: &Event) -> Result<Option<i32>, RoutingError> {
        let override_value = self
            .partition_header
            .as_deref()
            .and_then(|header| event.header(header).map(|value| (header, value)));

        match override_value {
            Some((header, value)) => value.parse::<i32>().map(Some).map_err(|source| {
                RoutingError::InvalidPartition {
                    header: header.to_string(),
                    value: value.to_string(),
                    source,
                }
            }),
            None => Ok(self.static_partition),
        }
    }
}
