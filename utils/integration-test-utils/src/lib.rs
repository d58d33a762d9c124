/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod recording_broker;
pub use recording_broker::{DeliveryBehavior, RecordingBroker};

mod tracked_channel;
pub use tracked_channel::{ChannelFault, TrackedChannel, TransactionStats};

mod integration_test_events;
pub use integration_test_events::{body_line, header_routed_event, keyed_event, topic_event};

mod integration_test_logging;
pub use integration_test_logging::init_logging;
