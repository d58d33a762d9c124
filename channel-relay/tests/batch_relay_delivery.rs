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

mod support;

use channel_relay::{
    decode_envelope, BatchOutcome, BrokerError, ChannelError, DeliveryCause, RelayError,
    RelaySettings, RelayState, RoutingPolicy,
};
use integration_test_utils::{
    header_routed_event, keyed_event, topic_event, ChannelFault, DeliveryBehavior,
    RecordingBroker, TrackedChannel,
};
use std::sync::Arc;
use std::time::Duration;

fn fixture(
    broker: RecordingBroker,
    policy: RoutingPolicy,
) -> (channel_relay::BatchRelay, TrackedChannel, Arc<RecordingBroker>) {
    integration_test_utils::init_logging();

    let channel = TrackedChannel::new(64);
    let broker = Arc::new(broker);
    let (relay, _store) = support::make_relay(
        support::settings(),
        Arc::new(channel.clone()),
        broker.clone(),
        policy,
    );
    (relay, channel, broker)
}

#[tokio::test]
async fn orders_scenario_relays_two_then_skips_one() {
    let (mut relay, channel, broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 2));
    channel
        .put_all([
            topic_event("orders", 1),
            topic_event("orders", 2),
            topic_event("other", 3),
        ])
        .await;

    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    assert_eq!(broker.topics(), vec!["orders", "orders"]);
    assert_eq!(channel.stats().committed, 1);

    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    assert_eq!(broker.records().len(), 2);
    assert_eq!(channel.stats().committed, 2);
    assert_eq!(channel.len().await, 0);

    let counters = relay.counters().snapshot();
    assert_eq!(counters.event_drain_success, 2);
    assert_eq!(counters.events_skipped, 1);
    assert_eq!(counters.rollback, 0);
}

#[tokio::test]
async fn empty_channel_returns_backoff_without_side_effects() {
    let (mut relay, channel, broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 10));

    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Backoff);

    let stats = channel.stats();
    assert_eq!(stats.begun, 1);
    assert_eq!(stats.taken, 0);
    assert_eq!(stats.rolled_back, 0);
    assert_eq!(stats.ended, 1);
    assert!(broker.records().is_empty());
}

#[tokio::test]
async fn disabled_policy_never_touches_channel_or_broker() {
    let (mut relay, channel, broker) = fixture(RecordingBroker::new(), RoutingPolicy::disabled());
    channel.put_all([topic_event("orders", 1)]).await;

    for _ in 0..3 {
        assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    }

    assert_eq!(channel.stats().begun, 0);
    assert_eq!(broker.flush_count(), 0);
    assert_eq!(channel.len().await, 1);
}

#[tokio::test]
async fn nacked_delivery_rolls_back_every_event() {
    let broker = RecordingBroker::new().on_topic(
        "payments",
        DeliveryBehavior::Nack("not enough replicas".to_string()),
    );
    let (mut relay, channel, _broker) = fixture(broker, support::policy(&["orders", "payments"], 10));
    channel
        .put_all([
            topic_event("orders", 1),
            topic_event("payments", 2),
            topic_event("orders", 3),
        ])
        .await;

    let err = relay.process().await.unwrap_err();

    assert!(matches!(
        err,
        RelayError::Delivery {
            events: 3,
            cause: DeliveryCause::Broker(BrokerError::NotAcknowledged { .. }),
            ..
        }
    ));
    let stats = channel.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.ended), (0, 1, 1));
    assert_eq!(channel.len().await, 3);
    assert_eq!(relay.counters().snapshot().rollback, 1);
    assert_eq!(relay.state(), RelayState::Idle);
}

#[tokio::test]
async fn rejected_submission_aborts_batch() {
    let broker = RecordingBroker::new().on_topic(
        "orders",
        DeliveryBehavior::Reject("record too large".to_string()),
    );
    let (mut relay, channel, _broker) = fixture(broker, support::policy(&["orders"], 10));
    channel.put_all([topic_event("orders", 1)]).await;

    let err = relay.process().await.unwrap_err();

    assert!(matches!(
        err,
        RelayError::Delivery {
            cause: DeliveryCause::Broker(BrokerError::Rejected { .. }),
            ..
        }
    ));
    assert_eq!(channel.stats().rolled_back, 1);
    assert_eq!(channel.len().await, 1);
}

#[tokio::test]
async fn flush_failure_aborts_batch() {
    let (mut relay, channel, _broker) = fixture(
        RecordingBroker::new().failing_flush(),
        support::policy(&["orders"], 10),
    );
    channel.put_all([topic_event("orders", 1)]).await;

    let err = relay.process().await.unwrap_err();

    assert!(matches!(
        err,
        RelayError::Delivery {
            cause: DeliveryCause::Broker(BrokerError::Flush(_)),
            ..
        }
    ));
    assert_eq!(channel.len().await, 1);
}

#[tokio::test]
async fn take_failure_rolls_back_already_pulled_events() {
    let (mut relay, channel, broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 10));
    channel
        .put_all([topic_event("orders", 1), topic_event("orders", 2)])
        .await;
    channel.set_fault(Some(ChannelFault::TakeAfter(1)));

    let err = relay.process().await.unwrap_err();

    assert!(matches!(
        err,
        RelayError::Delivery {
            events: 1,
            cause: DeliveryCause::Channel(ChannelError::Other(_)),
            ..
        }
    ));
    assert_eq!(broker.records().len(), 1);
    assert_eq!(channel.stats().rolled_back, 1);
    assert_eq!(channel.len().await, 2);

    channel.set_fault(None);
    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    assert_eq!(channel.len().await, 0);
}

#[tokio::test]
async fn commit_failure_rolls_back() {
    let (mut relay, channel, _broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 10));
    channel.put_all([topic_event("orders", 1)]).await;
    channel.set_fault(Some(ChannelFault::Commit));

    let err = relay.process().await.unwrap_err();

    assert!(!err.is_fatal());
    assert_eq!(channel.stats().rolled_back, 1);
    assert_eq!(channel.len().await, 1);
}

#[tokio::test]
async fn begin_failure_is_a_delivery_failure_without_rollback() {
    let (mut relay, channel, _broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 10));
    channel.put_all([topic_event("orders", 1)]).await;
    channel.set_fault(Some(ChannelFault::Begin));

    let err = relay.process().await.unwrap_err();

    assert!(matches!(err, RelayError::Delivery { events: 0, .. }));
    assert_eq!(channel.stats().ended, 0);
    assert_eq!(relay.counters().snapshot().rollback, 0);
}

#[tokio::test]
async fn rollback_failure_is_fatal() {
    let broker = RecordingBroker::with_default(DeliveryBehavior::Nack("timeout".to_string()));
    let (mut relay, channel, _broker) = fixture(broker, support::policy(&["orders"], 10));
    channel.put_all([topic_event("orders", 1)]).await;
    channel.set_fault(Some(ChannelFault::Rollback));

    let err = relay.process().await.unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, RelayError::RollbackFailed(_)));
    assert_eq!(channel.stats().ended, 1);
}

#[tokio::test(start_paused = true)]
async fn sends_of_one_batch_are_in_flight_together() {
    let broker = RecordingBroker::with_default(DeliveryBehavior::Delayed(Duration::from_millis(100)));
    let (mut relay, channel, broker) = fixture(broker, support::policy(&["orders"], 10));
    channel
        .put_all((0..5).map(|sequence| topic_event("orders", sequence)))
        .await;

    let started = tokio::time::Instant::now();
    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);

    assert_eq!(broker.max_in_flight(), 5);
    assert_eq!(started.elapsed(), Duration::from_millis(100));
}

#[tokio::test]
async fn envelope_mode_carries_headers_to_the_broker() {
    integration_test_utils::init_logging();
    let settings = RelaySettings::builder()
        .bootstrap_servers(support::BOOTSTRAP_SERVERS)
        .envelope(true)
        .partition_header("partition")
        .static_partition(3)
        .build()
        .unwrap();
    let channel = TrackedChannel::new(8);
    let broker = Arc::new(RecordingBroker::new());
    let (mut relay, _store) = support::make_relay(
        settings,
        Arc::new(channel.clone()),
        broker.clone(),
        support::policy(&["orders", "audit"], 10),
    );
    let keyed = keyed_event("orders", "customer-9", 1).with_header("partition", "7");
    let routed = header_routed_event("audit", "{\"action\":\"login\"}");
    channel.put_all([keyed.clone(), routed.clone()]).await;

    relay.process().await.unwrap();

    let records = broker.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].topic, "orders");
    assert_eq!(records[0].partition, Some(7));
    assert_eq!(records[0].key.as_deref(), Some("customer-9"));
    assert_eq!(decode_envelope(&records[0].payload).unwrap(), keyed);
    assert_eq!(records[1].topic, "audit");
    assert_eq!(records[1].partition, Some(3));
    assert_eq!(decode_envelope(&records[1].payload).unwrap(), routed);
}

#[tokio::test]
async fn close_releases_broker() {
    let (mut relay, _channel, broker) = fixture(RecordingBroker::new(), support::policy(&["orders"], 10));

    relay.close().await.unwrap();

    assert!(broker.is_closed());
}

#[tokio::test(start_paused = true)]
async fn policy_published_mid_batch_applies_from_next_invocation() {
    integration_test_utils::init_logging();

    let channel = TrackedChannel::new(64);
    let broker = Arc::new(RecordingBroker::with_default(DeliveryBehavior::Delayed(
        Duration::from_secs(1),
    )));
    let (mut relay, store) = support::make_relay(
        support::settings(),
        Arc::new(channel.clone()),
        broker.clone(),
        support::policy(&["orders"], 2),
    );
    channel
        .put_all([
            topic_event("orders", 1),
            topic_event("orders", 2),
            topic_event("orders", 3),
        ])
        .await;

    let publish_while_awaiting_acks = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(broker.records().len(), 2);
        assert_eq!(channel.stats().committed, 0);
        store.publish(support::policy(&["payments"], 10));
    };
    let (outcome, ()) = tokio::join!(relay.process(), publish_while_awaiting_acks);

    assert_eq!(outcome.unwrap(), BatchOutcome::Ready);
    assert_eq!(broker.topics(), vec!["orders", "orders"]);
    assert_eq!(channel.stats().committed, 1);
    assert_eq!(relay.counters().snapshot().events_skipped, 0);
    assert_eq!(store.version(), 1);

    // The remaining order is outside the new allow-list.
    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    assert_eq!(broker.records().len(), 2);
    assert_eq!(channel.stats().committed, 2);
    let counters = relay.counters().snapshot();
    assert_eq!(counters.events_skipped, 1);
    assert_eq!(counters.batch_underflow, 1);
}

#[tokio::test(start_paused = true)]
async fn disabling_mid_batch_still_commits_the_open_batch() {
    let channel = TrackedChannel::new(64);
    let broker = Arc::new(RecordingBroker::with_default(DeliveryBehavior::Delayed(
        Duration::from_secs(1),
    )));
    let (mut relay, store) = support::make_relay(
        support::settings(),
        Arc::new(channel.clone()),
        broker.clone(),
        support::policy(&["orders"], 10),
    );
    channel
        .put_all([topic_event("orders", 1), topic_event("orders", 2)])
        .await;

    let disable_while_awaiting_acks = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        store.publish(RoutingPolicy::disabled());
    };
    let (outcome, ()) = tokio::join!(relay.process(), disable_while_awaiting_acks);

    assert_eq!(outcome.unwrap(), BatchOutcome::Ready);
    assert_eq!(broker.records().len(), 2);
    assert_eq!(channel.stats().committed, 1);

    assert_eq!(relay.process().await.unwrap(), BatchOutcome::Ready);
    assert_eq!(channel.stats().begun, 1);
}
