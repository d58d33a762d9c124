use channel_relay::{
    BatchRelay, Event, PolicyStore, RelaySettings, RoutingPolicy, Serializer, SerializerMode,
    TopicResolver,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use integration_test_utils::{keyed_event, topic_event, RecordingBroker, TrackedChannel};
use std::sync::Arc;
use tokio::runtime::Builder;

const BATCH_SIZE: i64 = 100;

fn sample_event() -> Event {
    keyed_event("orders", "customer-42", 7)
        .with_header("timestamp", "1512716506169")
        .with_header("host", "relay-bench-01")
}

fn relay_criterion(c: &mut Criterion) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime should build");

    let event = sample_event();

    let mut serializer_group = c.benchmark_group("serializer");
    serializer_group.bench_function("raw", |b| {
        let mut serializer = Serializer::new(SerializerMode::Raw);
        b.iter(|| black_box(serializer.serialize(black_box(&event)).unwrap()));
    });
    serializer_group.bench_function("envelope", |b| {
        let mut serializer = Serializer::new(SerializerMode::Envelope);
        b.iter(|| black_box(serializer.serialize(black_box(&event)).unwrap()));
    });
    serializer_group.finish();

    let resolver = TopicResolver::default();
    let mut routing_group = c.benchmark_group("topic_resolution");
    routing_group.bench_function("body_pattern", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&event))));
    });
    routing_group.finish();

    let settings = RelaySettings::builder()
        .bootstrap_servers("bench-broker:9092")
        .build()
        .expect("benchmark settings should build");
    let policy = RoutingPolicy::new(true, ["orders"], BATCH_SIZE).expect("benchmark policy");

    let mut batch_group = c.benchmark_group("batch_relay");
    batch_group.bench_function("full_batch_acked", |b| {
        b.iter_batched(
            || {
                let channel = TrackedChannel::new(BATCH_SIZE as usize);
                runtime.block_on(
                    channel.put_all((0..BATCH_SIZE as u64).map(|seq| topic_event("orders", seq))),
                );
                BatchRelay::new(
                    settings.clone(),
                    Arc::new(channel),
                    Arc::new(RecordingBroker::new()),
                    PolicyStore::new(policy.clone()),
                )
            },
            |mut relay| black_box(runtime.block_on(relay.process()).unwrap()),
            BatchSize::SmallInput,
        );
    });
    batch_group.finish();
}

criterion_group!(benches, relay_criterion);
criterion_main!(benches);
