use linksim::{
    sim::SimulatedNetwork, DataRate, DataSize, LeakyBucketQueueFactory, Timestamp,
    TokenBucketNodeBuilder,
};

fn main() {
    tracing_subscriber::fmt().init();

    let mut network = SimulatedNetwork::new();

    // A 512 kbps link that absorbs a two-packet burst and queues the rest.
    let factory = LeakyBucketQueueFactory::new().with_max_packet_capacity(8);
    let (node, config) = TokenBucketNodeBuilder::new(&mut network)
        .burst(DataSize::bytes(3000))
        .rate(DataRate::kilobits_per_sec(512))
        .queue_factory(&factory)
        .build_with_config_handle();

    // Blast ten MTU-sized packets onto the link at t = 0.
    for _ in 0..10 {
        network.send_packet(node, DataSize::bytes(1500)).unwrap();
    }

    let deliveries = network.advance_to(Timestamp::micros(200_000)).unwrap();
    for record in &deliveries {
        match record.delivery.receive_time {
            Some(at) => println!("packet {} delivered at {at}", record.delivery.packet_id),
            None => println!("packet {} dropped", record.delivery.packet_id),
        }
    }

    // Double the link rate and push another burst through.
    config.update(|live| live.rate = DataRate::kilobits_per_sec(1024));
    for _ in 0..4 {
        network.send_packet(node, DataSize::bytes(1500)).unwrap();
    }
    for record in &network.advance_to(Timestamp::micros(400_000)).unwrap() {
        match record.delivery.receive_time {
            Some(at) => println!("packet {} delivered at {at}", record.delivery.packet_id),
            None => println!("packet {} dropped", record.delivery.packet_id),
        }
    }
}
