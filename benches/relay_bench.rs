//! Benchmarks for UDP request handling through the relay.
//!
//! Measures the local answer path and the forwarding path against a mock
//! upstream with simulated latency. We simulate ~15ms average with ±5ms
//! jitter, in line with public resolvers.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::Rng;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

use fanout::dns::{Header, MAX_MESSAGE_SIZE, Message, Name, Question};
use fanout::proxy::{self, ProxyConfig};
use fanout::resolver::ResolverConfig;

const LOCAL_RELAY_ADDR: &str = "127.0.0.1:15355";
const FORWARD_RELAY_ADDR: &str = "127.0.0.1:15356";
const UPSTREAM_ADDR: &str = "127.0.0.1:15357";

/// Simulated upstream latency (based on real-world DNS benchmarks)
const BASE_LATENCY_MS: u64 = 15;
const JITTER_MS: u64 = 5;

fn build_dns_query(names: &[&str]) -> Vec<u8> {
    Message {
        header: Header {
            id: 0x1234,
            rd: true,
            qd_count: names.len() as u16,
            ..Header::default()
        },
        questions: names
            .iter()
            .map(|n| Question::new(n.parse::<Name>().unwrap()))
            .collect(),
        answers: Vec::new(),
    }
    .encode()
    .unwrap()
}

/// Simulate realistic upstream latency with jitter
async fn simulate_upstream_latency() {
    let jitter = rand::rng().random_range(0..=JITTER_MS * 2);
    let latency = BASE_LATENCY_MS - JITTER_MS + jitter;
    tokio::time::sleep(Duration::from_millis(latency)).await;
}

/// Mock UDP upstream: echoes the query with one pointer-named A record.
async fn mock_udp_upstream(socket: UdpSocket) {
    let socket = std::sync::Arc::new(socket);
    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    loop {
        if let Ok((len, src)) = socket.recv_from(&mut buf).await {
            let mut response = buf[..len].to_vec();
            response[2] |= 0x80;
            response[7] = 1;
            response.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
            response.extend_from_slice(&[0x00, 0x00, 0x01, 0x2c, 0x00, 0x04]);
            response.extend_from_slice(&[93, 184, 216, 34]);

            let socket = socket.clone();
            tokio::spawn(async move {
                simulate_upstream_latency().await;
                let _ = socket.send_to(&response, src).await;
            });
        }
    }
}

fn start_mock_upstream() {
    let upstream_addr: SocketAddr = UPSTREAM_ADDR.parse().unwrap();

    std::thread::spawn(move || {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let socket = UdpSocket::bind(upstream_addr).await.unwrap();
            mock_udp_upstream(socket).await;
        });
    });

    std::thread::sleep(Duration::from_millis(50));
}

fn start_relay(bind: &str, resolver: Option<&str>) {
    let config = ProxyConfig {
        bind_addr: bind.parse().unwrap(),
        resolver: ResolverConfig {
            resolver: resolver.map(str::to_string),
            ..ResolverConfig::default()
        },
    };

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let local = LocalSet::new();

        local.block_on(&rt, async {
            proxy::start(config).await.unwrap();

            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        });
    });

    std::thread::sleep(Duration::from_millis(50));
}

async fn round_trip(relay: SocketAddr, query: &[u8]) -> usize {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(query, relay).await.unwrap();

    let mut buf = [0u8; MAX_MESSAGE_SIZE];
    tokio::time::timeout(Duration::from_secs(5), client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap()
        .0
}

fn bench_local_answer(c: &mut Criterion) {
    start_relay(LOCAL_RELAY_ADDR, None);

    let rt = Runtime::new().unwrap();
    let relay: SocketAddr = LOCAL_RELAY_ADDR.parse().unwrap();
    let query = build_dns_query(&["codecrafters.io"]);

    let mut group = c.benchmark_group("local");
    group.throughput(Throughput::Elements(1));
    group.bench_function(BenchmarkId::new("request_handling", "latency"), |b| {
        b.to_async(&rt).iter(|| round_trip(relay, &query));
    });
    group.finish();
}

fn bench_forwarding(c: &mut Criterion) {
    start_mock_upstream();
    start_relay(FORWARD_RELAY_ADDR, Some(UPSTREAM_ADDR));

    let rt = Runtime::new().unwrap();
    let relay: SocketAddr = FORWARD_RELAY_ADDR.parse().unwrap();

    let mut group = c.benchmark_group("forward");
    group.throughput(Throughput::Elements(1));

    for questions in [1usize, 2, 4] {
        let names: Vec<String> = (0..questions).map(|i| format!("host{i}.example.com")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let query = build_dns_query(&names);

        group.bench_function(BenchmarkId::new("questions", questions), |b| {
            b.to_async(&rt).iter(|| round_trip(relay, &query));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_local_answer, bench_forwarding);
criterion_main!(benches);
