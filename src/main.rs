use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fanout::proxy::{self, ProxyConfig};
use fanout::resolver::ResolverConfig;

#[derive(Parser)]
#[command(name = "fanout")]
#[command(about = "DNS relay that splits multi-question queries upstream", long_about = None)]
struct Args {
    /// Local port to listen on
    #[arg(short, long, default_value = "2053")]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Upstream DNS resolver (host:port); answers locally when absent
    #[arg(short, long)]
    resolver: Option<String>,

    /// Timeout for each upstream exchange, in milliseconds
    #[arg(long, default_value = "2000")]
    timeout_ms: u64,

    /// Address returned when answering locally
    #[arg(long, default_value = "8.8.8.8")]
    answer: Ipv4Addr,

    /// TTL of locally built answers, in seconds
    #[arg(long, default_value = "60")]
    ttl: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log every query (domain, outcome, timing)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = ProxyConfig {
        bind_addr: SocketAddr::new(args.bind, args.port),
        resolver: ResolverConfig {
            resolver: args.resolver,
            timeout: Duration::from_millis(args.timeout_ms),
            answer: args.answer,
            ttl: args.ttl,
            verbose: args.verbose,
        },
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&rt, proxy::run(config))
}
