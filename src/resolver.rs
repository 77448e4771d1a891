//! DNS query resolution logic.
//!
//! Turns one raw inbound datagram into the raw reply:
//! 1. Decode the request (normalizing the header for the response)
//! 2. Forward it upstream when a resolver is configured, otherwise answer
//!    every question with the configured address
//! 3. Encode the response
//!
//! Forwarding failures become a SERVFAIL reply rather than silence, and a
//! body that fails to decode becomes FORMERR. Datagrams without a readable
//! header get no reply at all.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::dns::Message;
use crate::dns::header::{HEADER_LEN, Header, RCODE_FORMAT_ERROR, RCODE_SERVER_FAILURE};
use crate::forwarder::Forwarder;
use crate::transport::UpstreamTransport;
use crate::transport::udp::UdpUpstream;

/// Settings for the resolution path.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upstream resolver as `host:port`. `None` or empty answers locally.
    pub resolver: Option<String>,
    /// Upper bound on each upstream exchange.
    pub timeout: Duration,
    /// Address returned for every question on the local path.
    pub answer: Ipv4Addr,
    /// TTL of locally built answers.
    pub ttl: u32,
    /// Log every query at info level instead of debug.
    pub verbose: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            resolver: None,
            timeout: Duration::from_secs(2),
            answer: Ipv4Addr::new(8, 8, 8, 8),
            ttl: 60,
            verbose: false,
        }
    }
}

/// Outcome of one request, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Local,
    Forwarded,
    ServerFailure,
    FormatError,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Local => "LOCAL",
            Outcome::Forwarded => "FORWARDED",
            Outcome::ServerFailure => "SERVFAIL",
            Outcome::FormatError => "FORMERR",
        }
    }
}

/// Resolver handles DNS query processing decisions.
pub struct Resolver<T> {
    forwarder: Option<Forwarder<T>>,
    answer: Ipv4Addr,
    ttl: u32,
    verbose: bool,
}

impl Resolver<UdpUpstream> {
    /// Build a resolver that forwards over UDP when `config.resolver` is set.
    pub fn from_config(config: &ResolverConfig) -> Self {
        let forwarder = config
            .resolver
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .map(|addr| Forwarder::new(UdpUpstream::new(addr), config.timeout));

        Self::new(forwarder, config)
    }
}

impl<T: UpstreamTransport> Resolver<T> {
    pub fn new(forwarder: Option<Forwarder<T>>, config: &ResolverConfig) -> Self {
        Self {
            forwarder,
            answer: config.answer,
            ttl: config.ttl,
            verbose: config.verbose,
        }
    }

    pub fn is_forwarding(&self) -> bool {
        self.forwarder.is_some()
    }

    /// Process one inbound datagram and return the bytes to send back.
    pub async fn handle(&self, datagram: &[u8]) -> Option<Vec<u8>> {
        let start = Instant::now();

        let header = match datagram.get(..HEADER_LEN).map(Header::parse) {
            Some(Ok(header)) => header,
            _ => {
                debug!(len = datagram.len(), "dropping datagram without a header");
                return None;
            }
        };

        let request = match Message::decode(datagram) {
            Ok(request) => request,
            Err(e) => {
                warn!(id = header.id, "malformed query: {}", e);
                let reply = Message::error_reply(&header, RCODE_FORMAT_ERROR);
                self.log(header.id, "<malformed>", Outcome::FormatError, start);
                return self.encode(reply);
            }
        };

        let domain = request
            .questions
            .iter()
            .map(|q| q.name.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let (response, outcome) = match &self.forwarder {
            None => {
                let mut response = request;
                response.answer_locally(self.ttl, self.answer.octets());
                (response, Outcome::Local)
            }
            Some(forwarder) => match forwarder.forward(&request).await {
                Ok(response) => (response, Outcome::Forwarded),
                Err(e) => {
                    warn!(id = header.id, domain = %domain, "forwarding failed: {}", e);
                    let reply = Message::error_reply(&request.header, RCODE_SERVER_FAILURE)
                        .with_questions(request.questions);
                    (reply, Outcome::ServerFailure)
                }
            },
        };

        self.log(header.id, &domain, outcome, start);
        self.encode(response)
    }

    fn encode(&self, response: Message) -> Option<Vec<u8>> {
        match response.encode() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(id = response.header.id, "failed to encode response: {}", e);
                Message::error_reply(&response.header, RCODE_SERVER_FAILURE)
                    .encode()
                    .ok()
            }
        }
    }

    fn log(&self, id: u16, domain: &str, outcome: Outcome, start: Instant) {
        let total_ms = start.elapsed().as_secs_f64() * 1000.0;
        if self.verbose {
            info!(id, "{} {} total={:.3}ms", domain, outcome.as_str(), total_ms);
        } else {
            debug!(id, "{} {} total={:.3}ms", domain, outcome.as_str(), total_ms);
        }
    }
}
