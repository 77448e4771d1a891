//! Fan a multi-question query out to the upstream resolver.
//!
//! Each question becomes its own single-question query carrying the
//! original transaction ID. The exchanges run concurrently, each bounded by
//! a timeout, and the decoded responses are merged back in question order.
//! Any failed exchange abandons the whole forward.

use std::io;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::debug;

use crate::dns::{MAX_MESSAGE_SIZE, Message};
use crate::error::{Error, Result};
use crate::transport::{Session, UpstreamTransport};

/// Forwards parsed requests to one upstream resolver.
pub struct Forwarder<T> {
    transport: T,
    timeout: Duration,
}

impl<T: UpstreamTransport> Forwarder<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve every question in `request` upstream and merge the results.
    ///
    /// The merged message keeps `request.header` (ID, opcode, RD and the
    /// QR/RCODE normalization applied on decode) with QDCount and ANCount
    /// set to the merged record counts.
    pub async fn forward(&self, request: &Message) -> Result<Message> {
        let header = request.header;

        let exchanges = request
            .questions
            .iter()
            .map(|q| self.exchange(Message::query(header.id, q.clone())));
        let responses = try_join_all(exchanges).await?;

        let mut merged = Message {
            header,
            questions: Vec::with_capacity(request.questions.len()),
            answers: Vec::new(),
        };
        for response in responses {
            merged.questions.extend(response.questions);
            merged.answers.extend(response.answers);
        }
        merged.header.qd_count = merged.questions.len() as u16;
        merged.header.an_count = merged.answers.len() as u16;

        Ok(merged)
    }

    async fn exchange(&self, query: Message) -> Result<Message> {
        let bytes = query.encode()?;
        let question = query.questions.first().map(|q| q.name.to_string());

        let raw = tokio::time::timeout(self.timeout, async {
            let mut session = self.transport.open().await?;
            session.send(&bytes).await?;
            session.receive(MAX_MESSAGE_SIZE).await
        })
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "upstream exchange timed out"))??;

        let response = Message::decode(&raw).map_err(Error::upstream)?;

        debug!(
            id = query.header.id,
            question = question.as_deref().unwrap_or("."),
            answers = response.answers.len(),
            "upstream exchange complete"
        );

        Ok(response)
    }
}
