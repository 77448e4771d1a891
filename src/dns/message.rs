//! Whole DNS messages: header, questions and answers.

use super::header::{
    Header, HEADER_LEN, OPCODE_QUERY, RCODE_NO_ERROR, RCODE_NOT_IMPLEMENTED,
};
use super::record::{Answer, Question, A_RDATA_LEN};
use crate::error::{Error, Result};

/// A decoded or locally built DNS message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
}

impl Message {
    /// Decode a message and normalize its header for use as a response.
    ///
    /// After decoding, QR is set, RCODE becomes "not implemented" for any
    /// non-standard opcode (otherwise "no error"), and the question and
    /// answer counts are replaced with the number of records actually
    /// decoded. Authority and additional sections are never decoded, so
    /// their counts are cleared.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let header_bytes = buf
            .get(..HEADER_LEN)
            .ok_or(Error::MalformedHeader(buf.len()))?;
        let mut header = Header::parse(header_bytes)?;

        let (questions, pos) = Question::decode_all(buf, header.qd_count, HEADER_LEN)?;
        let (answers, _) = Answer::decode_all(buf, header.an_count, pos)?;

        header.qr = true;
        header.rcode = if header.opcode == OPCODE_QUERY {
            RCODE_NO_ERROR
        } else {
            RCODE_NOT_IMPLEMENTED
        };
        header.qd_count = questions.len() as u16;
        header.an_count = answers.len() as u16;
        header.ns_count = 0;
        header.ar_count = 0;

        Ok(Self {
            header,
            questions,
            answers,
        })
    }

    /// Encode header, questions and answers in that order.
    ///
    /// Counts are written exactly as they sit in the header.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(512);

        out.extend_from_slice(&self.header.encode());
        for question in &self.questions {
            question.encode_into(&mut out);
        }
        for answer in &self.answers {
            answer.encode_into(&mut out)?;
        }

        Ok(out)
    }

    /// A single-question query carrying `id`, ready to send upstream.
    ///
    /// Only the ID and QDCount are set; every flag bit is clear.
    pub fn query(id: u16, question: Question) -> Self {
        Self {
            header: Header {
                id,
                qd_count: 1,
                ..Header::default()
            },
            questions: vec![question],
            answers: Vec::new(),
        }
    }

    /// Answer every question with one address record, unless the message
    /// already carries answers, which are then kept as they are.
    pub fn answer_locally(&mut self, ttl: u32, address: [u8; A_RDATA_LEN]) {
        if !self.answers.is_empty() {
            self.header.an_count = self.answers.len() as u16;
            return;
        }
        self.answers = self
            .questions
            .iter()
            .map(|q| Answer::address(q.name.clone(), ttl, address))
            .collect();
        self.header.an_count = self.answers.len() as u16;
    }

    /// Header-only error reply echoing the request's ID, opcode and RD bit.
    pub fn error_reply(request: &Header, rcode: u8) -> Self {
        Self {
            header: Header {
                id: request.id,
                qr: true,
                opcode: request.opcode,
                rd: request.rd,
                rcode,
                ..Header::default()
            },
            ..Self::default()
        }
    }

    /// Attach the questions an error reply refers to.
    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.header.qd_count = questions.len() as u16;
        self.questions = questions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::header::RCODE_SERVER_FAILURE;
    use crate::dns::name::Name;

    fn name(s: &str) -> Name {
        s.parse().unwrap()
    }

    fn query_bytes(id: u16, flags: [u8; 2], names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&id.to_be_bytes());
        buf.extend_from_slice(&flags);
        buf.extend_from_slice(&(names.len() as u16).to_be_bytes());
        buf.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        for n in names {
            Question::new(name(n)).encode_into(&mut buf);
        }
        buf
    }

    #[test]
    fn decode_normalizes_header() {
        let buf = query_bytes(1234, [0x01, 0x00], &["codecrafters.io"]);

        let message = Message::decode(&buf).unwrap();

        assert_eq!(message.header.id, 1234);
        assert!(message.header.qr);
        assert!(message.header.rd);
        assert_eq!(message.header.rcode, RCODE_NO_ERROR);
        assert_eq!(message.header.qd_count, 1);
        assert_eq!(message.header.an_count, 0);
        assert_eq!(message.questions, vec![Question::new(name("codecrafters.io"))]);
    }

    #[test]
    fn decode_sets_not_implemented_for_other_opcodes() {
        // opcode 2 (STATUS), rcode bits set on input
        let buf = query_bytes(7, [0x10, 0x03], &["example.com"]);

        let message = Message::decode(&buf).unwrap();

        assert_eq!(message.header.opcode, 2);
        assert_eq!(message.header.rcode, RCODE_NOT_IMPLEMENTED);
    }

    #[test]
    fn decode_rejects_short_buffer() {
        assert!(matches!(
            Message::decode(&[0; 5]),
            Err(Error::MalformedHeader(5))
        ));
    }

    #[test]
    fn decode_propagates_truncated_question() {
        let mut buf = query_bytes(1, [0, 0], &["example.com"]);
        // Claim a second question that is not there.
        buf[5] = 2;

        assert!(matches!(
            Message::decode(&buf),
            Err(Error::TruncatedName(_))
        ));
    }

    #[test]
    fn decode_reads_compressed_answers() {
        let mut buf = query_bytes(0x1234, [0x81, 0x80], &["example.com"]);
        buf[7] = 1;
        buf.extend_from_slice(&[0xC0, 0x0C]);
        buf.extend_from_slice(&[0, 1, 0, 1]);
        buf.extend_from_slice(&300u32.to_be_bytes());
        buf.extend_from_slice(&[0, 4, 93, 184, 216, 34]);

        let message = Message::decode(&buf).unwrap();

        assert_eq!(message.header.an_count, 1);
        assert_eq!(message.answers[0].name, name("example.com"));
        assert_eq!(message.answers[0].ttl, 300);
        assert_eq!(message.answers[0].rdata, vec![93, 184, 216, 34]);
    }

    #[test]
    fn encode_writes_counts_verbatim() {
        let mut message = Message::query(9, Question::new(name("a.io")));
        message.header.qd_count = 3;

        let bytes = message.encode().unwrap();

        assert_eq!(&bytes[4..6], &[0, 3]);
        assert_eq!(bytes.len(), HEADER_LEN + name("a.io").encoded_len() + 4);
    }

    #[test]
    fn query_header_has_no_flags_set() {
        let bytes = Message::query(0x4242, Question::new(name("a.io")))
            .encode()
            .unwrap();

        assert_eq!(&bytes[..6], &[0x42, 0x42, 0, 0, 0, 1]);
        assert_eq!(&bytes[6..HEADER_LEN], &[0; 6]);
    }

    #[test]
    fn local_answer_keeps_answers_already_present() {
        let mut buf = query_bytes(3, [0x01, 0x00], &["example.com"]);
        buf[7] = 1;
        buf.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1, 0, 0, 1, 0x2C, 0, 4]);
        buf.extend_from_slice(&[93, 184, 216, 34]);

        let mut message = Message::decode(&buf).unwrap();
        message.answer_locally(60, [8, 8, 8, 8]);

        assert_eq!(message.header.an_count, 1);
        assert_eq!(message.answers.len(), 1);
        assert_eq!(message.answers[0].ttl, 300);
        assert_eq!(message.answers[0].rdata, vec![93, 184, 216, 34]);
    }

    #[test]
    fn local_answer_end_to_end() {
        let buf = query_bytes(0xBEEF, [0x01, 0x00], &["codecrafters.io"]);

        let mut message = Message::decode(&buf).unwrap();
        message.answer_locally(60, [8, 8, 8, 8]);
        let response = Message::decode(&message.encode().unwrap()).unwrap();

        let raw = message.encode().unwrap();
        assert_eq!(raw[2] & 0x80, 0x80);
        assert_eq!(response.header.id, 0xBEEF);
        assert_eq!(response.header.qd_count, 1);
        assert_eq!(response.header.an_count, 1);
        assert_eq!(response.answers[0].name, name("codecrafters.io"));
        assert_eq!(response.answers[0].ttl, 60);
        assert_eq!(response.answers[0].rdata, vec![8, 8, 8, 8]);
    }

    #[test]
    fn error_reply_echoes_request() {
        let request = Header {
            id: 42,
            opcode: 0,
            rd: true,
            qd_count: 1,
            ..Header::default()
        };

        let reply = Message::error_reply(&request, RCODE_SERVER_FAILURE)
            .with_questions(vec![Question::new(name("example.com"))]);

        assert_eq!(reply.header.id, 42);
        assert!(reply.header.qr);
        assert!(reply.header.rd);
        assert_eq!(reply.header.rcode, RCODE_SERVER_FAILURE);
        assert_eq!(reply.header.qd_count, 1);
        assert!(reply.answers.is_empty());
    }
}
