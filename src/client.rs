use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpStream},
};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::protocol::{
    BookData, DecodeError, Message, MessageType, Payload, ProtocolTransport, TransportError,
};

pub const ROLE: &str = "Client";

const DEFAULT_STATUS: &str = "Not Found";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected reply: {0}")]
    Reply(#[from] DecodeError),
    #[error("server reported an error: {0}")]
    Rejected(String),
}

/// Outcome of one client session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SessionResult {
    pub client_id: String,
    pub book_name: String,
    pub status: String,
    pub error: bool,
    pub borrower_name: Option<String>,
    pub return_date: Option<String>,
}

impl SessionResult {
    fn new(client_id: &str, book_name: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            book_name: book_name.to_string(),
            status: DEFAULT_STATUS.to_string(),
            error: false,
            borrower_name: None,
            return_date: None,
        }
    }

    fn fill(&mut self, book: BookData) {
        self.status = book.status;
        self.borrower_name = book.borrowed_by;
        self.return_date = book.return_date;
    }
}

/// Drives a single request to completion.
pub trait SessionClient {
    fn run(&self) -> SessionResult;
}

pub struct Client {
    id: String,
    book: String,
    server: SocketAddr,
}

impl Client {
    pub fn new(id: usize, book: impl Into<String>, server: SocketAddr) -> Self {
        Self {
            id: format!("Client {id}"),
            book: book.into(),
            server,
        }
    }

    /// Runs the session over an established stream. Never retries; any
    /// failure is recorded in the result's error flag.
    pub fn drive<T: Read + Write>(&self, transport: &mut ProtocolTransport<T>) -> SessionResult {
        let mut result = SessionResult::new(&self.id, &self.book);

        if let Err(e) = self.exchange(transport, &mut result) {
            warn!("{}: session failed: {e}", self.id);
            result.error = true;
        }
        result
    }

    fn exchange<T: Read + Write>(
        &self,
        transport: &mut ProtocolTransport<T>,
        result: &mut SessionResult,
    ) -> Result<(), ClientError> {
        transport.write_message(&Message::new(MessageType::Hello, Some(self.id.clone())))?;

        loop {
            let message = transport.receive(ROLE)?;
            debug!("{}: received {:?}", self.id, message.kind);

            match Payload::try_from(message)? {
                Payload::Welcome => {
                    info!("{}: requesting '{}'", self.id, self.book);
                    let inquiry = Message::new(MessageType::BookInquiry, Some(self.book.clone()));
                    transport.write_message(&inquiry)?;
                }
                Payload::BookInquiryReply(book) => {
                    result.fill(book);
                    return Ok(());
                }
                Payload::NotFound(_) => return Ok(()),
                Payload::Error(description) => return Err(ClientError::Rejected(description)),
                other => debug!("{}: ignoring {other:?}", self.id),
            }
        }
    }
}

impl SessionClient for Client {
    fn run(&self) -> SessionResult {
        info!("{}: starting, book '{}'", self.id, self.book);

        match TcpStream::connect(self.server) {
            Ok(stream) => self.drive(&mut ProtocolTransport::new(stream)),
            Err(e) => {
                warn!("{}: could not connect to {}: {e}", self.id, self.server);
                SessionResult {
                    error: true,
                    ..SessionResult::new(&self.id, &self.book)
                }
            }
        }
    }
}
