//! Book helper: the catalog backend behind the server.
//!
//! The helper owns the [`Catalog`] and answers one `BookInquiry` at a time for
//! whichever server is connected. When the server disconnects it goes back to
//! accepting the next connection.
use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener},
    path::Path,
};

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    listener,
    protocol::{Message, MessageType, Payload, ProtocolTransport, TransportError},
};

pub const ROLE: &str = "BookHelper";

const NOT_FOUND: &str = "BookHelper could not find specified book";

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    #[error("failed to bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}

/// Produces the reply to a single request.
pub trait Responder {
    fn respond(&self, message: Message) -> Message;
}

pub struct BookHelper {
    address: SocketAddr,
    catalog: Catalog,
}

impl BookHelper {
    /// Loads the catalog; the helper cannot exist without one.
    pub fn new(address: SocketAddr, catalog: &Path) -> Result<Self, HelperError> {
        let catalog = Catalog::load(catalog)?;
        Ok(Self::with_catalog(address, catalog))
    }

    pub fn with_catalog(address: SocketAddr, catalog: Catalog) -> Self {
        Self { address, catalog }
    }

    pub fn listen(&self, backlog: u32) -> Result<(), HelperError> {
        let address = self.address;
        let listener = listener::bind(address, backlog)
            .map_err(|source| HelperError::Bind { address, source })?;
        info!("listening at {address}, backlog {backlog}");
        self.accept_loop(listener);
        Ok(())
    }

    pub fn accept_loop(&self, listener: TcpListener) {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    info!("server connected from {:?}", stream.peer_addr().ok());
                    self.serve(&mut ProtocolTransport::new(stream));
                    info!("awaiting next connection");
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
    }

    /// Answers requests until the peer goes away.
    pub fn serve<T: Read + Write>(&self, transport: &mut ProtocolTransport<T>) {
        loop {
            let reply = match transport.receive(ROLE) {
                Ok(message) => {
                    debug!("received {:?}: {:?}", message.kind, message.content);
                    self.respond(message)
                }
                Err(TransportError::Closed) => {
                    info!("server disconnected");
                    return;
                }
                Err(e) => {
                    warn!("failed to read from server: {e}");
                    return;
                }
            };

            if let Err(e) = transport.write_message(&reply) {
                warn!("failed to reply to server: {e}");
                return;
            }
        }
    }

    fn lookup(&self, title: &str) -> Message {
        match self.catalog.find(title) {
            Some(book) => {
                info!("found '{title}'");
                Message::from(Payload::BookInquiryReply(book.clone()))
            }
            None => {
                info!("'{title}' is not in the catalog");
                Message::new(MessageType::NotFound, Some(NOT_FOUND.to_string()))
            }
        }
    }
}

impl Responder for BookHelper {
    fn respond(&self, message: Message) -> Message {
        match Payload::try_from(message) {
            Ok(Payload::BookInquiry { title }) => self.lookup(&title),
            Ok(Payload::Error(description)) => {
                Message::error(format!("{ROLE} received an error: {description}"))
            }
            Ok(other) => {
                warn!("unsupported request {other:?}");
                Message::error(format!("{ROLE} only answers BookInquiry messages"))
            }
            Err(e) => Message::error(format!("{ROLE} could not read the request: {e}")),
        }
    }
}
