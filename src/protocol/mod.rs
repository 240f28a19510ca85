//! Communication protocol shared by the client, server and book helper.
//!
//! This module defines the message envelope exchanged between every pair of
//! roles and the transport used to move it over a stream.
//!
//! # Overview
//!
//! A conversation is a strict request/reply alternation. The client greets the
//! server with `Hello`, is answered with `Welcome`, then sends a
//! `BookInquiry`. The server forwards the inquiry to the book helper and relays
//! whatever comes back (`BookInquiryReply`, `NotFound` or `Error`).
//!
//! # Key Components
//!
//! - [`Message`]: The `Type`/`Content` envelope as it appears on the wire.
//! - [`Payload`]: Typed view of a message, pairing each type with its content.
//! - [`ProtocolTransport`]: Sends and receives one message per stream operation.
//!
//! # Text Format
//!
//! Messages are JSON objects so both ends can evolve independently:
//!
//! ```json
//! {"Type":"BookInquiry","Content":"Dune"}
//! ```
//!
//! A `BookInquiryReply` nests the serialized book record as a string in
//! `Content`. Each receive is a single read of at most [`MAX_MESSAGE_SIZE`]
//! bytes; messages are not length-prefixed, so a longer message is truncated
//! and decodes as an error.
mod message;
mod transport;

pub use message::{BookData, DecodeError, EncodeError, Message, MessageType, Payload};
pub use transport::{MAX_MESSAGE_SIZE, ProtocolTransport, TransportError};

#[cfg(test)]
pub(crate) use transport::testing;
