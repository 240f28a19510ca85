use std::io::{self, Read, Write};

use log::{trace, warn};
use thiserror::Error;

use super::{DecodeError, EncodeError, Message};

/// Capacity of the single read that receives one message. There is no framing,
/// so anything longer than this arrives truncated and fails to decode.
pub const MAX_MESSAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("connection closed by peer")]
    Closed,
    #[error("Transport IO Error: {0}")]
    Io(#[from] io::Error),
}

pub struct ProtocolTransport<T: Read + Write> {
    stream: T,
    buffer: [u8; MAX_MESSAGE_SIZE],
}

impl<T: Read + Write> ProtocolTransport<T> {
    pub fn new(stream: T) -> Self {
        Self {
            stream,
            buffer: [0; MAX_MESSAGE_SIZE],
        }
    }

    pub fn write_message(&mut self, message: &Message) -> Result<(), TransportError> {
        let bytes = message.encode()?;
        if bytes.len() > MAX_MESSAGE_SIZE {
            warn!(
                "sending {} byte message, peer reads at most {MAX_MESSAGE_SIZE}",
                bytes.len()
            );
        }

        self.stream.write_all(&bytes)?;
        self.stream.flush()?;
        trace!("sent {:?}", message.kind);
        Ok(())
    }

    /// Reads one message. Undecodable bytes are reported as
    /// [`TransportError::Decode`].
    pub fn read_message(&mut self) -> Result<Message, TransportError> {
        let read = self.stream.read(&mut self.buffer)?;
        if read == 0 {
            return Err(TransportError::Closed);
        }

        Ok(Message::decode(&self.buffer[..read])?)
    }

    /// Reads one message, substituting an `Error` message on behalf of `role`
    /// for anything that does not decode. Only I/O failures and a closed peer
    /// are returned as errors.
    pub fn receive(&mut self, role: &str) -> Result<Message, TransportError> {
        match self.read_message() {
            Err(TransportError::Decode(e)) => {
                warn!("incoming message is unreadable: {e}");
                Ok(Message::unreadable(role))
            }
            res => res,
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.stream
    }
}
