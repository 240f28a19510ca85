use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
};

use log::{info, warn};
use thiserror::Error;

use crate::{
    listener,
    protocol::{Message, MessageType, ProtocolTransport, TransportError},
    supervisor::{Connection, Supervisor},
};

pub const ROLE: &str = "Server";

const NO_HELPER: &str = "Server has no access to resources; could not connect to BookHelper";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind { address: SocketAddr, source: io::Error },
}

/// Turns one client message into the reply sent back to that client.
pub trait Relay {
    fn process(&mut self, message: Message) -> Message;
}

/// Sequential relay between clients and the book helper.
///
/// Clients are served one at a time, end to end. The helper connection is made
/// once at startup and reused by every session; if it is missing or breaks,
/// inquiries are answered with `Error` and no reconnect is attempted.
pub struct LibraryServer<H: Read + Write = TcpStream> {
    listener: TcpListener,
    helper: Option<ProtocolTransport<H>>,
}

impl LibraryServer<TcpStream> {
    pub fn bind(
        address: SocketAddr,
        backlog: u32,
        helper: SocketAddr,
        supervisor: &Supervisor,
    ) -> Result<Self, ServerError> {
        let listener = listener::bind(address, backlog)
            .map_err(|source| ServerError::Bind { address, source })?;
        info!("listening at {address}, backlog {backlog}");

        Ok(Self::start(listener, supervisor, || TcpStream::connect(helper)))
    }
}

impl<H: Read + Write> LibraryServer<H> {
    /// Runs the supervisor once against `connect`. Running out of attempts
    /// leaves the server without a helper but still able to accept clients.
    pub fn start<F>(listener: TcpListener, supervisor: &Supervisor, connect: F) -> Self
    where
        F: FnMut() -> io::Result<H>,
    {
        let helper = match supervisor.connect_with(connect) {
            Connection::Connected(stream) => Some(ProtocolTransport::new(stream)),
            Connection::Exhausted => {
                warn!("starting without a book helper; inquiries will be answered with errors");
                None
            }
        };

        Self { listener, helper }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn has_helper(&self) -> bool {
        self.helper.is_some()
    }

    pub fn listen(&mut self) -> Result<(), ServerError> {
        loop {
            info!("accepting client connections");
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    info!("client connected from {peer}");
                    self.handle_session(&mut ProtocolTransport::new(stream));
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
    }

    /// Serves one client until a terminal reply is sent or the client goes away.
    pub fn handle_session<T: Read + Write>(&mut self, transport: &mut ProtocolTransport<T>) {
        loop {
            let message = match transport.receive(ROLE) {
                Ok(message) => message,
                Err(TransportError::Closed) => {
                    info!("client disconnected");
                    return;
                }
                Err(e) => {
                    warn!("failed to read from client: {e}");
                    return;
                }
            };
            info!("received {:?}: {:?}", message.kind, message.content);

            let reply = self.process(message);
            info!("replying {:?}", reply.kind);
            if let Err(e) = transport.write_message(&reply) {
                warn!("failed to reply to client: {e}");
                return;
            }

            if reply.is_terminal() {
                info!("closing client session");
                return;
            }
        }
    }

    fn request_from_helper(&mut self, title: Option<String>) -> Message {
        let Some(helper) = self.helper.as_mut() else {
            warn!("no book helper connection");
            return Message::error(NO_HELPER);
        };

        let inquiry = Message::new(MessageType::BookInquiry, title);
        let res = helper
            .write_message(&inquiry)
            .and_then(|_| helper.receive(ROLE));

        match res {
            Ok(reply) => reply,
            Err(e) => {
                warn!("lost book helper connection: {e}");
                self.helper = None;
                Message::error(NO_HELPER)
            }
        }
    }
}

impl<H: Read + Write> Relay for LibraryServer<H> {
    fn process(&mut self, message: Message) -> Message {
        match message.kind {
            MessageType::Hello => Message::new(MessageType::Welcome, None),
            MessageType::BookInquiry => {
                info!("forwarding inquiry to book helper");
                self.request_from_helper(message.content)
            }
            _ => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BookData, Payload, testing::ScriptedStream};

    fn listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").unwrap()
    }

    fn refused<S>() -> io::Result<S> {
        Err(io::Error::from(io::ErrorKind::ConnectionRefused))
    }

    fn connected(stream: ScriptedStream) -> impl FnMut() -> io::Result<ScriptedStream> {
        let mut stream = Some(stream);
        move || stream.take().ok_or_else(|| io::ErrorKind::ConnectionRefused.into())
    }

    fn hello() -> Message {
        Message::new(MessageType::Hello, Some("Client 0".to_string()))
    }

    fn inquiry(title: &str) -> Message {
        Message::new(MessageType::BookInquiry, Some(title.to_string()))
    }

    fn dune_reply() -> Message {
        Message::from(Payload::BookInquiryReply(BookData {
            title: "Dune".to_string(),
            status: "Available".to_string(),
            borrowed_by: None,
            return_date: None,
        }))
    }

    #[test]
    fn session_relays_helper_reply() {
        let helper = ScriptedStream::new([dune_reply()]);
        let mut server = LibraryServer::start(listener(), &Supervisor::new(), connected(helper));
        let mut client = ProtocolTransport::new(ScriptedStream::new([hello(), inquiry("Dune")]));

        server.handle_session(&mut client);

        assert_eq!(
            client.get_ref().sent(),
            vec![Message::new(MessageType::Welcome, None), dune_reply()]
        );
        let forwarded = server.helper.as_ref().unwrap().get_ref().sent();
        assert_eq!(forwarded, vec![inquiry("Dune")]);
    }

    #[test]
    fn session_closes_after_terminal_reply() {
        let helper = ScriptedStream::new([Message::new(
            MessageType::NotFound,
            Some("missing".to_string()),
        )]);
        let mut server = LibraryServer::start(listener(), &Supervisor::new(), connected(helper));
        let mut client = ProtocolTransport::new(ScriptedStream::new([
            inquiry("Neuromancer"),
            hello(),
        ]));

        server.handle_session(&mut client);

        let sent = client.get_ref().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, MessageType::NotFound);
        // The unread Hello is still queued.
        assert_eq!(client.get_ref().incoming.len(), 1);
    }

    #[test]
    fn other_types_are_echoed() {
        let mut server = LibraryServer::start(
            listener(),
            &Supervisor::new(),
            refused::<ScriptedStream>,
        );
        let welcome = Message::new(MessageType::Welcome, Some("odd".to_string()));

        assert_eq!(server.process(welcome.clone()), welcome);
    }

    #[test]
    fn unreadable_message_ends_session() {
        let mut server = LibraryServer::start(
            listener(),
            &Supervisor::new(),
            refused::<ScriptedStream>,
        );
        let mut stream = ScriptedStream::default();
        stream.push_raw(b"hello");
        stream.push_raw(&hello().encode().unwrap());
        let mut client = ProtocolTransport::new(stream);

        server.handle_session(&mut client);

        let sent = client.get_ref().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, MessageType::Error);
    }

    #[test]
    fn no_helper_answers_every_inquiry_with_error() {
        let mut attempts = 0;
        let mut server = LibraryServer::<ScriptedStream>::start(
            listener(),
            &Supervisor::new(),
            || {
                attempts += 1;
                refused()
            },
        );
        assert!(!server.has_helper());

        for title in ["Dune", "Neuromancer", "Emma"] {
            let mut client = ProtocolTransport::new(ScriptedStream::new([hello(), inquiry(title)]));
            server.handle_session(&mut client);

            let sent = client.get_ref().sent();
            assert_eq!(sent[0].kind, MessageType::Welcome);
            assert_eq!(sent[1], Message::error(NO_HELPER));
        }
        assert_eq!(attempts, 3);
    }

    #[test]
    fn bind_with_backlog_queues_clients() {
        let taken = listener();
        let helper = taken.local_addr().unwrap();
        drop(taken);

        let server =
            LibraryServer::bind("127.0.0.1:0".parse().unwrap(), 2, helper, &Supervisor::new())
                .unwrap();
        let address = server.local_addr().unwrap();
        assert!(!server.has_helper());

        // Not accepting yet; both wait in the queue.
        let _first = TcpStream::connect(address).unwrap();
        let _second = TcpStream::connect(address).unwrap();
    }

    #[test]
    fn bind_taken_address() {
        let taken = listener();
        let res = LibraryServer::bind(
            taken.local_addr().unwrap(),
            5,
            taken.local_addr().unwrap(),
            &Supervisor::new(),
        );

        assert!(matches!(res, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn broken_helper_is_dropped() {
        // Helper script is empty, so its first read reports a closed peer.
        let mut server = LibraryServer::start(listener(), &Supervisor::new(), || {
            Ok(ScriptedStream::default())
        });
        let mut client = ProtocolTransport::new(ScriptedStream::new([inquiry("Dune")]));

        server.handle_session(&mut client);

        assert_eq!(client.get_ref().sent(), vec![Message::error(NO_HELPER)]);
        assert!(!server.has_helper());
    }
}
