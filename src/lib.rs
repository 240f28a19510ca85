pub mod catalog;
pub mod client;
pub mod helper;
pub mod listener;
pub mod protocol;
pub mod server;
pub mod settings;
pub mod supervisor;

pub use catalog::Catalog;
pub use client::{Client, SessionClient, SessionResult};
pub use helper::{BookHelper, Responder};
pub use server::{LibraryServer, Relay};
pub use settings::Settings;
pub use supervisor::{Connection, Supervisor};

#[cfg(test)]
mod tests {
    use std::{
        net::{SocketAddr, TcpListener},
        thread,
    };

    use super::*;
    use crate::protocol::BookData;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            BookData {
                title: "Dune".to_string(),
                status: "Available".to_string(),
                borrowed_by: None,
                return_date: None,
            },
            BookData {
                title: "Emma".to_string(),
                status: "Borrowed".to_string(),
                borrowed_by: Some("Jane".to_string()),
                return_date: Some("2026-11-01".to_string()),
            },
        ])
    }

    fn spawn_helper() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let helper = BookHelper::with_catalog(address, catalog());
        thread::spawn(move || helper.accept_loop(listener));
        address
    }

    fn spawn_server(helper: SocketAddr) -> (SocketAddr, bool) {
        let any: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut server = LibraryServer::bind(any, 1, helper, &Supervisor::new()).unwrap();
        let address = server.local_addr().unwrap();
        let connected = server.has_helper();
        thread::spawn(move || server.listen());
        (address, connected)
    }

    fn unused_address() -> SocketAddr {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
    }

    #[test]
    fn relay_available_book() {
        let (server, connected) = spawn_server(spawn_helper());
        assert!(connected);

        let result = Client::new(0, "Dune", server).run();

        assert_eq!(result.status, "Available");
        assert_eq!(result.borrower_name, None);
        assert_eq!(result.return_date, None);
        assert!(!result.error);
    }

    #[test]
    fn relay_sequential_clients() {
        let (server, _) = spawn_server(spawn_helper());

        let emma = Client::new(0, "Emma", server).run();
        let missing = Client::new(1, "Neuromancer", server).run();
        let dune = Client::new(2, "Dune", server).run();

        assert_eq!(emma.status, "Borrowed");
        assert_eq!(emma.borrower_name.as_deref(), Some("Jane"));
        assert_eq!(missing.status, "Not Found");
        assert!(!missing.error);
        assert_eq!(dune.status, "Available");
    }

    #[test]
    fn relay_without_helper() {
        let (server, connected) = spawn_server(unused_address());
        assert!(!connected);

        for (id, title) in ["Dune", "Neuromancer"].into_iter().enumerate() {
            let result = Client::new(id, title, server).run();
            assert!(result.error);
            assert_eq!(result.status, "Not Found");
        }
    }
}
