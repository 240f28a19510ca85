//! Listening sockets with an explicit accept backlog.
//!
//! Both long-running roles serve one peer at a time, so connections that
//! arrive meanwhile wait in the kernel's accept queue. Its length comes from
//! the `ServerListeningQueue` setting rather than the platform default that
//! `TcpListener::bind` applies.
use std::{
    io,
    net::{SocketAddr, TcpListener},
};

use log::debug;
use socket2::{Domain, Protocol, Socket, Type};

pub fn bind(address: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(address), Type::STREAM, Some(Protocol::TCP))?;
    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    socket.bind(&address.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;
    debug!("bound {address} with backlog {backlog}");

    Ok(socket.into())
}
