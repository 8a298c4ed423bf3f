//! Server core
//!
//! Owns the control listener and the sequential connection loop: accept a
//! client, read one request line, answer with a validation error or run
//! the transfer, then accept the next client. One client is serviced at a
//! time, and no read or connect carries a timeout, so a client that never
//! speaks parks the server until it goes away.

use log::{error, info};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;

use crate::config::ServerConfig;
use crate::error::TransferError;
use crate::protocol::responses::error_reply;
use crate::protocol::{Command, Request, parse_request};
use crate::transfer;

pub struct Server {
    listener: TcpListener,
    control_port: u16,
    config: ServerConfig,
}

impl Server {
    /// Binds the control listener. A failure here is fatal to the caller:
    /// the server cannot exist without its listening socket.
    pub async fn bind(config: ServerConfig, port: u16) -> std::io::Result<Self> {
        let listener = TcpListener::bind((config.bind_address.as_str(), port)).await?;
        let control_port = listener.local_addr()?.port();
        info!("Server open on port {}", control_port);

        Ok(Self {
            listener,
            control_port,
            config,
        })
    }

    /// The port the control listener actually bound (resolves port 0).
    pub fn control_port(&self) -> u16 {
        self.control_port
    }

    /// Accepts and serves control connections, one client at a time,
    /// until interrupted. An accept failure costs only that connection;
    /// an interrupt breaks the loop and drops the listening socket.
    pub async fn run(&self) {
        loop {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Connection from {}", addr.ip());
                        if let Err(e) = self.serve_client(stream, addr).await {
                            error!("Request from {} failed: {}", addr, e);
                        }
                    }
                    Err(e) => error!("Error accepting client connection: {}", e),
                },
            }
        }
    }

    /// Handles one control connection: a single request line in, either a
    /// validation-error reply or a complete data exchange out.
    async fn serve_client(
        &self,
        stream: TcpStream,
        addr: SocketAddr,
    ) -> Result<(), TransferError> {
        let mut control = BufReader::new(stream);
        let mut line = String::new();

        let n = control.read_line(&mut line).await?;
        if n == 0 {
            info!("Client {} disconnected before sending a request", addr);
            return Ok(());
        }

        match parse_request(&line, self.control_port) {
            Ok(request) => {
                log_request(&request);
                transfer::respond(&request, addr.ip(), &mut control, &self.config).await
            }
            Err(e) => {
                info!("Rejected request from {}: {}", addr, e);
                transfer::send_line(control.get_mut(), &error_reply(&e)).await
            }
        }
    }
}

fn log_request(request: &Request) {
    match request.command() {
        Command::Get => info!(
            "File \"{}\" requested on port {}",
            request.filename().unwrap_or(""),
            request.data_port()
        ),
        _ => info!("List directory requested on port {}", request.data_port()),
    }
}
