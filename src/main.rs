//! Mini FTP Server - Entry Point
//!
//! Resolves the control port, binds the server, and runs it until
//! interrupted.

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use env_logger::{Builder, Env};
use log::{error, info};

use mini_ftp_server::{Server, ServerConfig};

const MIN_PORT: u16 = 1024;
const MAX_PORT: u16 = 65535;

/// Resolve the control port from the first CLI argument, prompting on
/// stdin until a port in [1024, 65535] is supplied.
fn resolve_port() -> u16 {
    if let Some(port) = env::args().nth(1).and_then(|arg| parse_port(&arg)) {
        return port;
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Enter a valid port number [{} - {}]: ", MIN_PORT, MAX_PORT);
        let _ = io::stdout().flush();

        line.clear();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            // stdin closed, no port to be had
            error!("No valid port provided");
            process::exit(1);
        }

        if let Some(port) = parse_port(line.trim()) {
            return port;
        }
    }
}

/// The u16 parse enforces the upper bound.
fn parse_port(arg: &str) -> Option<u16> {
    arg.trim().parse::<u16>().ok().filter(|p| *p >= MIN_PORT)
}

#[tokio::main]
async fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    // listing colors are part of the wire format, tty or not
    colored::control::set_override(true);

    let port = resolve_port();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::bind(config, port).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to bind control socket on port {}: {}", port, e);
            process::exit(1);
        }
    };

    info!("Launching FTP server...");
    server.run().await;

    info!("FTP server stopped.");
}
