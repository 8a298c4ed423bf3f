//! Module `orchestrator`
//!
//! Drives the data-connection side of one validated request: the control
//! acknowledgment and readiness handshake, the outbound connection to the
//! client's data port, and the listing or file stream it carries.

use log::{info, warn};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::display::render_entry;
use crate::error::TransferError;
use crate::protocol::responses::{BAD, CANCEL, DONE, GOOD};
use crate::protocol::{Command, Request};
use crate::storage::{self, list_directory, list_directory_recursive};

/// Send one newline-terminated protocol message.
pub async fn send_line(stream: &mut TcpStream, message: &str) -> Result<(), TransferError> {
    stream.write_all(message.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    Ok(())
}

/// Await one line from the client on the control connection.
async fn receive_control_line(
    control: &mut BufReader<TcpStream>,
) -> Result<String, TransferError> {
    let mut line = String::new();
    let n = control.read_line(&mut line).await?;
    if n == 0 {
        return Err(TransferError::ControlChannelClosed);
    }
    Ok(line)
}

/// Runs the data phase for a validated request.
///
/// Sequence: acknowledge the request on the control connection, wait for
/// the client's readiness line, connect out to the client's data port,
/// stream the response, close the data connection. A data-connect failure
/// is fatal to this request only; the caller logs it and moves on to the
/// next client.
pub async fn respond(
    request: &Request,
    client_ip: IpAddr,
    control: &mut BufReader<TcpStream>,
    config: &ServerConfig,
) -> Result<(), TransferError> {
    send_line(control.get_mut(), GOOD).await?;

    // the client binds its data listener, then tells us it is ready
    receive_control_line(control).await?;

    let data_addr = SocketAddr::new(client_ip, request.data_port());
    let mut data = TcpStream::connect(data_addr)
        .await
        .map_err(|e| TransferError::DataConnectionFailed(data_addr, e))?;

    let root = config.server_root_path();
    match request.command() {
        Command::ListShort => {
            send_directory_list(&mut data, &root, data_addr, false, false, false).await?
        }
        Command::ListAll => {
            send_directory_list(&mut data, &root, data_addr, true, false, false).await?
        }
        Command::ListWithSize => {
            send_directory_list(&mut data, &root, data_addr, true, true, false).await?
        }
        Command::ListRecursive => {
            send_directory_list(&mut data, &root, data_addr, true, true, true).await?
        }
        Command::Get => send_requested_file(control, &mut data, &root, request, data_addr).await?,
    }

    drop(data);
    info!("FTP data connection with {} closed", data_addr);
    Ok(())
}

/// Streams a directory listing over the data connection, one rendered
/// entry per line, ending with the done sentinel. A directory that cannot
/// be read yields an empty listing rather than a failed transfer.
async fn send_directory_list(
    data: &mut TcpStream,
    root: &Path,
    data_addr: SocketAddr,
    include_hidden: bool,
    include_size: bool,
    recursive: bool,
) -> Result<(), TransferError> {
    info!("Sending directory contents to {}", data_addr);

    let entries = if recursive {
        list_directory_recursive(root, include_hidden, include_size)
    } else {
        list_directory(root, include_hidden, include_size)
    }
    .unwrap_or_else(|e| {
        warn!("Failed to read directory {}: {}", root.display(), e);
        Vec::new()
    });

    for entry in &entries {
        send_line(data, &render_entry(entry)).await?;
    }

    send_line(data, DONE).await
}

/// Streams the requested file, or the not-found error sequence.
///
/// A readable file is announced with the good sentinel on the data
/// connection, after which the client gets one line on the control
/// connection to cancel before any content is sent. The done sentinel
/// terminates the exchange whether the transfer ran, was cancelled, or
/// failed to find the file.
async fn send_requested_file(
    control: &mut BufReader<TcpStream>,
    data: &mut TcpStream,
    root: &Path,
    request: &Request,
    data_addr: SocketAddr,
) -> Result<(), TransferError> {
    let filename = request.filename().unwrap_or("");
    let path = root.join(filename);

    let reader = match storage::open_for_line_reading(&path).await {
        Ok(reader) => reader,
        Err(_) => {
            info!(
                "File \"{}\" not found. Sending error message to {}",
                filename, data_addr
            );
            send_line(data, BAD).await?;
            send_line(
                data,
                &format!("Response: Error - \"{}\" not found", filename),
            )
            .await?;
            return send_line(data, DONE).await;
        }
    };

    info!("File \"{}\" ready to send to {}", filename, data_addr);
    send_line(data, GOOD).await?;

    // one line from the client decides: cancel, or stream
    let reply = receive_control_line(control).await?;
    if reply.contains(CANCEL) {
        info!("Receiver cancelled the file transfer");
    } else {
        info!("Sending \"{}\" to {}", filename, data_addr);
        stream_file_lines(reader, data).await?;
    }

    send_line(data, DONE).await
}

/// Resends a file line by line. Transfer is text-oriented: content is
/// split on newline boundaries and each line travels as one message, so
/// binary or CRLF-delimited files arrive altered.
async fn stream_file_lines(
    mut reader: BufReader<File>,
    data: &mut TcpStream,
) -> Result<(), TransferError> {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => return Ok(()),
            Ok(_) => {
                send_line(data, line.trim_end_matches(['\r', '\n'])).await?;
            }
            Err(e) => {
                // non-text content ends the stream early; done still follows
                warn!("Stopped reading file mid-stream: {}", e);
                return Ok(());
            }
        }
    }
}
