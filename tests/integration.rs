//! End-to-end tests driving the full control/data choreography over real
//! sockets: one task runs the server, the test body plays the client.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use mini_ftp_server::{Server, ServerConfig};

const DONE: &str = "\\done";
const GOOD: &str = "\\good";
const BAD: &str = "\\bad";
const CANCEL: &str = "\\cancel";
const READY: &str = "\\ready";

static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Per-test served directory, removed on drop.
struct TestRoot(PathBuf);

impl TestRoot {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "mini-ftp-it-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).unwrap();
        TestRoot(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn write_file(&self, name: &str, contents: &str) {
        let mut f = File::create(self.0.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }
}

impl Drop for TestRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Bind the server on an ephemeral port, run it in the background, and
/// return the control port to connect to.
async fn start_server(root: &Path) -> u16 {
    let config = ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        server_root: root.display().to_string(),
    };
    let server = Server::bind(config, 0).await.unwrap();
    let port = server.control_port();
    tokio::spawn(async move { server.run().await });
    port
}

/// Client side of the control connection.
struct ControlConn {
    reader: BufReader<TcpStream>,
}

impl ControlConn {
    async fn connect(port: u16) -> Self {
        let stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        ControlConn {
            reader: BufReader::new(stream),
        }
    }

    async fn send_line(&mut self, line: &str) {
        let stream = self.reader.get_mut();
        stream.write_all(line.as_bytes()).await.unwrap();
        stream.write_all(b"\n").await.unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }
}

/// Read data-connection lines until the done sentinel; the sentinel is
/// not included in the result.
async fn read_until_done(reader: &mut BufReader<TcpStream>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "data connection closed before the done sentinel");
        let line = line.trim_end().to_string();
        if line == DONE {
            return lines;
        }
        lines.push(line);
    }
}

/// Drop ANSI escape sequences, leaving the visible text.
fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Run one complete listing exchange and return the stripped lines.
async fn list_exchange(control_port: u16, command: &str) -> Vec<String> {
    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();

    let mut control = ControlConn::connect(control_port).await;
    control
        .send_line(&format!("{} {}", command, data_port))
        .await;
    assert_eq!(control.read_line().await, GOOD);

    control.send_line(READY).await;
    let (data, _) = data_listener.accept().await.unwrap();
    let mut reader = BufReader::new(data);
    let lines = read_until_done(&mut reader).await;
    lines.iter().map(|l| strip_ansi(l)).collect()
}

#[tokio::test]
async fn list_streams_visible_entries_and_done() {
    let root = TestRoot::new();
    root.write_file("alpha.txt", "one");
    root.write_file(".hidden", "two");
    let port = start_server(root.path()).await;

    let names = list_exchange(port, "-l").await;
    assert!(names.contains(&"alpha.txt".to_string()));
    assert!(!names.contains(&".hidden".to_string()));
}

#[tokio::test]
async fn list_all_includes_hidden_entries() {
    let root = TestRoot::new();
    root.write_file("alpha.txt", "one");
    root.write_file(".hidden", "two");
    let port = start_server(root.path()).await;

    let names = list_exchange(port, "-la").await;
    assert!(names.contains(&"alpha.txt".to_string()));
    assert!(names.contains(&".hidden".to_string()));
    assert!(names.contains(&".".to_string()));
}

#[tokio::test]
async fn list_with_size_appends_byte_counts() {
    let root = TestRoot::new();
    root.write_file("data.bin", "12345");
    let port = start_server(root.path()).await;

    let lines = list_exchange(port, "-ll").await;
    let entry = lines
        .iter()
        .find(|l| l.starts_with("data.bin"))
        .expect("data.bin missing from listing");
    let (_, size) = entry.rsplit_once(' ').unwrap();
    assert_eq!(size.parse::<u64>().unwrap(), 5);
}

#[tokio::test]
async fn recursive_list_includes_nested_entries() {
    let root = TestRoot::new();
    fs::create_dir(root.path().join("sub")).unwrap();
    let mut f = File::create(root.path().join("sub").join("inner.txt")).unwrap();
    f.write_all(b"x").unwrap();
    root.write_file("top.txt", "y");
    let port = start_server(root.path()).await;

    let lines = list_exchange(port, "-lr").await;
    assert!(lines.iter().any(|l| l.contains("sub/inner.txt")));
    assert!(lines.iter().any(|l| l.contains("top.txt")));
}

#[tokio::test]
async fn get_streams_file_contents_line_by_line() {
    let root = TestRoot::new();
    root.write_file("poem.txt", "line one\nline two\n");
    let port = start_server(root.path()).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();

    let mut control = ControlConn::connect(port).await;
    control
        .send_line(&format!("-g poem.txt {}", data_port))
        .await;
    assert_eq!(control.read_line().await, GOOD);

    control.send_line(READY).await;
    let (data, _) = data_listener.accept().await.unwrap();
    let mut reader = BufReader::new(data);

    // file-ready sentinel arrives on the data connection
    let mut first = String::new();
    reader.read_line(&mut first).await.unwrap();
    assert_eq!(first.trim_end(), GOOD);

    control.send_line(READY).await;
    let lines = read_until_done(&mut reader).await;
    assert_eq!(lines, vec!["line one", "line two"]);
}

#[tokio::test]
async fn cancel_after_file_ready_sends_no_content() {
    let root = TestRoot::new();
    root.write_file("big.txt", "should never arrive\n");
    let port = start_server(root.path()).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();

    let mut control = ControlConn::connect(port).await;
    control.send_line(&format!("-g big.txt {}", data_port)).await;
    assert_eq!(control.read_line().await, GOOD);

    control.send_line(READY).await;
    let (data, _) = data_listener.accept().await.unwrap();
    let mut reader = BufReader::new(data);

    let mut first = String::new();
    reader.read_line(&mut first).await.unwrap();
    assert_eq!(first.trim_end(), GOOD);

    control.send_line(CANCEL).await;
    let lines = read_until_done(&mut reader).await;
    assert!(lines.is_empty());
}

#[tokio::test]
async fn get_missing_file_sends_bad_then_error_then_done() {
    let root = TestRoot::new();
    let port = start_server(root.path()).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();

    let mut control = ControlConn::connect(port).await;
    control
        .send_line(&format!("-g nope.txt {}", data_port))
        .await;
    assert_eq!(control.read_line().await, GOOD);

    control.send_line(READY).await;
    let (data, _) = data_listener.accept().await.unwrap();
    let mut reader = BufReader::new(data);

    let lines = read_until_done(&mut reader).await;
    assert_eq!(
        lines,
        vec![
            BAD.to_string(),
            "Response: Error - \"nope.txt\" not found".to_string()
        ]
    );
}

#[tokio::test]
async fn invalid_command_gets_error_reply_on_control() {
    let root = TestRoot::new();
    let port = start_server(root.path()).await;

    let mut control = ControlConn::connect(port).await;
    control.send_line("-x 5000").await;
    let reply = control.read_line().await;
    assert!(
        reply.starts_with("Error: An invalid command was provided"),
        "unexpected reply: {}",
        reply
    );
}

#[tokio::test]
async fn data_port_equal_to_control_port_is_rejected() {
    let root = TestRoot::new();
    let port = start_server(root.path()).await;

    let mut control = ControlConn::connect(port).await;
    control.send_line(&format!("-l {}", port)).await;
    let reply = control.read_line().await;
    assert!(
        reply.starts_with("Error: Invalid data port argument. The data port should not be"),
        "unexpected reply: {}",
        reply
    );
}

#[tokio::test]
async fn serves_a_second_client_after_the_first_completes() {
    let root = TestRoot::new();
    root.write_file("only.txt", "data");
    let port = start_server(root.path()).await;

    let first = list_exchange(port, "-l").await;
    let second = list_exchange(port, "-l").await;
    assert_eq!(first, second);
    assert!(second.contains(&"only.txt".to_string()));
}
