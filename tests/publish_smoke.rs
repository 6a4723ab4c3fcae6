//! Smoke tests for the static report server.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use slowsql_report::publish::{Publisher, ShutdownToken, stop_listener};
use tempfile::tempdir;

fn get(port: u16, path: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

#[test]
fn serves_report_until_cancelled() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("report.html"), "<html>ranked</html>").unwrap();

    let publisher = Publisher::bind("127.0.0.1:0", dir.path()).unwrap();
    let port = publisher.local_addr().unwrap().port();
    let token = ShutdownToken::new();
    let handle = publisher.spawn(token.clone());

    let ok = get(port, "/report.html");
    assert!(ok.starts_with("HTTP/1.1 200"));
    assert!(ok.contains("text/html"));
    assert!(ok.ends_with("<html>ranked</html>"));

    let missing = get(port, "/missing.html");
    assert!(missing.starts_with("HTTP/1.1 404"));

    let escape = get(port, "/../etc/passwd");
    assert!(escape.starts_with("HTTP/1.1 404"));

    let listing = get(port, "/");
    assert!(listing.starts_with("HTTP/1.1 200"));
    assert!(listing.contains("report.html"));

    token.cancel();
    handle.join().unwrap();
}

#[test]
fn serves_names_that_need_url_escaping() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("my report.html"), "spaced").unwrap();
    fs::write(dir.path().join("慢查询.html"), "unicode").unwrap();

    let publisher = Publisher::bind("127.0.0.1:0", dir.path()).unwrap();
    let port = publisher.local_addr().unwrap().port();
    let token = ShutdownToken::new();
    let handle = publisher.spawn(token.clone());

    let spaced = get(port, "/my%20report.html");
    assert!(spaced.starts_with("HTTP/1.1 200"));
    assert!(spaced.ends_with("spaced"));

    let unicode = get(port, "/%E6%85%A2%E6%9F%A5%E8%AF%A2.html");
    assert!(unicode.starts_with("HTTP/1.1 200"));
    assert!(unicode.ends_with("unicode"));

    let encoded_parent = get(port, "/%2e%2e/%2e%2e/etc/passwd");
    assert!(encoded_parent.starts_with("HTTP/1.1 404"));

    token.cancel();
    handle.join().unwrap();
}

#[test]
fn stalled_client_does_not_block_others_or_shutdown() {
    let dir = tempdir().unwrap();
    // Large enough to fill the socket buffers of a client that never reads.
    fs::write(dir.path().join("big.html"), vec![b'x'; 64 * 1024 * 1024]).unwrap();
    fs::write(dir.path().join("report.html"), "<html>ranked</html>").unwrap();

    let publisher = Publisher::bind("127.0.0.1:0", dir.path()).unwrap();
    let port = publisher.local_addr().unwrap().port();
    let token = ShutdownToken::new();
    let handle = publisher.spawn(token.clone());

    let mut stalled = TcpStream::connect(("127.0.0.1", port)).unwrap();
    write!(stalled, "GET /big.html HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
    std::thread::sleep(Duration::from_millis(500));

    let ok = get(port, "/report.html");
    assert!(ok.starts_with("HTTP/1.1 200"));

    token.cancel();
    let started = Instant::now();
    stop_listener(handle, Duration::from_secs(5)).unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "listener took {:?} to stop",
        started.elapsed()
    );
    drop(stalled);
}
