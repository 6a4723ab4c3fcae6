//! Static file server for the report directory.
//!
//! Serves files under a root directory verbatim over HTTP. Request paths are
//! percent-decoded per segment; segments that would leave the root are
//! refused. Directories serve their `index.html` or a listing.

use std::fs;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

use super::shutdown::ShutdownToken;
use crate::{ReportError, ReportResult};

/// How often the listener wakes up to check for cancellation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Bytes escaped when a file name is written into a listing link.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct Publisher {
    server: Server,
    root: Arc<Path>,
}

impl Publisher {
    /// Bind a listener on `addr` serving files under `root`.
    pub fn bind(addr: &str, root: impl Into<PathBuf>) -> ReportResult<Self> {
        let server = Server::http(addr).map_err(|e| ReportError::Network {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        let root: Arc<Path> = Arc::from(root.into());
        info!(addr, root = %root.display(), "report server listening");
        Ok(Publisher { server, root })
    }

    /// Bind on all interfaces at `port`.
    pub fn bind_port(port: u16, root: impl Into<PathBuf>) -> ReportResult<Self> {
        Self::bind(&format!("0.0.0.0:{port}"), root)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests on a new thread until `token` is cancelled.
    pub fn spawn(self, token: ShutdownToken) -> JoinHandle<()> {
        std::thread::spawn(move || self.serve_until(&token))
    }

    /// Accept requests on the current thread until `token` is cancelled.
    ///
    /// Each response is written from its own thread, so a slow or stalled
    /// client never holds up the accept loop. In-flight responses are not
    /// drained; the loop exits at the next poll.
    pub fn serve_until(&self, token: &ShutdownToken) {
        while !token.is_cancelled() {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => {
                    let root = Arc::clone(&self.root);
                    let spawned = std::thread::Builder::new()
                        .name("report-response".to_string())
                        .spawn(move || respond(&root, request));
                    if let Err(e) = spawned {
                        warn!(error = %e, "failed to spawn response thread");
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "failed to receive request");
                }
            }
        }
        debug!("report server stopped");
    }
}

fn respond(root: &Path, request: Request) {
    debug!(method = %request.method(), url = request.url(), "request");
    let response = match request.method() {
        Method::Get | Method::Head => lookup(root, request.url()),
        _ => text_response("Method Not Allowed", 405),
    };
    if let Err(e) = request.respond(response) {
        debug!(error = %e, "failed to send response");
    }
}

fn lookup(root: &Path, url: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let Some(path) = resolve_request_path(root, url) else {
        return text_response("Not Found", 404);
    };
    if path.is_dir() {
        let index = path.join("index.html");
        if index.is_file() {
            return file_response(&index);
        }
        return match directory_listing(&path, url) {
            Some(html) => with_content_type(Response::from_data(html.into_bytes()), "text/html; charset=utf-8"),
            None => text_response("Not Found", 404),
        };
    }
    file_response(&path)
}

/// Map a request URL onto a path under `root`.
///
/// The query string and fragment are ignored and each segment is
/// percent-decoded before it is checked. Returns `None` for segments that
/// are not valid UTF-8 or that do not name a single entry inside the
/// current directory (`..`, an encoded `/`, a drive prefix).
pub fn resolve_request_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let mut resolved = root.to_path_buf();
    for raw in path.split('/') {
        let segment = percent_decode_str(raw).decode_utf8().ok()?;
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment.as_ref()).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => resolved.push(part),
            _ => return None,
        }
    }
    Some(resolved)
}

fn file_response(path: &Path) -> Response<std::io::Cursor<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            with_content_type(Response::from_data(bytes), mime.essence_str())
        }
        Err(_) => text_response("Not Found", 404),
    }
}

fn text_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    with_content_type(
        Response::from_string(body).with_status_code(status),
        "text/plain; charset=utf-8",
    )
}

fn with_content_type(
    response: Response<std::io::Cursor<Vec<u8>>>,
    content_type: &str,
) -> Response<std::io::Cursor<Vec<u8>>> {
    match Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn directory_listing(dir: &Path, url: &str) -> Option<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() {
                name.push('/');
            }
            name
        })
        .collect();
    names.sort();

    let base = url.split(['?', '#']).next().unwrap_or_default();
    let base = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
    let mut html = String::from("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"></head><body><pre>\n");
    for name in names {
        let href = utf8_percent_encode(&name, PATH_SEGMENT).to_string();
        html.push_str(&format!(
            "<a href=\"{}{}\">{}</a>\n",
            html_escape(&base),
            html_escape(&href),
            html_escape(&name)
        ));
    }
    html.push_str("</pre></body></html>\n");
    Some(html)
}

/// Escape `& < > " '` for insertion into HTML.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
