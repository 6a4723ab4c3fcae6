//! Optional HTTP publishing of the generated report.

pub mod net;
pub mod server;
pub mod shutdown;

pub use net::{local_addresses, report_url};
pub use server::{Publisher, resolve_request_path};
pub use shutdown::{ShutdownToken, wait_for_termination};

use std::path::Path;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::{ReportError, ReportResult};

/// Upper bound on waiting for the listener after shutdown.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Serve `root` on `port`, print where `file_name` can be reached, and block
/// until SIGINT/SIGTERM. In-flight responses are abandoned on shutdown.
pub fn publish(port: u16, root: &Path, file_name: &str) -> ReportResult<()> {
    let publisher = Publisher::bind_port(port, root)?;
    let token = ShutdownToken::new();
    let handle = publisher.spawn(token.clone());

    println!("\nReport available at:");
    for addr in local_addresses() {
        println!("  {}", report_url(&addr, port, file_name));
    }
    println!("Press Ctrl+C to stop the web server\n");

    let waited = wait_for_termination(&token);
    token.cancel();
    stop_listener(handle, STOP_TIMEOUT)?;
    waited
}

/// Join the listener thread once it has observed cancellation.
///
/// Gives up after `timeout` and leaves the thread detached; a panic in the
/// listener is reported as an error.
pub fn stop_listener(handle: JoinHandle<()>, timeout: Duration) -> ReportResult<()> {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!("report server did not stop in time; abandoning it");
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    handle
        .join()
        .map_err(|_| ReportError::Message("report server thread panicked".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_listener_joins_finished_thread() {
        let handle = std::thread::spawn(|| {});
        assert!(stop_listener(handle, Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn test_stop_listener_reports_panic() {
        let handle = std::thread::spawn(|| panic!("listener failed"));
        let result = stop_listener(handle, Duration::from_secs(2));
        assert!(matches!(result, Err(ReportError::Message(_))));
    }

    #[test]
    fn test_stop_listener_gives_up_after_timeout() {
        let token = ShutdownToken::new();
        let stuck = token.clone();
        let handle = std::thread::spawn(move || {
            while !stuck.is_cancelled() {
                std::thread::sleep(Duration::from_millis(10));
            }
        });

        let started = Instant::now();
        assert!(stop_listener(handle, Duration::from_millis(100)).is_ok());
        assert!(started.elapsed() < Duration::from_secs(2));
        token.cancel();
    }
}
