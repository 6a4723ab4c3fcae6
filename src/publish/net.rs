//! Host address discovery for printing reachable report URLs.

use std::process::Command;

/// Addresses this host is reachable on, from `hostname -I`.
///
/// Falls back to `localhost` when the command is unavailable or prints
/// nothing.
pub fn local_addresses() -> Vec<String> {
    let addrs = Command::new("hostname")
        .arg("-I")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| parse_address_list(&s))
        .unwrap_or_default();
    if addrs.is_empty() {
        vec!["localhost".to_string()]
    } else {
        addrs
    }
}

/// Split whitespace-separated addresses, bracketing IPv6 ones for URLs.
pub fn parse_address_list(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|a| {
            if a.contains(':') {
                format!("[{a}]")
            } else {
                a.to_string()
            }
        })
        .collect()
}

/// `http://<addr>:<port>/<file>`
pub fn report_url(addr: &str, port: u16, file_name: &str) -> String {
    format!("http://{addr}:{port}/{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_list() {
        assert_eq!(
            parse_address_list("10.0.0.5 172.17.0.1 fe80::1 \n"),
            vec!["10.0.0.5", "172.17.0.1", "[fe80::1]"]
        );
        assert!(parse_address_list("  \n").is_empty());
    }

    #[test]
    fn test_report_url() {
        assert_eq!(
            report_url("10.0.0.5", 6033, "slowsql-analysis-2024-04-16-10-30.html"),
            "http://10.0.0.5:6033/slowsql-analysis-2024-04-16-10-30.html"
        );
    }

    #[test]
    fn test_local_addresses_never_empty() {
        assert!(!local_addresses().is_empty());
    }
}
