//! HTTP access to the usage endpoint.

use std::time::Duration;

use crate::error::StatusError;

/// Default usage endpoint
pub const DEFAULT_USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Beta header required for the OAuth usage API
const ANTHROPIC_BETA_HEADER: &str = "anthropic-beta";
const ANTHROPIC_BETA_VALUE: &str = "oauth-2025-04-20";

const USER_AGENT: &str = concat!("usageline/", env!("CARGO_PKG_VERSION"));

/// Performs the single GET against the usage endpoint
pub trait UsageTransport {
    /// Return the raw response body for a successful request
    fn get_usage(&self, token: &str) -> Result<String, StatusError>;
}

/// Blocking `ureq` transport with a global timeout
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_ENDPOINT, DEFAULT_TIMEOUT)
    }
}

impl HttpTransport {
    /// Create a transport for `endpoint` whose whole request is bounded by `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    /// Get the configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl UsageTransport for HttpTransport {
    fn get_usage(&self, token: &str) -> Result<String, StatusError> {
        let mut response = self
            .agent
            .get(&self.endpoint)
            .header("Authorization", format!("Bearer {}", token))
            .header(ANTHROPIC_BETA_HEADER, ANTHROPIC_BETA_VALUE)
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(map_ureq_error)?;

        response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)
    }
}

/// Classify a `ureq` failure into the error taxonomy
fn map_ureq_error(err: ureq::Error) -> StatusError {
    match err {
        ureq::Error::StatusCode(code) => StatusError::HttpStatus(code),
        ureq::Error::Timeout(_) => StatusError::Timeout,
        other => StatusError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Instant;

    /// Read one request head from a client connection
    fn read_request_head(stream: &mut std::net::TcpStream) -> String {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&head).to_string()
    }

    #[test]
    fn test_default_endpoint() {
        let transport = HttpTransport::default();
        assert_eq!(transport.endpoint(), DEFAULT_USAGE_ENDPOINT);
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("usageline/"));
        assert!(USER_AGENT.len() > "usageline/".len());
    }

    #[test]
    fn test_status_code_mapping() {
        assert!(matches!(
            map_ureq_error(ureq::Error::StatusCode(401)),
            StatusError::HttpStatus(401)
        ));
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        // Port 9 on localhost: nothing listens, connection is refused fast
        let transport = HttpTransport::new("http://127.0.0.1:9/usage", Duration::from_millis(500));
        match transport.get_usage("token") {
            Err(StatusError::Network(_)) | Err(StatusError::Timeout) => {}
            other => panic!("Expected network failure, got {:?}", other),
        }
    }

    #[test]
    fn test_request_carries_required_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_request_head(&mut stream);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}")
                .unwrap();
            head
        });

        let transport = HttpTransport::new(format!("http://{}/usage", addr), DEFAULT_TIMEOUT);
        let body = transport.get_usage("tok").unwrap();
        assert_eq!(body, "{}");

        let head = server.join().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /usage "), "{}", head);
        assert!(head.contains("authorization: bearer tok\r\n"), "{}", head);
        assert!(head.contains("anthropic-beta: oauth-2025-04-20\r\n"), "{}", head);
        assert!(head.contains("content-type: application/json\r\n"), "{}", head);
        assert!(head.contains("user-agent: usageline/"), "{}", head);
    }

    #[test]
    fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let server = thread::spawn(move || {
            // Hold the connection open without answering
            let (_stream, _) = listener.accept().unwrap();
            let _ = done_rx.recv();
        });

        let timeout = Duration::from_millis(500);
        let transport = HttpTransport::new(format!("http://{}/usage", addr), timeout);
        let started = Instant::now();
        let result = transport.get_usage("tok");
        let elapsed = started.elapsed();
        done_tx.send(()).unwrap();
        server.join().unwrap();

        assert!(
            matches!(result, Err(StatusError::Timeout)),
            "Expected timeout, got {:?}",
            result
        );
        assert!(elapsed >= timeout, "returned after {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);
    }
}
