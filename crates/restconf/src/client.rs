//! Blocking RESTCONF session with one switch.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use declarative::{Device, DeviceError, Method, Operation};
use log::{debug, trace};
use serde_json::Value;
use ureq::Agent;
use ureq::http::Response;
use ureq::tls::TlsConfig;
use yangpath::Path;

use crate::error::{Error, Result};
use crate::retry::{LogCallback, with_retry};
use crate::types::{ConnectionConfig, RetryConfig, YANG_JSON};

/// RESTCONF client implementing [`Device`].
///
/// Reads are retried on transient failures; mutations are sent once.
///
/// # Example
///
/// ```no_run
/// use declarative::{Device, Path};
/// use restconf::{ConnectionConfig, RestconfClient};
///
/// let config = ConnectionConfig::new("10.0.0.1").with_credentials("admin", "YourPaSsWoRd");
/// let mut client = RestconfClient::new(config).unwrap();
/// let body = client.get(&Path::parse("data/openconfig-qos:qos/pfc-watchdog").unwrap()).unwrap();
/// println!("{body:?}");
/// ```
pub struct RestconfClient {
    agent: Agent,
    base_url: String,
    authorization: String,
    retry: RetryConfig,
}

impl RestconfClient {
    /// Open a session. No request is made until the first call.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let agent_config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .tls_config(TlsConfig::builder().disable_verification(!config.verify_tls).build())
            .build();

        let credentials = format!("{}:{}", config.username, config.password);
        Ok(Self {
            agent: Agent::new_with_config(agent_config),
            base_url: config.base_url(),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            retry: RetryConfig::default(),
        })
    }

    /// Use `retry` for reads.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of a resource path.
    pub fn url(&self, path: &Path) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path`, `None` when the device reports nothing there.
    pub fn fetch(&self, path: &Path) -> Result<Option<Value>> {
        let url = self.url(path);
        with_retry(&self.retry, Some(&LogCallback), || {
            debug!("GET {url}");
            let response = self
                .agent
                .get(&url)
                .header("Accept", YANG_JSON)
                .header("Authorization", &self.authorization)
                .call()?;
            let (status, body) = read(response)?;
            match status {
                404 => Ok(None),
                200..=299 if body.trim().is_empty() => Ok(None),
                200..=299 => Ok(Some(serde_json::from_str(&body)?)),
                _ => Err(Error::http(error_message(status, &body), Some(status))),
            }
        })
    }

    /// Send one mutation and return the status the device answered with.
    pub fn apply(&self, op: &Operation) -> Result<u16> {
        let url = self.url(op.path());
        debug!("{} {url}", op.method());

        let response = match op.method() {
            Method::Get => self
                .agent
                .get(&url)
                .header("Accept", YANG_JSON)
                .header("Authorization", &self.authorization)
                .call()?,
            Method::Delete => self
                .agent
                .delete(&url)
                .header("Accept", YANG_JSON)
                .header("Authorization", &self.authorization)
                .call()?,
            method @ (Method::Patch | Method::Post) => {
                let body = serde_json::to_string(op.payload().unwrap_or(&Value::Null))?;
                trace!("{body}");
                let request = if method == Method::Patch {
                    self.agent.patch(&url)
                } else {
                    self.agent.post(&url)
                };
                request
                    .header("Accept", YANG_JSON)
                    .header("Content-Type", YANG_JSON)
                    .header("Authorization", &self.authorization)
                    .send(body.as_bytes())?
            }
        };

        let (status, body) = read(response)?;
        if (200..300).contains(&status) {
            Ok(status)
        } else {
            Err(Error::http(error_message(status, &body), Some(status)))
        }
    }
}

impl Device for RestconfClient {
    fn get(&mut self, path: &Path) -> std::result::Result<Option<Value>, DeviceError> {
        self.fetch(path).map_err(DeviceError::from)
    }

    fn send(&mut self, op: &Operation) -> std::result::Result<u16, DeviceError> {
        self.apply(op).map_err(DeviceError::from)
    }
}

fn read(mut response: Response<ureq::Body>) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string()?;
    trace!("HTTP {status}: {body}");
    Ok((status, body))
}

/// Message of the first `ietf-restconf:errors` entry, or the bare status.
fn error_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        let errors = value.get("ietf-restconf:errors").or_else(|| value.get("errors"))?;
        let first = errors.get("error")?.as_array()?.first()?;
        let text = first
            .get("error-message")
            .or_else(|| first.get("error-tag"))?
            .as_str()?;
        Some(text.to_string())
    });
    match message {
        Some(message) => format!("HTTP {status}: {message}"),
        None => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Answer one connection per canned response and return the raw requests
    fn serve(responses: Vec<(u16, &'static str)>) -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                requests.push(read_request(&mut stream));
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/yang-data+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
            requests
        });
        (port, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length || n == 0 {
                    return text;
                }
            }
            if n == 0 {
                return text;
            }
        }
    }

    fn client(port: u16) -> RestconfClient {
        let config = ConnectionConfig {
            tls: false,
            port: Some(port),
            timeout: Duration::from_secs(5),
            ..ConnectionConfig::new("127.0.0.1").with_credentials("admin", "secret")
        };
        RestconfClient::new(config).unwrap().with_retry_config(RetryConfig {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            backoff_factor: 1.0,
            max_delay: Duration::from_millis(1),
        })
    }

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    #[test]
    fn test_url() {
        let client = client(8080);
        assert_eq!(
            client.url(&path("data/openconfig-qos:qos/queues/queue=Eth1%2f5:0")),
            "http://127.0.0.1:8080/restconf/data/openconfig-qos:qos/queues/queue=Eth1%2f5:0"
        );
    }

    #[test]
    fn test_rejects_bad_host() {
        assert!(RestconfClient::new(ConnectionConfig::new("")).is_err());
    }

    #[test]
    fn test_get_sends_auth_and_parses_body() {
        let (port, server) = serve(vec![(200, r#"{"openconfig-qos:pfc-watchdog": {"poll": {}}}"#)]);
        let mut client = client(port);

        let body = client.get(&path("data/openconfig-qos:qos/pfc-watchdog")).unwrap();
        assert_eq!(body, Some(json!({"openconfig-qos:pfc-watchdog": {"poll": {}}})));

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("GET /restconf/data/openconfig-qos:qos/pfc-watchdog "));
        // admin:secret
        assert!(requests[0].contains("YWRtaW46c2VjcmV0"));
        assert!(requests[0].to_ascii_lowercase().contains("accept: application/yang-data+json"));
    }

    #[test]
    fn test_get_not_found_is_empty() {
        let (port, server) = serve(vec![(404, "")]);
        let mut client = client(port);
        assert_eq!(client.get(&path("data/openconfig-qos:qos/queues")).unwrap(), None);
        server.join().unwrap();
    }

    #[test]
    fn test_get_retries_unavailable() {
        let (port, server) = serve(vec![(503, ""), (200, r#"{"openconfig-qos:queues": {}}"#)]);
        let mut client = client(port);
        let body = client.get(&path("data/openconfig-qos:qos/queues")).unwrap();
        assert_eq!(body, Some(json!({"openconfig-qos:queues": {}})));
        assert_eq!(server.join().unwrap().len(), 2);
    }

    #[test]
    fn test_patch_sends_payload_once() {
        let (port, server) = serve(vec![(204, "")]);
        let mut client = client(port);
        let op = Operation::patch(
            path("data/openconfig-qos:qos/pfc-watchdog/poll/config/poll-interval"),
            json!(150),
        );
        assert_eq!(client.send(&op).unwrap(), 204);

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("PATCH "));
        assert!(requests[0].to_ascii_lowercase().contains("content-type: application/yang-data+json"));
        assert!(requests[0].ends_with(r#"{"openconfig-qos:poll-interval":150}"#));
    }

    #[test]
    fn test_mutation_error_is_not_retried() {
        let body = r#"{"ietf-restconf:errors": {"error": [{"error-type": "application", "error-tag": "invalid-value", "error-message": "Entry not found"}]}}"#;
        let (port, server) = serve(vec![(400, body)]);
        let mut client = client(port);
        let op = Operation::delete(path("data/openconfig-qos:qos/queues/queue=Eth1%2f5:9"));

        let err = client.send(&op).unwrap_err();
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "HTTP 400: Entry not found");
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(500, "oops"), "HTTP 500");
        assert_eq!(
            error_message(409, r#"{"ietf-restconf:errors": {"error": [{"error-tag": "resource-denied"}]}}"#),
            "HTTP 409: resource-denied"
        );
    }
}
