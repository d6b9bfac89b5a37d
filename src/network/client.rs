//! HTTP client wrapper - executes probes and formats responses

use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::messages::NetworkResponse;
use crate::models::HttpMethod;
use crate::network::request::PreparedRequest;

/// Build a reqwest request from a prepared probe
fn build_request(client: &reqwest::Client, request: &PreparedRequest) -> reqwest::RequestBuilder {
    let url = request.url.as_str();
    let mut req_builder = match request.method {
        HttpMethod::GET => client.get(url),
        HttpMethod::POST => client.post(url),
        HttpMethod::PUT => client.put(url),
        HttpMethod::PATCH => client.patch(url),
        HttpMethod::DELETE => client.delete(url),
    };

    for (name, value) in &request.headers {
        req_builder = req_builder.header(name, value);
    }

    if let Some(body) = &request.body {
        req_builder = req_builder.body(body.clone());
    }

    req_builder
}

/// Render a response body for display.
///
/// JSON responses are pretty-printed; anything else, including JSON that
/// doesn't parse, is shown as a JSON string literal.
pub fn format_body(content_type: Option<&str>, text: String) -> String {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        if let Ok(json) = serde_json::from_str::<Value>(&text) {
            if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                return pretty;
            }
        }
    }
    serde_json::to_string_pretty(&Value::String(text.clone())).unwrap_or(text)
}

/// Display body for a request that never got a response
pub fn failure_body(message: &str) -> String {
    let value = json!({ "error": message });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| message.to_string())
}

fn describe_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("Request timed out ({}s)", timeout.as_secs())
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        format!("Request failed: {}", e)
    }
}

/// Execute a probe and return the response (buffered)
pub async fn execute_probe(
    client: &reqwest::Client,
    request: PreparedRequest,
    timeout: Duration,
    request_id: u64,
) -> NetworkResponse {
    let start = Instant::now();
    let result = build_request(client, &request).send().await;

    let failed = |message: String, start: Instant| NetworkResponse::Failed {
        id: request_id,
        body: failure_body(&message),
        message,
        time_ms: start.elapsed().as_millis() as u64,
    };

    match result {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match resp.text().await {
                Ok(text) => NetworkResponse::Completed {
                    id: request_id,
                    status,
                    body: format_body(content_type.as_deref(), text),
                    time_ms: start.elapsed().as_millis() as u64,
                },
                Err(e) => failed(format!("Error reading body: {}", e), start),
            }
        }
        Err(e) => failed(describe_error(&e, timeout), start),
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestSpec;
    use crate::network::request::prepare;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            raw
        });
        (format!("http://{}/items", addr), handle)
    }

    /// Read the request head plus a `Content-Length` body
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let body_len = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= head_end + 4 + body_len {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn client() -> reqwest::Client {
        create_client(Duration::from_secs(5))
    }

    #[test]
    fn test_format_json_body() {
        let body = format_body(Some("application/json; charset=utf-8"), r#"{"a":1}"#.into());
        assert_eq!(body, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_format_invalid_json_falls_back_to_text() {
        let body = format_body(Some("application/json"), "oops {".into());
        assert_eq!(body, "\"oops {\"");
        assert_eq!(body, format_body(Some("text/plain"), "oops {".into()));
    }

    #[test]
    fn test_format_text_body_as_string_literal() {
        assert_eq!(format_body(Some("text/plain"), "Not Found".into()), "\"Not Found\"");
        assert_eq!(format_body(None, "a\"b".into()), "\"a\\\"b\"");
    }

    #[test]
    fn test_failure_body() {
        assert_eq!(failure_body("boom"), "{\n  \"error\": \"boom\"\n}");
    }

    #[tokio::test]
    async fn test_successful_get_is_pretty_printed() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 7\r\nConnection: close\r\n\r\n{\"a\":1}",
        )
        .await;

        let request = prepare(&RequestSpec::new(HttpMethod::GET, &url)).unwrap();
        let response = execute_probe(&client(), request, Duration::from_secs(5), 7).await;

        match response {
            NetworkResponse::Completed { id, status, body, .. } => {
                assert_eq!(id, 7);
                assert_eq!(status, 200);
                assert_eq!(body, "{\n  \"a\": 1\n}");
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("get /items"));
        assert!(raw.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_not_found_text_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 9\r\nConnection: close\r\n\r\nNot Found",
        )
        .await;

        let spec = RequestSpec::new(HttpMethod::POST, &url)
            .with_headers(r#"{"X-Trace": "abc"}"#)
            .with_body(r#"{"name":"x"}"#);
        let request = prepare(&spec).unwrap();
        let response = execute_probe(&client(), request, Duration::from_secs(5), 1).await;

        match response {
            NetworkResponse::Completed { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "\"Not Found\"");
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /items"));
        assert!(raw.to_ascii_lowercase().contains("x-trace: abc"));
        assert!(raw.ends_with(r#"{"name":"x"}"#));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{}/", addr);

        let request = prepare(&RequestSpec::new(HttpMethod::GET, &url)).unwrap();
        let response = execute_probe(&client(), request, Duration::from_secs(5), 3).await;

        match response {
            NetworkResponse::Failed { id, message, body, .. } => {
                assert_eq!(id, 3);
                assert!(!message.is_empty());
                assert!(body.starts_with("{\n  \"error\": "));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
