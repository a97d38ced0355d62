//! Test fixtures for building requests and checking stored content.

use sha1::{Digest, Sha1};
use std::net::TcpListener;

/// Multipart boundary used by `multipart_body`.
pub const BOUNDARY: &str = "cass-test-boundary-7MA4YWxkTrZu0gW";

/// Compute SHA-1 hash of data as hex string.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// One part of a multipart form.
#[allow(dead_code)]
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

/// Encode `parts` as a `multipart/form-data` body delimited by `BOUNDARY`.
#[allow(dead_code)]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// `application/x-www-form-urlencoded` encoding of `pairs`.
#[allow(dead_code)]
pub fn form_encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// Whether the sandbox allows binding to localhost (needed by httpmock).
#[allow(dead_code)]
pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// A localhost URL nothing is listening on.
#[allow(dead_code)]
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/missing.bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encode() {
        assert_eq!(
            form_encode(&[("url", "http://h:1/a b?x=1"), ("filename", "a.txt")]),
            "url=http%3A%2F%2Fh%3A1%2Fa%20b%3Fx%3D1&filename=a.txt"
        );
    }

    #[test]
    fn test_multipart_body_shape() {
        let body = multipart_body(&[Part {
            name: "file",
            filename: Some("hello.txt"),
            data: b"hello",
        }]);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with(&format!("--{BOUNDARY}\r\n")));
        assert!(text.contains("filename=\"hello.txt\""));
        assert!(text.ends_with(&format!("\r\nhello\r\n--{BOUNDARY}--\r\n")));
    }
}
