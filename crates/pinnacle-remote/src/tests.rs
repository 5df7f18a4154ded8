use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use pinnacle_core::{Architecture, OperatingSystem, Platform};

use super::*;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    fn with(url: &str, body: &[u8]) -> Self {
        let mut bodies = HashMap::new();
        bodies.insert(url.to_string(), body.to_vec());
        Self { bodies }
    }
}

impl Fetch for StaticFetcher {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        let body = self
            .bodies
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("request to {url} received status code: 404"))?;
        Ok(Box::new(io::Cursor::new(body)))
    }
}

struct BrokenBody;

impl Read for BrokenBody {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
    }
}

struct BrokenFetcher;

impl Fetch for BrokenFetcher {
    fn get(&self, _url: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(BrokenBody))
    }
}

fn scratch_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "pinnacle-remote-tests-{}-{nanos}-{}",
        std::process::id(),
        SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    fs::create_dir_all(&dir).expect("must create scratch dir");
    dir
}

/// Serves exactly one HTTP response and hands back the raw request head.
fn serve_once(status_line: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("must bind loopback");
    let addr = listener.local_addr().expect("must have local addr");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("must accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("must clone stream"));
        let mut head = String::new();
        loop {
            let mut line = String::new();
            let read = reader.read_line(&mut line).expect("must read request line");
            if read == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }

        let mut stream = stream;
        write!(
            stream,
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .expect("must write response head");
        stream.write_all(body).expect("must write response body");
        stream.flush().expect("must flush response");
        head
    });
    (format!("http://{addr}"), handle)
}

fn linux_x86() -> Platform {
    Platform::new(OperatingSystem::Linux, Architecture::X86_64)
}

#[test]
fn user_agent_names_version_os_and_arch() {
    assert_eq!(user_agent("1.2.3", linux_x86()), "Pinnacle/1.2.3 (linux; x86)");
}

#[test]
fn endpoints_build_bundle_and_runtime_urls() {
    let endpoints = MetadataEndpoints::new("https://meta.example.test/");
    assert_eq!(endpoints.bundle_url(), "https://meta.example.test/pinnacle");
    assert_eq!(
        endpoints.runtime_url(Platform::new(OperatingSystem::Mac, Architecture::Arm64)),
        "https://meta.example.test/jre?version=17&os=mac&arch=arm64"
    );
}

#[test]
fn resolve_descriptor_decodes_metadata() {
    let fetcher = StaticFetcher::with(
        "https://meta.example.test/pinnacle",
        br#"{"url":"https://cdn.example.test/launcher.jar","sha1":"abc","size":7}"#,
    );
    let descriptor = resolve_descriptor(&fetcher, "https://meta.example.test/pinnacle")
        .expect("descriptor must resolve");
    assert_eq!(descriptor.url, "https://cdn.example.test/launcher.jar");
    assert_eq!(descriptor.sha1, "abc");
    assert_eq!(descriptor.size, 7);
}

#[test]
fn resolve_descriptor_fails_on_malformed_body() {
    let fetcher = StaticFetcher::with("https://meta.example.test/pinnacle", b"<html>");
    let err = resolve_descriptor(&fetcher, "https://meta.example.test/pinnacle")
        .expect_err("html is not a descriptor");
    assert!(err.to_string().contains("decoding response from"));
}

#[test]
fn resolve_descriptor_fails_when_request_fails() {
    let fetcher = StaticFetcher::with("https://meta.example.test/other", b"{}");
    let err = resolve_descriptor(&fetcher, "https://meta.example.test/pinnacle")
        .expect_err("unknown url must fail");
    assert!(err.to_string().contains("making request to"));
}

#[test]
fn download_to_file_truncates_existing_destination() {
    let dir = scratch_dir();
    let path = dir.join("launcher.jar");
    fs::write(&path, b"a much longer stale payload").expect("must seed stale file");

    let fetcher = StaticFetcher::with("https://cdn.example.test/launcher.jar", b"fresh");
    let written = download_to_file(&fetcher, "https://cdn.example.test/launcher.jar", &path)
        .expect("download must succeed");

    assert_eq!(written, 5);
    assert_eq!(fs::read(&path).expect("must read download"), b"fresh");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn download_to_file_propagates_body_read_errors() {
    let dir = scratch_dir();
    let path = dir.join("jre.zip");
    let err = download_to_file(&BrokenFetcher, "https://cdn.example.test/jre.zip", &path)
        .expect_err("broken body must fail");
    assert!(err.to_string().contains("failed to write"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn download_to_file_fails_when_destination_cannot_be_created() {
    let dir = scratch_dir();
    let path = dir.join("missing-parent").join("launcher.jar");
    let fetcher = StaticFetcher::with("https://cdn.example.test/launcher.jar", b"fresh");
    let err = download_to_file(&fetcher, "https://cdn.example.test/launcher.jar", &path)
        .expect_err("missing parent must fail");
    assert!(err.to_string().contains("failed to create"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn http_fetcher_returns_body_and_sends_user_agent() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", b"payload");
    let fetcher = HttpFetcher::for_platform("9.9.9", linux_x86()).expect("client must build");

    let mut body = fetcher
        .get(&format!("{base}/pinnacle"))
        .expect("request must succeed");
    let mut received = String::new();
    body.read_to_string(&mut received)
        .expect("body must be readable");
    drop(body);

    assert_eq!(received, "payload");
    let head = server.join().expect("server must not panic");
    assert!(head.starts_with("GET /pinnacle HTTP/1.1"));
    assert!(head
        .to_ascii_lowercase()
        .contains("user-agent: pinnacle/9.9.9 (linux; x86)"));
}

#[test]
fn http_fetcher_rejects_non_ok_status() {
    let (base, server) = serve_once("HTTP/1.1 404 Not Found", b"missing");
    let fetcher = HttpFetcher::for_platform("9.9.9", linux_x86()).expect("client must build");

    let err = fetcher
        .get(&format!("{base}/pinnacle"))
        .err()
        .expect("404 must fail");
    assert!(err.to_string().contains("received status code: 404"));
    server.join().expect("server must not panic");
}

#[test]
fn http_fetcher_fails_when_nothing_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("must bind loopback");
    let addr = listener.local_addr().expect("must have local addr");
    drop(listener);

    let fetcher = HttpFetcher::for_platform("9.9.9", linux_x86()).expect("client must build");
    assert!(fetcher.get(&format!("http://{addr}/pinnacle")).is_err());
}
