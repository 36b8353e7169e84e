//! Local HTTP/1.1 server for integration tests: HEAD plus `Range` GET over a
//! single static body, with switches for the server quirks the engine must
//! cope with.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// HEAD answers 405 (servers that block HEAD).
    pub block_head: bool,
    /// GET ignores `Range` and answers 200 with the full body.
    pub ignore_ranges: bool,
    /// HEAD sends `Accept-Ranges: none`.
    pub refuse_ranges: bool,
    /// HEAD omits `Content-Length`; GET without range closes to delimit.
    pub hide_length: bool,
    /// `Content-Disposition` filename to announce.
    pub filename: Option<String>,
    /// A ranged GET starting at this offset answers 500.
    pub fail_range_at: Option<u64>,
}

pub struct RangeServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl RangeServer {
    /// Requests received so far (HEAD and GET).
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub fn start(body: Vec<u8>) -> RangeServer {
    start_with(body, ServerOptions::default())
}

/// Serve `body` from a background thread until the process exits.
pub fn start_with(body: Vec<u8>, opts: ServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                handle(stream, &body, &opts);
            });
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/files/payload.bin", port),
        requests,
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(data).ok()
}

fn handle(mut stream: TcpStream, body: &[u8], opts: &ServerOptions) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_head(&mut stream) else { return };
    let (method, range) = parse_request(&request);
    let total = body.len() as u64;

    let mut headers = String::from("Connection: close\r\n");
    if let Some(name) = &opts.filename {
        headers.push_str(&format!("Content-Disposition: attachment; filename=\"{}\"\r\n", name));
    }

    if method == "HEAD" {
        if opts.block_head {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
            return;
        }
        if !opts.hide_length {
            headers.push_str(&format!("Content-Length: {}\r\n", total));
        }
        headers.push_str(if opts.refuse_ranges {
            "Accept-Ranges: none\r\n"
        } else {
            "Accept-Ranges: bytes\r\n"
        });
        let _ = stream.write_all(format!("HTTP/1.1 200 OK\r\n{}\r\n", headers).as_bytes());
        return;
    }
    if method != "GET" {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    match range.filter(|_| !opts.ignore_ranges) {
        Some((start, _)) if opts.fail_range_at == Some(start) => {
            let _ = stream.write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n");
        }
        Some((start, end)) if start < total => {
            let end = end.min(total - 1);
            let slice = &body[start as usize..=end as usize];
            headers.push_str(&format!(
                "Content-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n",
                slice.len(),
                start,
                end,
                total
            ));
            let _ = stream.write_all(format!("HTTP/1.1 206 Partial Content\r\n{}\r\n", headers).as_bytes());
            let _ = stream.write_all(slice);
        }
        Some(_) => {
            let _ = stream.write_all(
                format!("HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\n\r\n", total)
                    .as_bytes(),
            );
        }
        None => {
            if !opts.hide_length {
                headers.push_str(&format!("Content-Length: {}\r\n", total));
            }
            let _ = stream.write_all(format!("HTTP/1.1 200 OK\r\n{}\r\n", headers).as_bytes());
            let _ = stream.write_all(body);
        }
    }
}

/// Method and the `bytes=start-end` range, if any.
fn parse_request(request: &str) -> (String, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("")
        .to_ascii_uppercase();
    let range = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("range"))
        .and_then(|(_, value)| value.trim().strip_prefix("bytes="))
        .and_then(|spec| spec.split_once('-'))
        .and_then(|(a, b)| {
            let start = a.trim().parse().ok()?;
            let end = match b.trim() {
                "" => u64::MAX,
                e => e.parse().ok()?,
            };
            Some((start, end))
        });
    (method, range)
}
