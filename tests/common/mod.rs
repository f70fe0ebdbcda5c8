#![allow(dead_code)]

pub mod test_server {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::{Arc, Once};
    use todolist_api::app::build_service;
    use todolist_api::config::AppConfig;
    use todolist_api::server::{HttpServer, ServerHandle};
    use todolist_api::store::{InMemoryTodoStore, TodoStore};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    pub fn static_site_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static_site")
    }

    /// A running server on a free port with its own store, stopped on drop.
    pub struct TestServer {
        handle: Option<ServerHandle>,
        addr: SocketAddr,
        pub store: Arc<dyn TodoStore>,
    }

    impl TestServer {
        /// Seeded store, default configuration plus the shipped static site.
        pub fn new() -> Self {
            Self::with_store(Arc::new(InMemoryTodoStore::with_samples()))
        }

        /// Empty store.
        pub fn empty() -> Self {
            Self::with_store(Arc::new(InMemoryTodoStore::new()))
        }

        pub fn with_store(store: Arc<dyn TodoStore>) -> Self {
            let mut config = AppConfig::default();
            config.server.static_dir = Some(static_site_dir());
            Self::with_config(config, store)
        }

        pub fn with_config(config: AppConfig, store: Arc<dyn TodoStore>) -> Self {
            std::env::set_var("TODO_STACK_SIZE", "0x8000");
            setup_may_runtime();
            let service = build_service(&config, Arc::clone(&store)).unwrap();
            let handle = HttpServer(service).start("127.0.0.1:0").unwrap();
            handle.wait_ready().unwrap();
            let addr = handle.addr();
            Self {
                handle: Some(handle),
                addr,
                store,
            }
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(handle) = self.handle.take() {
                handle.stop();
            }
        }
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::{Duration, Instant};

    #[derive(Debug)]
    pub struct TestResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl TestResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn json(&self) -> serde_json::Value {
            serde_json::from_str(&self.body)
                .unwrap_or_else(|e| panic!("body is not JSON ({e}): {:?}", self.body))
        }
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn content_length(head: &str) -> Option<usize> {
        head.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
    }

    /// Write a raw request and read one response (headers plus
    /// `Content-Length` bytes of body, or whatever arrives before the timeout).
    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut buf = Vec::new();
        let mut tmp = [0u8; 4096];
        while Instant::now() < deadline {
            if let Some(end) = find_header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..end]);
                if let Some(len) = content_length(&head) {
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    if find_header_end(&buf).is_some() {
                        break;
                    }
                }
                Err(e) => panic!("read error: {e:?}"),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub fn parse_response(resp: &str) -> TestResponse {
        let (head, body) = resp.split_once("\r\n\r\n").unwrap_or((resp, ""));
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|l| l.split_whitespace().nth(1))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let headers = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        TestResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }

    /// Send `method path` with optional extra header lines and JSON body.
    pub fn request(
        addr: &SocketAddr,
        method: &str,
        path: &str,
        extra_headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> TestResponse {
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in extra_headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(body) = body {
            req.push_str("Content-Type: application/json\r\n");
            req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
        } else {
            req.push_str("\r\n");
        }
        parse_response(&send_request(addr, &req))
    }

    pub fn get(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "GET", path, &[], None)
    }

    pub fn post(addr: &SocketAddr, path: &str, body: Option<&str>) -> TestResponse {
        request(addr, "POST", path, &[], body)
    }

    pub fn put(addr: &SocketAddr, path: &str, body: &str) -> TestResponse {
        request(addr, "PUT", path, &[], Some(body))
    }

    pub fn delete(addr: &SocketAddr, path: &str) -> TestResponse {
        request(addr, "DELETE", path, &[], None)
    }
}
