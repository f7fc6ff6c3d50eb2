use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use dropwatch_core::MonitorConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP server answering each path with a fixed status and body.
/// Routes can be swapped between runs.
pub struct PageServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
}

impl PageServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let routes: Arc<Mutex<HashMap<String, (u16, String)>>> = Arc::default();

        let shared = routes.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = shared.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();

                    let (code, body) = routes
                        .lock()
                        .unwrap()
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, "missing".to_string()));

                    let response = format!(
                        "HTTP/1.1 {} Canned\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        code,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self { addr, routes }
    }

    pub fn route(&self, path: &str, code: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (code, body.to_string()));
    }

    pub fn url(&self, template_path: &str) -> String {
        format!("http://{}{}", self.addr, template_path)
    }

    /// Config pointing both sources at this server, with state in `dir`.
    pub fn config(&self, dir: &Path) -> MonitorConfig {
        let mut config = MonitorConfig {
            state_file: dir.join("domain_status.json"),
            ..MonitorConfig::default()
        };
        config.sources.dropcatch_url = self.url("/domain/{domain}");
        config.sources.whois_url = self.url("/whois/{domain}");
        config.http.timeout_secs = 5;
        config.validated().expect("valid test config")
    }
}
