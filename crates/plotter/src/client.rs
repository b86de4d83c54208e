//! Fire-and-forget JSON POSTs to the plotter server.
//!
//! Each call sends one request and drops the response unread. Error statuses
//! are logged, not returned, and nothing is retried.

use std::time::Duration;

use fresco_core::Shape;
use serde::Serialize;
use ureq::{Agent, AgentBuilder, ErrorKind};

use crate::config::PlotterConfig;
use crate::error::PlotterError;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct DrawRequest {
    /// Each path is a list of `[x, y]` points; closed shapes repeat their
    /// first point at the end.
    paths: Vec<Vec<[f64; 2]>>,
}

#[derive(Serialize)]
struct CanvasSize {
    width: f64,
    height: f64,
}

#[derive(Debug, Clone)]
pub struct PlotterClient {
    addr: String,
    agent: Agent,
}

impl Default for PlotterClient {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

fn agent(timeout: Duration) -> Agent {
    AgentBuilder::new().timeout(timeout).build()
}

impl PlotterClient {
    /// `addr` is `host:port`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            agent: agent(DEFAULT_TIMEOUT),
        }
    }

    /// Overall timeout of each request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent(timeout);
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends shapes as polylines. Shapes with fewer than two vertices are
    /// skipped. Returns the number of paths sent.
    pub fn draw(&self, shapes: &[Shape]) -> Result<usize, PlotterError> {
        let request = draw_request(shapes);
        let count = request.paths.len();
        self.post("/draw", &request)?;
        Ok(count)
    }

    pub fn config(&self, config: &PlotterConfig) -> Result<(), PlotterError> {
        self.post("/config", config)
    }

    /// Size of the coordinate space the drawn paths live in.
    pub fn canvas_size(&self, width: f64, height: f64) -> Result<(), PlotterError> {
        self.post("/canvas_size", &CanvasSize { width, height })
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), PlotterError> {
        let body = serde_json::to_string(body)?;
        let url = format!("http://{}{path}", self.addr);
        let sent = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body);
        match sent {
            Ok(response) => {
                log::debug!("POST {url} -> {} ({} byte body)", response.status(), body.len());
                Ok(())
            }
            Err(ureq::Error::Status(status, _)) => {
                log::debug!("POST {url} -> {status}, ignored");
                Ok(())
            }
            Err(ureq::Error::Transport(transport)) => {
                let err = self.transport_error(path, transport);
                log::warn!("{err}");
                Err(err)
            }
        }
    }

    fn transport_error(&self, path: &str, transport: ureq::Transport) -> PlotterError {
        let source = Box::new(transport);
        match source.kind() {
            ErrorKind::InvalidUrl | ErrorKind::Dns | ErrorKind::ConnectionFailed => {
                PlotterError::Connect {
                    addr: self.addr.clone(),
                    source,
                }
            }
            _ => PlotterError::Send {
                path: path.to_string(),
                source,
            },
        }
    }
}

fn draw_request(shapes: &[Shape]) -> DrawRequest {
    let paths = shapes
        .iter()
        .filter(|s| s.len() >= 2)
        .map(|s| s.outline().into_iter().map(|p| [p.x, p.y]).collect())
        .collect();
    DrawRequest { paths }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresco_core::DVec2;
    use serde_json::{json, Value};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Accepts one request, answers it with `status` and returns its head
    /// and JSON body.
    fn capture_one(status: &'static str) -> (String, thread::JoinHandle<(String, Value)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    length = v.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" {
                    break;
                }
            }
            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(reply.as_bytes()).unwrap();
            (head, serde_json::from_slice(&body).unwrap())
        });
        (addr, handle)
    }

    #[test]
    fn draw_posts_paths() {
        let (addr, server) = capture_one("200 OK");
        let square = Shape::rect(DVec2::ZERO, DVec2::splat(2.0));
        let line = Shape::polyline(vec![DVec2::new(1.0, 1.0), DVec2::new(3.0, 4.0)]);
        let dot = Shape::polyline(vec![DVec2::ZERO]);
        let sent = PlotterClient::new(addr).draw(&[square, line, dot]).unwrap();
        assert_eq!(sent, 2);

        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("POST /draw HTTP/1.1\r\n"));
        assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
        let paths = body["paths"].as_array().unwrap();
        assert_eq!(paths.len(), 2);
        // closed square repeats its first point
        assert_eq!(paths[0].as_array().unwrap().len(), 5);
        assert_eq!(paths[1], json!([[1.0, 1.0], [3.0, 4.0]]));
    }

    #[test]
    fn config_and_canvas_size_bodies() {
        let (addr, server) = capture_one("200 OK");
        PlotterClient::new(addr).config(&PlotterConfig::default()).unwrap();
        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("POST /config "));
        assert_eq!(body["paper"], "A4");

        let (addr, server) = capture_one("200 OK");
        PlotterClient::new(addr).canvas_size(640.0, 480.0).unwrap();
        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("POST /canvas_size "));
        assert_eq!(body, json!({"width": 640.0, "height": 480.0}));
    }

    #[test]
    fn error_status_is_not_an_error() {
        let (addr, server) = capture_one("500 Internal Server Error");
        PlotterClient::new(addr).canvas_size(1.0, 1.0).unwrap();
        server.join().unwrap();
    }

    #[test]
    fn unreachable_server_is_a_connect_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let client = PlotterClient::new(addr).with_timeout(Duration::from_millis(200));
        let err = client.canvas_size(1.0, 1.0).unwrap_err();
        assert!(matches!(err, PlotterError::Connect { .. }));
    }

    #[test]
    fn bad_address_is_a_connect_error() {
        let err = PlotterClient::new("no port here").canvas_size(1.0, 1.0).unwrap_err();
        assert!(matches!(err, PlotterError::Connect { .. }));
    }
}
