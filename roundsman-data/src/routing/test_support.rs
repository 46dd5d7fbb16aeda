//! Test utilities for routing providers.
//!
//! [`OsrmStub`] is a loopback HTTP server answering every request with one
//! canned OSRM Table response, so provider and CLI tests exercise the real
//! HTTP path without a running OSRM instance.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use serde_json::{Value, json};

/// Canned response served by [`OsrmStub`].
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    body: String,
}

impl StubResponse {
    /// Successful table response from durations (seconds) and distances
    /// (metres). `None` cells serialise as `null`.
    #[must_use]
    pub fn table(durations: &[Vec<Option<f64>>], distances: &[Vec<Option<f64>>]) -> Self {
        Self::json(
            200,
            &json!({
                "code": "Ok",
                "durations": durations,
                "distances": distances,
            }),
        )
    }

    /// Table response derived from a duration matrix, with distances at ten
    /// metres per second.
    #[must_use]
    pub fn from_durations(durations: &[Vec<f64>]) -> Self {
        let wrap = |scale: f64| -> Vec<Vec<Option<f64>>> {
            durations
                .iter()
                .map(|row| row.iter().map(|secs| Some(secs * scale)).collect())
                .collect()
        };
        Self::table(&wrap(1.0), &wrap(10.0))
    }

    /// OSRM application error such as `NoTable`.
    #[must_use]
    pub fn service_error(code: &str, message: &str) -> Self {
        Self::json(200, &json!({ "code": code, "message": message }))
    }

    /// Non-success HTTP status with a plain body.
    #[must_use]
    pub fn http_status(status: u16) -> Self {
        Self {
            status,
            body: String::from("unavailable"),
        }
    }

    /// Raw body served with status 200.
    #[must_use]
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }
}

/// Loopback HTTP server replaying a [`StubResponse`].
///
/// The server thread lives until the process exits; request lines are
/// recorded for assertions.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use roundsman_core::TravelMatrixProvider;
/// use roundsman_data::routing::OsrmProvider;
/// use roundsman_data::routing::test_support::{OsrmStub, StubResponse};
///
/// let stub = OsrmStub::start(StubResponse::from_durations(&[vec![0.0, 60.0], vec![60.0, 0.0]]))?;
/// let provider = OsrmProvider::new(stub.base_url())?;
/// let matrix = provider.get_travel_matrix(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 0.01, y: 0.0 }])?;
/// assert_eq!(matrix.duration_secs(0, 1), Some(60.0));
/// assert_eq!(matrix.distance_km(0, 1), Some(0.6));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct OsrmStub {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl OsrmStub {
    /// Bind an ephemeral loopback port and start serving `response`.
    ///
    /// # Errors
    ///
    /// Returns the bind error when no loopback port is available.
    pub fn start(response: StubResponse) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                if let Err(err) = serve(stream, &response, &seen) {
                    log::warn!("OSRM stub failed to answer: {err}");
                }
            }
        });
        Ok(Self { addr, requests })
    }

    /// Base URL to configure the provider with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request lines received so far, e.g. `GET /table/v1/... HTTP/1.1`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn serve(
    stream: TcpStream,
    response: &StubResponse,
    seen: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut header = String::new();
    while reader.read_line(&mut header)? > 0 && !header.trim_end().is_empty() {
        header.clear();
    }
    seen.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request_line.trim_end().to_owned());

    let mut writer = stream;
    write!(
        writer,
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    )?;
    writer.flush()
}
