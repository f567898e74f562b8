//! Status report request building and response body draining.

use core::fmt::Write;

use embedded_io::Read;
use thiserror_no_std::Error;

use crate::step::StepCount;

/// Query parameter carrying the cumulative step count.
pub const REPORT_QUERY_KEY: &str = "total_steps_taken";

/// `/?total_steps_taken=` plus at most ten digits.
pub type ReportPath = heapless::String<32>;

pub const REPORT_URL_CAPACITY: usize = 128;
pub type ReportUrl = heapless::String<REPORT_URL_CAPACITY>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("report URL does not fit in {capacity} bytes")]
    UrlTooLong { capacity: usize },
}

/// Request path for a report, e.g. `/?total_steps_taken=42`.
pub fn report_path(steps: StepCount) -> ReportPath {
    let mut path = ReportPath::new();
    // 20 bytes of prefix and a u32 always fit
    let _ = write!(path, "/?{}={}", REPORT_QUERY_KEY, steps);
    path
}

/// Absolute `http://host:port/?total_steps_taken=N` URL for a report.
pub fn report_url(host: &str, port: u16, steps: StepCount) -> Result<ReportUrl, ReportError> {
    let mut url = ReportUrl::new();
    write!(url, "http://{}:{}{}", host, port, report_path(steps)).map_err(|_| {
        ReportError::UrlTooLong {
            capacity: REPORT_URL_CAPACITY,
        }
    })?;
    Ok(url)
}

/// Why draining a body stopped.
#[derive(Debug, PartialEq, Eq)]
pub enum DrainEnd<E> {
    /// The peer closed the connection.
    Closed,
    /// A read failed, including the transport's inactivity timeout.
    Failed(E),
}

#[derive(Debug, PartialEq, Eq)]
pub struct DrainSummary<E> {
    pub bytes: usize,
    pub end: DrainEnd<E>,
}

/// Read `reader` until it reports end of stream or an error, handing every
/// chunk to `on_chunk`.
///
/// There is no deadline of its own here: the inactivity timeout is whatever
/// the underlying connection enforces on a single read.
pub fn drain_body<R, F>(reader: &mut R, buf: &mut [u8], mut on_chunk: F) -> DrainSummary<R::Error>
where
    R: Read + ?Sized,
    F: FnMut(&[u8]),
{
    let mut bytes = 0;
    loop {
        match reader.read(buf) {
            Ok(0) => {
                return DrainSummary {
                    bytes,
                    end: DrainEnd::Closed,
                }
            }
            Ok(n) => {
                bytes += n;
                on_chunk(&buf[..n]);
            }
            Err(e) => {
                return DrainSummary {
                    bytes,
                    end: DrainEnd::Failed(e),
                }
            }
        }
    }
}
