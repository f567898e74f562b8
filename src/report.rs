// StepWatch — Status Reporter
//
// Fire-and-forget HTTP GET carrying the cumulative step count. The
// connection lives only for the duration of one `report` call and is torn
// down on every exit path when it goes out of scope.

use anyhow::Context;
use embedded_svc::http::client::{Client, Response};
use embedded_svc::http::{Headers, Status};
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use log::{debug, info, warn};
use stepwatch_core::report::{drain_body, report_url, DrainEnd};
use stepwatch_core::{StatusReporter, StepCount};

use crate::config::*;

pub struct Reporter {
    host: &'static str,
    port: u16,
    drain_body: bool,
}

impl Reporter {
    pub fn new(host: &'static str, port: u16, drain_body: bool) -> Self {
        Self {
            host,
            port,
            drain_body,
        }
    }

    /// Send one report. Errors are for the caller to log; nothing is retried.
    pub fn send(&self, steps: StepCount) -> anyhow::Result<()> {
        let url = report_url(self.host, self.port, steps).map_err(|e| anyhow::anyhow!("{}", e))?;
        debug!("GET {}", url);

        // The socket timeout doubles as the body inactivity timeout.
        let connection = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(NETWORK_TIMEOUT),
            ..Default::default()
        })
        .context("Connect failed")?;
        let mut client = Client::wrap(connection);

        let request = client.get(&url).context("Connect failed")?;
        let mut response = request.submit().context("Getting response failed")?;
        info!("startedRequest ok");
        info!("Got status code: {}", response.status());

        match response.content_len() {
            Some(len) => info!("Content length is: {}", len),
            None => info!("Content length is: unknown"),
        }

        if self.drain_body {
            drain(&mut response);
        }
        Ok(())
    }
}

impl StatusReporter for Reporter {
    type Error = anyhow::Error;

    fn report(&mut self, steps: StepCount) -> anyhow::Result<()> {
        self.send(steps)
    }
}

fn drain(response: &mut Response<&mut EspHttpConnection>) {
    info!("Body returned follows:");
    let mut buf = [0u8; REPORT_BODY_CHUNK];
    let summary = drain_body(response, &mut buf, |chunk| {
        info!("{}", String::from_utf8_lossy(chunk));
    });

    match summary.end {
        DrainEnd::Closed => debug!("Body complete ({} bytes)", summary.bytes),
        DrainEnd::Failed(e) => warn!("Body read stopped after {} bytes: {}", summary.bytes, e),
    }
}
