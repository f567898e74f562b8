// StepWatch — WiFi Station Bring-up
//
// Associates with the stored network and blocks until the interface has an
// address. There is no give-up path: with bad credentials the device keeps
// polling forever, and status query errors only log.

use std::thread;
use std::time::Duration;

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{debug, info, warn};
use stepwatch_core::Credentials;

use crate::config::*;

pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    credentials: &Credentials,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: credentials.ssid.clone(),
        password: credentials.password.clone(),
        auth_method: if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;
    wifi.start()?;

    if credentials.is_empty() {
        warn!("No SSID stored, connection will not succeed until provisioned");
    }
    info!("Connecting to {}", credentials.ssid);

    // Non-blocking connect; progress is observed by polling below.
    if let Err(e) = wifi.wifi_mut().connect() {
        warn!("WiFi connect request failed: {}", e);
    }

    let poll = Duration::from_millis(WIFI_POLL_INTERVAL_MS);
    let mut polls: u32 = 0;
    while !is_ready(&wifi) {
        thread::sleep(poll);
        polls = polls.wrapping_add(1);
        debug!(".");

        if polls % WIFI_RECONNECT_POLLS == 0 {
            warn!(
                "Still not connected after {} ms, retrying",
                u64::from(polls) * WIFI_POLL_INTERVAL_MS
            );
            if let Err(e) = wifi.wifi_mut().connect() {
                warn!("WiFi connect request failed: {}", e);
            }
        }
    }

    info!("WiFi connected");
    let netif = wifi.wifi().sta_netif();
    match netif.get_ip_info() {
        Ok(info) => info!("IP address: {}", info.ip),
        Err(e) => warn!("Could not read IP address: {}", e),
    }
    match netif.get_mac() {
        Ok(mac) => info!("MAC address: {}", format_mac(&mac)),
        Err(e) => warn!("Could not read MAC address: {}", e),
    }

    Ok(wifi)
}

/// Associated and the interface has an address. A failed status query counts
/// as not ready yet.
fn is_ready(wifi: &BlockingWifi<EspWifi<'static>>) -> bool {
    match wifi.is_connected() {
        Ok(true) => {}
        Ok(false) => return false,
        Err(e) => {
            warn!("WiFi status query failed: {}", e);
            return false;
        }
    }
    match wifi.is_up() {
        Ok(up) => up,
        Err(e) => {
            warn!("Network interface query failed: {}", e);
            false
        }
    }
}

fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
