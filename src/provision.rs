// StepWatch — Credential Provisioning Mode
//
// Built with `--features provision`: writes WIFI_SSID / WIFI_PASS from the
// build environment into NVS and then idles. The normal firmware only reads
// these keys.

use anyhow::Context;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use stepwatch_core::credentials::provision;
use stepwatch_core::Credentials;

use crate::config::*;
use crate::nvs::NvsStore;

pub fn run(partition: EspDefaultNvsPartition) -> anyhow::Result<()> {
    let ssid = PROVISION_SSID.context("WIFI_SSID was not set at build time")?;
    let pass = PROVISION_PASS.unwrap_or("");
    let credentials = Credentials::new(ssid, pass).map_err(|e| anyhow::anyhow!("{}", e))?;

    let mut store = NvsStore::open(partition).context("Error opening NVS handle")?;
    provision(&mut store, &credentials).context("Provisioning failed")?;
    drop(store);

    log::info!("Credentials stored, reflash the normal firmware");
    crate::halt()
}
