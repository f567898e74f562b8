// StepWatch — NVS Credential Store
//
// Adapts an ESP-IDF NVS namespace to the core `KeyValueStore` seam.

use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;
use stepwatch_core::credentials::{load_credentials, NVS_NAMESPACE};
use stepwatch_core::{Credentials, KeyValueStore};

pub struct NvsStore(EspNvs<NvsDefault>);

impl NvsStore {
    /// Open the credential namespace read/write. The handle is closed when
    /// the store is dropped.
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self, EspError> {
        log::info!("Opening Non-Volatile Storage (NVS) handle...");
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        log::info!("Done");
        Ok(Self(nvs))
    }
}

impl KeyValueStore for NvsStore {
    type Error = EspError;

    fn get_str<'a>(&self, key: &str, buf: &'a mut [u8]) -> Result<Option<&'a str>, EspError> {
        self.0.get_str(key, buf)
    }

    fn str_len(&self, key: &str) -> Result<Option<usize>, EspError> {
        // NVS counts the trailing NUL.
        Ok(self.0.str_len(key)?.map(|len| len.saturating_sub(1)))
    }

    // EspNvs commits inside every set_str, so the default `commit` is enough.
    fn set_str(&mut self, key: &str, value: &str) -> Result<(), EspError> {
        self.0.set_str(key, value)
    }
}

/// Read the WiFi credentials at boot. Never fails: a missing key, a read
/// error or an unopenable namespace all fall back to whatever could be read
/// (possibly nothing) so the WiFi attempt still happens.
pub fn load_boot_credentials(partition: EspDefaultNvsPartition) -> Credentials {
    match NvsStore::open(partition) {
        Ok(store) => load_credentials(&store).into_credentials(),
        Err(e) => {
            log::error!("Error ({}) opening NVS handle!", e);
            Credentials::default()
        }
    }
}
