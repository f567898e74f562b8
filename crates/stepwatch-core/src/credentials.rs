//! WiFi credentials kept in a persistent key-value namespace.
//!
//! The boot path only ever reads them. Writing happens in the separate
//! provisioning mode.

use core::fmt;

use log::{error, info, warn};
use thiserror_no_std::Error;

/// Key-value namespace holding the credentials.
pub const NVS_NAMESPACE: &str = "storage";
pub const SSID_KEY: &str = "ssid";
pub const PASS_KEY: &str = "pass";

/// 802.11 SSIDs are at most 32 bytes.
pub const SSID_CAPACITY: usize = 32;
/// WPA2 passphrases are at most 64 bytes.
pub const PASSWORD_CAPACITY: usize = 64;

pub type Ssid = heapless::String<SSID_CAPACITY>;
pub type Password = heapless::String<PASSWORD_CAPACITY>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("value for `{key}` is longer than {capacity} bytes")]
    TooLong { key: &'static str, capacity: usize },
}

/// Minimal string key-value store, as offered by ESP-IDF NVS.
pub trait KeyValueStore {
    type Error: fmt::Debug;

    /// Read the string stored under `key` into `buf`. `Ok(None)` means the
    /// key has never been written.
    fn get_str<'a>(&self, key: &str, buf: &'a mut [u8]) -> Result<Option<&'a str>, Self::Error>;

    /// Length in bytes of the string stored under `key`, without any
    /// terminator. `Ok(None)` means the key has never been written.
    fn str_len(&self, key: &str) -> Result<Option<usize>, Self::Error>;

    fn set_str(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Make previous writes durable. Stores that write through on every
    /// `set_str` can keep the default.
    fn commit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: Ssid,
    pub password: Password,
}

impl Credentials {
    /// Build credentials, refusing values that do not fit the bounded
    /// buffers instead of truncating them.
    pub fn new(ssid: &str, password: &str) -> Result<Self, CredentialError> {
        Ok(Self {
            ssid: bounded(SSID_KEY, ssid)?,
            password: bounded(PASS_KEY, password)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ssid.is_empty()
    }
}

fn bounded<const N: usize>(key: &'static str, value: &str) -> Result<heapless::String<N>, CredentialError> {
    let mut out = heapless::String::new();
    out.push_str(value)
        .map_err(|_| CredentialError::TooLong { key, capacity: N })?;
    Ok(out)
}

/// Result of reading the credentials at boot. Every variant lets the boot
/// continue; they only differ in what gets logged and which values survive.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome<E> {
    /// Both keys were present.
    Loaded(Credentials),
    /// At least one key has never been written. Values that were present are
    /// kept, missing ones are empty.
    NotFound {
        credentials: Credentials,
        missing: &'static str,
    },
    /// The store failed to read a key.
    StorageError(E),
    /// A stored value does not fit its buffer.
    Invalid(CredentialError),
}

impl<E> LoadOutcome<E> {
    /// Credentials to attempt the WiFi connection with. Empty after an
    /// error.
    pub fn into_credentials(self) -> Credentials {
        match self {
            Self::Loaded(credentials) | Self::NotFound { credentials, .. } => credentials,
            Self::StorageError(_) | Self::Invalid(_) => Credentials::default(),
        }
    }
}

enum KeyRead<T> {
    Found(T),
    Missing,
}

fn read_key<S, const N: usize>(
    store: &S,
    key: &'static str,
) -> Result<KeyRead<heapless::String<N>>, LoadOutcome<S::Error>>
where
    S: KeyValueStore + ?Sized,
{
    // Size check first: a value longer than the read buffer would otherwise
    // come back from the store as a generic read error.
    match store.str_len(key) {
        Ok(Some(len)) if len > N => {
            return Err(LoadOutcome::Invalid(CredentialError::TooLong { key, capacity: N }))
        }
        Ok(Some(_)) => {}
        Ok(None) => return Ok(KeyRead::Missing),
        Err(e) => return Err(LoadOutcome::StorageError(e)),
    }

    // Room for the NUL ESP-IDF counts.
    let mut buf = [0u8; PASSWORD_CAPACITY + 1];
    match store.get_str(key, &mut buf) {
        Ok(Some(value)) => bounded(key, value)
            .map(KeyRead::Found)
            .map_err(LoadOutcome::Invalid),
        Ok(None) => Ok(KeyRead::Missing),
        Err(e) => Err(LoadOutcome::StorageError(e)),
    }
}

fn load_inner<S>(store: &S) -> LoadOutcome<S::Error>
where
    S: KeyValueStore + ?Sized,
{
    let ssid = match read_key::<S, SSID_CAPACITY>(store, SSID_KEY) {
        Ok(read) => read,
        Err(outcome) => return outcome,
    };
    let password = match read_key::<S, PASSWORD_CAPACITY>(store, PASS_KEY) {
        Ok(read) => read,
        Err(outcome) => return outcome,
    };

    match (ssid, password) {
        (KeyRead::Found(ssid), KeyRead::Found(password)) => {
            LoadOutcome::Loaded(Credentials { ssid, password })
        }
        (KeyRead::Missing, password) => LoadOutcome::NotFound {
            credentials: Credentials {
                ssid: Ssid::new(),
                password: match password {
                    KeyRead::Found(p) => p,
                    KeyRead::Missing => Password::new(),
                },
            },
            missing: SSID_KEY,
        },
        (KeyRead::Found(ssid), KeyRead::Missing) => LoadOutcome::NotFound {
            credentials: Credentials {
                ssid,
                password: Password::new(),
            },
            missing: PASS_KEY,
        },
    }
}

/// Read SSID and password from `store`, logging the outcome.
pub fn load_credentials<S>(store: &S) -> LoadOutcome<S::Error>
where
    S: KeyValueStore + ?Sized,
{
    info!("Retrieving SSID/PASSWD");
    let outcome = load_inner(store);
    match &outcome {
        LoadOutcome::Loaded(credentials) => info!("Done (ssid `{}`)", credentials.ssid),
        LoadOutcome::NotFound { missing, .. } => {
            warn!("The value is not initialized yet! (`{}` missing)", missing)
        }
        LoadOutcome::StorageError(e) => error!("Error ({:?}) reading!", e),
        LoadOutcome::Invalid(e) => error!("Error ({}) reading!", e),
    }
    outcome
}

/// Write `credentials` under the SSID and password keys and commit.
pub fn provision<S>(store: &mut S, credentials: &Credentials) -> Result<(), S::Error>
where
    S: KeyValueStore + ?Sized,
{
    info!("Updating ssid/pass in NVS ...");
    let written = store
        .set_str(SSID_KEY, &credentials.ssid)
        .and_then(|()| store.set_str(PASS_KEY, &credentials.password));
    match &written {
        Ok(()) => info!("Done"),
        Err(e) => error!("Failed! ({:?})", e),
    }
    written?;

    info!("Committing updates in NVS ...");
    let committed = store.commit();
    match &committed {
        Ok(()) => info!("Done"),
        Err(e) => error!("Failed! ({:?})", e),
    }
    committed
}
