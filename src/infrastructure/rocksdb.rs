use crate::domain::machine::Coordinate;
use crate::domain::ports::SettingsStore;
use crate::domain::settings::{Settings, SimulationMode};
use crate::error::{Result, SessionError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family holding one JSON value per setting.
pub const CF_SETTINGS: &str = "settings";

pub const KEY_SIMULATION: &str = "simulation";
pub const KEY_USE_MOBILE_LOCATION: &str = "useMobileLocation";
pub const KEY_STUBBED_LOCATION: &str = "stubbedLocation";

/// A persistent key-value settings store using RocksDB.
///
/// Each setting lives under its own key so a missing key falls back to its
/// first-run default without disturbing the others.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBSettingsStore {
    db: Arc<DB>,
}

impl RocksDBSettingsStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_settings = ColumnFamilyDescriptor::new(CF_SETTINGS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_settings])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let cf = self.settings_cf()?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let cf = self.settings_cf()?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn settings_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_SETTINGS).ok_or_else(|| {
            SessionError::InternalError(Box::new(std::io::Error::other(
                "Settings column family not found",
            )))
        })
    }
}

#[async_trait]
impl SettingsStore for RocksDBSettingsStore {
    async fn load(&self) -> Result<Settings> {
        let defaults = Settings::default();

        Ok(Settings {
            simulation: self
                .get::<SimulationMode>(KEY_SIMULATION)?
                .unwrap_or(defaults.simulation),
            use_mobile_location: self
                .get::<bool>(KEY_USE_MOBILE_LOCATION)?
                .unwrap_or(defaults.use_mobile_location),
            stubbed_location: self
                .get::<Coordinate>(KEY_STUBBED_LOCATION)?
                .unwrap_or(defaults.stubbed_location),
        })
    }

    async fn save(&self, settings: Settings) -> Result<()> {
        self.put(KEY_SIMULATION, &settings.simulation)?;
        self.put(KEY_USE_MOBILE_LOCATION, &settings.use_mobile_location)?;
        self.put(KEY_STUBBED_LOCATION, &settings.stubbed_location)?;
        Ok(())
    }
}
