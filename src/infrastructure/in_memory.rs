use crate::domain::ports::SettingsStore;
use crate::domain::settings::Settings;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory settings store.
///
/// Starts from the first-run defaults and forgets everything on exit.
#[derive(Default, Clone)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<Settings>>,
}

impl InMemorySettingsStore {
    /// Creates a store holding the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<Settings> {
        let settings = self.settings.read().await;
        Ok(settings.clone())
    }

    async fn save(&self, settings: Settings) -> Result<()> {
        let mut current = self.settings.write().await;
        *current = settings;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::Coordinate;
    use crate::domain::settings::{CannedOutcome, SimulationMode};

    #[tokio::test]
    async fn test_in_memory_defaults() {
        let store = InMemorySettingsStore::new();
        assert_eq!(
            store.simulation_mode().await.unwrap(),
            SimulationMode::Canned(CannedOutcome::AllSuccess)
        );
    }

    #[tokio::test]
    async fn test_in_memory_save_and_load() {
        let store = InMemorySettingsStore::new();
        let mut settings = store.load().await.unwrap();
        settings.use_mobile_location = false;
        settings.stubbed_location = Coordinate::new(1.3, 103.8);

        store.save(settings.clone()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_set_simulation_mode_keeps_other_settings() {
        let store = InMemorySettingsStore::with_settings(Settings {
            use_mobile_location: false,
            ..Settings::default()
        });

        store.set_simulation_mode(SimulationMode::Off).await.unwrap();

        let settings = store.load().await.unwrap();
        assert_eq!(settings.simulation, SimulationMode::Off);
        assert!(!settings.use_mobile_location);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemorySettingsStore::new();
        let clone = store.clone();
        clone
            .set_simulation_mode(SimulationMode::Canned(CannedOutcome::VendingFailed))
            .await
            .unwrap();
        assert_eq!(
            store.simulation_mode().await.unwrap(),
            SimulationMode::Canned(CannedOutcome::VendingFailed)
        );
    }
}
