use super::machine::{Coordinate, Machine};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest amount a real transport may authorize in one session.
pub const DEFAULT_MAX_AMOUNT: Decimal = dec!(1.00);

/// Fixed, pre-scripted result played back by the simulated transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum CannedOutcome {
    AllSuccess,
    DeviceNotLocated,
    ConnectionFailed,
    VendingFailed,
}

impl fmt::Display for CannedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            CannedOutcome::AllSuccess => "All success",
            CannedOutcome::DeviceNotLocated => "Device not located",
            CannedOutcome::ConnectionFailed => "Connection failed",
            CannedOutcome::VendingFailed => "Vending failed",
        };
        f.write_str(description)
    }
}

/// Whether sessions talk to real hardware or to a canned simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "outcome", rename_all = "lowercase")]
pub enum SimulationMode {
    Off,
    Canned(CannedOutcome),
}

/// Process-wide settings kept by the settings store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub simulation: SimulationMode,
    /// Use the device location instead of `stubbed_location`.
    pub use_mobile_location: bool,
    pub stubbed_location: Coordinate,
}

impl Default for Settings {
    /// First-run settings: simulate a fully successful vend.
    fn default() -> Self {
        Self {
            simulation: SimulationMode::Canned(CannedOutcome::AllSuccess),
            use_mobile_location: true,
            stubbed_location: Coordinate::default(),
        }
    }
}

/// Configuration captured once when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub simulation: SimulationMode,
}

impl From<SimulationMode> for SessionConfig {
    fn from(simulation: SimulationMode) -> Self {
        Self { simulation }
    }
}

/// Parameters for opening a device transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSpec {
    Real {
        model: String,
        serial: String,
        service_id: String,
        max_amount: Decimal,
    },
    Simulated(CannedOutcome),
}

impl TransportSpec {
    /// The only place where simulation is distinguished from real hardware.
    pub fn for_session(config: &SessionConfig, machine: &Machine) -> Self {
        match config.simulation {
            SimulationMode::Canned(outcome) => TransportSpec::Simulated(outcome),
            SimulationMode::Off => TransportSpec::Real {
                model: machine.model.clone(),
                serial: machine.serial.clone(),
                service_id: machine.service_id.clone(),
                max_amount: DEFAULT_MAX_AMOUNT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_simulate_success() {
        let settings = Settings::default();
        assert_eq!(
            settings.simulation,
            SimulationMode::Canned(CannedOutcome::AllSuccess)
        );
        assert!(settings.use_mobile_location);
    }

    #[test]
    fn test_simulation_mode_serialization() {
        let json =
            serde_json::to_string(&SimulationMode::Canned(CannedOutcome::VendingFailed)).unwrap();
        assert_eq!(json, r#"{"mode":"canned","outcome":"vendingFailed"}"#);

        let off: SimulationMode = serde_json::from_str(r#"{"mode":"off"}"#).unwrap();
        assert_eq!(off, SimulationMode::Off);
    }

    #[test]
    fn test_transport_spec_real_uses_machine_identity() {
        let machine = Machine::demo();
        let spec = TransportSpec::for_session(&SimulationMode::Off.into(), &machine);
        assert_eq!(
            spec,
            TransportSpec::Real {
                model: machine.model.clone(),
                serial: machine.serial.clone(),
                service_id: machine.service_id.clone(),
                max_amount: dec!(1.00),
            }
        );
    }

    #[test]
    fn test_transport_spec_simulated() {
        let config = SessionConfig::from(SimulationMode::Canned(CannedOutcome::DeviceNotLocated));
        assert_eq!(
            TransportSpec::for_session(&config, &Machine::demo()),
            TransportSpec::Simulated(CannedOutcome::DeviceNotLocated)
        );
    }
}
