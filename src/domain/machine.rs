use serde::{Deserialize, Serialize};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Identifies a physical vending machine.
///
/// Machines are fetched by the discovery collaborator and never mutated
/// afterwards. A vend session holds its own copy of the machine it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Display name shown on the receipt.
    pub name: String,
    /// Street address of the machine.
    pub address: String,
    /// Where the machine is.
    pub location: Coordinate,
    /// Device model identifier used when pairing.
    pub model: String,
    /// Device serial used when pairing.
    pub serial: String,
    /// Transport service identifier advertised by the controller.
    pub service_id: String,
}

impl Machine {
    /// Parses a machine description from JSON.
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    /// A stand-in machine for simulated sessions.
    pub fn demo() -> Self {
        Self {
            name: "Demo Vending Machine".to_string(),
            address: "1 Demo Street".to_string(),
            location: Coordinate::default(),
            model: "VMC-DEMO".to_string(),
            serial: "0000-0001".to_string(),
            service_id: "FFF0".to_string(),
        }
    }
}
