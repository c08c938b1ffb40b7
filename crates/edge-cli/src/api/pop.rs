use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Latitude:{} Longitude:{} X:{} Y:{}}}",
            self.latitude, self.longitude, self.x, self.y
        )
    }
}

/// A point of presence.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Datacenter {
    pub name: String,
    pub code: String,
    pub group: String,
    pub shield: String,
    pub coordinates: Coordinates,
}
