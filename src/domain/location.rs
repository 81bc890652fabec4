use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{PersistError, Result};

use super::{parse_number, split_parts};

/// A point in a named world, with the facing direction.
///
/// Text form: `world,x,y,z,pitch,yaw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pitch: f32,
    pub yaw: f32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    pub fn with_rotation(mut self, pitch: f32, yaw: f32) -> Self {
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.world, self.x, self.y, self.z, self.pitch, self.yaw
        )
    }
}

impl FromStr for Location {
    type Err = PersistError;

    fn from_str(text: &str) -> Result<Self> {
        let [world, x, y, z, pitch, yaw] = split_parts::<6>(text, "location")?;
        if world.is_empty() {
            return Err(PersistError::ParseError(format!(
                "location '{}' has no world",
                text
            )));
        }
        Ok(Self {
            world: world.to_string(),
            x: parse_number(x, "x coordinate")?,
            y: parse_number(y, "y coordinate")?,
            z: parse_number(z, "z coordinate")?,
            pitch: parse_number(pitch, "pitch")?,
            yaw: parse_number(yaw, "yaw")?,
        })
    }
}

crate::persist_scalar!(Location);
