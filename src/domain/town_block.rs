use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{PersistError, Result};

use super::{parse_number, split_parts};

/// One claimable cell of a world grid. Text form: `world,x,z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TownBlock {
    pub world: String,
    pub x: i32,
    pub z: i32,
}

impl TownBlock {
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }
}

impl fmt::Display for TownBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.world, self.x, self.z)
    }
}

impl FromStr for TownBlock {
    type Err = PersistError;

    fn from_str(text: &str) -> Result<Self> {
        let [world, x, z] = split_parts::<3>(text, "town block")?;
        if world.is_empty() {
            return Err(PersistError::ParseError(format!(
                "town block '{}' has no world",
                text
            )));
        }
        Ok(Self::new(
            world,
            parse_number(x, "block x")?,
            parse_number(z, "block z")?,
        ))
    }
}

crate::persist_scalar!(TownBlock);
