use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{PersistError, Result};

/// A player known to the town system, stored by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resident {
    pub name: String,
}

impl Resident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Resident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Resident {
    type Err = PersistError;

    fn from_str(text: &str) -> Result<Self> {
        let name = text.trim();
        if name.is_empty() {
            return Err(PersistError::ParseError("resident name is empty".into()));
        }
        Ok(Self::new(name))
    }
}

crate::persist_scalar!(Resident);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_name() {
        let resident: Resident = " Alice ".parse().unwrap();
        assert_eq!(resident, Resident::new("Alice"));
        assert_eq!(resident.to_string(), "Alice");
        assert!("   ".parse::<Resident>().is_err());
    }
}
