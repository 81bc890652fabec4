//! Value types of the town domain that get their own adapters.

pub mod location;
pub mod resident;
pub mod town_block;

pub use location::Location;
pub use resident::Resident;
pub use town_block::TownBlock;

use crate::core::{PersistError, Result};

/// Splits `text` into exactly `N` comma separated parts.
fn split_parts<'a, const N: usize>(text: &'a str, what: &str) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    parts.try_into().map_err(|parts: Vec<&str>| {
        PersistError::ParseError(format!(
            "{} needs {} comma separated parts, got {} in '{}'",
            what,
            N,
            parts.len(),
            text
        ))
    })
}

fn parse_number<T>(part: &str, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    part.parse::<T>()
        .map_err(|e| PersistError::ParseError(format!("invalid {} '{}': {}", what, part, e)))
}
