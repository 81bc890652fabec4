pub mod flatfile;

pub use flatfile::{FlatFileParser, FlatFileWriter, ParsedRecord};
