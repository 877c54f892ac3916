pub mod config;
pub mod cursor;
pub mod decode;
pub mod dump;
pub mod error;
pub mod label;
pub mod listing;
pub mod render;

pub use config::Config;
pub use decode::{DecodedLine, Decoder};
pub use error::Error;
pub use label::LabelTable;
pub use listing::{disassemble, disassemble_with, Listing};
