use arch::catalog::Catalog;
use std::fmt;

use crate::decode::{DecodedLine, Decoder};
use crate::error::Error;
use crate::label::{self, LabelTable};

pub const HEADER: &str = "bits 16";

/// Decoded program with resolved labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub lines: Vec<DecodedLine>,
    pub labels: LabelTable,
}

/// Decode `bytes` with the built-in catalog and resolve jump targets.
pub fn disassemble(bytes: &[u8]) -> Result<Listing, Error> {
    disassemble_with(bytes, Catalog::builtin())
}

pub fn disassemble_with(bytes: &[u8], catalog: &Catalog) -> Result<Listing, Error> {
    let mut lines = Decoder::new(bytes, catalog).decode_all()?;
    let labels = label::resolve(&mut lines)?;
    Ok(Listing { lines, labels })
}

impl Listing {
    /// Label placed after the last instruction, if any jump lands there.
    pub fn end_label(&self) -> Option<u32> {
        self.labels.get(self.lines.len())
    }

    /// Instruction text with its jump target filled in.
    pub fn text(line: &DecodedLine) -> String {
        match line.target {
            Some(id) => format!("{} {}", line.text, label_name(id)),
            None => line.text.clone(),
        }
    }
}

pub fn label_name(id: u32) -> String {
    format!("label_{}", id)
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        for line in &self.lines {
            if let Some(id) = line.label {
                writeln!(f, "{}:", label_name(id))?;
            }
            writeln!(f, "{}", Listing::text(line))?;
        }
        if let Some(id) = self.end_label() {
            writeln!(f, "{}:", label_name(id))?;
        }
        Ok(())
    }
}
