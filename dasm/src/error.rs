use arch::{catalog::CatalogError, op::Mnemonic};
use color_print::ceprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown opcode: no instruction starts with `{bits:08b}`")]
    UnknownOpcode { offset: usize, bits: u8 },

    #[error("Misaligned read: bit offset {bit} inside byte 0x{offset:04X}")]
    Misaligned { offset: usize, bit: u8 },

    #[error("Missing operand for `{mnemonic}`")]
    MissingOperand { offset: usize, mnemonic: Mnemonic },

    #[error("Unresolved jump: displacement {displacement} does not land on an instruction")]
    JumpUnresolved { offset: usize, displacement: i16 },

    #[error("Truncated input: byte 0x{offset:04X} requested but input is {len} bytes")]
    Truncated { offset: usize, len: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Config(String, #[source] serde_yaml::Error),
}

impl Error {
    /// Byte offset into the input the error points at, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::UnknownOpcode { offset, .. }
            | Error::Misaligned { offset, .. }
            | Error::MissingOperand { offset, .. }
            | Error::JumpUnresolved { offset, .. }
            | Error::Truncated { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Print error with the input offset and the bytes around it.
    pub fn print_diag(&self, file: &str, bytes: &[u8]) {
        ceprintln!("<red,bold>error</>: {}", self);

        let Some(offset) = self.offset() else {
            return;
        };
        ceprintln!("     <blue>--></> <underline>{}:0x{:04X}</>", file, offset);
        ceprintln!("      <blue>|</>");

        // Show the row of 8 bytes holding the offset, marking the offending one.
        let row = offset / 8 * 8;
        let cells: Vec<String> = (row..row + 8)
            .filter_map(|idx| bytes.get(idx).map(|b| (idx, b)))
            .map(|(idx, b)| {
                if idx == offset {
                    color_print::cformat!("<r,s>{:08b}</>", b)
                } else {
                    format!("{:08b}", b)
                }
            })
            .collect();
        ceprintln!(" <blue>{:04X} |</> {}", row, cells.join(" "));
        ceprintln!("      <blue>|</>");
    }
}
