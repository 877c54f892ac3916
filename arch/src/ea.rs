use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;
use strum::Display;

/// Base registers of an effective address, indexed by the R/M field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, IntoPrimitive, Display)]
#[repr(u8)]
pub enum Base {
    #[default]
    #[strum(to_string = "BX+SI")]
    BxSi,
    #[strum(to_string = "BX+DI")]
    BxDi,
    #[strum(to_string = "BP+SI")]
    BpSi,
    #[strum(to_string = "BP+DI")]
    BpDi,
    #[strum(to_string = "SI")]
    Si,
    #[strum(to_string = "DI")]
    Di,
    #[strum(to_string = "BP")]
    Bp,
    #[strum(to_string = "BX")]
    Bx,
}

/// Where a memory operand's address comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ea {
    /// Register combination plus an optional displacement.
    Based(Base),
    /// mod=00 r/m=110: a 16-bit address follows instead of `[BP]`.
    Direct,
}

impl fmt::Display for Ea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ea::Based(base) => write!(f, "{}", base),
            Ea::Direct => write!(f, "DIRADDR"),
        }
    }
}

/// Displacement that follows the ModRM byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disp {
    None,
    Byte,
    Word,
}

pub const MOD_MEM: u8 = 0b00;
pub const MOD_MEM8: u8 = 0b01;
pub const MOD_MEM16: u8 = 0b10;
pub const MOD_REG: u8 = 0b11;

const RM_DIRECT: u8 = 0b110;

/// Effective address for a memory-mode (mod 0..=2) R/M field.
pub fn lookup(mode: u8, rm: u8) -> Option<(Ea, Disp)> {
    match (mode, rm & 0b111) {
        (MOD_MEM, RM_DIRECT) => Some((Ea::Direct, Disp::Word)),
        (MOD_MEM, rm) => Some((Ea::Based(Base::from(rm)), Disp::None)),
        (MOD_MEM8, rm) => Some((Ea::Based(Base::from(rm)), Disp::Byte)),
        (MOD_MEM16, rm) => Some((Ea::Based(Base::from(rm)), Disp::Word)),
        _ => None,
    }
}
