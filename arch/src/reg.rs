use num_enum::{FromPrimitive, IntoPrimitive};
use strum::Display;

/// General purpose registers.
///
/// The discriminant is `w << 3 | code`, so the byte registers occupy 0..8 and
/// the word registers 8..16, in the order the REG field encodes them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    FromPrimitive,
    IntoPrimitive,
    Display,
)]
#[repr(u8)]
pub enum Reg {
    #[default]
    AL,
    CL,
    DL,
    BL,
    AH,
    CH,
    DH,
    BH,
    AX,
    CX,
    DX,
    BX,
    SP,
    BP,
    SI,
    DI,
}

impl Reg {
    /// Register selected by a 3-bit REG or R/M field.
    pub fn new(code: u8, wide: bool) -> Self {
        Reg::from(((wide as u8) << 3) | (code & 0b111))
    }

    /// Accumulator of the given width.
    pub fn acc(wide: bool) -> Self {
        Reg::new(0b000, wide)
    }
}
