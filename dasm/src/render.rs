use arch::{ea::Base, op::Mnemonic, reg::Reg};
use std::fmt;

/// Operand size spelled out on immediates whose width is otherwise ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Byte,
    Word,
}

impl Size {
    pub fn new(wide: bool) -> Self {
        if wide {
            Size::Word
        } else {
            Size::Byte
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Byte => write!(f, "byte"),
            Size::Word => write!(f, "word"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    /// Base registers plus a signed displacement.
    Mem { base: Base, disp: i16 },
    /// Absolute 16-bit address.
    Direct(u16),
    Imm { value: i16, size: Option<Size> },
}

impl Operand {
    pub fn is_mem(&self) -> bool {
        matches!(self, Operand::Mem { .. } | Operand::Direct(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Mem { base, disp: 0 } => write!(f, "[{}]", base),
            Operand::Mem { base, disp } if disp > 0 => write!(f, "[{}+{}]", base, disp),
            Operand::Mem { base, disp } => write!(f, "[{}-{}]", base, disp.unsigned_abs()),
            Operand::Direct(addr) => write!(f, "[{}]", addr),
            Operand::Imm {
                value,
                size: Some(size),
            } => write!(f, "{} {}", size, value),
            Operand::Imm { value, size: None } => write!(f, "{}", value),
        }
    }
}

/// Put the primary operand first when `dir` is set, second otherwise.
pub fn order(primary: Operand, secondary: Operand, dir: bool) -> [Operand; 2] {
    if dir {
        [primary, secondary]
    } else {
        [secondary, primary]
    }
}

/// `MNEMONIC a, b`.
pub fn render(mnemonic: Mnemonic, operands: &[Operand]) -> String {
    let operands: Vec<String> = operands.iter().map(|op| op.to_string()).collect();
    if operands.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{} {}", mnemonic, operands.join(", "))
    }
}
