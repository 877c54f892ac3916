use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::op::Mnemonic;

/// Shortest and longest primary opcode, in bits. Jump and loop opcodes are
/// whole bytes, so the longest pattern is 8 bits rather than 7.
pub const MIN_LEN: u8 = 2;
pub const MAX_LEN: u8 = 8;

/// Fixed leading bits of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pattern {
    pub bits: u8,
    pub len: u8,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.len as usize)
    }
}

/// Secondary 3-bit opcode. `offset` counts bits from the start of the
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ext {
    pub value: u8,
    pub offset: u8,
}

/// Flag bits directly following the pattern.
///
/// `dir` is the hardcoded direction for shapes without a d bit: `true` prints
/// the primary operand (register, accumulator, or the r/m destination of a
/// register-less shape) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    Bare,
    W { dir: bool },
    DW,
    SW { dir: bool },
}

impl Head {
    pub fn bits(&self) -> u8 {
        match self {
            Head::Bare => 0,
            Head::W { .. } => 1,
            Head::DW | Head::SW { .. } => 2,
        }
    }
}

/// Operand fields after the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    None,
    /// 3-bit REG field only.
    Reg,
    /// mod, reg, r/m.
    ModRegRm,
    /// mod, secondary opcode, r/m.
    ModExtRm(Ext),
    /// Accumulator (AX or AL by width), no field bits.
    Acc,
}

/// Meaning of the trailing data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Address,
    Immediate,
    Jump,
}

/// How many data bytes trail the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Data {
    None,
    Byte(Tag),
    Word(Tag),
    /// Two bytes when w=1 and no sign extension is requested, else one.
    ByWidth(Tag),
}

impl Data {
    pub fn tag(&self) -> Option<Tag> {
        match *self {
            Data::None => None,
            Data::Byte(tag) | Data::Word(tag) | Data::ByWidth(tag) => Some(tag),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpDef {
    pub mnemonic: Mnemonic,
    pub pattern: Pattern,
    pub head: Head,
    pub body: Body,
    pub data: Data,
}

impl OpDef {
    pub const fn new(
        mnemonic: Mnemonic,
        bits: u8,
        len: u8,
        head: Head,
        body: Body,
        data: Data,
    ) -> Self {
        OpDef {
            mnemonic,
            pattern: Pattern { bits, len },
            head,
            body,
            data,
        }
    }

    pub fn ext(&self) -> Option<Ext> {
        match self.body {
            Body::ModExtRm(ext) => Some(ext),
            _ => None,
        }
    }

    pub fn is_jump(&self) -> bool {
        self.data.tag() == Some(Tag::Jump)
    }

    fn key(&self) -> (Pattern, Option<u8>) {
        (self.pattern, self.ext().map(|ext| ext.value))
    }
}

impl fmt::Display for OpDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mnemonic, self.pattern)?;
        if let Some(ext) = self.ext() {
            write!(f, " /{:03b}", ext.value)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate opcode: `{new}` collides with `{prev}`")]
    Duplicate { prev: OpDef, new: OpDef },

    #[error("Invalid pattern: {0:?} must be 2..=8 bits long")]
    BadPattern(Pattern),
}

/// Source of lookahead bits at the start of an instruction.
pub trait Peek {
    type Error;

    /// `count` bits starting `offset` bits past the current position,
    /// without advancing.
    fn peek(&self, count: u8, offset: u8) -> Result<u8, Self::Error>;
}

/// Ordered table of instruction shapes.
#[derive(Debug)]
pub struct Catalog {
    defs: Vec<OpDef>,
    index: HashMap<Pattern, Vec<usize>>,
}

impl Catalog {
    pub fn new(defs: Vec<OpDef>) -> Result<Self, CatalogError> {
        let mut index: HashMap<Pattern, Vec<usize>> = HashMap::new();
        for (idx, def) in defs.iter().enumerate() {
            let Pattern { bits, len } = def.pattern;
            if !(MIN_LEN..=MAX_LEN).contains(&len) || (len < 8 && bits >> len != 0) {
                return Err(CatalogError::BadPattern(def.pattern));
            }
            let slot = index.entry(def.pattern).or_default();
            if let Some(&prev) = slot.iter().find(|&&i| defs[i].key() == def.key()) {
                return Err(CatalogError::Duplicate {
                    prev: defs[prev],
                    new: *def,
                });
            }
            slot.push(idx);
        }
        Ok(Catalog { defs, index })
    }

    /// The modeled 8086 subset, built on first use.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Try pattern lengths shortest first. Entries sharing a pattern are
    /// told apart by their secondary opcode, first declared wins.
    pub fn find<P: Peek>(&self, src: &P) -> Result<Option<&OpDef>, P::Error> {
        for len in MIN_LEN..=MAX_LEN {
            let bits = src.peek(len, 0)?;
            let Some(candidates) = self.index.get(&Pattern { bits, len }) else {
                continue;
            };
            for &idx in candidates {
                let def = &self.defs[idx];
                match def.ext() {
                    Some(ext) if src.peek(3, ext.offset)? != ext.value => continue,
                    _ => return Ok(Some(def)),
                }
            }
        }
        Ok(None)
    }
}

static BUILTIN: Lazy<Catalog> =
    Lazy::new(|| Catalog::new(table()).expect("built-in opcode table is ambiguous"));

/// Immediate to register/memory: the secondary opcode sits in the REG slot.
fn imm_to_rm(mnemonic: Mnemonic, bits: u8, len: u8, head: Head, ext: u8) -> OpDef {
    let offset = len + head.bits() + 2;
    OpDef::new(
        mnemonic,
        bits,
        len,
        head,
        Body::ModExtRm(Ext { value: ext, offset }),
        Data::ByWidth(Tag::Immediate),
    )
}

pub fn table() -> Vec<OpDef> {
    use Mnemonic::*;

    let mut defs = vec![
        OpDef::new(MOV, 0b100010, 6, Head::DW, Body::ModRegRm, Data::None),
        imm_to_rm(MOV, 0b1100011, 7, Head::W { dir: true }, 0b000),
        OpDef::new(
            MOV,
            0b1011,
            4,
            Head::W { dir: true },
            Body::Reg,
            Data::ByWidth(Tag::Immediate),
        ),
        OpDef::new(
            MOV,
            0b1010000,
            7,
            Head::W { dir: true },
            Body::Acc,
            Data::Word(Tag::Address),
        ),
        OpDef::new(
            MOV,
            0b1010001,
            7,
            Head::W { dir: false },
            Body::Acc,
            Data::Word(Tag::Address),
        ),
    ];

    // (mnemonic, reg/mem with reg, imm to acc, secondary opcode of 100000sw)
    let arith = [
        (ADD, 0b000000, 0b0000010, 0b000),
        (SUB, 0b001010, 0b0010110, 0b101),
        (CMP, 0b001110, 0b0011110, 0b111),
    ];
    for (mnemonic, rm, acc, ext) in arith {
        defs.push(OpDef::new(
            mnemonic,
            rm,
            6,
            Head::DW,
            Body::ModRegRm,
            Data::None,
        ));
        defs.push(imm_to_rm(mnemonic, 0b100000, 6, Head::SW { dir: true }, ext));
        defs.push(OpDef::new(
            mnemonic,
            acc,
            7,
            Head::W { dir: true },
            Body::Acc,
            Data::ByWidth(Tag::Immediate),
        ));
    }

    for (cc, mnemonic) in Mnemonic::JCC.into_iter().enumerate() {
        defs.push(jump(mnemonic, 0b0111_0000 | cc as u8));
    }
    for (cc, mnemonic) in Mnemonic::LOOPS.into_iter().enumerate() {
        defs.push(jump(mnemonic, 0b1110_0000 | cc as u8));
    }

    defs
}

fn jump(mnemonic: Mnemonic, bits: u8) -> OpDef {
    OpDef::new(mnemonic, bits, 8, Head::Bare, Body::None, Data::Byte(Tag::Jump))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bits<'a>(&'a [u8]);

    impl Peek for Bits<'_> {
        type Error = ();

        fn peek(&self, count: u8, offset: u8) -> Result<u8, ()> {
            let mut value = 0u8;
            for pos in offset as usize..(offset + count) as usize {
                let byte = self.0.get(pos / 8).ok_or(())?;
                value = (value << 1) | ((byte >> (7 - pos % 8)) & 1);
            }
            Ok(value)
        }
    }

    fn find(bytes: &[u8]) -> Option<OpDef> {
        Catalog::builtin().find(&Bits(bytes)).unwrap().copied()
    }

    #[test]
    fn test_builtin_is_unambiguous() {
        assert!(Catalog::new(table()).is_ok());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut defs = table();
        defs.push(OpDef::new(
            Mnemonic::ADD,
            0b1011,
            4,
            Head::W { dir: true },
            Body::Reg,
            Data::ByWidth(Tag::Immediate),
        ));
        match Catalog::new(defs) {
            Err(CatalogError::Duplicate { prev, new }) => {
                assert_eq!(prev.mnemonic, Mnemonic::MOV);
                assert_eq!(new.mnemonic, Mnemonic::ADD);
            }
            other => panic!("expected duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_secondary_rejected() {
        let defs = vec![
            imm_to_rm(Mnemonic::ADD, 0b100000, 6, Head::SW { dir: true }, 0b000),
            imm_to_rm(Mnemonic::SUB, 0b100000, 6, Head::SW { dir: true }, 0b000),
        ];
        assert!(matches!(
            Catalog::new(defs),
            Err(CatalogError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_shared_pattern_distinct_secondary() {
        let defs = vec![
            imm_to_rm(Mnemonic::ADD, 0b100000, 6, Head::SW { dir: true }, 0b000),
            imm_to_rm(Mnemonic::SUB, 0b100000, 6, Head::SW { dir: true }, 0b101),
        ];
        assert!(Catalog::new(defs).is_ok());
    }

    #[test]
    fn test_bad_pattern() {
        let def = OpDef::new(Mnemonic::MOV, 0b11111, 4, Head::Bare, Body::None, Data::None);
        assert!(matches!(
            Catalog::new(vec![def]),
            Err(CatalogError::BadPattern(_))
        ));
        let def = OpDef::new(Mnemonic::MOV, 0b1, 1, Head::Bare, Body::None, Data::None);
        assert!(matches!(
            Catalog::new(vec![def]),
            Err(CatalogError::BadPattern(_))
        ));
    }

    #[test]
    fn test_find_short_pattern() {
        let def = find(&[0b1011_1_000, 0x05, 0x00]).unwrap();
        assert_eq!(def.mnemonic, Mnemonic::MOV);
        assert_eq!(def.body, Body::Reg);
    }

    #[test]
    fn test_find_by_secondary() {
        assert_eq!(find(&[0b100000_11, 0b11_000_001, 5]).unwrap().mnemonic, Mnemonic::ADD);
        assert_eq!(find(&[0b100000_11, 0b11_101_001, 5]).unwrap().mnemonic, Mnemonic::SUB);
        assert_eq!(find(&[0b100000_11, 0b11_111_001, 5]).unwrap().mnemonic, Mnemonic::CMP);
        assert_eq!(find(&[0b100000_11, 0b11_010_001, 5]), None);
    }

    #[test]
    fn test_find_jumps() {
        assert_eq!(find(&[0x75, 0xFE]).unwrap().mnemonic, Mnemonic::JNZ);
        assert_eq!(find(&[0x74, 0xFE]).unwrap().mnemonic, Mnemonic::JZ);
        assert_eq!(find(&[0xE2, 0xFE]).unwrap().mnemonic, Mnemonic::LOOP);
        assert_eq!(find(&[0xE3, 0xFE]).unwrap().mnemonic, Mnemonic::JCXZ);
    }

    #[test]
    fn test_find_unknown() {
        assert_eq!(find(&[0xFF, 0xFF]), None);
    }

    #[test]
    fn test_every_entry_reachable() {
        for def in table() {
            let mut window: u32 = (def.pattern.bits as u32) << (24 - def.pattern.len);
            if let Some(ext) = def.ext() {
                window |= (ext.value as u32) << (24 - ext.offset - 3);
            }
            let bytes = &window.to_be_bytes()[1..];
            assert_eq!(find(bytes), Some(def), "{} is shadowed", def);
        }
    }

    #[test]
    fn test_pattern_display() {
        let def = imm_to_rm(Mnemonic::SUB, 0b100000, 6, Head::SW { dir: true }, 0b101);
        assert_eq!(def.pattern.to_string(), "100000");
        assert_eq!(def.to_string(), "SUB 100000 /101");
        assert_eq!(def.ext().map(|e| e.offset), Some(10));
    }
}
