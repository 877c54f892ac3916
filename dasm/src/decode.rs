use arch::{
    catalog::{Body, Catalog, Data, Head, OpDef, Tag},
    ea::{self, Disp, Ea},
    reg::Reg,
};

use crate::cursor::Cursor;
use crate::error::Error;
use crate::render::{self, Operand, Size};

/// One decoded instruction, in program order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLine {
    /// Byte offset of the first byte.
    pub addr: usize,
    /// Mnemonic and operands. Jumps hold only the mnemonic.
    pub text: String,
    /// Machine bytes consumed.
    pub len: usize,
    /// Signed displacement from the end of this instruction, for jumps.
    pub jump: Option<i16>,
    /// Label defined on this line.
    pub label: Option<u32>,
    /// Label this jump refers to.
    pub target: Option<u32>,
}

/// Raw field values. `None` when the shape has no such field.
#[derive(Debug, Default, Clone, Copy)]
struct Fields {
    d: Option<bool>,
    s: Option<bool>,
    w: Option<bool>,
    mode: Option<u8>,
    reg: Option<u8>,
    rm: Option<u8>,
}

pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    catalog: &'a Catalog,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8], catalog: &'a Catalog) -> Self {
        Decoder {
            cursor: Cursor::new(bytes),
            catalog,
        }
    }

    pub fn decode_all(mut self) -> Result<Vec<DecodedLine>, Error> {
        let mut lines = vec![];
        while !self.cursor.is_end() {
            lines.push(self.decode_next()?);
        }
        Ok(lines)
    }

    pub fn decode_next(&mut self) -> Result<DecodedLine, Error> {
        self.cursor.ensure_aligned()?;
        let addr = self.cursor.offset();

        let bits = self.cursor.peek(8, 0)?;
        let def = *self
            .catalog
            .find(&self.cursor)?
            .ok_or(Error::UnknownOpcode { offset: addr, bits })?;
        self.cursor.consume_bits(def.pattern.len)?;

        let fields = self.fields(&def)?;
        let (text, jump) = self.operands(addr, &def, &fields)?;
        self.cursor.ensure_aligned()?;

        Ok(DecodedLine {
            addr,
            text,
            len: self.cursor.offset() - addr,
            jump,
            label: None,
            target: None,
        })
    }

    // d, s, w, mod, reg, secondary opcode, r/m
    fn fields(&mut self, def: &OpDef) -> Result<Fields, Error> {
        let cursor = &mut self.cursor;
        let mut fields = Fields::default();

        match def.head {
            Head::Bare => {}
            Head::W { .. } => {
                fields.w = Some(flag(cursor)?);
            }
            Head::DW => {
                fields.d = Some(flag(cursor)?);
                fields.w = Some(flag(cursor)?);
            }
            Head::SW { .. } => {
                fields.s = Some(flag(cursor)?);
                fields.w = Some(flag(cursor)?);
            }
        }

        match def.body {
            Body::None | Body::Acc => {}
            Body::Reg => {
                fields.reg = Some(cursor.consume_bits(3)?);
            }
            Body::ModRegRm => {
                fields.mode = Some(cursor.consume_bits(2)?);
                fields.reg = Some(cursor.consume_bits(3)?);
                fields.rm = Some(cursor.consume_bits(3)?);
            }
            Body::ModExtRm(_) => {
                fields.mode = Some(cursor.consume_bits(2)?);
                // Secondary opcode, already checked by the catalog.
                cursor.consume_bits(3)?;
                fields.rm = Some(cursor.consume_bits(3)?);
            }
        }

        Ok(fields)
    }

    fn operands(
        &mut self,
        addr: usize,
        def: &OpDef,
        fields: &Fields,
    ) -> Result<(String, Option<i16>), Error> {
        // Shapes without a w bit operate on words.
        let wide = fields.w.unwrap_or(true);

        let rm = match (fields.mode, fields.rm) {
            (Some(mode), Some(rm)) => Some(self.rm_operand(mode, rm, wide)?),
            _ => None,
        };

        let data = self.data(def, fields)?;
        if let Some((Tag::Jump, disp)) = data {
            return Ok((def.mnemonic.to_string(), Some(disp)));
        }

        let (primary, rm) = match def.body {
            Body::ModExtRm(_) => (rm, None),
            Body::Acc => (Some(Operand::Reg(Reg::acc(wide))), rm),
            _ => (fields.reg.map(|reg| Operand::Reg(Reg::new(reg, wide))), rm),
        };

        let data = data.map(|(tag, value)| match tag {
            Tag::Address => Operand::Direct(value as u16),
            _ => Operand::Imm {
                value,
                size: primary.filter(Operand::is_mem).map(|_| Size::new(wide)),
            },
        });

        match (primary, rm.or(data)) {
            (Some(primary), Some(secondary)) => {
                let operands = render::order(primary, secondary, direction(def.head, fields));
                Ok((render::render(def.mnemonic, &operands), None))
            }
            _ => Err(Error::MissingOperand {
                offset: addr,
                mnemonic: def.mnemonic,
            }),
        }
    }

    fn rm_operand(&mut self, mode: u8, rm: u8, wide: bool) -> Result<Operand, Error> {
        match ea::lookup(mode, rm) {
            None => Ok(Operand::Reg(Reg::new(rm, wide))),
            Some((Ea::Direct, _)) => Ok(Operand::Direct(self.cursor.consume_word()?)),
            Some((Ea::Based(base), disp)) => {
                let disp = match disp {
                    Disp::None => 0,
                    Disp::Byte => self.cursor.consume_byte()? as i8 as i16,
                    Disp::Word => self.cursor.consume_word()? as i16,
                };
                Ok(Operand::Mem { base, disp })
            }
        }
    }

    /// Trailing data bytes. A single byte is always sign-extended.
    fn data(&mut self, def: &OpDef, fields: &Fields) -> Result<Option<(Tag, i16)>, Error> {
        let wide = fields.w == Some(true);
        let sign = fields.s == Some(true);
        let (tag, two) = match def.data {
            Data::None => return Ok(None),
            Data::Byte(tag) => (tag, false),
            Data::Word(tag) => (tag, true),
            Data::ByWidth(tag) => (tag, wide && !sign),
        };
        let value = if two {
            self.cursor.consume_word()? as i16
        } else {
            self.cursor.consume_byte()? as i8 as i16
        };
        Ok(Some((tag, value)))
    }
}

fn flag(cursor: &mut Cursor) -> Result<bool, Error> {
    Ok(cursor.consume_bits(1)? == 1)
}

fn direction(head: Head, fields: &Fields) -> bool {
    match head {
        Head::DW => fields.d == Some(true),
        Head::W { dir } | Head::SW { dir } => dir,
        Head::Bare => true,
    }
}
