use indexmap::IndexMap;

use crate::decode::DecodedLine;
use crate::error::Error;

/// Label ids keyed by target line index, in discovery order.
///
/// A target equal to the line count names the end of the program.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LabelTable {
    ids: IndexMap<usize, u32>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable {
            ids: IndexMap::new(),
        }
    }

    /// Id for `target`, assigning the next one on first reference.
    pub fn assign(&mut self, target: usize) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(target).or_insert(next)
    }

    pub fn get(&self, target: usize) -> Option<u32> {
        self.ids.get(&target).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Second pass: turn every stored jump displacement into a label reference.
pub fn resolve(lines: &mut [DecodedLine]) -> Result<LabelTable, Error> {
    let mut labels = LabelTable::new();
    for idx in 0..lines.len() {
        let Some(disp) = lines[idx].jump else {
            continue;
        };
        let target = walk(lines, idx, disp)?;
        let id = labels.assign(target);
        if let Some(line) = lines.get_mut(target) {
            line.label = Some(id);
        }
        lines[idx].target = Some(id);
    }
    Ok(labels)
}

/// Index of the line `disp` bytes past the end of line `from`.
fn walk(lines: &[DecodedLine], from: usize, disp: i16) -> Result<usize, Error> {
    let unresolved = || Error::JumpUnresolved {
        offset: lines[from].addr,
        displacement: disp,
    };

    let mut remaining = disp.unsigned_abs() as usize;
    if disp >= 0 {
        let mut idx = from + 1;
        while remaining > 0 {
            let line = lines.get(idx).ok_or_else(unresolved)?;
            remaining = remaining.checked_sub(line.len).ok_or_else(unresolved)?;
            idx += 1;
        }
        Ok(idx)
    } else {
        // The displacement counts from the end of the jump itself.
        let mut idx = from;
        loop {
            remaining = remaining
                .checked_sub(lines[idx].len)
                .ok_or_else(unresolved)?;
            if remaining == 0 {
                return Ok(idx);
            }
            idx = idx.checked_sub(1).ok_or_else(unresolved)?;
        }
    }
}
