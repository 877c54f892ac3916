use color_print::cformat;
use std::io::{self, Write};

use crate::listing::{label_name, Listing};

/// One row per label and instruction: `[ADDR] BYTES | TEXT`.
pub fn dump_lines(listing: &Listing, bytes: &[u8]) -> Vec<String> {
    let mut rows = vec![];
    let label_row = |id: u32| cformat!("{:25}| <g>{}:</>", "", label_name(id));

    for line in &listing.lines {
        if let Some(id) = line.label {
            rows.push(label_row(id));
        }
        let raw: Vec<String> = bytes
            .get(line.addr..line.addr + line.len)
            .unwrap_or_default()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        let text = Listing::text(line);
        let (op, args) = text.split_once(' ').unwrap_or((text.as_str(), ""));
        rows.push(cformat!(
            "[{:04X}] <y>{:<17}</> |   <r>{:<7}</><b>{}</>",
            line.addr,
            raw.join(" "),
            op,
            args
        ));
    }
    if let Some(id) = listing.end_label() {
        rows.push(label_row(id));
    }
    rows
}

/// Framed dump. Kept off stdout so a piped listing stays plain assembly.
pub fn write_dump<W: Write>(
    out: &mut W,
    path: &str,
    listing: &Listing,
    bytes: &[u8],
) -> io::Result<()> {
    writeln!(
        out,
        "{}+------[{}]{}",
        "-".repeat(25),
        path,
        "-".repeat(40usize.saturating_sub(path.len()))
    )?;
    for row in dump_lines(listing, bytes) {
        writeln!(out, "{}", row)?;
    }
    writeln!(out, "{}+{}", "-".repeat(25), "-".repeat(48))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::disassemble;

    #[test]
    fn test_rows() {
        let bytes = [0x83, 0xC6, 0x02, 0x75, 0xFB];
        let listing = disassemble(&bytes).unwrap();
        let rows = dump_lines(&listing, &bytes);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("label_0:"));
        assert!(rows[1].starts_with("[0000]"));
        assert!(rows[1].contains("83 C6 02"));
        assert!(rows[1].contains("ADD"));
        assert!(rows[2].starts_with("[0003]"));
        assert!(rows[2].contains("75 FB"));
        assert!(rows[2].contains("label_0"));
    }

    #[test]
    fn test_end_label_row() {
        let bytes = [0xE3, 0x00];
        let listing = disassemble(&bytes).unwrap();
        let rows = dump_lines(&listing, &bytes);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].contains("label_0:"));
    }

    #[test]
    fn test_write_dump_frame() {
        let bytes = [0x89, 0xD9];
        let listing = disassemble(&bytes).unwrap();
        let mut out = vec![];
        write_dump(&mut out, "a.bin", &listing, &bytes).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains("[a.bin]"));
        assert!(rows[1].contains("89 D9"));
        assert!(!text.contains("bits 16"));
        assert_eq!(rows[2], format!("{}+{}", "-".repeat(25), "-".repeat(48)));
    }
}
