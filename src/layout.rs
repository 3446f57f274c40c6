use crate::models::disk::Disk;
use crate::models::enclosure::Enclosure;
use crate::topology::Topology;
use crossterm::style::Stylize;

/// One drawn row of bays: 4 columns, 0 = no physical bay in that position.
type Row = [u32; 4];

/// 20-slot chassis: two stacked banks, short left column.
const GRID_20: &[Row] = &[
    [0, 8, 14, 20],
    [0, 7, 13, 19],
    [0, 6, 12, 18],
    [0, 5, 11, 17],
    [2, 4, 10, 16],
    [1, 3, 9, 15],
];

/// 24-slot chassis: full 6×4 bank, column-major from bottom-left.
const GRID_24: &[Row] = &[
    [6, 12, 18, 24],
    [5, 11, 17, 23],
    [4, 10, 16, 22],
    [3, 9, 15, 21],
    [2, 8, 14, 20],
    [1, 7, 13, 19],
];

/// 44-slot chassis: a 24-bank on top of a 20-bank.
const GRID_44: &[Row] = &[
    [6, 12, 18, 24],
    [5, 11, 17, 23],
    [4, 10, 16, 22],
    [3, 9, 15, 21],
    [2, 8, 14, 20],
    [1, 7, 13, 19],
    [0, 32, 38, 44],
    [0, 31, 37, 43],
    [0, 30, 36, 42],
    [0, 29, 35, 41],
    [26, 28, 34, 40],
    [25, 27, 33, 39],
];

/// Unrecognized slot counts fall back to the largest known chassis; slots
/// without a cell just don't get drawn.
pub fn grid_for(slot_count: usize) -> &'static [Row] {
    match slot_count {
        20 => GRID_20,
        24 => GRID_24,
        _  => GRID_44,
    }
}

pub const CELL_WIDTH: usize = 26;

/// The 4-line status block for one bay.
pub fn disk_block(disk: &Disk) -> [String; 4] {
    let size = if disk.status == "NI" {
        String::new()
    } else {
        format!("Size={}", disk.size.text())
    };
    [
        format!("Slot {}: {}", disk.slot, disk.device.text()),
        disk.ident.text().to_string(),
        size,
        format!("Status={} L={} F={}", disk.status, disk.locate, disk.fault),
    ]
}

/// Block lines with the highlight applied when a LED is lit, plus the extra
/// invisible bytes each line now carries. The highlight marker consumes
/// width that must not shift the columns to the right of it.
fn styled_block(disk: &Disk, color: bool) -> ([String; 4], usize) {
    let lines = disk_block(disk);
    if !disk.is_lit() {
        return (lines, 0);
    }
    if !color {
        return (lines.map(|l| format!("*{l}*")), 0);
    }
    let mut extra = 0;
    let styled = lines.map(|l| {
        let s = l.as_str().reverse().to_string();
        extra = s.len() - l.len();
        s
    });
    (styled, extra)
}

/// One disk's block for single-disk status output.
pub fn render_disk(disk: &Disk, color: bool) -> String {
    let (lines, _) = styled_block(disk, color);
    let mut out = String::new();
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Draw one enclosure's bay grid: cells concatenated column by column,
/// line by line, each left-justified to a fixed width.
pub fn render(enc: &Enclosure, color: bool) -> String {
    let mut out = String::new();
    for row in grid_for(enc.slot_count) {
        let cells: Vec<([String; 4], usize)> = row
            .iter()
            .map(|&slot| match slot {
                0 => placeholder(),
                n => match enc.slot(n) {
                    Some(disk) => styled_block(disk, color),
                    None       => placeholder(),
                },
            })
            .collect();

        for li in 0..4 {
            for (lines, extra) in &cells {
                let width = CELL_WIDTH + extra;
                out.push_str(&format!("{:<width$}", lines[li]));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn placeholder() -> ([String; 4], usize) {
    (std::array::from_fn(|_| "-".to_string()), 0)
}

/// All enclosures, ascending by the numeric suffix of their device node.
pub fn render_all(topo: &Topology, color: bool) -> String {
    let mut out = String::new();
    for enc in topo.ordered() {
        out.push_str(&format!("{}  {}  ({} slots)\n\n", enc.id, enc.description, enc.slot_count));
        out.push_str(&render(enc, color));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::{Disk, Mapped};
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn coverage(grid: &[Row], slot_count: u32) {
        let mut seen = HashSet::new();
        for row in grid {
            for &slot in row {
                if slot != 0 {
                    assert!(seen.insert(slot), "slot {slot} appears twice");
                }
            }
        }
        assert_eq!(seen, (1..=slot_count).collect::<HashSet<u32>>());
    }

    #[test]
    fn every_slot_in_exactly_one_cell() {
        coverage(GRID_20, 20);
        coverage(GRID_24, 24);
        coverage(GRID_44, 44);
    }

    #[test]
    fn unknown_counts_fall_back_to_largest_grid() {
        assert_eq!(grid_for(20).len(), 6);
        assert_eq!(grid_for(24).len(), 6);
        assert_eq!(grid_for(44).len(), 12);
        assert_eq!(grid_for(12).len(), 12);
        assert_eq!(grid_for(60).len(), 12);
    }

    fn sample_enclosure() -> Enclosure {
        let mut enc = Enclosure::new("/dev/sg2".into(), "HP D3700".into(), 24);
        let mut d = Disk::new(5, PathBuf::new());
        d.address = Some("5000c500a1b2c3d4".into());
        d.device = Mapped::Named("/dev/sdf".into());
        d.ident = Mapped::Named("35000c500a1b2c3d5".into());
        d.size = Mapped::Named("10.9TB".into());
        d.status = "online".into();
        d.fault = 1;
        enc.insert(d);

        let mut ni = Disk::new(6, PathBuf::new());
        ni.status = "NI".into();
        enc.insert(ni);
        enc
    }

    #[test]
    fn block_lines_for_a_populated_slot() {
        let enc = sample_enclosure();
        let lines = disk_block(enc.slot(5).unwrap());
        assert_eq!(lines[0], "Slot 5: /dev/sdf");
        assert_eq!(lines[1], "35000c500a1b2c3d5");
        assert_eq!(lines[2], "Size=10.9TB");
        assert_eq!(lines[3], "Status=online L=0 F=1");
    }

    #[test]
    fn ni_slot_gets_blank_size_line() {
        let enc = sample_enclosure();
        let lines = disk_block(enc.slot(6).unwrap());
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Status=NI L=0 F=0");
    }

    #[test]
    fn highlighted_lines_pad_wider_so_columns_align() {
        let enc = sample_enclosure();
        let text = render(&enc, true);
        let lines: Vec<&str> = text.lines().collect();
        // 6 grid rows of 4 block lines plus a blank separator each.
        assert_eq!(lines.len(), 6 * 5);

        for line in lines.iter().filter(|l| !l.is_empty()) {
            let escape_bytes: usize = if line.contains('\x1b') {
                line.len() - strip_escapes(line).len()
            } else {
                0
            };
            assert_eq!(line.len() - escape_bytes, 4 * CELL_WIDTH, "misaligned: {line:?}");
        }

        // Slot 5 (fault lit) is highlighted, slot 6 is not.
        assert!(text.contains('\x1b'));
    }

    #[test]
    fn no_color_marker_wraps_lit_blocks() {
        let enc = sample_enclosure();
        let text = render(&enc, false);
        assert!(text.contains("*Slot 5: /dev/sdf*"));
        assert!(!text.contains('\x1b'));
    }

    fn strip_escapes(s: &str) -> String {
        let mut out = String::new();
        let mut in_escape = false;
        for c in s.chars() {
            match (in_escape, c) {
                (false, '\x1b') => in_escape = true,
                (false, c)      => out.push(c),
                (true, 'm')     => in_escape = false,
                (true, _)       => {}
            }
        }
        out
    }
}
