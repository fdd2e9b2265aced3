use itertools::intersperse;
use std::iter;
use unicode_segmentation::UnicodeSegmentation;

pub const RING_WIDTH: u16 = 21;
pub const RING_HEIGHT: u16 = 11;

const RING: &str = "╭───────────────────╮
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
╰───────────────────╯";

/// Border cells in the order they disappear: clockwise from the top center.
fn ring_path() -> Vec<(usize, usize)> {
    let (width, height) = (RING_WIDTH as usize, RING_HEIGHT as usize);
    let mut path = Vec::with_capacity(2 * (width + height) - 4);

    path.extend(iter::repeat(0).zip(width / 2..width - 1));
    path.extend((0..height - 1).zip(iter::repeat(width - 1)));
    path.extend(iter::repeat(height - 1).zip((1..width).rev()));
    path.extend((1..height).rev().zip(iter::repeat(0)));
    path.extend(iter::repeat(0).zip(0..width / 2));

    path
}

/// The ring border with only `remaining` (0.0 to 1.0) of it left standing.
pub fn ring(remaining: f64) -> String {
    let remaining = remaining.clamp(0.0, 1.0);
    let path = ring_path();

    let keep = (path.len() as f64 * remaining).ceil() as usize;
    let mut cells: Vec<Vec<&str>> = RING
        .lines()
        .map(|line| line.graphemes(true).collect())
        .collect();

    for (row, col) in path.iter().take(path.len() - keep) {
        cells[*row][*col] = " ";
    }

    cells
        .iter()
        .map(|row| row.concat())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `filled` boxes followed by dashes, e.g. `▣ ▣ -` for 2 of 3.
pub fn counter(filled: u32, total: u32) -> String {
    let filled = filled.min(total) as usize;
    let marks = "▣".repeat(filled) + &"-".repeat(total as usize - filled);
    intersperse(marks.graphemes(true), " ").collect()
}
