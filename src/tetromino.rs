//! Tetromino definitions and shapes
//!
//! Each of the 7 kinds has a single base shape stored as a boolean
//! occupancy matrix; rotation states are computed geometrically from it
//! rather than pre-tabulated.

use rand::Rng;
use ratatui::style::Color;

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

impl BlockKind {
    /// Get the color for this kind
    pub fn color(&self) -> Color {
        match self {
            BlockKind::I => Color::Cyan,
            BlockKind::O => Color::Yellow,
            BlockKind::T => Color::Magenta,
            BlockKind::S => Color::Green,
            BlockKind::Z => Color::Red,
            BlockKind::J => Color::Blue,
            BlockKind::L => Color::Rgb(255, 165, 0), // Orange
        }
    }

    /// Get all kinds, in catalog order
    pub fn all() -> [BlockKind; 7] {
        [
            BlockKind::I,
            BlockKind::O,
            BlockKind::T,
            BlockKind::S,
            BlockKind::Z,
            BlockKind::J,
            BlockKind::L,
        ]
    }

    /// Base (spawn) shape for this kind.
    ///
    /// Occupied cells sit in the bottom rows of the bounding box, so the
    /// empty leading rows are skipped when testing or stamping and a
    /// fresh piece appears flush with the top of the board.
    pub fn base_shape(&self) -> Shape {
        match self {
            BlockKind::I => Shape::from_pattern(&["....", "....", "....", "####"]),
            BlockKind::O => Shape::from_pattern(&["##", "##"]),
            BlockKind::T => Shape::from_pattern(&["...", "###", ".#."]),
            BlockKind::S => Shape::from_pattern(&["...", ".##", "##."]),
            BlockKind::Z => Shape::from_pattern(&["...", "##.", ".##"]),
            BlockKind::J => Shape::from_pattern(&["...", "#..", "###"]),
            BlockKind::L => Shape::from_pattern(&["...", "..#", "###"]),
        }
    }
}

/// Draw a kind uniformly at random
pub fn random_kind<R: Rng>(rng: &mut R) -> BlockKind {
    let all = BlockKind::all();
    all[rng.gen_range(0..all.len())]
}

/// Boolean occupancy matrix for one rotation state of a kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// Build a shape from ascii art: '#' marks an occupied cell
    fn from_pattern(pattern: &[&str]) -> Self {
        let rows = pattern
            .iter()
            .map(|line| line.chars().map(|c| c == '#').collect())
            .collect();
        Self { rows }
    }

    /// Rotate 90 degrees clockwise: `new[c][rows-1-r] = old[r][c]`
    pub fn rotate_cw(&self) -> Shape {
        let height = self.rows.len();
        let width = self.rows[0].len();
        let mut rotated = vec![vec![false; height]; width];
        for (r, row) in self.rows.iter().enumerate() {
            for (c, &set) in row.iter().enumerate() {
                rotated[c][height - 1 - r] = set;
            }
        }
        Shape { rows: rotated }
    }

    /// Iterate over the rows that contain at least one occupied cell.
    ///
    /// Collision testing and stamping both index rows through this
    /// filtered view, so fully-empty rows never consume board space.
    pub fn occupied_rows(&self) -> impl Iterator<Item = &[bool]> {
        self.rows
            .iter()
            .filter(|row| row.iter().any(|&set| set))
            .map(|row| row.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_four_rotations_are_identity() {
        for kind in BlockKind::all() {
            let shape = kind.base_shape();
            let back = shape.rotate_cw().rotate_cw().rotate_cw().rotate_cw();
            assert_eq!(shape, back, "{:?}", kind);
        }
    }

    #[test]
    fn test_rotate_i_once() {
        // Horizontal bar becomes the left column of the box
        let rotated = BlockKind::I.base_shape().rotate_cw();
        let expected = Shape::from_pattern(&["#...", "#...", "#...", "#..."]);
        assert_eq!(rotated, expected);
    }

    #[test]
    fn test_every_kind_has_four_occupied_cells() {
        for kind in BlockKind::all() {
            let shape = kind.base_shape();
            let count: usize = shape
                .occupied_rows()
                .map(|row| row.iter().filter(|&&set| set).count())
                .sum();
            assert_eq!(count, 4, "{:?}", kind);
        }
    }

    #[test]
    fn test_occupied_rows_skips_empty_rows() {
        // The I bar is a single occupied row in a 4x4 box
        let shape = BlockKind::I.base_shape();
        assert_eq!(shape.occupied_rows().count(), 1);
    }

    #[test]
    fn test_random_kind_is_deterministic_with_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(random_kind(&mut a), random_kind(&mut b));
        }
    }
}
