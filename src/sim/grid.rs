//! Material-coded figure grid and its on-screen layout
//!
//! A cell holds a material code. The code picks the palette entry a renderer
//! draws; physical behavior is derived from the code by [`behavior`] so new
//! behaviors extend that table instead of the code space.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Material codes used by the level templates
pub mod material {
    pub const EMPTY: u8 = 0;
    // Wizard
    pub const WIZARD_CLOAK: u8 = 1;
    pub const WIZARD_BEARD: u8 = 2;
    pub const WIZARD_SKIN: u8 = 3;
    pub const WIZARD_BROWN: u8 = 4;
    pub const WIZARD_BLACK: u8 = 5;
    // Spider
    pub const SPIDER_BODY_LIME: u8 = 6;
    pub const SPIDER_BODY_GREEN: u8 = 7;
    pub const SPIDER_BODY_DARK: u8 = 8;
    pub const SPIDER_LEGS: u8 = 9;
    // Toad
    pub const TOAD_BODY: u8 = 15;
    pub const TOAD_EYE: u8 = 16;
    pub const TOAD_BELLY: u8 = 17;
    // Swamp rat
    pub const RAT_FUR_MID: u8 = 22;
    pub const RAT_BELLY: u8 = 23;
    pub const RAT_OUTLINE: u8 = 25;
    pub const RAT_FUR_DARK: u8 = 27;
    pub const RAT_PINK: u8 = 29;
    pub const RAT_EYE: u8 = 30;
    /// Indestructible
    pub const METAL: u8 = 33;
    pub const LAB_BLUE: u8 = 34;
    // Ogre head
    pub const OGRE_OUTLINE: u8 = 35;
    pub const OGRE_FACE_MAIN: u8 = 36;
    pub const OGRE_FACE_DARK: u8 = 37;
    pub const OGRE_FACE_LIGHT: u8 = 38;
    pub const OGRE_TEETH: u8 = 39;
    pub const OGRE_SPOT: u8 = 40;
}

/// Physical behavior of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Nothing to collide with
    Empty,
    /// Cleared on hit, counts toward level completion
    Destructible,
    /// Bounces the ball, never cleared, ignored for completion
    Indestructible,
}

/// Classify a material code
#[inline]
pub fn behavior(code: u8) -> Behavior {
    match code {
        material::EMPTY => Behavior::Empty,
        material::METAL => Behavior::Indestructible,
        _ => Behavior::Destructible,
    }
}

/// Render color for a material (0xRRGGBB)
pub fn material_color(code: u8) -> u32 {
    use material::*;
    match code {
        WIZARD_CLOAK => 0x2563EB,
        WIZARD_BEARD => 0x94A3B8,
        WIZARD_SKIN => 0xFDBA74,
        WIZARD_BROWN => 0x78350F,
        WIZARD_BLACK => 0x020617,
        SPIDER_BODY_LIME => 0x39FF14,
        SPIDER_BODY_GREEN => 0x16A34A,
        SPIDER_BODY_DARK => 0x064E3B,
        SPIDER_LEGS => 0x9CA3AF,
        TOAD_BODY => 0x4ADE80,
        TOAD_EYE => 0xFEF08A,
        TOAD_BELLY => 0x166534,
        RAT_FUR_MID => 0x715E4D,
        RAT_BELLY => 0xD2B48C,
        RAT_OUTLINE => 0x1A110A,
        RAT_FUR_DARK => 0x46382E,
        RAT_PINK => 0xFFC0CB,
        RAT_EYE => 0xFF0000,
        METAL => 0x94A3B8,
        LAB_BLUE => 0x0EA5E9,
        OGRE_OUTLINE => 0x141414,
        OGRE_FACE_MAIN => 0x6D8C32,
        OGRE_FACE_DARK => 0x475E2A,
        OGRE_FACE_LIGHT => 0x99B244,
        OGRE_TEETH => 0xF1F1F1,
        OGRE_SPOT => 0xC5D481,
        _ => 0xFFFFFF,
    }
}

/// Errors raised while building a grid from template rows
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Fixed-size matrix of material codes, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Deep-copy template rows into a grid
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut cells = Vec::with_capacity(cols * rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != cols {
                return Err(GridError::Ragged {
                    row,
                    expected: cols,
                    found: r.len(),
                });
            }
            cells.extend_from_slice(r);
        }
        let rows = if cols == 0 { 0 } else { rows.len() };
        Ok(Self { cols, rows, cells })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// True when the grid has no cells at all
    pub fn is_degenerate(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Clear a destructible cell. Returns the material that was removed.
    pub fn clear(&mut self, col: usize, row: usize) -> Option<u8> {
        let code = self.get(col, row)?;
        if behavior(code) != Behavior::Destructible {
            return None;
        }
        self.cells[row * self.cols + col] = material::EMPTY;
        Some(code)
    }

    /// Number of cells still required for completion
    pub fn remaining_destructible(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&c| behavior(c) == Behavior::Destructible)
            .count()
    }
}

/// Where the grid sits on screen this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Top-left corner of cell (0, 0)
    pub origin: Vec2,
    /// Edge length of one cell
    pub cell_size: f32,
}

impl GridLayout {
    /// Cell size fitted to the canvas width, capped, never below one pixel
    pub fn cell_size_for(grid: &Grid, canvas_width: f32) -> f32 {
        if grid.cols() == 0 || !canvas_width.is_finite() {
            return MIN_CELL_SIZE;
        }
        let fitted = (canvas_width * FIGURE_WIDTH_FRACTION / grid.cols() as f32).floor();
        fitted.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE)
    }

    /// Horizontally centered, pinned at the top, shifted by `float_x`
    pub fn compute(grid: &Grid, canvas_width: f32, float_x: f32) -> Self {
        let cell_size = Self::cell_size_for(grid, canvas_width);
        let figure_width = grid.cols() as f32 * cell_size;
        Self {
            origin: Vec2::new((canvas_width - figure_width) / 2.0 + float_x, FIGURE_TOP),
            cell_size,
        }
    }

    /// Grid cell under a point, bounds-checked before the cast
    pub fn cell_at(&self, grid: &Grid, point: Vec2) -> Option<(usize, usize)> {
        let rel = (point - self.origin) / self.cell_size;
        if !rel.is_finite() || rel.x < 0.0 || rel.y < 0.0 {
            return None;
        }
        let (col, row) = (rel.x.floor(), rel.y.floor());
        if col >= grid.cols() as f32 || row >= grid.rows() as f32 {
            return None;
        }
        Some((col as usize, row as usize))
    }

    /// Screen-space bounds of a cell as (min, max)
    pub fn cell_bounds(&self, col: usize, row: usize) -> (Vec2, Vec2) {
        let min = self.origin + Vec2::new(col as f32, row as f32) * self.cell_size;
        (min, min + Vec2::splat(self.cell_size))
    }
}
