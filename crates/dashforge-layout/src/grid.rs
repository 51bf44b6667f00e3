//! Tile grid placement.
//!
//! Charts are fixed-size tiles placed row by row into the first free slot,
//! left to right. Positions are reported in grid units, so with the
//! default 6x6 tiles on two slots per row the sequence is:
//!
//! ```text
//! (0,0)  (6,0)
//! (0,6)  (6,6)
//! (0,12) ...
//! ```

use serde::{Deserialize, Serialize};

/// Grid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTemplate {
    /// Tile slots per row
    pub columns: usize,
    /// Tile width in grid units
    pub tile_width: u32,
    /// Tile height in grid units
    pub tile_height: u32,
    /// Minimum width a user may resize a tile to
    pub min_width: u32,
    /// Minimum height a user may resize a tile to
    pub min_height: u32,
}

impl Default for GridTemplate {
    fn default() -> Self {
        Self::two_column()
    }
}

impl GridTemplate {
    /// Two 6x6 tiles per row (the platform's default dashboard grid).
    #[must_use]
    pub const fn two_column() -> Self {
        Self {
            columns: 2,
            tile_width: 6,
            tile_height: 6,
            min_width: 3,
            min_height: 1,
        }
    }

    /// Set slots per row; at least one.
    #[must_use]
    pub const fn with_columns(mut self, columns: usize) -> Self {
        self.columns = if columns == 0 { 1 } else { columns };
        self
    }

    /// Set tile size.
    #[must_use]
    pub const fn with_tile(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }
}

/// One placed tile, in the platform's layout item shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    /// Identifier of the chart this tile holds
    pub i: String,
    /// Column offset in grid units
    pub x: u32,
    /// Row offset in grid units
    pub y: u32,
    /// Height in grid units
    pub h: u32,
    /// Width in grid units
    pub w: u32,
    /// Minimum height
    pub min_h: u32,
    /// Minimum width
    pub min_w: u32,
    /// Whether the user moved the tile
    pub moved: bool,
    /// Whether the tile is pinned
    #[serde(rename = "static")]
    pub is_static: bool,
}

/// Incremental placer tracking occupied slots.
#[derive(Debug, Clone, Default)]
pub struct GridPlacer {
    template: GridTemplate,
    occupied: Vec<Vec<bool>>,
}

impl GridPlacer {
    /// Empty grid with the given geometry.
    #[must_use]
    pub fn new(template: GridTemplate) -> Self {
        Self {
            template: template.with_columns(template.columns),
            occupied: Vec::new(),
        }
    }

    /// Mark the slot at `(row, col)` as taken.
    pub fn occupy(&mut self, row: usize, col: usize) {
        ensure_rows(&mut self.occupied, row + 1, self.template.columns);
        if let Some(slot) = self.occupied[row].get_mut(col) {
            *slot = true;
        }
    }

    /// Place `id` in the first free slot.
    pub fn place(&mut self, id: impl Into<String>) -> LayoutItem {
        let (row, col) = find_next_slot(&mut self.occupied, self.template.columns);
        self.occupy(row, col);

        let t = &self.template;
        LayoutItem {
            i: id.into(),
            x: col as u32 * t.tile_width,
            y: row as u32 * t.tile_height,
            h: t.tile_height,
            w: t.tile_width,
            min_h: t.min_height,
            min_w: t.min_width,
            moved: false,
            is_static: false,
        }
    }
}

/// Place every id in order on a fresh grid.
pub fn auto_place<I, S>(template: GridTemplate, ids: I) -> Vec<LayoutItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut placer = GridPlacer::new(template);
    ids.into_iter().map(|id| placer.place(id)).collect()
}

fn find_next_slot(occupied: &mut Vec<Vec<bool>>, col_count: usize) -> (usize, usize) {
    let mut row = 0;
    loop {
        ensure_rows(occupied, row + 1, col_count);
        if let Some(col) = occupied[row].iter().position(|taken| !taken) {
            return (row, col);
        }
        row += 1;
    }
}

fn ensure_rows(occupied: &mut Vec<Vec<bool>>, min_rows: usize, col_count: usize) {
    while occupied.len() < min_rows {
        occupied.push(vec![false; col_count]);
    }
}
