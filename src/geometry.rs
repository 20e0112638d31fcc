/// Shared grid, cell and color primitives used across the editor modules.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoordinate {
    pub x: i32,
    pub y: i32,
}

impl CellCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive cell rectangle. `min_x <= max_x` and `min_y <= max_y` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellBounds {
    pub const fn single(cell: CellCoordinate) -> Self {
        Self {
            min_x: cell.x,
            min_y: cell.y,
            max_x: cell.x,
            max_y: cell.y,
        }
    }

    pub fn spanning(start: CellCoordinate, end: CellCoordinate) -> Self {
        Self {
            min_x: start.x.min(end.x),
            min_y: start.y.min(end.y),
            max_x: start.x.max(end.x),
            max_y: start.y.max(end.y),
        }
    }

    /// Square of `size` cells anchored at `(min_x, min_y)`.
    pub fn square(min_x: i32, min_y: i32, size: u32) -> Self {
        let extent = i32::try_from(size.max(1) - 1).unwrap_or(i32::MAX);
        Self {
            min_x,
            min_y,
            max_x: min_x.saturating_add(extent),
            max_y: min_y.saturating_add(extent),
        }
    }

    pub fn width(&self) -> u32 {
        axis_len(self.min_x, self.max_x)
    }

    pub fn height(&self) -> u32 {
        axis_len(self.min_y, self.max_y)
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }

    pub fn contains(&self, cell: CellCoordinate) -> bool {
        (self.min_x..=self.max_x).contains(&cell.x) && (self.min_y..=self.max_y).contains(&cell.y)
    }

    pub fn contains_bounds(&self, other: &CellBounds) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Grows the box so it also covers `cell`.
    pub fn expand_to(&mut self, cell: CellCoordinate) {
        self.min_x = self.min_x.min(cell.x);
        self.min_y = self.min_y.min(cell.y);
        self.max_x = self.max_x.max(cell.x);
        self.max_y = self.max_y.max(cell.y);
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Row-major walk over every cell in the box. Calling it again restarts the walk.
    pub fn cells(&self) -> CellIter {
        CellIter {
            bounds: *self,
            next: Some(CellCoordinate::new(self.min_x, self.min_y)),
        }
    }
}

fn axis_len(min: i32, max: i32) -> u32 {
    let span = i64::from(max) - i64::from(min) + 1;
    u32::try_from(span.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct CellIter {
    bounds: CellBounds,
    next: Option<CellCoordinate>,
}

impl Iterator for CellIter {
    type Item = CellCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current.x < self.bounds.max_x {
            Some(CellCoordinate::new(current.x + 1, current.y))
        } else if current.y < self.bounds.max_y {
            Some(CellCoordinate::new(self.bounds.min_x, current.y + 1))
        } else {
            None
        };
        Some(current)
    }
}

/// Per-map coordinate settings supplied by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateConfig {
    pub base_cell_size: f64,
    pub image_width: f64,
    pub image_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

impl GridSize {
    pub fn full_bounds(&self) -> CellBounds {
        CellBounds {
            min_x: 0,
            min_y: 0,
            max_x: i32::try_from(self.columns).unwrap_or(i32::MAX) - 1,
            max_y: i32::try_from(self.rows).unwrap_or(i32::MAX) - 1,
        }
    }

    /// Side of the largest square anchored at the origin.
    pub fn square_side(&self) -> u32 {
        self.columns.max(self.rows)
    }
}

impl CoordinateConfig {
    pub const fn new(base_cell_size: f64, image_width: f64, image_height: f64) -> Self {
        Self {
            base_cell_size,
            image_width,
            image_height,
        }
    }

    /// `floor(image / cell)` per axis; `None` when either count is not positive.
    pub fn grid_size(&self) -> Option<GridSize> {
        if !(self.base_cell_size.is_finite() && self.base_cell_size > 0.0) {
            return None;
        }
        let columns = (self.image_width / self.base_cell_size).floor();
        let rows = (self.image_height / self.base_cell_size).floor();
        if !(columns >= 1.0 && rows >= 1.0) || columns > f64::from(i32::MAX) || rows > f64::from(i32::MAX)
        {
            return None;
        }
        Some(GridSize {
            columns: columns as u32,
            rows: rows as u32,
        })
    }

    pub fn max_point(&self) -> MapPoint {
        MapPoint::new(
            self.image_width.max(0.0).floor() as i32,
            self.image_height.max(0.0).floor() as i32,
        )
    }
}

/// Map-relative pixel position of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: i32,
    pub y: i32,
}

impl MapPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `hue` in degrees, `saturation` and `lightness` in `0.0..=1.0`.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let sector = (hue.rem_euclid(360.0)) / 60.0;
        let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, second, 0.0),
            1 => (second, chroma, 0.0),
            2 => (0.0, chroma, second),
            3 => (0.0, second, chroma),
            4 => (second, 0.0, chroma),
            _ => (chroma, 0.0, second),
        };
        let offset = lightness - chroma / 2.0;
        let channel = |value: f64| ((value + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}
