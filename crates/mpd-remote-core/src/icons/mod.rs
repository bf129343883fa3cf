//! Icon bitmaps for the optional pixel display.
//!
//! The display variant mirrors the most recent key press onto a small LED
//! matrix. Icons live in an external JSON resource keyed by logical button
//! name, each an 8×8 grid of 0/1:
//!
//! ```json
//! {
//!     "PLAY": [
//!         [0,0,1,0,0,0,0,0],
//!         [0,0,1,1,0,0,0,0],
//!         ...
//!     ]
//! }
//! ```
//!
//! The table is read-only after load; names without an icon simply leave the
//! display untouched.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Side length of an icon grid, in pixels.
pub const ICON_SIZE: usize = 8;

/// Error type for icon-table loading.
#[derive(Debug, Error)]
pub enum IconError {
    /// The resource is not valid JSON of the expected shape.
    #[error("failed to parse icon resource: {0}")]
    Parse(#[from] serde_json::Error),

    /// A grid is not exactly [`ICON_SIZE`]×[`ICON_SIZE`].
    #[error("icon {name:?} is {rows}x{cols}, expected {ICON_SIZE}x{ICON_SIZE}")]
    BadDimensions {
        name: String,
        rows: usize,
        cols: usize,
    },
}

/// A fixed-size monochrome pixel grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconBitmap {
    pixels: [[bool; ICON_SIZE]; ICON_SIZE],
}

impl IconBitmap {
    /// Whether the pixel at (row, col) is lit. Out-of-range coordinates are
    /// unlit rather than a panic.
    pub fn pixel(&self, row: usize, col: usize) -> bool {
        self.pixels
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Row-major iterator over all pixels.
    pub fn rows(&self) -> impl Iterator<Item = &[bool; ICON_SIZE]> {
        self.pixels.iter()
    }

    fn from_grid(name: &str, grid: Vec<Vec<u8>>) -> Result<Self, IconError> {
        let rows = grid.len();
        let cols = grid.first().map(Vec::len).unwrap_or(0);
        if rows != ICON_SIZE || grid.iter().any(|row| row.len() != ICON_SIZE) {
            return Err(IconError::BadDimensions {
                name: name.to_string(),
                rows,
                cols,
            });
        }

        let mut pixels = [[false; ICON_SIZE]; ICON_SIZE];
        for (r, row) in grid.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                pixels[r][c] = value != 0;
            }
        }
        Ok(Self { pixels })
    }
}

/// Read-only table of icons keyed by logical button name.
#[derive(Debug, Clone, Default)]
pub struct IconTable {
    icons: HashMap<String, IconBitmap>,
}

impl IconTable {
    /// Parses an icon table from its JSON resource text.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::Parse`] for malformed JSON and
    /// [`IconError::BadDimensions`] when any grid is not 8×8.
    pub fn from_json(json: &str) -> Result<Self, IconError> {
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct RawIcons(HashMap<String, Vec<Vec<u8>>>);

        let raw: RawIcons = serde_json::from_str(json)?;
        let mut icons = HashMap::with_capacity(raw.0.len());
        for (name, grid) in raw.0 {
            let bitmap = IconBitmap::from_grid(&name, grid)?;
            icons.insert(name, bitmap);
        }
        Ok(Self { icons })
    }

    /// Icon registered for a logical button name, if any.
    pub fn get(&self, name: &str) -> Option<&IconBitmap> {
        self.icons.get(name)
    }

    /// Number of registered icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Returns `true` if no icons are registered.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_json(rows: usize, cols: usize) -> String {
        let row: Vec<String> = (0..cols).map(|c| (c % 2).to_string()).collect();
        let row = format!("[{}]", row.join(","));
        let rows: Vec<String> = (0..rows).map(|_| row.clone()).collect();
        format!(r#"{{"PLAY": [{}]}}"#, rows.join(","))
    }

    #[test]
    fn test_valid_icon_loads_with_expected_pixels() {
        // Arrange: alternating 0/1 columns
        let json = grid_json(ICON_SIZE, ICON_SIZE);

        // Act
        let table = IconTable::from_json(&json).expect("valid icon must load");

        // Assert
        let icon = table.get("PLAY").expect("PLAY icon present");
        assert!(!icon.pixel(0, 0));
        assert!(icon.pixel(0, 1));
        assert!(icon.pixel(7, 7));
    }

    #[test]
    fn test_short_row_is_rejected() {
        let json = grid_json(ICON_SIZE, ICON_SIZE - 1);
        let result = IconTable::from_json(&json);
        assert!(matches!(result, Err(IconError::BadDimensions { .. })));
    }

    #[test]
    fn test_wrong_row_count_is_rejected() {
        let json = grid_json(ICON_SIZE + 1, ICON_SIZE);
        let result = IconTable::from_json(&json);
        assert!(matches!(result, Err(IconError::BadDimensions { .. })));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            IconTable::from_json("[[1,2"),
            Err(IconError::Parse(_))
        ));
    }

    #[test]
    fn test_unregistered_name_has_no_icon() {
        let table = IconTable::from_json(&grid_json(ICON_SIZE, ICON_SIZE)).expect("load");
        assert!(table.get("MUTE").is_none());
    }

    #[test]
    fn test_out_of_range_pixel_is_unlit() {
        let table = IconTable::from_json(&grid_json(ICON_SIZE, ICON_SIZE)).expect("load");
        let icon = table.get("PLAY").expect("icon");
        assert!(!icon.pixel(ICON_SIZE, 0));
        assert!(!icon.pixel(0, ICON_SIZE));
    }
}
