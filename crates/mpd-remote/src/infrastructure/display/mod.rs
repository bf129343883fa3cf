//! Pixel-display infrastructure for the optional icon mirroring.
//!
//! The dispatcher paints the icon of every recognized key press onto a small
//! LED matrix. The [`PixelDisplay`] trait is the seam: a hardware driver
//! implements it against the real device; [`AsciiDisplay`] is the headless
//! stand-in that renders into the debug log and is used on machines without
//! a matrix attached.

use tracing::debug;

use mpd_remote_core::IconBitmap;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting the pixel display.
#[cfg_attr(test, automock)]
pub trait PixelDisplay: Send {
    /// Turns every pixel off.
    fn clear(&mut self);

    /// Paints an icon bitmap, one pixel per matrix LED.
    fn set_pixels(&mut self, icon: &IconBitmap);

    /// Rotates the rendered output; accepts 0, 90, 180, or 270 degrees.
    fn set_rotation(&mut self, degrees: u16);
}

/// Headless display rendering icons into the debug log.
pub struct AsciiDisplay {
    rotation: u16,
}

impl AsciiDisplay {
    /// Creates a display with no rotation.
    pub fn new() -> Self {
        Self { rotation: 0 }
    }

    /// Currently configured rotation in degrees.
    pub fn rotation(&self) -> u16 {
        self.rotation
    }
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelDisplay for AsciiDisplay {
    fn clear(&mut self) {
        debug!("display cleared");
    }

    fn set_pixels(&mut self, icon: &IconBitmap) {
        for row in icon.rows() {
            let line: String = row.iter().map(|&lit| if lit { '#' } else { '.' }).collect();
            debug!("|{line}|");
        }
    }

    fn set_rotation(&mut self, degrees: u16) {
        self.rotation = degrees % 360;
        debug!("display rotation set to {}", self.rotation);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
