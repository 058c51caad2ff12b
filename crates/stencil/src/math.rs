//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam)'s `Vec2` so users don't need to
//! depend on it directly. [`Region`] is a pixel-space rectangle used for
//! animation frame regions and collision extents.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// An axis-aligned rectangle in pixel coordinates.
///
/// `(x, y)` is the top-left corner; `w` and `h` extend right and down.
/// Animation systems use regions to select one frame out of a sprite sheet;
/// collision code uses them as entity extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Half the width and height, as a vector.
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w * 0.5, self.h * 0.5)
    }

    /// Returns `true` if the two rectangles overlap with a positive area.
    /// Edge-touching rectangles do not count as overlapping.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Cut a uniform grid of `columns * rows` regions out of this rectangle,
    /// row-major. Handy for describing sprite-sheet frames.
    pub fn grid(&self, columns: u32, rows: u32) -> Vec<Region> {
        let fw = self.w / columns as f32;
        let fh = self.h / rows as f32;
        let mut frames = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for col in 0..columns {
                frames.push(Region::new(
                    self.x + col as f32 * fw,
                    self.y + row as f32 * fh,
                    fw,
                    fh,
                ));
            }
        }
        frames
    }
}
