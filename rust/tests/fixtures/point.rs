//! Geometry primitives

use std::fmt;
use std::ops::{Add, Sub};

/// A 2D point
pub struct Point {
    /// x coordinate
    pub x: i32,
    /// y coordinate
    pub y: i32,
}

/// Operations on `Point`
impl Point {
    /// Create a new Point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sum coordinates
    pub fn sum(&self) -> i32 {
        self.x + self.y
    }
}

/// Compass directions
pub enum Direction {
    North,
    South,
}

/// Things that can be measured
pub trait Measure {
    /// Length of the thing
    fn length(&self) -> f64;
}

/// Free function example
pub fn origin() -> Point {
    Point { x: 0, y: 0 }
}

pub mod io {
    /// Load a point from disk
    pub async fn load() -> super::Point {
        super::origin()
    }
}
