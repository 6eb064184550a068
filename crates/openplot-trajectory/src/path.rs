//! Vertex list validation and access.

use openplot_fixed::POSITION_Q;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One target point in integer plot units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate, plot units (degrees of the X axis).
    pub x: i32,
    /// Y coordinate, plot units (degrees of the Y axis).
    pub y: i32,
}

impl Vertex {
    /// Construct a vertex.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Trajectory validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajectoryError {
    /// At least the starting vertex is required.
    #[error("trajectory must contain at least one vertex")]
    Empty,
    /// A zero or negative ramp limit can never arrive anywhere.
    #[error("ramp limit must be positive, got {0}")]
    BadRampLimit(i32),
    /// Coordinates must survive the shift into Q16 reference units.
    #[error("vertex {index} coordinate {value} exceeds ±{limit}")]
    CoordinateOutOfRange {
        /// Offending vertex index.
        index: usize,
        /// Offending coordinate value.
        value: i32,
        /// Permitted magnitude.
        limit: i32,
    },
}

/// An ordered, immutable sequence of target vertices.
///
/// The first vertex is the starting point of the plot; the references are
/// seeded from it when a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    vertices: Vec<Vertex>,
}

impl Trajectory {
    /// Largest coordinate magnitude representable in Q16 reference units.
    pub const COORDINATE_LIMIT: i32 = i32::MAX >> POSITION_Q;

    /// Validate and freeze a vertex list.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Empty`] for an empty list and
    /// [`TrajectoryError::CoordinateOutOfRange`] when any coordinate cannot
    /// be scaled into the reference format.
    pub fn new(vertices: Vec<Vertex>) -> Result<Self, TrajectoryError> {
        if vertices.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        for (index, vertex) in vertices.iter().enumerate() {
            for value in [vertex.x, vertex.y] {
                // unsigned_abs: i32::MIN must be rejected, not negated.
                if value.unsigned_abs() > Self::COORDINATE_LIMIT.unsigned_abs() {
                    return Err(TrajectoryError::CoordinateOutOfRange {
                        index,
                        value,
                        limit: Self::COORDINATE_LIMIT,
                    });
                }
            }
        }
        Ok(Self { vertices })
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// A validated trajectory is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Vertex at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vertex> {
        self.vertices.get(index).copied()
    }

    /// The full vertex slice.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index of the final vertex.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.vertices.len() - 1
    }
}
