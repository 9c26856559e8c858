use std::fmt;
use crate::stats::FrameStats;

/// A polygon the scanline converter refused. The polygon is skipped, the rest
/// of the frame is unaffected.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterFault {
    /// Fewer than three vertices reached the rasterizer.
    TooFewVertices { count: usize },
    /// A third edge became active on `row`; the polygon is not convex.
    TooManyEdges { row: i32 },
    /// Fewer than two edges active on `row` inside the polygon's span.
    MissingEdge { row: i32 },
}

impl fmt::Display for RasterFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterFault::TooFewVertices { count } => {
                write!(f, "polygon has {count} vertices, need at least 3")
            }
            RasterFault::TooManyEdges { row } => {
                write!(f, "more than two active edges on row {row}")
            }
            RasterFault::MissingEdge { row } => {
                write!(f, "fewer than two active edges on row {row}")
            }
        }
    }
}

impl std::error::Error for RasterFault {}

/// Fault together with the color of the polygon that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFault {
    pub color: u32,
    pub fault: RasterFault,
}

#[derive(Debug, Clone)]
pub enum RenderError {
    InvalidTileSize { width: usize, height: usize },
    /// The frame buffer or the camera viewport does not match the context
    /// viewport.
    BufferSize { expected: (usize, usize), actual: (usize, usize) },
    /// The frame was drawn but some polygons were skipped.
    Partial { stats: FrameStats, faults: Vec<PolygonFault> },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidTileSize { width, height } => {
                write!(f, "invalid tile size {width}x{height}")
            }
            RenderError::BufferSize { expected, actual } => write!(
                f,
                "viewport mismatch: got {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            RenderError::Partial { faults, .. } => {
                write!(f, "frame rendered with {} skipped polygons", faults.len())?;
                if let Some(first) = faults.first() {
                    write!(f, " (first: {})", first.fault)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for RenderError {}
