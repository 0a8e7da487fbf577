//! Square lattice builder.
//!
//! Cells are numbered row-major: the cell at `(row, col)` has id
//! `row * width + col`. Each cell lists its neighbours in row-major offset
//! order (north-west first, south-east last), so the neighbour scan order is
//! the same on every run.
//!
//! With `periodic` set the lattice wraps around both axes (a torus). On very
//! small tori several offsets can land on the same cell, or on the cell
//! itself; those are listed once and never as a self loop.

use followflee_types::NodeId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;
use crate::topology::Topology;

/// Which cells count as neighbours on a square lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighbourhood {
    /// The 4 orthogonal cells.
    VonNeumann,
    /// The 8 orthogonal and diagonal cells.
    #[default]
    Moore,
}

/// Orthogonal offsets `(d_row, d_col)` in row-major order.
const VON_NEUMANN_OFFSETS: [(i64, i64); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Orthogonal and diagonal offsets `(d_row, d_col)` in row-major order.
const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Neighbourhood {
    /// Return the neighbour offsets of this neighbourhood.
    pub const fn offsets(self) -> &'static [(i64, i64)] {
        match self {
            Self::VonNeumann => &VON_NEUMANN_OFFSETS,
            Self::Moore => &MOORE_OFFSETS,
        }
    }
}

/// Build a `width` x `height` square lattice.
///
/// # Errors
///
/// Returns [`WorldError::InvalidDimensions`] if either dimension is zero or
/// the cell count does not fit a [`NodeId`].
pub fn square_lattice(
    width: u32,
    height: u32,
    neighbourhood: Neighbourhood,
    periodic: bool,
) -> Result<Topology, WorldError> {
    let invalid = || WorldError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    let cell_count = width.checked_mul(height).ok_or_else(invalid)?;
    let node_count = usize::try_from(cell_count).map_err(|_err| invalid())?;

    let mut topology = Topology::with_nodes(node_count)?;
    let w = i64::from(width);
    let h = i64::from(height);

    for row in 0..h {
        for col in 0..w {
            let from = cell_id(row, col, w)?;
            for &(d_row, d_col) in neighbourhood.offsets() {
                let Some((n_row, n_col)) = offset_cell(row, col, d_row, d_col, w, h, periodic)
                else {
                    continue;
                };
                let to = cell_id(n_row, n_col, w)?;
                if to == from || topology.is_neighbour(from, to) {
                    continue;
                }
                topology.add_edge(from, to, false)?;
            }
        }
    }

    debug!(
        width,
        height,
        ?neighbourhood,
        periodic,
        edges = topology.edge_count(),
        "Square lattice built"
    );
    Ok(topology)
}

/// Apply an offset to a cell, wrapping or clipping at the border.
fn offset_cell(
    row: i64,
    col: i64,
    d_row: i64,
    d_col: i64,
    width: i64,
    height: i64,
    periodic: bool,
) -> Option<(i64, i64)> {
    let raw_row = row.checked_add(d_row)?;
    let raw_col = col.checked_add(d_col)?;
    if periodic {
        Some((
            raw_row.checked_rem_euclid(height)?,
            raw_col.checked_rem_euclid(width)?,
        ))
    } else if (0..height).contains(&raw_row) && (0..width).contains(&raw_col) {
        Some((raw_row, raw_col))
    } else {
        None
    }
}

/// Row-major id of the cell at `(row, col)`.
fn cell_id(row: i64, col: i64, width: i64) -> Result<NodeId, WorldError> {
    let raw = row
        .checked_mul(width)
        .and_then(|base| base.checked_add(col))
        .ok_or(WorldError::ArithmeticOverflow)?;
    u32::try_from(raw)
        .map(NodeId::new)
        .map_err(|_err| WorldError::ArithmeticOverflow)
}
