//! Per-node attribute storage.
//!
//! [`AttributeStore`] holds one [`CellAttributes`] per graph node, indexed by
//! [`NodeId`]. The host hands node data over in the raw integer encoding
//! ([`RawCell`]); [`AttributeStore::from_raw`] validates it once so the rest
//! of the simulation only ever sees typed values.

use followflee_types::{CellAttributes, Genome, NodeId, Strategy};
use followflee_types::enums::EMPTY_STRATEGY_CODE;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A node's attributes in the host's integer encoding.
///
/// `strategy`: 0 = empty, 1 = Cooperator, 2 = Defector. `actions`: 0-255.
/// `score`: any value in the `i32` range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCell {
    /// Raw strategy code.
    pub strategy: i64,
    /// Raw genome value.
    #[serde(default)]
    pub actions: i64,
    /// Raw score.
    #[serde(default)]
    pub score: i64,
}

impl RawCell {
    /// Decode this cell as the attributes of node `node`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidStrategyCode`],
    /// [`WorldError::InvalidActions`], or [`WorldError::InvalidScore`] for
    /// values outside the encoding.
    pub fn decode(self, node: NodeId) -> Result<CellAttributes, WorldError> {
        let invalid_strategy = || WorldError::InvalidStrategyCode {
            node,
            code: self.strategy,
        };
        let code = u8::try_from(self.strategy).map_err(|_err| invalid_strategy())?;
        let strategy = if code == EMPTY_STRATEGY_CODE {
            None
        } else {
            Some(Strategy::from_code(code).ok_or_else(invalid_strategy)?)
        };

        let actions = u8::try_from(self.actions).map_err(|_err| WorldError::InvalidActions {
            node,
            value: self.actions,
        })?;
        let score = i32::try_from(self.score).map_err(|_err| WorldError::InvalidScore {
            node,
            value: self.score,
        })?;

        Ok(CellAttributes {
            strategy,
            actions: Genome::new(actions),
            score,
        })
    }
}

impl From<CellAttributes> for RawCell {
    fn from(cell: CellAttributes) -> Self {
        Self {
            strategy: i64::from(cell.strategy_code()),
            actions: i64::from(cell.actions.raw()),
            score: i64::from(cell.score),
        }
    }
}

/// One [`CellAttributes`] per graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStore {
    /// Cells indexed by node id.
    cells: Vec<CellAttributes>,
}

impl AttributeStore {
    /// Create a store of `node_count` empty cells.
    pub fn new(node_count: usize) -> Self {
        Self {
            cells: vec![CellAttributes::EMPTY; node_count],
        }
    }

    /// Wrap already-typed cells, one per node in id order.
    pub const fn from_cells(cells: Vec<CellAttributes>) -> Self {
        Self { cells }
    }

    /// Decode raw host cells, one per node in id order.
    ///
    /// Empty cells are normalised to [`CellAttributes::EMPTY`] regardless of
    /// the genome or score the host left on them.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error, tagged with its node id.
    pub fn from_raw(raw: &[RawCell]) -> Result<Self, WorldError> {
        let mut cells = Vec::with_capacity(raw.len());
        for (idx, cell) in raw.iter().enumerate() {
            let node = u32::try_from(idx)
                .map(NodeId::new)
                .map_err(|_err| WorldError::TooManyNodes(raw.len()))?;
            let decoded = cell.decode(node)?;
            cells.push(if decoded.is_empty() {
                CellAttributes::EMPTY
            } else {
                decoded
            });
        }
        Ok(Self { cells })
    }

    /// Return the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the store holds no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Return the attributes of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is outside the store.
    pub fn get(&self, id: NodeId) -> Result<&CellAttributes, WorldError> {
        self.cells.get(id.index()).ok_or(WorldError::NodeNotFound(id))
    }

    /// Return the attributes of `id` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is outside the store.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut CellAttributes, WorldError> {
        self.cells
            .get_mut(id.index())
            .ok_or(WorldError::NodeNotFound(id))
    }

    /// Overwrite the attributes of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is outside the store.
    pub fn set(&mut self, id: NodeId, attrs: CellAttributes) -> Result<(), WorldError> {
        *self.get_mut(id)? = attrs;
        Ok(())
    }

    /// Zero every attribute of `id`, turning it into an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if `id` is outside the store.
    pub fn clear(&mut self, id: NodeId) -> Result<(), WorldError> {
        self.set(id, CellAttributes::EMPTY)
    }

    /// Copy all attributes of `src` onto `tgt`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NodeNotFound`] if either node is outside the
    /// store.
    pub fn copy(&mut self, src: NodeId, tgt: NodeId) -> Result<(), WorldError> {
        let attrs = *self.get(src)?;
        self.set(tgt, attrs)
    }

    /// Whether `id` is an empty cell. Unknown nodes are not empty.
    pub fn is_empty_cell(&self, id: NodeId) -> bool {
        self.cells.get(id.index()).is_some_and(|cell| cell.is_empty())
    }

    /// Iterate over `(node id, attributes)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CellAttributes)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| u32::try_from(idx).ok().map(|raw| (NodeId::new(raw), cell)))
    }

    /// Count the cells holding an agent with `strategy`.
    pub fn count_strategy(&self, strategy: Strategy) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.strategy == Some(strategy))
            .count()
    }

    /// Export every cell in the host's integer encoding.
    pub fn to_raw(&self) -> Vec<RawCell> {
        self.cells.iter().copied().map(RawCell::from).collect()
    }
}
