//! Core value structs for the `FollowFlee` simulation.
//!
//! Covers the 8-bit movement [`Genome`], the per-node [`CellAttributes`], and
//! the [`GenerationSummary`] reported to the host after every step.

use serde::{Deserialize, Serialize};

use crate::enums::{ActionCode, GenomeSlot, Strategy};

// ---------------------------------------------------------------------------
// Genome
// ---------------------------------------------------------------------------

/// An 8-bit movement genome holding four independent 2-bit action codes.
///
/// Bits 7-6 apply when all occupied neighbours cooperate, bits 5-4 when all
/// defect, and bits 3-2 / 1-0 apply to the cooperator and defector lists of
/// a mixed neighbourhood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome(pub u8);

impl Genome {
    /// The zeroed genome carried by empty cells.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw `actions` attribute value.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Build a genome from four action codes, ordered as [`GenomeSlot::ALL`].
    pub const fn from_codes(codes: [ActionCode; 4]) -> Self {
        let [all_c, all_d, mixed_c, mixed_d] = codes;
        Self(
            all_c.bits().wrapping_shl(6)
                | all_d.bits().wrapping_shl(4)
                | mixed_c.bits().wrapping_shl(2)
                | mixed_d.bits(),
        )
    }

    /// Return the raw attribute value.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Decode the action code stored in `slot`.
    pub const fn code(self, slot: GenomeSlot) -> ActionCode {
        // shift() is at most 6, so the shift never wraps.
        ActionCode::from_bits(self.0.wrapping_shr(slot.shift()))
    }
}

// ---------------------------------------------------------------------------
// CellAttributes
// ---------------------------------------------------------------------------

/// The attributes stored on every graph node.
///
/// A node with `strategy == None` is an empty cell; its genome and score are
/// kept at zero by every ledger operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Strategy of the agent on this cell, or `None` for an empty cell.
    pub strategy: Option<Strategy>,
    /// Movement genome.
    pub actions: Genome,
    /// Payoff accumulated during the current generation.
    pub score: i32,
}

impl CellAttributes {
    /// Attributes of an empty cell.
    pub const EMPTY: Self = Self {
        strategy: None,
        actions: Genome::ZERO,
        score: 0,
    };

    /// Attributes of a freshly placed agent with a zero score.
    pub const fn agent(strategy: Strategy, actions: Genome) -> Self {
        Self {
            strategy: Some(strategy),
            actions,
            score: 0,
        }
    }

    /// Whether this cell holds no agent.
    pub const fn is_empty(self) -> bool {
        self.strategy.is_none()
    }

    /// Return the strategy code as stored by the host (0 for empty).
    pub const fn strategy_code(self) -> u8 {
        match self.strategy {
            Some(strategy) => strategy.code(),
            None => crate::enums::EMPTY_STRATEGY_CODE,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationSummary
// ---------------------------------------------------------------------------

/// Summary of one generation step, reported to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// 1-based index of the generation that was executed.
    pub generation: u64,
    /// Agents alive at the end of the generation.
    pub agents: usize,
    /// Cooperators alive at the end of the generation.
    pub cooperators: usize,
    /// Defectors alive at the end of the generation.
    pub defectors: usize,
    /// Empty cells at the end of the generation.
    pub empty_cells: usize,
    /// Micro-steps that relocated an agent.
    pub moves: u64,
    /// Agents evicted (and clones spawned) by the replacement phase.
    pub replaced: usize,
    /// Highest score reached before replacement.
    pub best_score: Option<i32>,
    /// Lowest score reached before replacement.
    pub worst_score: Option<i32>,
    /// Sum of all scores before replacement.
    pub total_score: i64,
}
