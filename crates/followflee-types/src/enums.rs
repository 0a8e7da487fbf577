//! Enumeration types for the `FollowFlee` simulation.
//!
//! Strategies and action codes have fixed integer encodings because they are
//! stored as plain node attributes by the host:
//!
//! | Attribute  | Encoding                                   |
//! |------------|--------------------------------------------|
//! | `strategy` | 0 = empty cell, 1 = Cooperator, 2 = Defector |
//! | `actions`  | 0-255, four 2-bit action codes             |

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Attribute code of an empty cell.
pub const EMPTY_STRATEGY_CODE: u8 = 0;

/// The game strategy played by a live agent.
///
/// An empty cell has no strategy; it is represented as `Option::None`
/// wherever a cell may or may not hold an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Plays "Cooperate" (attribute code 1).
    Cooperator,
    /// Plays "Defect" (attribute code 2).
    Defector,
}

impl Strategy {
    /// Return the attribute code of this strategy.
    pub const fn code(self) -> u8 {
        match self {
            Self::Cooperator => 1,
            Self::Defector => 2,
        }
    }

    /// Decode a live-agent strategy code.
    ///
    /// Returns `None` for the empty code and for anything outside the
    /// encoding; callers that must tell the two apart check
    /// [`EMPTY_STRATEGY_CODE`] first.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Cooperator),
            2 => Some(Self::Defector),
            _ => None,
        }
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cooperator => f.write_str("cooperator"),
            Self::Defector => f.write_str("defector"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action codes
// ---------------------------------------------------------------------------

/// A 2-bit movement behaviour decoded from the genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    /// Code 0: every free cell except the agent's own loses one point per
    /// neighbour in the list.
    StayStill,
    /// Code 1: free cells adjacent to a listed neighbour gain a point.
    Follow,
    /// Code 2: free cells not adjacent to a listed neighbour gain a point.
    Flee,
    /// Code 3: every free cell gets a uniform draw in `[-n, n]`.
    Random,
}

impl ActionCode {
    /// Decode the two lowest bits of `bits`. Higher bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::StayStill,
            1 => Self::Follow,
            2 => Self::Flee,
            // 3 is the only remaining value after masking.
            _ => Self::Random,
        }
    }

    /// Return the 2-bit value of this code.
    pub const fn bits(self) -> u8 {
        match self {
            Self::StayStill => 0,
            Self::Follow => 1,
            Self::Flee => 2,
            Self::Random => 3,
        }
    }
}

/// Which 2-bit field of the genome applies to a neighbour list.
///
/// The genome is read most-significant pair first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GenomeSlot {
    /// Bits 7-6: neighbourhood made only of cooperators.
    AllCooperators,
    /// Bits 5-4: neighbourhood made only of defectors.
    AllDefectors,
    /// Bits 3-2: cooperator list of a mixed neighbourhood.
    MixedCooperators,
    /// Bits 1-0: defector list of a mixed neighbourhood.
    MixedDefectors,
}

impl GenomeSlot {
    /// All slots, most-significant first.
    pub const ALL: [Self; 4] = [
        Self::AllCooperators,
        Self::AllDefectors,
        Self::MixedCooperators,
        Self::MixedDefectors,
    ];

    /// Bit offset of the low bit of this slot.
    pub const fn shift(self) -> u32 {
        match self {
            Self::AllCooperators => 6,
            Self::AllDefectors => 4,
            Self::MixedCooperators => 2,
            Self::MixedDefectors => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement modes
// ---------------------------------------------------------------------------

/// The generational replacement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementMode {
    /// Clones of the best agents land on uniformly random empty cells
    /// (configuration name `simpleBD`).
    Simple,
    /// Clones land next to their parent when possible
    /// (configuration name `neighbourBD`).
    NeighbourPreferring,
}

impl ReplacementMode {
    /// Parse the configuration name of a replacement mode.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "simpleBD" => Some(Self::Simple),
            "neighbourBD" => Some(Self::NeighbourPreferring),
            _ => None,
        }
    }

    /// Return the configuration name of this mode.
    pub const fn config_name(self) -> &'static str {
        match self {
            Self::Simple => "simpleBD",
            Self::NeighbourPreferring => "neighbourBD",
        }
    }
}
