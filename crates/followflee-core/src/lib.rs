//! Scoring, movement decisions, and generational replacement for the
//! `FollowFlee` simulation.
//!
//! Each generation every agent plays the game with its graph neighbours,
//! relocates according to its genome ("follow" or "flee" the neighbours it
//! sees), and finally the worst scorers are replaced by clones of the best.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `followflee-config.yaml` into
//!   strongly-typed structs, and validation of the model parameters.
//! - [`error`] -- [`ModelError`], the invariant violations that abort a run.
//! - [`generation`] -- The [`Simulation`] driver: one generation per step.
//! - [`horizon`] -- Per-agent neighbourhood scan and score accumulation.
//! - [`movement`] -- Genome-driven choice of the next cell.
//! - [`payoff`] -- The prisoner's dilemma payoff matrix.
//! - [`population`] -- The agent / empty-cell partition and its mutations.
//! - [`replacement`] -- Simple and neighbour-preferring replacement.
//! - [`runner`] -- Bounded run loop with a per-generation callback.
//!
//! [`ModelError`]: error::ModelError
//! [`Simulation`]: generation::Simulation

pub mod config;
pub mod error;
pub mod generation;
pub mod horizon;
pub mod movement;
pub mod payoff;
pub mod population;
pub mod replacement;
pub mod runner;

pub use error::ModelError;
pub use generation::{DriverState, Simulation, StepSignal};
