//! The prisoner's dilemma payoff matrix.
//!
//! | A \ B     | Cooperate | Defect |
//! |-----------|-----------|--------|
//! | Cooperate | 3         | 0      |
//! | Defect    | 5         | 1      |
//!
//! The matrix is read from the acting agent's side: `payoff(a, b)` is what
//! `a` earns against `b`, which in general differs from `payoff(b, a)`.

use followflee_types::Strategy;

/// Reward for mutual cooperation.
pub const REWARD: i32 = 3;

/// Sucker's payoff: cooperating against a defector.
pub const SUCKER: i32 = 0;

/// Temptation to defect against a cooperator.
pub const TEMPTATION: i32 = 5;

/// Punishment for mutual defection.
pub const PUNISHMENT: i32 = 1;

/// Payoff earned by an agent playing `own` against a neighbour playing
/// `other`.
pub const fn payoff(own: Strategy, other: Strategy) -> i32 {
    match (own, other) {
        (Strategy::Cooperator, Strategy::Cooperator) => REWARD,
        (Strategy::Cooperator, Strategy::Defector) => SUCKER,
        (Strategy::Defector, Strategy::Cooperator) => TEMPTATION,
        (Strategy::Defector, Strategy::Defector) => PUNISHMENT,
    }
}
