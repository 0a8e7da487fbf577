//! Genome-driven movement decisions.
//!
//! Given a [`Horizon`], an agent scores each of its free cells according to
//! the action codes its genome assigns to the current neighbourhood, then
//! moves to the best-scoring cell (ties broken uniformly at random). Its own
//! cell is always a candidate, so "stay" is a possible outcome.
//!
//! # Which codes apply
//!
//! | Occupied neighbours    | Genome bits | Applied to            |
//! |------------------------|-------------|-----------------------|
//! | only cooperators       | 7-6         | cooperator list       |
//! | only defectors         | 5-4         | defector list         |
//! | both                   | 3-2 and 1-0 | cooperators, defectors |
//!
//! With no occupied neighbour at all there is no social context and the
//! genome is ignored: the target is drawn uniformly from the free cells.
//!
//! # Randomness
//!
//! Draws happen in this order within one decision: one draw per free cell
//! for each applied [`ActionCode::Random`] code, then one tie-break draw
//! when more than one cell shares the best score.

use followflee_types::{ActionCode, Genome, GenomeSlot, NodeId};
use followflee_world::Topology;
use rand::Rng;

use crate::error::ModelError;
use crate::horizon::{FreeCell, Horizon};

/// Composition of an agent's occupied neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// No neighbour cell is occupied.
    Isolated,
    /// Every occupied neighbour cooperates.
    AllCooperators,
    /// Every occupied neighbour defects.
    AllDefectors,
    /// Anything else.
    Mixed,
}

impl Composition {
    /// Classify a horizon.
    ///
    /// The counts are compared against the occupied-neighbour count derived
    /// from the degree, so a neighbourhood whose lists do not add up to it is
    /// treated as mixed, with both mixed codes applied.
    pub fn of(horizon: &Horizon) -> Self {
        let occupied = horizon.occupied_neighbours();
        if occupied == 0 {
            Self::Isolated
        } else if occupied == horizon.cooperators().len() {
            Self::AllCooperators
        } else if occupied == horizon.defectors().len() {
            Self::AllDefectors
        } else {
            Self::Mixed
        }
    }
}

/// Choose the cell `agent` moves to next.
///
/// Returns `agent` itself when staying put wins, or when no empty neighbour
/// exists. The free-cell scores in `horizon` are left as evaluated.
///
/// # Errors
///
/// Returns [`ModelError::World`] if a listed neighbour is not in the graph,
/// or [`ModelError::ArithmeticOverflow`] if a neighbour list is too long to
/// score.
pub fn decide_move(
    agent: NodeId,
    genome: Genome,
    horizon: &mut Horizon,
    topology: &Topology,
    rng: &mut impl Rng,
) -> Result<NodeId, ModelError> {
    // Only the agent's own cell: nowhere to go.
    if horizon.free_cells().len() == 1 {
        return Ok(agent);
    }

    let composition = Composition::of(horizon);
    let (free_cells, cooperators, defectors) = horizon.split_mut();

    match composition {
        Composition::Isolated => {
            let idx = rng.random_range(0..free_cells.len());
            return free_cells
                .get(idx)
                .map(|fc| fc.id)
                .ok_or_else(|| overflow("isolated draw out of range"));
        }
        Composition::AllCooperators => {
            let code = genome.code(GenomeSlot::AllCooperators);
            apply_code(code, free_cells, cooperators, topology, rng)?;
        }
        Composition::AllDefectors => {
            let code = genome.code(GenomeSlot::AllDefectors);
            apply_code(code, free_cells, defectors, topology, rng)?;
        }
        Composition::Mixed => {
            let code = genome.code(GenomeSlot::MixedCooperators);
            apply_code(code, free_cells, cooperators, topology, rng)?;
            let code = genome.code(GenomeSlot::MixedDefectors);
            apply_code(code, free_cells, defectors, topology, rng)?;
        }
    }

    pick_best(free_cells, rng).ok_or_else(|| overflow("no free cell to pick"))
}

/// Apply one action code to the free cells, against one neighbour list.
///
/// Effects of successive calls add up.
///
/// # Errors
///
/// Returns [`ModelError::World`] if a neighbour is not in the graph, or
/// [`ModelError::ArithmeticOverflow`] if the list length exceeds `i32`.
pub fn apply_code(
    code: ActionCode,
    free_cells: &mut [FreeCell],
    neighbours: &[NodeId],
    topology: &Topology,
    rng: &mut impl Rng,
) -> Result<(), ModelError> {
    match code {
        ActionCode::StayStill => stay_still(free_cells, list_size(neighbours)?),
        ActionCode::Follow => {
            for &neighbour in neighbours {
                follow(free_cells, topology.neighbours(neighbour)?);
            }
        }
        ActionCode::Flee => {
            for &neighbour in neighbours {
                flee(free_cells, topology.neighbours(neighbour)?);
            }
        }
        ActionCode::Random => random(free_cells, list_size(neighbours)?, rng),
    }
    Ok(())
}

/// Every free cell but the agent's own (index 0) loses `list_size` points.
fn stay_still(free_cells: &mut [FreeCell], list_size: i32) {
    for fc in free_cells.iter_mut().skip(1) {
        fc.score = fc.score.saturating_sub(list_size);
    }
}

/// Free cells adjacent to the neighbour gain a point.
fn follow(free_cells: &mut [FreeCell], neighbour_adjacency: &[NodeId]) {
    for fc in free_cells.iter_mut() {
        if neighbour_adjacency.contains(&fc.id) {
            fc.score = fc.score.saturating_add(1);
        }
    }
}

/// Free cells not adjacent to the neighbour gain a point.
fn flee(free_cells: &mut [FreeCell], neighbour_adjacency: &[NodeId]) {
    for fc in free_cells.iter_mut() {
        if !neighbour_adjacency.contains(&fc.id) {
            fc.score = fc.score.saturating_add(1);
        }
    }
}

/// Every free cell gets an independent draw in `[-list_size, list_size]`.
fn random(free_cells: &mut [FreeCell], list_size: i32, rng: &mut impl Rng) {
    let low = list_size.saturating_neg();
    for fc in free_cells.iter_mut() {
        fc.score = fc.score.saturating_add(rng.random_range(low..=list_size));
    }
}

/// Return the id of a best-scoring free cell, breaking ties uniformly.
///
/// No draw is made when the best score is unique.
fn pick_best(free_cells: &[FreeCell], rng: &mut impl Rng) -> Option<NodeId> {
    let best = free_cells.iter().map(|fc| fc.score).max()?;
    let mut tied = free_cells.iter().filter(|fc| fc.score == best);
    let tie_count = tied.clone().count();
    if tie_count == 1 {
        return tied.next().map(|fc| fc.id);
    }
    let pick = rng.random_range(0..tie_count);
    tied.nth(pick).map(|fc| fc.id)
}

/// Length of a neighbour list as a score delta.
fn list_size(neighbours: &[NodeId]) -> Result<i32, ModelError> {
    i32::try_from(neighbours.len()).map_err(|_err| overflow("neighbour list longer than i32"))
}

fn overflow(context: &str) -> ModelError {
    ModelError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use followflee_types::{CellAttributes, Strategy};
    use followflee_world::{AttributeStore, Neighbourhood, square_lattice};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::horizon::build_horizon;

    fn n(raw: u32) -> NodeId {
        NodeId::new(raw)
    }

    fn scores(horizon: &Horizon) -> Vec<i32> {
        horizon.free_cells().iter().map(|fc| fc.score).collect()
    }

    /// Agent 0 with neighbours 1..=4; 1 and 2 are cooperators, 3 and 4 empty.
    fn two_cooperators_two_free() -> (Topology, Horizon) {
        let topo = Topology::from_edges(
            5,
            &[(n(0), n(1)), (n(0), n(2)), (n(0), n(3)), (n(0), n(4))],
            true,
        )
        .unwrap();
        let horizon = Horizon::from_parts(n(0), 4, vec![n(1), n(2)], vec![], &[n(3), n(4)]);
        (topo, horizon)
    }

    #[test]
    fn stay_still_keeps_agent_in_place() {
        let (topo, mut horizon) = two_cooperators_two_free();
        let mut rng = StdRng::seed_from_u64(42);
        let genome = Genome::new(0);

        let target = decide_move(n(0), genome, &mut horizon, &topo, &mut rng).unwrap();

        assert_eq!(target, n(0));
        assert_eq!(scores(&horizon), vec![0, -2, -2]);
    }

    #[test]
    fn follow_prefers_cells_shared_with_the_neighbour() {
        // Path 2 - 0 - 1 - 3 plus leaf 4 on the agent: the cooperator on 1
        // is adjacent to the agent's cell and to free cell 3, not to 4.
        let topo = Topology::from_edges(
            5,
            &[(n(0), n(1)), (n(0), n(4)), (n(1), n(3)), (n(0), n(3))],
            true,
        )
        .unwrap();
        let mut horizon = Horizon::from_parts(n(0), 3, vec![n(1)], vec![], &[n(4), n(3)]);
        let genome = Genome::from_codes([
            ActionCode::Follow,
            ActionCode::StayStill,
            ActionCode::StayStill,
            ActionCode::StayStill,
        ]);

        let mut seen = BTreeMap::new();
        for seed in 0..64_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut h = horizon.clone();
            let target = decide_move(n(0), genome, &mut h, &topo, &mut rng).unwrap();
            *seen.entry(target).or_insert(0_u32) += 1;
        }
        let mut rng = StdRng::seed_from_u64(0);
        decide_move(n(0), genome, &mut horizon, &topo, &mut rng).unwrap();

        // Self and cell 3 touch the cooperator; cell 4 does not.
        assert_eq!(scores(&horizon), vec![1, 0, 1]);
        assert!(!seen.contains_key(&n(4)));
        assert!(seen.contains_key(&n(3)));
        assert!(seen.contains_key(&n(0)));
    }

    #[test]
    fn flee_prefers_cells_away_from_the_neighbour() {
        let topo = Topology::from_edges(
            5,
            &[(n(0), n(1)), (n(0), n(4)), (n(1), n(3)), (n(0), n(3))],
            true,
        )
        .unwrap();
        let mut horizon = Horizon::from_parts(n(0), 3, vec![], vec![n(1)], &[n(4), n(3)]);
        let genome = Genome::from_codes([
            ActionCode::StayStill,
            ActionCode::Flee,
            ActionCode::StayStill,
            ActionCode::StayStill,
        ]);
        let mut rng = StdRng::seed_from_u64(1);

        let target = decide_move(n(0), genome, &mut horizon, &topo, &mut rng).unwrap();

        assert_eq!(scores(&horizon), vec![0, 1, 0]);
        assert_eq!(target, n(4));
    }

    #[test]
    fn random_code_stays_within_list_size() {
        let (topo, horizon) = two_cooperators_two_free();
        let genome = Genome::from_codes([ActionCode::Random; 4]);
        for seed in 0..50_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut h = horizon.clone();
            let target = decide_move(n(0), genome, &mut h, &topo, &mut rng).unwrap();
            assert!(scores(&h).iter().all(|s| (-2..=2).contains(s)));
            let best = scores(&h).into_iter().max().unwrap();
            let chosen = h.free_cells().iter().find(|fc| fc.id == target).unwrap();
            assert_eq!(chosen.score, best);
        }
    }

    #[test]
    fn no_free_neighbour_means_no_move() {
        let topo = Topology::from_edges(2, &[(n(0), n(1))], true).unwrap();
        let mut horizon = Horizon::from_parts(n(0), 1, vec![], vec![n(1)], &[]);
        let mut rng = StdRng::seed_from_u64(3);
        let target = decide_move(n(0), Genome::new(0b0001_0000), &mut horizon, &topo, &mut rng);
        assert_eq!(target.unwrap(), n(0));
    }

    #[test]
    fn isolated_agent_ignores_genome() {
        // Agent 0 on a star with every leaf empty.
        let topo = Topology::from_edges(
            4,
            &[(n(0), n(1)), (n(0), n(2)), (n(0), n(3))],
            true,
        )
        .unwrap();
        let horizon = Horizon::from_parts(n(0), 3, vec![], vec![], &[n(1), n(2), n(3)]);
        assert_eq!(Composition::of(&horizon), Composition::Isolated);

        let mut counts: BTreeMap<NodeId, u32> = BTreeMap::new();
        // A stay-still genome would never leave; an isolated agent does.
        let genome = Genome::new(0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4000 {
            let mut h = horizon.clone();
            let target = decide_move(n(0), genome, &mut h, &topo, &mut rng).unwrap();
            assert!(h.free_cells().iter().all(|fc| fc.score == 0));
            *counts.entry(target).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 4);
        for count in counts.values() {
            assert!((800..=1200).contains(count), "skewed count {count}");
        }
    }

    #[test]
    fn mixed_neighbourhood_applies_both_codes() {
        // Cooperator on 1, defector on 2, free cells 3 and 4.
        let topo = Topology::from_edges(
            5,
            &[(n(0), n(1)), (n(0), n(2)), (n(0), n(3)), (n(0), n(4)), (n(2), n(4))],
            true,
        )
        .unwrap();
        let mut horizon = Horizon::from_parts(n(0), 4, vec![n(1)], vec![n(2)], &[n(3), n(4)]);
        assert_eq!(Composition::of(&horizon), Composition::Mixed);
        // Mixed: stay still against cooperators, follow the defector.
        let genome = Genome::from_codes([
            ActionCode::Random,
            ActionCode::Random,
            ActionCode::StayStill,
            ActionCode::Follow,
        ]);
        let mut rng = StdRng::seed_from_u64(9);

        let target = decide_move(n(0), genome, &mut horizon, &topo, &mut rng).unwrap();

        // Self: 0 + 1 (adjacent to 2). Cell 3: -1 + 0. Cell 4: -1 + 1.
        assert_eq!(scores(&horizon), vec![1, -1, 0]);
        assert_eq!(target, n(0));
    }

    #[test]
    fn mixed_with_an_empty_list_still_applies_both_codes() {
        // Degree says two neighbours are occupied but only one is listed:
        // the neighbourhood is classified mixed and the empty defector list
        // contributes nothing.
        let topo = Topology::from_edges(
            4,
            &[(n(0), n(1)), (n(0), n(2)), (n(0), n(3))],
            true,
        )
        .unwrap();
        let mut horizon = Horizon::from_parts(n(0), 3, vec![n(1)], vec![], &[n(3)]);
        assert_eq!(Composition::of(&horizon), Composition::Mixed);
        let genome = Genome::from_codes([
            ActionCode::Follow,
            ActionCode::Follow,
            ActionCode::StayStill,
            ActionCode::StayStill,
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        let target = decide_move(n(0), genome, &mut horizon, &topo, &mut rng).unwrap();
        assert_eq!(scores(&horizon), vec![0, -1]);
        assert_eq!(target, n(0));
    }

    #[test]
    fn ties_are_broken_across_all_best_cells() {
        let (topo, horizon) = two_cooperators_two_free();
        // Flee from cooperators 1 and 2 on a star: neither leaf touches
        // cells 3 or 4, and both touch the centre.
        let genome = Genome::from_codes([
            ActionCode::Flee,
            ActionCode::StayStill,
            ActionCode::StayStill,
            ActionCode::StayStill,
        ]);
        let mut seen = BTreeMap::new();
        for seed in 0..200_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut h = horizon.clone();
            let target = decide_move(n(0), genome, &mut h, &topo, &mut rng).unwrap();
            assert_eq!(scores(&h), vec![0, 2, 2]);
            *seen.entry(target).or_insert(0_u32) += 1;
        }
        assert_eq!(seen.keys().copied().collect::<Vec<_>>(), vec![n(3), n(4)]);
    }

    #[test]
    fn decision_on_a_lattice_is_reproducible() {
        let topo = square_lattice(5, 5, Neighbourhood::Moore, true).unwrap();
        let mut store = AttributeStore::new(25);
        for id in [0_u32, 1, 6, 7, 12] {
            let strategy = if id % 2 == 0 {
                Strategy::Cooperator
            } else {
                Strategy::Defector
            };
            store
                .set(n(id), CellAttributes::agent(strategy, Genome::new(0b1110_0111)))
                .unwrap();
        }

        let run = |seed: u64| {
            let mut store = store.clone();
            let mut horizon = Horizon::with_capacity(topo.neighbours_hint());
            let mut rng = StdRng::seed_from_u64(seed);
            build_horizon(n(6), &topo, &mut store, &mut horizon).unwrap();
            let genome = store.get(n(6)).unwrap().actions;
            decide_move(n(6), genome, &mut horizon, &topo, &mut rng).unwrap()
        };
        assert_eq!(run(11), run(11));
    }
}
