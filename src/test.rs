use crate::{
    geometry::Point,
    shape::Shape,
    solver::{CubePacker, Outcome, SolveResult, SolverConfig},
};

fn solve(length: usize, shape: &Shape, seed: u64) -> SolveResult {
    CubePacker::new(length)
        .unwrap()
        .with_config(SolverConfig::default().with_seed(seed))
        .with_observer(())
        .solve(shape)
}

#[test]
pub fn solve_2by2_cube() {
    let result = solve(2, &Shape::from_size(1, 1, 2).unwrap(), 0);

    assert_eq!(result.outcome, Outcome::Solved);
    assert_eq!(result.solution_count(), 1, "Solution found");
    assert_eq!(result.placements().len(), 4);
    assert_eq!(result.stats.orientations, 3);
    assert!(result.solution.unwrap().verify());
}

#[test]
pub fn shape_size_doesnt_fit() {
    let result = solve(5, &Shape::from_size(1, 1, 2).unwrap(), 0);

    assert_eq!(result.outcome, Outcome::Infeasible);
    assert_eq!(result.solution_count(), 0, "No solutions can be found");
    assert!(result.placements().is_empty());
    assert_eq!(result.stats.attempts, 0, "no search is attempted");
}

#[test]
pub fn solve_4by4_cube() {
    let shape = Shape::preset("ell").unwrap();

    for seed in 0..4 {
        let result = solve(4, &shape, seed);

        assert_eq!(result.solution_count(), 1, "Solution found, seed {seed}");
        let solution = result.solution.unwrap();
        assert_eq!(solution.placements().len(), 8);
        assert!(solution.verify());
    }
}

#[test]
pub fn exhausted_when_shape_never_fits() {
    // Volume 8 is divisible by 4, but a 4 long bar sticks out of a 2 cube
    // in every orientation.
    let result = solve(2, &Shape::from_size(1, 1, 4).unwrap(), 0);

    assert_eq!(result.outcome, Outcome::Exhausted);
    assert_eq!(result.solution_count(), 0);
    assert_eq!(result.stats.attempts, 3);
}

#[test]
pub fn tripod_tiles_2by2_cube_for_every_seed() {
    // The second tripod's leading point is at (1, 1, 0) of its box, which a
    // search shifting only along x would never anchor on its target cell.
    let shape = Shape::preset("tripod").unwrap();

    for seed in 0..16 {
        let result = solve(2, &shape, seed);
        assert_eq!(result.outcome, Outcome::Solved, "seed {seed}");
        assert!(result.solution.unwrap().verify());
    }
}

#[test]
pub fn placements_record_anchor_and_rotation() {
    let result = solve(3, &Shape::from_size(1, 1, 3).unwrap(), 8);
    let solution = result.solution.unwrap();

    assert_eq!(solution.placements().len(), 9);
    assert_eq!(solution.placements()[0].anchor, Point::ORIGIN);

    for placement in solution.placements() {
        let orientation = &solution.orientations()[placement.orientation];
        assert_eq!(orientation.rotation(), placement.rotation);
        assert!([placement.anchor.x, placement.anchor.y, placement.anchor.z]
            .iter()
            .all(|c| (0..3).contains(c)));
    }

    assert!(solution.verify());
}

#[test]
pub fn unit_cube_fills_trivially() {
    let result = solve(3, &Shape::from_size(1, 1, 1).unwrap(), 0);

    assert_eq!(result.placements().len(), 27);
    assert_eq!(result.stats.attempts, 27);
    let anchors: Vec<_> = result.placements().iter().map(|p| p.anchor).collect();
    assert_eq!(anchors, crate::solver::cells(3).collect::<Vec<_>>());
}

#[test]
pub fn same_seed_same_solution() {
    let shape = Shape::preset("ell").unwrap();

    let a = solve(4, &shape, 21);
    let b = solve(4, &shape, 21);

    assert_eq!(a.placements(), b.placements());
    assert_eq!(a.stats, b.stats);
}

#[test]
pub fn budget_exceeded_is_not_a_solution() {
    let result = CubePacker::new(4)
        .unwrap()
        .with_config(SolverConfig::default().with_seed(2).with_max_attempts(1))
        .with_observer(())
        .solve(&Shape::preset("ell").unwrap());

    assert_eq!(result.outcome, Outcome::BudgetExceeded);
    assert_eq!(result.solution_count(), 0);
    assert_eq!(result.stats.attempts, 1);
}

#[test]
pub fn zero_length_is_rejected() {
    assert!(matches!(
        CubePacker::new(0),
        Err(crate::Error::InvalidLength(0))
    ));
}

#[test]
#[ignore = "takes too much time"]
pub fn solve_5by5_cube() {
    let result = solve(5, &Shape::preset("tee").unwrap(), 0);
    assert_eq!(result.solution_count(), 1, "Solution found");
}

#[test]
pub fn deep_search_runs_on_a_default_thread() {
    // 27000 placements deep. The search keeps its frames on the heap, so this
    // runs within the default test thread stack.
    let result = solve(30, &Shape::from_size(1, 1, 1).unwrap(), 0);

    assert_eq!(result.outcome, Outcome::Solved);
    assert_eq!(result.placements().len(), 27_000);
    assert!(result.solution.unwrap().verify());
}
