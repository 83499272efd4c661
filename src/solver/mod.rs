//! Backtracking search that packs copies of one shape into a cube.
//!
//! Cells are filled in scan order (x fastest, then y, then z). At every step
//! the lowest empty cell must be covered, so each orientation is tried with
//! its [leading point](crate::orientation::Orientation::leading) on that
//! cell. Placements are pushed onto a stack and popped again when the
//! remainder of the cube cannot be completed.

use hashbrown::HashSet;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    error::{Error, Result},
    geometry::Point,
    orientation::{OrientationSet, RotationTriple},
    shape::Shape,
};

pub mod progress;
pub use progress::{LogObserver, Progress, ProgressObserver};

/// Largest supported cube side. Every cell index of a cube this size fits
/// in an `i32` with room for shape offsets.
pub const MAX_LENGTH: usize = 1024;

/// The occupied set starts with room for at most this many cells and grows
/// as shapes are placed.
const INITIAL_CAPACITY: usize = 1 << 16;

/// Default number of attempts between progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 100_000;

/// Configuration for a [`CubePacker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Seed for the orientation shuffle. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Give up after this many attempts. `None` searches until done.
    pub max_attempts: Option<u64>,

    /// Report progress every this many attempts (0 = only at the end).
    pub report_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_attempts: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }
}

/// One copy of the shape in the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    /// World position of the orientation's local origin.
    pub anchor: Point,
    /// The rotation that produced the orientation.
    pub rotation: RotationTriple,
    /// Index into the [`OrientationSet`] the search ran with.
    pub orientation: usize,
}

/// How a call to [`CubePacker::solve`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The cube was filled.
    Solved,
    /// The cube volume is not a multiple of the shape size. No search was run.
    Infeasible,
    /// Every placement was explored without filling the cube.
    Exhausted,
    /// The attempt budget ran out before the search finished.
    BudgetExceeded,
}

/// A complete packing of the cube.
#[derive(Debug, Clone)]
pub struct Solution {
    length: usize,
    orientations: OrientationSet,
    placements: Vec<Placement>,
}

impl Solution {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn orientations(&self) -> &OrientationSet {
        &self.orientations
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The world cells covered by each placement, in placement order.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        self.placements
            .iter()
            .flat_map(move |p| self.orientations[p.orientation].placed_at(p.anchor))
    }

    /// `true` if the placements cover every cell of the cube exactly once.
    pub fn verify(&self) -> bool {
        let length = self.length as i32;
        let mut seen = HashSet::new();

        let all_unique = self.cells().all(|p| {
            let inside = [p.x, p.y, p.z].iter().all(|c| (0..length).contains(c));
            inside && seen.insert(p)
        });

        all_unique && seen.len() == self.length.pow(3)
    }
}

/// Counters describing the work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub attempts: u64,
    pub orientations: usize,
}

/// The result of [`CubePacker::solve`].
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: Outcome,
    pub solution: Option<Solution>,
    pub stats: SearchStats,
}

impl SolveResult {
    fn infeasible() -> Self {
        Self {
            outcome: Outcome::Infeasible,
            solution: None,
            stats: SearchStats::default(),
        }
    }

    /// `1` if a packing was found, else `0`. The search stops at the first.
    pub fn solution_count(&self) -> usize {
        usize::from(self.solution.is_some())
    }

    /// The placements of the solution, or an empty slice.
    pub fn placements(&self) -> &[Placement] {
        self.solution
            .as_ref()
            .map(Solution::placements)
            .unwrap_or_default()
    }
}

/// Iterate over all cells of a cube of side `length` in scan order.
pub fn cells(length: usize) -> impl Iterator<Item = Point> {
    let first = (length > 0).then_some(Point::ORIGIN);
    std::iter::successors(first, move |p| next_cell(*p, length))
}

/// The cell following `cell` in scan order, or `None` after the last cell.
pub fn next_cell(cell: Point, length: usize) -> Option<Point> {
    let length = length as i32;
    let Point { mut x, mut y, mut z } = cell;

    x += 1;
    if x >= length {
        x = 0;
        y += 1;
    }
    if y >= length {
        y = 0;
        z += 1;
    }

    (z < length).then_some(Point { x, y, z })
}

/// Packs copies of a shape into a cube of side `length`.
pub struct CubePacker<O = LogObserver> {
    length: usize,
    config: SolverConfig,
    observer: O,
}

impl CubePacker {
    /// Fails for a zero length or one above [`MAX_LENGTH`].
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 || length > MAX_LENGTH {
            return Err(Error::InvalidLength(length));
        }

        Ok(Self {
            length,
            config: SolverConfig::default(),
            observer: LogObserver,
        })
    }
}

impl<O> CubePacker<O>
where
    O: ProgressObserver,
{
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the progress observer.
    pub fn with_observer<P: ProgressObserver>(self, observer: P) -> CubePacker<P> {
        CubePacker {
            length: self.length,
            config: self.config,
            observer,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn volume(&self) -> usize {
        self.length.pow(3)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Try to fill the cube with copies of `shape`.
    ///
    /// Returns as soon as the first packing is found.
    pub fn solve(&mut self, shape: &Shape) -> SolveResult {
        let volume = self.volume();

        if volume % shape.size() != 0 {
            log::info!(
                "Can not fit shape with {} number of points in a cube with size {}",
                shape.size(),
                self.length
            );
            return SolveResult::infeasible();
        }

        let orientations = OrientationSet::generate(shape);
        log::debug!("Shape has {} distinct orientations", orientations.len());

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut search = Search::new(
            self.length,
            &orientations,
            &self.config,
            &mut self.observer,
            rng,
        );

        let step = search.run();
        search.report(true);

        let stats = SearchStats {
            attempts: search.attempts,
            orientations: orientations.len(),
        };
        let placements = std::mem::take(&mut search.placements);
        drop(search);

        let (outcome, solution) = match step {
            Step::Solved => (
                Outcome::Solved,
                Some(Solution {
                    length: self.length,
                    orientations,
                    placements,
                }),
            ),
            Step::Backtrack => (Outcome::Exhausted, None),
            Step::Abort => (Outcome::BudgetExceeded, None),
        };

        SolveResult {
            outcome,
            solution,
            stats,
        }
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Solved,
    Backtrack,
    Abort,
}

/// One level of the search: the cell being covered, the shuffled order of
/// orientations to try on it and how many of them have been tried.
struct Frame {
    target: Point,
    order: Vec<usize>,
    cursor: usize,
}

/// The mutable state of one search: occupied cells and the placement stack.
///
/// Every frame above the root sits on top of exactly one placement, so
/// popping an exhausted frame is always followed by undoing one placement.
struct Search<'a, O> {
    length: usize,
    volume: usize,
    orientations: &'a OrientationSet,
    config: &'a SolverConfig,
    observer: &'a mut O,
    rng: StdRng,
    occupied: HashSet<Point>,
    placements: Vec<Placement>,
    attempts: u64,
    #[cfg(feature = "diagnostics")]
    seeded: usize,
}

impl<'a, O> Search<'a, O>
where
    O: ProgressObserver,
{
    fn new(
        length: usize,
        orientations: &'a OrientationSet,
        config: &'a SolverConfig,
        observer: &'a mut O,
        rng: StdRng,
    ) -> Self {
        let volume = length.pow(3);

        Self {
            length,
            volume,
            orientations,
            config,
            observer,
            rng,
            occupied: HashSet::with_capacity(volume.min(INITIAL_CAPACITY)),
            placements: Vec::new(),
            attempts: 0,
            #[cfg(feature = "diagnostics")]
            seeded: 0,
        }
    }

    fn frame(&mut self, target: Point) -> Frame {
        let mut order: Vec<usize> = (0..self.orientations.len()).collect();
        order.shuffle(&mut self.rng);

        Frame {
            target,
            order,
            cursor: 0,
        }
    }

    /// Fill the cube, starting at its lowest empty cell.
    ///
    /// On `Backtrack` the occupied set and placement stack are exactly as
    /// they were before the call.
    fn run(&mut self) -> Step {
        #[cfg(feature = "diagnostics")]
        {
            self.seeded = self.occupied.len();
        }

        let first = if self.occupied.contains(&Point::ORIGIN) {
            self.next_empty(Point::ORIGIN)
        } else {
            Some(Point::ORIGIN)
        };

        let Some(first) = first else {
            return Step::Solved;
        };

        let orientations = self.orientations;
        let mut stack = vec![self.frame(first)];

        while let Some(frame) = stack.last_mut() {
            let Some(&index) = frame.order.get(frame.cursor) else {
                stack.pop();
                if stack.is_empty() {
                    break;
                }
                self.undo();
                continue;
            };
            frame.cursor += 1;
            let target = frame.target;

            if self.config.max_attempts.is_some_and(|max| self.attempts >= max) {
                return Step::Abort;
            }

            self.attempts += 1;
            let interval = self.config.report_interval;
            if interval != 0 && self.attempts % interval == 0 {
                self.report(false);
            }

            let anchor = target - orientations[index].leading();
            if !self.place(index, anchor) {
                continue;
            }

            if self.occupied.len() == self.volume {
                return Step::Solved;
            }

            match self.next_empty(target) {
                Some(next) => {
                    let frame = self.frame(next);
                    stack.push(frame);
                }
                None => self.undo(),
            }
        }

        Step::Backtrack
    }

    /// Place orientation `index` with its origin at `anchor` if every cell
    /// it needs is inside the cube and free.
    fn place(&mut self, index: usize, anchor: Point) -> bool {
        let orientations = self.orientations;
        let orientation = &orientations[index];

        let fits = orientation
            .placed_at(anchor)
            .all(|p| self.in_bounds(p) && !self.occupied.contains(&p));

        if !fits {
            return false;
        }

        self.occupied.extend(orientation.placed_at(anchor));
        self.placements.push(Placement {
            anchor,
            rotation: orientation.rotation(),
            orientation: index,
        });

        log::debug!(
            "Place shape at (x,y,z): {anchor}, rotation on X,Y,Z axis: {}",
            orientation.rotation()
        );

        true
    }

    /// Remove the most recent placement and free its cells.
    fn undo(&mut self) {
        let Some(placement) = self.placements.pop() else {
            return;
        };

        let orientations = self.orientations;
        for p in orientations[placement.orientation].placed_at(placement.anchor) {
            self.occupied.remove(&p);
        }

        #[cfg(feature = "diagnostics")]
        self.check_occupied();
    }

    /// The occupied set holds exactly the seeded cells plus the cells of
    /// every placement still on the stack.
    #[cfg(feature = "diagnostics")]
    fn check_occupied(&self) {
        let orientations = self.orientations;
        let placed: usize = self
            .placements
            .iter()
            .map(|p| orientations[p.orientation].points().len())
            .sum();

        assert_eq!(
            self.occupied.len(),
            self.seeded + placed,
            "occupied cells leaked past an undo"
        );
    }

    /// The first unoccupied cell strictly after `from` in scan order.
    fn next_empty(&self, from: Point) -> Option<Point> {
        let length = self.length;
        std::iter::successors(next_cell(from, length), |p| next_cell(*p, length))
            .find(|p| !self.occupied.contains(p))
    }

    fn in_bounds(&self, p: Point) -> bool {
        let length = self.length as i32;
        [p.x, p.y, p.z].iter().all(|c| (0..length).contains(c))
    }

    fn report(&mut self, finished: bool) {
        let progress = Progress {
            attempts: self.attempts,
            placed: self.placements.len(),
            finished,
        };
        self.observer.progress(&progress);
    }
}

#[cfg(test)]
fn search_state<'a>(
    length: usize,
    orientations: &'a OrientationSet,
    config: &'a SolverConfig,
    observer: &'a mut (),
) -> Search<'a, ()> {
    Search::new(
        length,
        orientations,
        config,
        observer,
        StdRng::seed_from_u64(3),
    )
}

#[cfg(test)]
fn domino() -> OrientationSet {
    OrientationSet::generate(&Shape::from_size(1, 1, 2).unwrap())
}

#[test]
fn scan_order() {
    let mut loc = Point::ORIGIN;
    let mut step = |n: usize| {
        for _ in 0..n {
            loc = next_cell(loc, 3).unwrap();
        }
        loc
    };

    assert_eq!(step(1), Point::new(1, 0, 0));
    assert_eq!(step(1), Point::new(2, 0, 0));
    assert_eq!(step(1), Point::new(0, 1, 0));
    assert_eq!(step(1), Point::new(1, 1, 0));
    assert_eq!(step(1), Point::new(2, 1, 0));
    assert_eq!(step(1), Point::new(0, 2, 0));
    assert_eq!(step(4), Point::new(1, 0, 1));
    assert_eq!(step(10), Point::new(2, 0, 2));
    assert_eq!(step(6), Point::new(2, 2, 2));

    assert_eq!(next_cell(Point::new(2, 2, 2), 3), None);
}

#[test]
fn cells_visit_every_cell_once() {
    let all: Vec<_> = cells(3).collect();
    assert_eq!(all.len(), 27);
    assert_eq!(all.first(), Some(&Point::ORIGIN));
    assert_eq!(all.last(), Some(&Point::new(2, 2, 2)));
    assert!(all.windows(2).all(|w| w[0].scan_key() < w[1].scan_key()));

    assert_eq!(cells(0).count(), 0);
}

#[test]
fn next_empty_skips_occupied() {
    let orientations = domino();
    let config = SolverConfig::default();
    let mut observer = ();
    let mut search = search_state(3, &orientations, &config, &mut observer);

    search.occupied.extend([
        Point::new(1, 0, 0),
        Point::new(2, 0, 0),
        Point::new(0, 1, 0),
    ]);

    assert_eq!(search.next_empty(Point::ORIGIN), Some(Point::new(1, 1, 0)));

    search.occupied.extend(cells(3));
    assert_eq!(search.next_empty(Point::ORIGIN), None);
}

#[test]
fn place_rejects_collisions_and_out_of_bounds() {
    let orientations = domino();
    let config = SolverConfig::default();
    let mut observer = ();
    let mut search = search_state(2, &orientations, &config, &mut observer);

    // Orientation 0 is the bar along z.
    assert!(!search.place(0, Point::new(0, 0, 1)));
    assert!(search.place(0, Point::ORIGIN));
    assert!(!search.place(0, Point::ORIGIN));
    assert_eq!(search.occupied.len(), 2);
    assert_eq!(search.placements.len(), 1);

    search.undo();
    assert!(search.occupied.is_empty());
    assert!(search.placements.is_empty());
}

#[test]
fn failed_branch_restores_state() {
    let orientations = domino();
    let config = SolverConfig::default();
    let mut observer = ();
    let mut search = search_state(2, &orientations, &config, &mut observer);

    // With these two cells taken the remaining six cannot be covered by
    // dominoes, but the search has to place and undo several before it
    // finds that out.
    search
        .occupied
        .extend([Point::new(1, 0, 0), Point::new(0, 1, 0)]);
    let before = search.occupied.clone();

    assert_eq!(search.run(), Step::Backtrack);
    assert!(search.attempts > orientations.len() as u64);
    assert_eq!(search.occupied, before);
    assert!(search.placements.is_empty());
}

#[test]
fn budget_aborts() {
    let orientations = domino();
    let config = SolverConfig::default().with_max_attempts(2);
    let mut observer = ();
    let mut search = search_state(2, &orientations, &config, &mut observer);

    search
        .occupied
        .extend([Point::new(1, 0, 0), Point::new(0, 1, 0)]);

    assert_eq!(search.run(), Step::Abort);
    assert_eq!(search.attempts, 2);
}

#[test]
fn occupied_capacity_is_capped() {
    let orientations = domino();
    let config = SolverConfig::default();
    let mut observer = ();
    let search = search_state(MAX_LENGTH, &orientations, &config, &mut observer);

    assert!(search.occupied.capacity() < 4 * INITIAL_CAPACITY);
}

#[test]
fn lengths_outside_the_addressable_range_are_rejected() {
    assert!(matches!(CubePacker::new(0), Err(Error::InvalidLength(0))));
    assert!(matches!(
        CubePacker::new(MAX_LENGTH + 1),
        Err(Error::InvalidLength(_))
    ));
    assert!(matches!(
        CubePacker::new(3000),
        Err(Error::InvalidLength(3000))
    ));
}

#[test]
fn largest_cube_stops_at_the_budget() {
    let result = CubePacker::new(MAX_LENGTH)
        .unwrap()
        .with_config(SolverConfig::default().with_seed(0).with_max_attempts(10))
        .with_observer(())
        .solve(&Shape::from_size(1, 1, 1).unwrap());

    assert_eq!(result.outcome, Outcome::BudgetExceeded);
    assert_eq!(result.stats.attempts, 10);
}

#[cfg(feature = "diagnostics")]
#[test]
#[should_panic(expected = "occupied cells leaked past an undo")]
fn leaked_cell_is_detected() {
    let orientations = domino();
    let config = SolverConfig::default();
    let mut observer = ();
    let mut search = search_state(3, &orientations, &config, &mut observer);

    assert!(search.place(0, Point::ORIGIN));
    assert!(search.place(0, Point::new(1, 0, 0)));
    search.occupied.insert(Point::new(2, 2, 2));
    search.undo();
}

#[test]
fn progress_is_reported() {
    let mut reports = Vec::new();
    let mut packer = CubePacker::new(4)
        .unwrap()
        .with_config(SolverConfig::default().with_seed(1).with_report_interval(10))
        .with_observer(|p: &Progress| reports.push(*p));

    let result = packer.solve(&Shape::preset("ell").unwrap());
    drop(packer);

    assert_eq!(result.outcome, Outcome::Solved);

    let last = reports.last().unwrap();
    assert!(last.finished);
    assert_eq!(last.attempts, result.stats.attempts);
    assert_eq!(last.placed, 8);

    let periodic = &reports[..reports.len() - 1];
    assert_eq!(periodic.len() as u64, result.stats.attempts / 10);
    assert!(periodic.iter().all(|p| !p.finished && p.attempts % 10 == 0));
    assert!(reports.windows(2).all(|w| w[0].attempts <= w[1].attempts));
}
