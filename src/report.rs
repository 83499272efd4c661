//! Plain text rendering of a solve result.

use std::io::Write;

use crate::{
    orientation::OrientationSet,
    solver::{Outcome, SolveResult},
};

/// Write `result` as numbered placement blocks, or a single failure line.
pub fn write_result<W: Write>(mut out: W, result: &SolveResult) -> std::io::Result<()> {
    let solution = match &result.solution {
        Some(solution) => solution,
        None => {
            let reason = match result.outcome {
                Outcome::Infeasible => " (shape size does not divide the cube volume)",
                Outcome::BudgetExceeded => " (attempt budget exhausted)",
                Outcome::Exhausted | Outcome::Solved => "",
            };
            writeln!(out, "Cube could not be solved!{reason}")?;
            return Ok(());
        }
    };

    for (index, placement) in solution.placements().iter().enumerate() {
        writeln!(out, "[{}] ---------------- ", index + 1)?;
        writeln!(out, "Position (x,y,z): {}", placement.anchor)?;
        writeln!(out, "Rotation X axis: {}", placement.rotation.x)?;
        writeln!(out, "Rotation Y axis: {}", placement.rotation.y)?;
        writeln!(out, "Rotation Z axis: {}", placement.rotation.z)?;
        writeln!(out)?;
    }

    Ok(())
}

/// [`write_result`] into a `String`.
pub fn render(result: &SolveResult) -> String {
    let mut out = Vec::new();
    write_result(&mut out, result).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&out).into_owned()
}

/// One line per orientation: index, rotation triple and points.
pub fn write_orientations<W: Write>(mut out: W, orientations: &OrientationSet) -> std::io::Result<()> {
    for (index, orientation) in orientations.iter().enumerate() {
        let points: Vec<String> = orientation.points().iter().map(|p| p.to_string()).collect();
        writeln!(
            out,
            "{index:>2}: rotation {} points {}",
            orientation.rotation(),
            points.join(" ")
        )?;
    }

    Ok(())
}

#[cfg(test)]
use crate::{
    shape::Shape,
    solver::{CubePacker, SolverConfig},
};

#[test]
fn solved_result_has_a_block_per_placement() {
    let mut packer = CubePacker::new(2)
        .unwrap()
        .with_config(SolverConfig::default().with_seed(5))
        .with_observer(());
    let result = packer.solve(&Shape::from_size(1, 1, 2).unwrap());

    let text = render(&result);
    assert_eq!(text.matches("---------------- ").count(), 4);
    assert!(text.starts_with("[1] ---------------- \nPosition (x,y,z): [0, 0, 0]\n"));
    assert!(text.contains("[4] ---------------- "));
    assert_eq!(text.matches("Rotation X axis: ").count(), 4);
}

#[test]
fn unsolved_result() {
    let mut packer = CubePacker::new(5).unwrap().with_observer(());
    let result = packer.solve(&Shape::from_size(1, 1, 2).unwrap());

    assert!(render(&result).starts_with("Cube could not be solved!"));
}

#[test]
fn orientation_listing() {
    let orientations = OrientationSet::generate(&Shape::from_size(1, 1, 2).unwrap());
    let mut out = Vec::new();
    write_orientations(&mut out, &orientations).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.starts_with(" 0: rotation (0, 0, 0) points [0, 0, 0] [0, 0, 1]"));
}
