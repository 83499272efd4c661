//! Pack copies of a polycube into a cube by backtracking search.
//!
//! ```no_run
//! use cubepack::{shape::Shape, solver::CubePacker};
//!
//! let shape = Shape::from_size(1, 1, 2).unwrap();
//! let result = CubePacker::new(2).unwrap().solve(&shape);
//! assert_eq!(result.solution_count(), 1);
//! ```

#[cfg(test)]
mod test;

pub mod error;
pub mod fanout;
pub mod geometry;
pub mod orientation;
pub mod report;
pub mod shape;
pub mod solver;

pub use error::{Error, Result};
