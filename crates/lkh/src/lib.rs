//! `lkh` drives the LKH-3 solver on routing problems and turns its output
//! back into vehicle routes.
//!
//! It covers:
//! - TSPLIB problem files (write and read),
//! - LKH parameter files, including the leading `SPECIAL` line and free-form
//!   pass-through options,
//! - running LKH as a blocking subprocess inside a scratch directory that is
//!   removed on every exit path,
//! - parsing TSPLIB tour output and splitting LKH's merged tour into routes.
//!
//! # Quickstart
//!
//! ```no_run
//! use lkh::{
//!     parameters::LkhParameters,
//!     problem::{TsplibProblem, TsplibProblemType},
//!     solver::RouteSolver,
//! };
//!
//! fn main() -> lkh::LkhResult<()> {
//!     let problem = TsplibProblem::from_euc2d_points(
//!         "depot-and-four",
//!         TsplibProblemType::Cvrp,
//!         vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.5)],
//!     )
//!     .with_depot_section(vec![1_usize])
//!     .with_capacity(10_i64)
//!     .with_vehicles(2_usize);
//!
//!     let routes = RouteSolver::new("LKH")
//!         .with_problem(problem)
//!         .with_parameters(LkhParameters::default().with_runs(1_usize))
//!         .solve()?;
//!     println!("{routes:?}");
//!     Ok(())
//! }
//! ```
//!
//! Decoding on its own needs no solver:
//!
//! ```
//! use lkh::routes::decode_routes;
//!
//! let routes = decode_routes(&[1, 5, 2, 3, 5, 4], &[5], 4);
//! assert_eq!(routes, vec![vec![1], vec![2, 3], vec![4]]);
//! ```

pub mod diagnostics;
pub mod parameters;
pub mod problem;
pub mod process;
pub mod routes;
pub mod scratch;
pub mod solver;
pub mod tour;

mod error;
mod spec_writer;

pub use error::{LkhError, LkhResult};
