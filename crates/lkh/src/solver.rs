use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    LkhError, LkhResult,
    diagnostics::{Advisory, Diagnostics, LogDiagnostics},
    parameters::LkhParameters,
    problem::TsplibProblem,
    process::LkhProcess,
    routes::{Route, TourDecoder},
    scratch::ScratchSpace,
    tour::TsplibTour,
};

pub const DEFAULT_SOLVER: &str = "LKH";

const SCRATCH_PREFIX: &str = "lkh-routes";
const PROBLEM_FILE: &str = "problem.tsp";
const PARAMS_FILE: &str = "problem.par";
const TOUR_FILE: &str = "problem.tour";

const ERR_PROBLEM_SOURCE: &str = "specify a problem object *or* a problem file, not both or neither";
const ERR_PROBLEM_FILE_OPTION: &str =
    "PROBLEM_FILE is written by the route solver; pass the problem with with_problem or with_problem_file";
const ERR_NO_DIMENSION: &str =
    "problem has no positive DIMENSION, so solver dummy nodes cannot be told apart";
const ERR_LKH_FAILED: &str = "LKH failed";

/// Where the problem for a solve comes from.
enum ProblemSource<'a> {
    Inline(&'a TsplibProblem),
    File(TsplibProblem),
}

impl ProblemSource<'_> {
    fn problem(&self) -> &TsplibProblem {
        match self {
            Self::Inline(problem) => problem,
            Self::File(problem) => problem,
        }
    }
}

/// Runs LKH on one routing problem and decodes the resulting tour into routes.
///
/// ```no_run
/// use lkh::{parameters::LkhParameters, problem::TsplibProblem, solver::RouteSolver};
///
/// fn main() -> lkh::LkhResult<()> {
///     let problem = TsplibProblem::from_file("instances/E-n13-k4.vrp")?;
///     let routes = RouteSolver::new("LKH")
///         .with_problem(problem)
///         .with_parameters(LkhParameters::default().with_runs(1_usize))
///         .solve()?;
///     for route in routes {
///         println!("{route:?}");
///     }
///     Ok(())
/// }
/// ```
pub struct RouteSolver<D = LogDiagnostics> {
    solver: OsString,
    problem: Option<TsplibProblem>,
    problem_file: Option<PathBuf>,
    params: LkhParameters,
    diagnostics: D,
}

impl RouteSolver<LogDiagnostics> {
    /// `solver` is an executable name looked up on `PATH`, or a path to one.
    pub fn new(solver: impl Into<OsString>) -> Self {
        Self {
            solver: solver.into(),
            problem: None,
            problem_file: None,
            params: LkhParameters::default(),
            diagnostics: LogDiagnostics,
        }
    }
}

impl Default for RouteSolver<LogDiagnostics> {
    fn default() -> Self {
        Self::new(DEFAULT_SOLVER)
    }
}

impl<D: Diagnostics> RouteSolver<D> {
    pub fn with_problem(mut self, problem: TsplibProblem) -> Self {
        self.problem = Some(problem);
        self
    }

    /// Reads the problem from an existing TSPLIB file instead.
    pub fn with_problem_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.problem_file = Some(path.into());
        self
    }

    /// LKH options for the run, `special` included. `PROBLEM_FILE` is always
    /// replaced; a `TOUR_FILE`, typed or passed through
    /// [`LkhParameters::with_option`], is kept and left on disk after the solve.
    pub fn with_parameters(mut self, params: LkhParameters) -> Self {
        self.params = params;
        self
    }

    /// Shorthand for setting `special` on the current parameters.
    pub fn with_special(mut self, special: bool) -> Self {
        self.params.special = special;
        self
    }

    pub fn with_diagnostics<E: Diagnostics>(self, diagnostics: E) -> RouteSolver<E> {
        RouteSolver {
            solver: self.solver,
            problem: self.problem,
            problem_file: self.problem_file,
            params: self.params,
            diagnostics,
        }
    }

    pub fn solve(&self) -> LkhResult<Vec<Route>> {
        let process = LkhProcess::resolve(&self.solver)?;

        let source = match (&self.problem, &self.problem_file) {
            (Some(problem), None) => ProblemSource::Inline(problem),
            (None, Some(path)) => ProblemSource::File(TsplibProblem::from_file(path)?),
            _ => return Err(LkhError::invalid_invocation(ERR_PROBLEM_SOURCE)),
        };
        let problem = source.problem();

        self.advise(problem);

        let dimension = match problem.dimension {
            Some(dimension) if dimension > 0 => dimension,
            _ => return Err(LkhError::invalid_data(ERR_NO_DIMENSION)),
        };
        let params = self.prepare_parameters()?;

        let mut scratch = ScratchSpace::create(SCRATCH_PREFIX)?;
        let routes = self.solve_in(&mut scratch, &process, problem, dimension, params)?;

        log::info!("solver: complete routes={}", routes.len());
        Ok(routes)
    }

    fn advise(&self, problem: &TsplibProblem) {
        for issue in problem.structural_issues() {
            self.diagnostics.advise(Advisory::MalformedProblem(issue));
        }

        if problem.depots().len() > 1 {
            self.diagnostics.advise(Advisory::MultiDepot {
                depots: problem.depots().to_vec(),
            });
        }
    }

    /// Folds pass-through options naming keys the solver manages into the
    /// typed fields, so no key reaches the parameter file twice.
    fn prepare_parameters(&self) -> LkhResult<LkhParameters> {
        let mut params = self.params.clone();

        if params.take_option("PROBLEM_FILE").is_some() {
            return Err(LkhError::invalid_input(ERR_PROBLEM_FILE_OPTION));
        }
        if let Some(tour_file) = params.take_option("TOUR_FILE") {
            params.tour_file = Some(PathBuf::from(tour_file));
        }

        Ok(params)
    }

    fn solve_in(
        &self,
        scratch: &mut ScratchSpace,
        process: &LkhProcess,
        problem: &TsplibProblem,
        dimension: usize,
        mut params: LkhParameters,
    ) -> LkhResult<Vec<Route>> {
        let problem_path = scratch.acquire(PROBLEM_FILE);
        problem.write_to_file(&problem_path)?;

        params.problem_file = problem_path;
        // LKH runs inside the scratch dir, so a relative TOUR_FILE would land there.
        let tour_path = match params.tour_file.take() {
            Some(path) => std::path::absolute(path)?,
            None => scratch.acquire(TOUR_FILE),
        };
        params.tour_file = Some(tour_path.clone());

        let par_path = scratch.acquire(PARAMS_FILE);
        params.write_to_file(&par_path)?;

        log::info!(
            "solver: start exe={} dimension={dimension} depots={} special={}",
            process.exe_path().display(),
            problem.depots().len(),
            params.special
        );
        let output = process
            .clone()
            .with_current_dir(scratch.dir())
            .run(&par_path, ERR_LKH_FAILED)?;
        log::trace!("solver.run: output={output}");

        ensure_tour_written(&tour_path)?;

        let solution = TsplibTour::from_file(&tour_path)?;
        let tour = solution
            .first_tour()
            .ok_or_else(|| LkhError::NoTours {
                tour_file: tour_path.clone(),
            })?;
        log::debug!("solver.decode: tour_len={}", tour.len());

        let decoder = TourDecoder::new(problem.depots().iter().copied(), dimension);
        Ok(decoder.decode(tour))
    }
}

fn ensure_tour_written(tour_path: &Path) -> LkhResult<()> {
    let written = fs::metadata(tour_path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false);

    if written {
        Ok(())
    } else {
        Err(LkhError::NoTours {
            tour_file: tour_path.to_path_buf(),
        })
    }
}
