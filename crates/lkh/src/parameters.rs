use std::{
    fmt::{Display, Formatter},
    fs,
    path::{Path, PathBuf},
};

use crate::{LkhResult, spec_writer::SpecWriter};
use lkh_derive::{LkhKeyword, WithMethods};

const SPECIAL_MARKER: &str = "SPECIAL";

/// Yes/No wrapper for LKH parameters expressed as `[ YES | NO ]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
pub enum YesNo {
    Yes,
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

/// `CANDIDATE_SET_TYPE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
pub enum CandidateSetType {
    Alpha,
    Delaunay,
    #[lkh("DELAUNAY PURE")]
    DelaunayPure,
    NearestNeighbor,
    Popmusic,
    Quadrant,
}

/// `INITIAL_TOUR_ALGORITHM` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
pub enum InitialTourAlgorithm {
    Boruvka,
    Greedy,
    NearestNeighbor,
    QuickBoruvka,
    Sierpinski,
    Walk,
    /// LKH-3 construction for multi-route problems.
    Cvrp,
    Mtsp,
    Sop,
}

/// LKH-3 `MTSP_OBJECTIVE` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, LkhKeyword)]
#[lkh(separator = "_")]
pub enum MtspObjective {
    #[lkh("MINMAX")]
    MinMax,
    #[lkh("MINMAX_SIZE")]
    MinMaxSize,
    #[lkh("MINSUM")]
    MinSum,
}

/// Candidate count with optional `SYMMETRIC` modifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CandidateLimit {
    pub value: usize,
    pub symmetric: bool,
}

impl CandidateLimit {
    pub const fn new(value: usize, symmetric: bool) -> Self {
        Self { value, symmetric }
    }
}

impl Display for CandidateLimit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)?;
        if self.symmetric {
            write!(f, " SYMMETRIC")?;
        }
        Ok(())
    }
}

/// LKH-3 parameter-file model.
///
/// Options the model does not name go through [`LkhParameters::with_option`]
/// and are written verbatim after the typed keys.
#[derive(Clone, Debug, PartialEq, WithMethods)]
pub struct LkhParameters {
    /// Written as a leading `SPECIAL` line, which switches LKH-3 into the mode
    /// used for its routing problem types. On by default.
    pub special: bool,
    /// "Specifies the name of the problem file." (mandatory)
    pub(crate) problem_file: PathBuf,

    /// "Specifies the candidate set type."
    pub candidate_set_type: Option<CandidateSetType>,
    /// "The maximum alpha-value allowed for any candidate edge is set to EXCESS times ..."
    pub excess: Option<f64>,
    /// "Specifies the algorithm for obtaining an initial tour."
    pub initial_tour_algorithm: Option<InitialTourAlgorithm>,
    /// "Specifies the name of a file containing a tour to be used as the initial tour."
    pub initial_tour_file: Option<PathBuf>,
    /// "Specifies the number of times to 'kick' a tour found by Lin-Kernighan."
    pub kicks: Option<usize>,
    /// "The maximum number of candidate edges to be associated with each node."
    pub max_candidates: Option<CandidateLimit>,
    /// "The maximum number of trials in each run."
    pub max_trials: Option<usize>,
    /// "Specifies the sequential move type to be used in local search."
    pub move_type: Option<usize>,
    /// Largest number of nodes a single salesman may visit.
    pub mtsp_max_size: Option<usize>,
    /// Smallest number of nodes a single salesman must visit.
    pub mtsp_min_size: Option<usize>,
    pub mtsp_objective: Option<MtspObjective>,
    /// "Known optimal tour length."
    pub optimum: Option<f64>,
    /// "Specifies the name of a file where the best tour is to be written."
    pub output_tour_file: Option<PathBuf>,
    /// "Specifies the name of a file to which penalties (Pi-values) are to be written."
    pub pi_file: Option<PathBuf>,
    /// Size of the genetic population kept between runs.
    pub population_size: Option<usize>,
    /// "The internal precision in the representation of transformed distances."
    pub precision: Option<usize>,
    /// "The total number of runs."
    pub runs: Option<usize>,
    /// Number of salesmen (vehicles) for multi-route problems.
    pub salesmen: Option<usize>,
    /// "Specifies the initial seed for random number generation."
    pub seed: Option<u64>,
    /// "Specifies whether a run is stopped, if the tour length becomes equal to OPTIMUM."
    pub stop_at_optimum: Option<YesNo>,
    /// "Specifies a time limit in seconds for each run."
    pub time_limit: Option<f64>,
    /// Time limit in seconds across all runs.
    pub total_time_limit: Option<f64>,
    /// "Specifies the name of a file to which the best tour is to be written."
    pub tour_file: Option<PathBuf>,
    /// "Specifies the level of detail of the output given during the solution process."
    pub trace_level: Option<usize>,
    /// "Specifies the number of vehicles."
    pub vehicles: Option<usize>,

    /// Pass-through `KEY = value` options; keys are upper-cased on write.
    #[with(skip)]
    pub extra: Vec<(String, String)>,
    /// "Terminates the input data. The entry is optional." (`EOF`)
    pub emit_eof: bool,
}

impl Display for LkhParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut writer = SpecWriter::new(f);

        if self.special {
            writer.line(SPECIAL_MARKER)?;
        }

        writer.kv_eq("PROBLEM_FILE", self.problem_file.display())?;

        // Remaining typed keys stay alphabetical for stable, testable output.
        writer.opt_kv_eq("CANDIDATE_SET_TYPE", self.candidate_set_type)?;
        writer.opt_kv_eq("EXCESS", self.excess)?;
        writer.opt_kv_eq("INITIAL_TOUR_ALGORITHM", self.initial_tour_algorithm)?;
        writer.opt_path_eq("INITIAL_TOUR_FILE", self.initial_tour_file.as_deref())?;
        writer.opt_kv_eq("KICKS", self.kicks)?;
        writer.opt_kv_eq("MAX_CANDIDATES", self.max_candidates)?;
        writer.opt_kv_eq("MAX_TRIALS", self.max_trials)?;
        writer.opt_kv_eq("MOVE_TYPE", self.move_type)?;
        writer.opt_kv_eq("MTSP_MAX_SIZE", self.mtsp_max_size)?;
        writer.opt_kv_eq("MTSP_MIN_SIZE", self.mtsp_min_size)?;
        writer.opt_kv_eq("MTSP_OBJECTIVE", self.mtsp_objective)?;
        writer.opt_kv_eq("OPTIMUM", self.optimum)?;
        writer.opt_path_eq("OUTPUT_TOUR_FILE", self.output_tour_file.as_deref())?;
        writer.opt_path_eq("PI_FILE", self.pi_file.as_deref())?;
        writer.opt_kv_eq("POPULATION_SIZE", self.population_size)?;
        writer.opt_kv_eq("PRECISION", self.precision)?;
        writer.opt_kv_eq("RUNS", self.runs)?;
        writer.opt_kv_eq("SALESMEN", self.salesmen)?;
        writer.opt_kv_eq("SEED", self.seed)?;
        writer.opt_kv_eq("STOP_AT_OPTIMUM", self.stop_at_optimum)?;
        writer.opt_kv_eq("TIME_LIMIT", self.time_limit)?;
        writer.opt_kv_eq("TOTAL_TIME_LIMIT", self.total_time_limit)?;
        writer.opt_path_eq("TOUR_FILE", self.tour_file.as_deref())?;
        writer.opt_kv_eq("TRACE_LEVEL", self.trace_level)?;
        writer.opt_kv_eq("VEHICLES", self.vehicles)?;

        for (key, value) in &self.extra {
            writer.kv_eq(&key.to_ascii_uppercase(), value)?;
        }

        if self.emit_eof {
            writer.line("EOF")?;
        }

        Ok(())
    }
}

impl LkhParameters {
    pub fn new(problem_file: impl Into<PathBuf>) -> Self {
        Self {
            special: true,
            problem_file: problem_file.into(),
            candidate_set_type: None,
            excess: None,
            initial_tour_algorithm: None,
            initial_tour_file: None,
            kicks: None,
            max_candidates: None,
            max_trials: None,
            move_type: None,
            mtsp_max_size: None,
            mtsp_min_size: None,
            mtsp_objective: None,
            optimum: None,
            output_tour_file: None,
            pi_file: None,
            population_size: None,
            precision: None,
            runs: None,
            salesmen: None,
            seed: None,
            stop_at_optimum: None,
            time_limit: None,
            total_time_limit: None,
            tour_file: None,
            trace_level: None,
            vehicles: None,
            extra: Vec::new(),
            emit_eof: false,
        }
    }

    pub fn problem_file(&self) -> &Path {
        &self.problem_file
    }

    /// Adds a free-form `KEY = value` option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.extra.push((key.into(), value.to_string()));
        self
    }

    pub fn write_to_file(&self, path: &Path) -> LkhResult<()> {
        fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Removes every free-form option named `key` (any case) and returns the
    /// value of the last one, which is the one LKH would have used.
    pub(crate) fn take_option(&mut self, key: &str) -> Option<String> {
        let mut taken = None;
        self.extra.retain(|(name, value)| {
            if name.trim().eq_ignore_ascii_case(key) {
                taken = Some(value.clone());
                false
            } else {
                true
            }
        });
        taken
    }
}

impl Default for LkhParameters {
    /// Parameters with an empty `PROBLEM_FILE`, for callers whose problem
    /// path is filled in later by the route solver.
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{
        CandidateLimit, CandidateSetType, InitialTourAlgorithm, LkhParameters, MtspObjective,
        YesNo,
    };

    #[test]
    fn display_writes_special_marker_before_problem_file() {
        let cfg = LkhParameters::new("problem.vrp")
            .with_special(true)
            .with_runs(1_usize);

        let text = cfg.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["SPECIAL", "PROBLEM_FILE = problem.vrp", "RUNS = 1"]);
    }

    #[test]
    fn display_emits_typed_values() {
        let cfg = LkhParameters::new("problem.tsp")
            .with_max_candidates(CandidateLimit::new(32, true))
            .with_candidate_set_type(CandidateSetType::DelaunayPure)
            .with_initial_tour_algorithm(InitialTourAlgorithm::NearestNeighbor)
            .with_mtsp_objective(MtspObjective::MinSum)
            .with_stop_at_optimum(YesNo::from(false))
            .with_tour_file("run.tour")
            .with_emit_eof(true);

        let text = cfg.to_string();
        assert!(text.contains("PROBLEM_FILE = problem.tsp"));
        assert!(text.contains("MAX_CANDIDATES = 32 SYMMETRIC"));
        assert!(text.contains("CANDIDATE_SET_TYPE = DELAUNAY PURE"));
        assert!(text.contains("INITIAL_TOUR_ALGORITHM = NEAREST-NEIGHBOR"));
        assert!(text.contains("MTSP_OBJECTIVE = MINSUM"));
        assert!(text.contains("STOP_AT_OPTIMUM = NO"));
        assert!(text.contains("TOUR_FILE = run.tour"));
        assert!(text.ends_with("EOF\n"));
    }

    #[test]
    fn extra_options_are_uppercased_and_follow_typed_keys() {
        let cfg = LkhParameters::new("problem.tsp")
            .with_trace_level(0_usize)
            .with_option("depot", 1)
            .with_option("Mtsp_Solution_File", "routes.txt");

        let text = cfg.to_string();
        assert!(text.ends_with(
            "TRACE_LEVEL = 0\nDEPOT = 1\nMTSP_SOLUTION_FILE = routes.txt\n"
        ));
    }

    #[test]
    fn display_orders_problem_file_first_then_alphabetical() {
        let cfg = LkhParameters::new("problem.tsp")
            .with_candidate_set_type(CandidateSetType::Alpha)
            .with_excess(1.5)
            .with_initial_tour_algorithm(InitialTourAlgorithm::Greedy)
            .with_initial_tour_file("initial.tour")
            .with_kicks(6_usize)
            .with_max_candidates(CandidateLimit::new(9, true))
            .with_max_trials(11_usize)
            .with_move_type(5_usize)
            .with_mtsp_max_size(20_usize)
            .with_mtsp_min_size(2_usize)
            .with_mtsp_objective(MtspObjective::MinMax)
            .with_optimum(14.0)
            .with_output_tour_file("output.tour")
            .with_pi_file("problem.pi")
            .with_population_size(10_usize)
            .with_precision(17_usize)
            .with_runs(18_usize)
            .with_salesmen(3_usize)
            .with_seed(19_u64)
            .with_stop_at_optimum(YesNo::Yes)
            .with_time_limit(22.0)
            .with_total_time_limit(60.0)
            .with_tour_file("tour.out")
            .with_trace_level(23_usize)
            .with_vehicles(3_usize);

        let text = cfg.to_string();
        let keys: Vec<&str> = text
            .lines()
            .filter_map(|line| line.split_once(" = ").map(|(key, _)| key))
            .collect();

        assert_eq!(keys.len(), 26);
        assert_eq!(keys.first(), Some(&"PROBLEM_FILE"));
        let mut sorted = keys[1..].to_vec();
        sorted.sort_unstable();
        assert_eq!(&keys[1..], sorted.as_slice());
    }

    #[test]
    fn new_parameters_start_with_special() {
        let text = LkhParameters::new("problem.vrp").to_string();
        assert!(text.starts_with("SPECIAL\nPROBLEM_FILE = problem.vrp\n"));

        let plain = LkhParameters::new("problem.vrp").with_special(false).to_string();
        assert!(plain.starts_with("PROBLEM_FILE = "));
    }

    #[test]
    fn take_option_removes_every_spelling_and_keeps_the_last_value() {
        let mut cfg = LkhParameters::default()
            .with_option("tour_file", "first.tour")
            .with_option("RUNS", 3)
            .with_option("Tour_File", "second.tour");

        assert_eq!(cfg.take_option("TOUR_FILE"), Some("second.tour".to_string()));
        assert_eq!(cfg.extra, vec![("RUNS".to_string(), "3".to_string())]);
        assert_eq!(cfg.take_option("TOUR_FILE"), None);
    }

    #[test]
    fn with_methods_set_fields() {
        let cfg = LkhParameters::default()
            .with_seed(7_u8)
            .with_output_tour_file("out.tour")
            .with_emit_eof(true)
            .with_problem_file("other.tsp");

        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.output_tour_file, Some(PathBuf::from("out.tour")));
        assert!(cfg.emit_eof);
        assert_eq!(cfg.problem_file(), PathBuf::from("other.tsp").as_path());
    }
}
