use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lkh::{parameters::LkhParameters, solver::DEFAULT_SOLVER};
use log::LevelFilter;

/// Run LKH-3 on a TSPLIB routing problem and print one route per line.
#[derive(Clone, Debug, Parser)]
#[command(name = "lkh-routes", version, about)]
pub struct CliOptions {
    /// TSPLIB problem file to solve.
    #[arg(long)]
    pub problem_file: PathBuf,
    /// LKH executable, looked up on PATH unless it is a path.
    #[arg(long, default_value = DEFAULT_SOLVER)]
    pub lkh_exe: String,
    /// Do not start the parameter file with `SPECIAL`.
    #[arg(long)]
    pub no_special: bool,
    /// `RUNS`
    #[arg(long)]
    pub runs: Option<usize>,
    /// `MAX_TRIALS`
    #[arg(long)]
    pub max_trials: Option<usize>,
    /// `TIME_LIMIT` in seconds.
    #[arg(long)]
    pub time_limit: Option<f64>,
    /// `SEED`
    #[arg(long)]
    pub seed: Option<u64>,
    /// `TRACE_LEVEL`
    #[arg(long)]
    pub trace_level: Option<usize>,
    /// `SALESMEN`
    #[arg(long)]
    pub salesmen: Option<usize>,
    /// Extra LKH option as KEY=VALUE. Repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
    /// Keep the solver's tour file at this path.
    #[arg(long)]
    pub tour_file: Option<PathBuf>,
    /// Structured logging level.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
    /// Logging output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[arg(long)]
    pub log_timestamp: bool,
    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_output: Option<PathBuf>,
}

impl CliOptions {
    pub fn lkh_parameters(&self) -> LkhParameters {
        let mut params = LkhParameters::default();
        params.special = !self.no_special;
        params.runs = self.runs;
        params.max_trials = self.max_trials;
        params.time_limit = self.time_limit;
        params.seed = self.seed;
        params.trace_level = self.trace_level;
        params.salesmen = self.salesmen;
        params.tour_file = self.tour_file.clone();

        self.params
            .iter()
            .fold(params, |params, (key, value)| params.with_option(key, value))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use log::LevelFilter;

    use super::{CliOptions, LogFormat, LogLevel, parse_key_value};

    #[test]
    fn defaults_use_lkh_on_path_with_special() {
        let options =
            CliOptions::try_parse_from(["lkh-routes", "--problem-file", "a.vrp"]).expect("parse");

        assert_eq!(options.problem_file, PathBuf::from("a.vrp"));
        assert_eq!(options.lkh_exe, "LKH");
        assert!(!options.no_special);
        assert!(options.lkh_parameters().special);
        assert_eq!(options.log_level, LogLevel::Warn);
        assert_eq!(options.log_format, LogFormat::Compact);
        assert!(options.log_output.is_none());
    }

    #[test]
    fn problem_file_is_required() {
        assert!(CliOptions::try_parse_from(["lkh-routes"]).is_err());
    }

    #[test]
    fn solver_flags_become_lkh_parameters() {
        let options = CliOptions::try_parse_from([
            "lkh-routes",
            "--problem-file",
            "a.vrp",
            "--runs",
            "2",
            "--seed",
            "7",
            "--salesmen",
            "3",
            "--param",
            "mtsp_objective=MINMAX",
            "--param",
            "POPULATION_SIZE = 10",
            "--tour-file",
            "out.tour",
            "--no-special",
        ])
        .expect("parse");

        let params = options.lkh_parameters();
        assert!(!params.special);
        assert_eq!(params.runs, Some(2));
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.salesmen, Some(3));
        assert_eq!(params.tour_file, Some(PathBuf::from("out.tour")));
        assert_eq!(
            params.extra,
            vec![
                ("mtsp_objective".to_string(), "MINMAX".to_string()),
                ("POPULATION_SIZE".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn log_level_accepts_warning_alias() {
        let options = CliOptions::try_parse_from([
            "lkh-routes",
            "--problem-file",
            "a.vrp",
            "--log-level",
            "warning",
            "--log-format",
            "pretty",
        ])
        .expect("parse");

        assert_eq!(options.log_level.to_filter(), LevelFilter::Warn);
        assert_eq!(options.log_format, LogFormat::Pretty);
    }

    #[test]
    fn parse_key_value_rejects_missing_separator_or_key() {
        assert!(parse_key_value("RUNS").is_err());
        assert!(parse_key_value("=3").is_err());
        assert_eq!(
            parse_key_value("KICKS=1").expect("parse"),
            ("KICKS".to_string(), "1".to_string())
        );
    }
}
