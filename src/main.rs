mod cli;
mod logging;

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use lkh::{LkhResult, routes::Route, solver::RouteSolver};
use log::info;

use crate::cli::CliOptions;

fn main() -> ExitCode {
    let options = CliOptions::parse();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("lkh-routes: failed err={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CliOptions) -> LkhResult<()> {
    let now = Instant::now();
    logging::init_logger(options)?;

    info!(
        "input: problem_file={} lkh_exe={}",
        options.problem_file.display(),
        options.lkh_exe
    );

    let routes = RouteSolver::new(&options.lkh_exe)
        .with_problem_file(&options.problem_file)
        .with_parameters(options.lkh_parameters())
        .solve()?;

    print_routes(&mut io::stdout().lock(), &routes)?;

    info!(
        "output: routes={} time={:.2}s",
        routes.len(),
        now.elapsed().as_secs_f32()
    );
    Ok(())
}

fn print_routes(out: &mut impl Write, routes: &[Route]) -> io::Result<()> {
    for route in routes {
        let line = route
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}")?;
    }
    out.flush()
}
