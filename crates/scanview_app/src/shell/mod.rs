//! Terminal shell: wires the pure core to the engine and prints the results.
pub mod cli;
mod config;
mod effects;
mod render;
mod session;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, LogDestination};
use scanview_core::{AppViewModel, PollStatus, Route};

use cli::Args;
use config::AppConfig;
use session::{Goal, Session};

pub fn run(args: Args) -> Result<ExitCode> {
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(args.log_level(), destination);

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_overrides(&args);

    let route = Route::parse(&args.route)
        .with_context(|| format!("unrecognised location {:?}", args.route))?;
    let goal = goal_from_args(&args, &route)?;
    engine_info!(
        "Opening {} against {}",
        route.path(),
        config.client.base_url
    );

    let view = Session::new(&config)?.run(route, &goal);
    Ok(report(&goal, &view))
}

fn goal_from_args(args: &Args, route: &Route) -> Result<Goal> {
    if args.backend {
        return Ok(Goal::Backend);
    }
    if route.job_hash().is_some() && (args.compile.is_some() || args.submit.is_some()) {
        bail!("--compile and --submit start from the composer; open `/` instead");
    }
    if let Some(path) = &args.compile {
        return Ok(Goal::Compile {
            raw_query: read_query(path)?,
            taint: args.taint.clone(),
        });
    }
    if let Some(path) = &args.submit {
        return Ok(Goal::Submit {
            raw_query: read_query(path)?,
            taint: args.taint.clone(),
        });
    }
    Ok(match route {
        Route::Compose => Goal::Browse,
        Route::Job(_) => Goal::Watch,
    })
}

fn read_query(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading query {}", path.display()))
}

/// Prints the outcome of the session to stdout and picks the exit code.
fn report(goal: &Goal, view: &AppViewModel) -> ExitCode {
    match goal {
        Goal::Browse => {
            for taint in &view.available_taints {
                println!("{taint}");
            }
            ExitCode::SUCCESS
        }
        Goal::Compile { .. } => match (&view.query_plan, &view.query_error) {
            (Some(plan), _) => {
                println!("{:#}", plan.0);
                ExitCode::SUCCESS
            }
            (None, Some(error)) => {
                eprintln!("error: {error}");
                ExitCode::FAILURE
            }
            (None, None) => ExitCode::FAILURE,
        },
        Goal::Watch | Goal::Submit { .. } => {
            if let (None, Some(error)) = (&view.job_hash, &view.query_error) {
                eprintln!("error: {error}");
                return ExitCode::FAILURE;
            }
            if let Some(hash) = &view.job_hash {
                eprintln!("location: {}", Route::Job(hash.clone()).path());
            }
            for line in render::match_lines(&view.matches) {
                println!("{line}");
            }
            match &view.poll {
                PollStatus::Stalled { reason } => {
                    eprintln!("error: polling stopped early: {reason}");
                    ExitCode::FAILURE
                }
                _ => ExitCode::SUCCESS,
            }
        }
        Goal::Backend => {
            if let Some(error) = &view.backend_error {
                eprintln!("error: {error}");
                return ExitCode::FAILURE;
            }
            let alive = view.db_alive.unwrap_or(false);
            println!("database: {}", if alive { "alive" } else { "down" });
            println!("{}", render::backend_table(&view.backend_rows));
            ExitCode::SUCCESS
        }
    }
}
