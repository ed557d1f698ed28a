use std::io;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;
use tracing_subscriber::EnvFilter;

use bem_create::config::{Cli, Config, ContentArg};
use bem_create::creator::{
    create_with_progress, CellResult, CellStatus, CreateOptions, CreateReport, FileContent,
    Progress,
};
use bem_create::materializer::WriteOptions;
use bem_create::resolver::Context;
use bem_create::settings::Settings;
use bem_create::template::FsTemplates;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// `RUST_LOG` wins; otherwise verbosity flags pick the level
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    init_logging(config.verbose, config.quiet);

    // Configure Rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build_global()
        .ok();

    let settings = match &config.config_file {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Settings::discover(&config.cwd).context("Failed to load .bemrc configuration")?,
    };

    let ctx = Context {
        cwd: &config.cwd,
        config: &settings,
        templates: &FsTemplates,
    };

    let file_content = config.content.clone().map(|arg| match arg {
        ContentArg::Text(text) => FileContent::Text(text),
        ContentArg::Stdin => FileContent::Stream(Box::new(io::stdin())),
    });

    let options = CreateOptions {
        tech_filter: config.tech_filter.clone(),
        file_content,
        write: WriteOptions {
            force_rewrite: config.force,
            no_warn: config.quiet,
        },
    };

    let start = Instant::now();
    let progress = VerboseProgress::new(&config);

    let report = create_with_progress(
        &config.entities,
        &config.levels,
        &config.techs,
        options,
        &ctx,
        &progress,
    )
    .context("Failed to create entities")?;

    progress.finish();
    print_report(&report, &config, start);

    Ok(exit_code(&report))
}

/// Progress bar and per-file lines, only in verbose mode
struct VerboseProgress {
    bar: Option<ProgressBar>,
    jobs: usize,
}

impl VerboseProgress {
    fn new(config: &Config) -> Self {
        let bar = config.verbose.then(|| {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        });

        Self {
            bar,
            jobs: config.jobs,
        }
    }

    fn finish(&self) {
        if let Some(ref pb) = self.bar {
            pb.finish_and_clear();
        }
    }
}

impl Progress for VerboseProgress {
    fn start(&self, cells: usize) {
        if let Some(ref pb) = self.bar {
            pb.set_length(cells as u64);
            pb.println(format!("Creating {} file(s) with {} worker(s)", cells, self.jobs));
        }
    }

    fn cell_done(&self, result: &CellResult) {
        let Some(ref pb) = self.bar else {
            return;
        };
        if let CellStatus::Created(path) = &result.status {
            pb.println(format!("{} ({:.2?})", path.display(), result.duration));
        }
        pb.inc(1);
    }
}

fn print_report(report: &CreateReport, config: &Config, start: Instant) {
    for failure in &report.failures {
        error!("{failure}");
    }

    if !config.quiet {
        eprintln!(
            "Created {} file(s) in {:.2}s",
            report.created.len(),
            start.elapsed().as_secs_f64()
        );
    }
}

/// 0 when everything succeeded, 1 on partial failure, 2 when nothing did
fn exit_code(report: &CreateReport) -> ExitCode {
    if report.has_failure() && !report.has_success() {
        ExitCode::from(2)
    } else if report.has_failure() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
