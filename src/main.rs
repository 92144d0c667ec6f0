use clap::Parser;
use pacbackup::backup::{self, BackupReport};
use pacbackup::cli::Cli;
use pacbackup::config::{Config, Settings};
use pacbackup::pacman::PacmanDb;
use pacbackup::repo::{CommitOutcome, InitOutcome};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(report: &BackupReport, container: &Path, verbose: bool) {
    if report.init == InitOutcome::Created {
        println!("Preparing backup folder : {}", container.display());
    }

    println!(
        "{} explicit packages in {} groups",
        report.grouping.package_count(),
        report.grouping.group_names().count()
    );

    if let Some(diff) = &report.diff {
        if diff.is_empty() {
            println!("Package list unchanged since the last backup");
        } else {
            println!(
                "Since the last backup: +{} added, -{} removed, {} moved",
                diff.added(),
                diff.removed(),
                diff.moved()
            );
            if verbose {
                print!("{}", diff.render());
            }
        }
    }

    if let CommitOutcome::Committed(oid) = report.commit {
        println!("Committed {oid}");
    }
}

fn run(cli: &Cli) -> pacbackup::Result<()> {
    let settings = match Settings::default_path() {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    let config = Config::from_cli(cli, &settings)?;

    let db = PacmanDb::open(&config.pacman_conf, config.db_path.as_deref(), config.root.as_deref())?;
    let report = backup::run(&config, &db)?;

    print_summary(&report, &config.container, config.verbose);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
