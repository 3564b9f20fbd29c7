use std::fmt::Display;

use clap::{Parser, Subcommand};
use colored::Colorize;
use routeboard_lib::{Error, Repository, repository::entities};
use sysexits::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber, filter::LevelFilter};

mod gallery;
mod location;
mod route;
mod sort;

#[derive(Parser, Debug)]
#[command(name = "routeboard")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the configured default region
    #[arg(short, long, global = true)]
    region: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on routes
    #[command(subcommand)]
    Route(route::Command),
    /// Operate on the locations of a route
    #[command(subcommand)]
    Location(location::Command),
    /// Operate on the gallery content block
    #[command(subcommand)]
    Gallery(gallery::Command),
    /// Reorder locations, gallery rows or the images of a gallery row
    #[command(subcommand)]
    Sort(sort::Command),
}

/// A command that could not complete: what to tell the user and how to exit.
#[derive(Debug)]
pub struct Failure {
    message: String,
    code: ExitCode,
}

impl Failure {
    /// A record named on the command line doesn't exist.
    pub fn not_found(message: impl Display) -> Self {
        Self {
            message: message.to_string(),
            code: ExitCode::NoInput,
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::Entity(entities::Error::DuplicateCode(_)) => ExitCode::DataErr,
            Error::Entity(entities::Error::RemovedEntity) => ExitCode::NoInput,
            Error::EmptyListName | Error::AmbiguousCode(_) => ExitCode::Usage,
            Error::UnknownRow(_) => ExitCode::NoInput,
            Error::UnknownList(_) => ExitCode::NoInput,
            Error::Config(_) => ExitCode::Config,
            Error::Io(_) => ExitCode::IoErr,
            Error::Entity(_) | Error::Store(_) | Error::Database(_) => ExitCode::Software,
        };

        Self {
            message: err.to_string(),
            code,
        }
    }
}

impl From<entities::Error> for Failure {
    fn from(err: entities::Error) -> Self {
        Error::from(err).into()
    }
}

pub type Outcome = Result<(), Failure>;

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging goes to stderr so command output stays clean
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {err}");
    }

    let cli = Cli::parse();

    let repo = match Repository::new() {
        Ok(repo) => repo,
        Err(err) => return report(err.into()),
    };
    let region = cli.region.unwrap_or_else(|| repo.default_region());

    let outcome = match &cli.command {
        Command::Route(cmd) => route::handle(&repo, &region, cmd),
        Command::Location(cmd) => location::handle(&repo, cmd),
        Command::Gallery(cmd) => gallery::handle(&repo, cmd),
        Command::Sort(cmd) => sort::handle(&repo, &region, cmd),
    };

    match outcome {
        Ok(()) => ExitCode::Ok,
        Err(failure) => report(failure),
    }
}

fn report(failure: Failure) -> ExitCode {
    eprintln!("{} {}", "error:".red().bold(), failure.message);
    failure.code
}
