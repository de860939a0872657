use crate::demo::{run_assign, run_available, run_demo, AssignArgs, AvailableArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use school_proxy::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "School Proxy",
    about = "Rank substitute teachers and plan cover for an absent teacher's day",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank eligible substitutes for one period
    Available(AvailableArgs),
    /// Plan (or, with --commit, record) cover for every lesson of an absent teacher
    Assign(AssignArgs),
    /// Walk through a cover plan against the built-in sample school
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Roster directory to serve; overrides SCHOOL_ROSTER_DIR
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Available(args) => run_available(args),
        Command::Assign(args) => run_assign(args),
        Command::Demo(args) => run_demo(args),
    }
}
