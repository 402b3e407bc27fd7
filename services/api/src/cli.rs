use crate::roster::{run_init_db, run_list, ListArgs};
use crate::server;
use admissions::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admission Server",
    about = "Run the admission intake service and inspect stored admissions",
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
    /// Create the students table in the configured store and exit
    InitDb,
    /// Inspect stored admissions
    Students {
        #[command(subcommand)]
        command: StudentsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StudentsCommand {
    /// Print every stored admission
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::InitDb => run_init_db().await,
        Command::Students {
            command: StudentsCommand::List(args),
        } => run_list(args).await,
    }
}
