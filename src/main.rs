use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grocery_notes::{commands, App, Command, CommandError, Config};

#[derive(Parser)]
#[command(name = "gnotes")]
#[command(about = "Grocery lists with running totals, filled by typing or dictation")]
struct Cli {
    /// Path to the database file (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory database
    #[arg(long, global = true)]
    memory: bool,

    /// Keep all lists under one key instead of per user
    #[arg(long, global = true)]
    single_user: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "grocery_notes=info,grocery_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::new(cli.db, cli.memory, cli.single_user);
    tracing::debug!("Using database {}", config.describe_db());

    let db = config.open_database()?;
    let mut app = App::open(db, config.multi_user)?;
    for err in app.startup_errors() {
        tracing::warn!("{}", err);
        eprintln!("{}", grocery_core::format::user_message(err));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = cli.command.unwrap_or(Command::Lists);
    match commands::run(&mut app, command, &mut input, &mut out) {
        Ok(()) => {}
        Err(CommandError::Io(err)) => return Err(err.into()),
        Err(err) => {
            tracing::debug!("Command rejected: {:?}", err);
            out.flush()?;
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}
