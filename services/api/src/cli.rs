use crate::demo::{run_demo, DemoArgs};
use crate::server;
use camp_admin::auth::password;
use camp_admin::config::ConfigError;
use camp_admin::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Camp Administration",
    about = "Run and demonstrate the camp administration service from the command line",
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
    /// Walk through a room allocation scenario against an in-memory store
    Demo(DemoArgs),
    /// Print an argon2 hash suitable for APP_ADMIN_PASSWORD_HASH
    HashPassword(HashPasswordArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the JSON snapshot file backing the store
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct HashPasswordArgs {
    /// Plain-text administrator password to hash
    pub(crate) password: String,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::HashPassword(args) => {
            let hash = password::hash_password(&args.password)
                .map_err(|err| AppError::Config(ConfigError::PasswordHash(err)))?;
            println!("{hash}");
            Ok(())
        }
    }
}
