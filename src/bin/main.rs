mod cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cellar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run(cmd::run::Cmd),
    Check(cmd::check::Cmd),
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(cmd) => cmd.execute(),
        Commands::Check(cmd) => cmd.execute(),
    };
    std::process::exit(i32::from(cellar::exit_code(&result)));
}
