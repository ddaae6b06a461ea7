//! # Ponder Orb
//!
//! A procedurally animated orb for the terminal that answers questions.
//!
//! ## Modes
//! - Local: one session on the controlling terminal (default)
//! - Server: `--serve` gives every telnet connection its own session
//! - `completions <shell>` prints a shell completion script

mod cli;
mod core;
mod orb;
mod run;
mod server;
mod tui;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args = Args::parse();

    if let Some(Commands::Completions { shell }) = &args.command {
        let mut cmd = Args::command();
        cli::generate(*shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
        return Ok(());
    }

    run::init_logger(&args);

    // Print user-friendly message; exit uses Display not Debug
    let config = core::config::load(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    log::debug!("{} {} starting: {:?}", core::app::NAME, core::app::VERSION, config);

    let result = if args.serve {
        run::run_server(config).await
    } else {
        run::run_local(config).await
    };
    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
