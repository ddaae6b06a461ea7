//! Application run modes: logger init, shared services, local terminal or server.

use std::error::Error;
use std::sync::Arc;

use crate::cli::Args;
use crate::core;
use crate::core::config::Config;
use crate::core::oracle::{Oracle, OracleError};
use crate::core::transcript::Transcript;
use crate::server;
use crate::tui::{self, Services};

/// Initialize env_logger. In local mode, writes to file to avoid corrupting the display.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if !args.serve
        && let Some(path) = core::paths::log_file()
    {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Answer client and transcript, shared by every session of the process.
fn services(config: &Config) -> Result<Services, OracleError> {
    Ok(Services {
        oracle: Arc::new(Oracle::new(config.endpoint.clone(), config.timeout)?),
        transcript: Arc::new(Transcript::new(config.transcript.clone())),
    })
}

/// Run one session on this terminal until the user quits.
pub async fn run_local(config: Config) -> Result<(), Box<dyn Error>> {
    let services = services(&config)?;
    tui::run(&config, services).await?;
    Ok(())
}

/// Serve sessions over telnet until the process is stopped.
pub async fn run_server(config: Config) -> Result<(), Box<dyn Error>> {
    let services = services(&config)?;
    server::serve(config, services).await?;
    Ok(())
}
