use std::error::Error;
use std::fs::File;
use std::path::Path;

use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

/// `env_logger` honouring `RUST_LOG` (default `info`), or terminal plus a
/// debug-level log file when `log_file` is given.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()?;
        }
        Some(path) => {
            CombinedLogger::init(vec![
                TermLogger::new(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(path)?),
            ])?;
        }
    }
    Ok(())
}
