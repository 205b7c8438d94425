use log::{LevelFilter, SetLoggerError};
use simple_logger::SimpleLogger;

/// Installs the process logger. Call once from the embedding binary.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    SimpleLogger::new().with_level(level).init()?;
    log::info!("Logger initialised at {}", level);
    Ok(())
}
