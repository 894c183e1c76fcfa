use std::str::FromStr;

use colored::Colorize;
use common::env_config::Config;
use middleware::logger::LoggerMiddleware;

pub mod middleware {
    pub mod logger;
}

pub fn middleware() -> LoggerMiddleware {
    LoggerMiddleware::new()
}

/// Installs the global logger: coloured console output plus a plain log file.
pub fn setup(config: &Config) -> Result<(), fern::InitError> {
    let level = log::LevelFilter::from_str(&config.log_level).unwrap_or(log::LevelFilter::Debug);

    fern::Dispatch::new()
        .format(|out, message, record| {
            let color = match record.level() {
                log::Level::Info => "green",
                log::Level::Warn => "yellow",
                log::Level::Error => "red",
                log::Level::Debug => "magenta",
                log::Level::Trace => "bright black",
            };
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(color),
                message
            ))
        })
        .level(level)
        .level_for("hyper", log::LevelFilter::Off)
        .level_for("rustls", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        .chain(fern::log_file(&config.log_file)?)
        .apply()?;

    log::debug!("Logger ready at {} level, writing {}", level, config.log_file);
    Ok(())
}
