//! Logging setup

use tracing::log::LevelFilter;

/// Transport and windowing modules that are too chatty at info level, with
/// the level they are capped at unless debug logging is on.
pub const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("tracing", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
    ("h2", LevelFilter::Info),
    ("minifb", LevelFilter::Warn),
];

/// The level the logger runs at, `Debug` with `--debug` and `Info` otherwise.
pub fn log_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Fails if one is already installed.
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let mut logger = simple_logger::SimpleLogger::new().with_level(log_level(debug));
    if !debug {
        for (module, level) in QUIET_MODULES {
            logger = logger.with_module_level(module, *level);
        }
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}
