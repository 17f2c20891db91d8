pub mod app;
pub mod clock;
pub mod game;
pub mod store;
pub mod telemetry;
pub mod ui;
pub mod util;

/// Short git hash baked in by build.rs, reported in startup logging.
pub const GIT_VERSION: &str = env!("GIT_HASH");

/// Build tag attached to the app-loaded telemetry event.
pub const BUILD_TAG: &str = concat!("BVQ-v", env!("CARGO_PKG_VERSION"));

#[cfg(debug_assertions)]
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;

#[cfg(not(debug_assertions))]
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
