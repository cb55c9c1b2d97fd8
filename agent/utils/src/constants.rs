use log::LevelFilter;

pub const DEFAULT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;

/// The crates whose log records are shown at the requested level. Everything else is limited to
/// errors.
pub const LOGGED_CRATES: [&str; 3] = ["stack_model", "stack_utils", "provisioner"];
