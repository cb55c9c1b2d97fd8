/*!

`stack-utils` is a collection of functions shared by the provisioner and the `stackctl` CLI.
`command` contains the seam through which every external program (`terraform`, `docker`, `aws`) is
run.

!*/

use constants::{DEFAULT_LEVEL_FILTER, LOGGED_CRATES};
use env_logger::Builder;
pub use error::Error;
use log::LevelFilter;
use serde::Serialize;
use std::env;

pub mod command;
pub mod constants;
mod error;

/// Extract the value of `RUST_LOG` if it exists, otherwise log `bin_crate` and this workspace's
/// libraries at `log_level` (or `DEFAULT_LEVEL_FILTER`).
pub fn init_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            let log_level = log_level.unwrap_or(DEFAULT_LEVEL_FILTER);
            let mut builder = Builder::new();
            builder
                .filter_level(LevelFilter::Error)
                .filter(Some(bin_crate), log_level);
            for name in LOGGED_CRATES {
                builder.filter(Some(name), log_level);
            }
            builder.init();
        }
    }
}

/// Print a value using `serde_json` `to_string_pretty` for types that implement Serialize.
pub fn json_display<T: Serialize>(object: T) -> String {
    serde_json::to_string_pretty(&object).unwrap_or_else(|e| format!("Serialization failed: {}", e))
}

/// Implement `Display` using `serde_json` `to_string_pretty` for types that implement Serialize.
#[macro_export]
macro_rules! impl_display_as_json {
    ($i:ident) => {
        impl std::fmt::Display for $i {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let s = serde_json::to_string_pretty(self)
                    .unwrap_or_else(|e| format!("Serialization failed: {}", e));
                std::fmt::Display::fmt(&s, f)
            }
        }
    };
}
