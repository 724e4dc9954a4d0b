//! Log setup for the binary.

use env_logger::{Builder, Env};

/// Install `env_logger` once.  Defaults to `info`; `RUST_LOG` overrides,
/// e.g. `RUST_LOG=debug` for the per-second tracking line.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
