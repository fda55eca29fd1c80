//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber filtered by `filter`
/// (e.g. `"info,aegis_db=debug"`).
///
/// Falls back to `info` when the directive does not parse. Returns `false`
/// when a global subscriber was already installed.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        init_tracing("not a [valid directive");
        assert!(!init_tracing("debug"));
    }
}
