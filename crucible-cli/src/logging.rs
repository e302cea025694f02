use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install a subscriber which writes log records to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));
    fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))
}

fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,crucible=debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0, "warn")]
    #[case(1, "warn,crucible=debug")]
    #[case(2, "trace")]
    #[case(5, "trace")]
    fn test_default_directives(#[case] verbosity: u8, #[case] expected: &str) {
        assert_eq!(default_directives(verbosity), expected)
    }
}
