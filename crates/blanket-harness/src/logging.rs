//! Subscriber setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for JSONL frames. The filter comes
//! from `--log-filter`, else `RUST_LOG`, else `info`.

use tracing_subscriber::EnvFilter;

use crate::error::{HarnessError, Result};

pub const DEFAULT_FILTER: &str = "info";

/// Build the filter without installing anything.
pub fn filter(directive: Option<&str>) -> Result<EnvFilter> {
    match directive {
        Some(directive) => Ok(EnvFilter::try_new(directive)?),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(directive: Option<&str>, json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(directive)?)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| HarnessError::Logging {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_parses() {
        let filter = filter(Some("blanket_core=debug,warn")).unwrap();
        assert!(filter.to_string().contains("blanket_core=debug"));
    }

    #[test]
    fn bad_filter_is_rejected() {
        assert!(matches!(
            filter(Some("blanket_core=loud")),
            Err(HarnessError::LogFilter(_))
        ));
    }
}
