//! Tracing subscriber setup.

use crate::{CliError, CliResult, LogArgs, LogFormat};
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise everything at or above the level implied by
/// [`LogArgs::verbosity`] is logged.
pub fn init_tracing_subscriber(args: &LogArgs) -> CliResult<()> {
    let filter = EnvFilter::builder().with_default_directive(args.level().into()).from_env()?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match args.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| CliError::Tracing(e.to_string()))
}
