/*
[INPUT]:  Log level / filter directive from the CLI
[OUTPUT]: Global tracing subscriber
[POS]:    Observability - logging bootstrap for binaries
[UPDATE]: When changing log format or filter handling
*/

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// `log_level` accepts anything `EnvFilter` does (`info`, `edgex_sdk=debug`).
pub fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
