use tracing_subscriber::EnvFilter;

/// All workspace crate targets that should receive log output.
const CRATE_TARGETS: &[&str] = &["verif", "verif_evaluate", "verif_stats"];

/// Initialize tracing for a verbosity level.
///
/// Mapping:
/// - 0 -> warn
/// - 1 -> info (station skips, run summary)
/// - 2 -> debug (rows dropped during enrichment)
/// - 3+ -> trace
///
/// `RUST_LOG` env var overrides the level if set. Calling this more than
/// once is a no-op.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let default_filter: String = CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
