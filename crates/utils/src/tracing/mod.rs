use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Filter directive matching a cache log verbosity
///
/// `0` keeps errors only, `1` adds hit-rate reports, `2` adds per-operation
/// cache activity.
pub fn directive_for(log_level: u8) -> &'static str {
    match log_level {
        0 => "error",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize the tracing system
///
/// `RUST_LOG` wins when set; otherwise the directive derived from
/// `log_level` is used. Output goes to stderr so command output on stdout
/// stays clean.
pub fn init(log_level: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive_for(log_level)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
