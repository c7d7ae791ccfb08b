use std::{
    str::FromStr,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, Layer};

static IS_TRACING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Prefix shared by every target emitted by the tapster crates.
const TARGET_PREFIX: &str = "tapster";

/// How chatty the logs should be when `TRACE` is not set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only warnings and errors.
    #[default]
    Quiet,
    /// `--verbose`
    Verbose,
    /// `--debug`
    Debug,
}

impl Verbosity {
    /// Choose a verbosity from the command line flags. `--debug` wins over `--verbose`.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => Verbosity::Debug,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Quiet,
        }
    }

    pub fn level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::WARN,
            Verbosity::Verbose => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
        }
    }
}

/// Install the global subscriber. Calling this more than once is a no-op.
///
/// The `TRACE` environment variable takes precedence over `verbosity`: it is either a bare
/// level (applied to all tapster targets) or an [`EnvFilter`] directive.
pub fn enable_tracing(verbosity: Verbosity) {
    if IS_TRACING_ENABLED.swap(true, Ordering::SeqCst) {
        return;
    }

    use tracing_subscriber::{fmt, prelude::*};

    let trace_var = std::env::var("TRACE").ok();
    let filter = common_layer(trace_var.as_deref(), verbosity);
    let output = if trace_var.is_some() {
        fmt::layer()
            .pretty()
            .with_file(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer().compact().without_time().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry().with(filter).with(output).init();
    tracing::trace!(target: "tapster::diagnostics", ?verbosity, "enable_tracing");
}

fn targets_at(level: Level) -> tracing_subscriber::filter::Targets {
    tracing_subscriber::filter::Targets::new().with_target(TARGET_PREFIX, level)
}

fn common_layer(
    trace_var: Option<&str>,
    verbosity: Verbosity,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> {
    let Some(trace_var) = trace_var else {
        return targets_at(verbosity.level()).boxed();
    };

    if let Ok(level) = Level::from_str(trace_var) {
        return targets_at(level).boxed();
    }

    match EnvFilter::builder().with_regex(true).parse(trace_var) {
        Ok(filter) => filter.boxed(),
        Err(error) => {
            // no subscriber is installed at this point
            eprintln!("warning: ignoring invalid TRACE directive {trace_var:?}: {error}");
            targets_at(verbosity.level()).boxed()
        }
    }
}
