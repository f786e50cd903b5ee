//! Logging setup.
//!
//! Everything goes through `tracing`. Log lines are written to stderr so they
//! never interleave with the flashcards drawn on stdout.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate targets that follow the `-v`/`-q` flags. Dependencies stay at `warn`.
const OWN_TARGETS: [&str; 2] = ["sightreader", "sightread"];

/// How chatty the binary should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Session start/end, review progress and warnings.
    #[default]
    Normal,
    /// Every card drawn and every storage write.
    Verbose,
    /// Practice clock flushes and everything else.
    Trace,
}

impl Verbosity {
    /// Most detailed level shown for this crate.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn shows_timestamps(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the filter derived from `verbosity`.
/// Calling this twice is harmless; the second call does nothing.
///
/// ```no_run
/// use sightreader::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(verbosity)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Trace)
        .compact();

    // already-installed subscribers are left alone
    let _ = if verbosity.shows_timestamps() {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.without_time())
            .try_init()
    };
}

/// Filter used when `RUST_LOG` is unset.
fn filter_directives(verbosity: Verbosity) -> String {
    let dependencies = if verbosity == Verbosity::Quiet {
        "error"
    } else {
        "warn"
    };
    let level = verbosity.level();
    let mut directives = vec![dependencies.to_string()];
    directives.extend(OWN_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
