use std::io::IsTerminal;

use miette::{IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Handle on the installed log filter
///
/// The browser uses it to switch debug output on and off while running.
pub struct Console {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
    base: LevelFilter,
    debug: bool,
}

impl Console {
    /// A console that is not attached to any subscriber
    pub fn detached(base: LevelFilter) -> Self {
        Console {
            handle: None,
            base,
            debug: false,
        }
    }

    /// Whether debug output is currently enabled
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Switch between the starting level and debug output, returning the new level
    pub fn toggle(&mut self) -> Result<LevelFilter> {
        self.debug = !self.debug;
        let level = if self.debug {
            LevelFilter::DEBUG.max(self.base)
        } else {
            self.base
        };

        if let Some(handle) = &self.handle {
            handle.reload(filter(level)).into_diagnostic()?;
        }

        Ok(level)
    }
}

fn filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Install the global subscriber
pub fn init(level: LevelFilter) -> Result<Console> {
    let (filter, handle) = reload::Layer::new(filter(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stdout().is_terminal())
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init()
        .into_diagnostic()?;

    Ok(Console {
        handle: Some(handle),
        base: level,
        debug: false,
    })
}
