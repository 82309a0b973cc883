//! Structured logging setup
//!
//! The library only emits `tracing` spans and events (`parse_all`,
//! `build_model`, `validate_model`, `render_diagram`). Binaries decide
//! where they go by calling [`init_logging`] once at startup.
//!
//! Level and format are taken from the arguments first, then from
//! `STATEFLOW_LOG_LEVEL` / `RUST_LOG` and `STATEFLOW_LOG_FORMAT`, and
//! finally default to `info` and `compact`.
//!
//! ```bash
//! # Trace reachability checks only
//! RUST_LOG="warn,stateflow::model::validate=trace" stateflow validate -i flow.txt
//! ```

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

const LEVEL_VARS: [&str; 2] = ["STATEFLOW_LOG_LEVEL", "RUST_LOG"];
const FORMAT_VAR: &str = "STATEFLOW_LOG_FORMAT";

/// Output shape of log lines on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event, no targets or source locations
    #[default]
    Compact,
    /// Multi-line with span enter/exit events and source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true);

        match self {
            LogFormat::Compact => base
                .compact()
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .boxed(),
            LogFormat::Pretty => base
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::ACTIVE)
                .boxed(),
            LogFormat::Json => base
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .boxed(),
        }
    }
}

/// Level directive and format after applying the fallbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Resolve explicit values, then the environment, then the defaults
    pub fn resolve(level: Option<&str>, format: Option<&str>) -> Result<Self, String> {
        let level = level
            .map(str::to_string)
            .or_else(|| LEVEL_VARS.iter().find_map(|var| std::env::var(var).ok()))
            .unwrap_or_else(|| "info".to_string());

        let format = match format.map(str::to_string).or_else(|| std::env::var(FORMAT_VAR).ok()) {
            Some(name) => name.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self { level, format })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber writing to stderr
///
/// Fails on an unknown format name, or when a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = LogSettings::resolve(level, format)?;

    Registry::default()
        .with(settings.format.layer())
        .with(settings.filter())
        .try_init()?;

    tracing::debug!(level = %settings.level, format = %settings.format, "Logging initialized");
    Ok(())
}
