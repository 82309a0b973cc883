//! Command-line interface for the stateflow utility
//!
//! Validates `@StateFlow` directive blocks, inspects the built model and
//! renders it as an ASCII flow diagram.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use stateflow::core::logging::init_logging;
use stateflow::diagram::{FlowDiagram, FlowRenderer, DEFAULT_TITLE};
use stateflow::model::{StateModel, Transition};
use stateflow::CharacterSet;

/// Stateflow - Compile @StateFlow directives into validated state models
#[derive(Parser)]
#[command(name = "stateflow")]
#[command(about = "Validate @StateFlow directive blocks and render them as ASCII flow diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a directive block as an ASCII flow diagram
    Render {
        /// Input file containing the directive block (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the diagram (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Character set to use for rendering output
        #[arg(long, value_enum, default_value_t = StyleChoice::Ascii)]
        style: StyleChoice,

        /// Wrap the diagram in a fenced `//` comment block
        #[arg(long)]
        comment: bool,

        /// Title of the comment block (defaults to the workflow name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Parse and validate a directive block
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show the phases, statuses and transitions of the built model
    Inspect {
        /// Input file to inspect (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Supported output character sets
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum StyleChoice {
    Ascii,
    Unicode,
}

impl From<StyleChoice> for CharacterSet {
    fn from(value: StyleChoice) -> Self {
        match value {
            StyleChoice::Ascii => CharacterSet::Ascii,
            StyleChoice::Unicode => CharacterSet::Unicode,
        }
    }
}

/// JSON shape of `inspect --json`
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub init_stage: String,
    pub has_status: bool,
    pub has_approval: bool,
    pub phases: Vec<PhaseReport>,
    pub transitions: Vec<TransitionReport>,
}

#[derive(Debug, Serialize)]
pub struct PhaseReport {
    pub name: String,
    pub statuses: Vec<String>,
    pub via_only: bool,
}

#[derive(Debug, Serialize)]
pub struct TransitionReport {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl From<&Transition> for TransitionReport {
    fn from(transition: &Transition) -> Self {
        let approval = if transition.approval_required {
            Some("required")
        } else if transition.approval_optional {
            Some("optional")
        } else {
            None
        };
        Self {
            from: transition.from.key(),
            to: transition.to.key(),
            approval,
            via: transition.via.as_ref().map(|s| s.key()),
            fallback: transition.fallback.as_ref().map(|s| s.key()),
        }
    }
}

impl From<&StateModel> for ModelReport {
    fn from(model: &StateModel) -> Self {
        Self {
            name: display_name(model).to_string(),
            init_stage: model.init_stage().key(),
            has_status: model.has_status(),
            has_approval: model.has_approval(),
            phases: model
                .phases()
                .iter()
                .map(|phase| PhaseReport {
                    name: phase.clone(),
                    statuses: model.statuses(phase).to_vec(),
                    via_only: model.is_via_phase(phase),
                })
                .collect(),
            transitions: model.transitions().iter().map(TransitionReport::from).collect(),
        }
    }
}

fn display_name(model: &StateModel) -> &str {
    if model.name().is_empty() {
        DEFAULT_TITLE
    } else {
        model.name()
    }
}

/// Main CLI application
#[derive(Default)]
pub struct StateFlowApp;

impl StateFlowApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("STATEFLOW_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("STATEFLOW_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Stateflow v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                input,
                output,
                style,
                comment,
                title,
            } => self.render_command(input, output, style, comment, title, cli.verbose),
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Inspect { input, json } => self.inspect_command(input, json, cli.verbose),
        }
    }

    fn render_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        style: StyleChoice,
        comment: bool,
        title: Option<String>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let diagram = self.render_text(&content, style.into(), comment, title.as_deref())?;
        self.write_output(output, &diagram)
    }

    /// Parse, build and render one directive block
    pub fn render_text(
        &self,
        content: &str,
        style: CharacterSet,
        comment: bool,
        title: Option<&str>,
    ) -> Result<String> {
        let model = stateflow::build(content)?;
        let mut diagram = FlowDiagram::from_model(&model);
        if let Some(title) = title {
            diagram.set_title(title);
        }

        let renderer = FlowRenderer::with_style(style);
        let output = if comment {
            renderer.render_comment(&diagram)
        } else {
            renderer.render_diagram(&diagram)
        };
        info!(bytes = output.len(), comment, "Rendered state flow");
        Ok(output)
    }

    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.validate_text(&content) {
            Ok(summary) => {
                println!("{}", summary);
                Ok(())
            }
            Err(e) => {
                println!("✗ {}", e);
                Err(e)
            }
        }
    }

    /// One-line summary of a valid block, or the first error found
    pub fn validate_text(&self, content: &str) -> Result<String> {
        let model = stateflow::build(content)?;
        Ok(format!(
            "✓ Valid state flow '{}' ({} phases, {} transitions)",
            display_name(&model),
            model.phases().len(),
            model.transitions().len()
        ))
    }

    fn inspect_command(&self, input: Option<PathBuf>, json: bool, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let report = self.inspect_text(&content, json)?;
        self.write_output(None, &report)
    }

    /// Describe the built model as text or pretty JSON
    pub fn inspect_text(&self, content: &str, json: bool) -> Result<String> {
        let model = stateflow::build(content)?;
        let report = ModelReport::from(&model);
        debug!(phases = report.phases.len(), json, "Inspecting model");

        if json {
            return Ok(serde_json::to_string_pretty(&report)?);
        }

        let mut lines = vec![
            format!("State flow '{}'", report.name),
            format!("  init: {}", report.init_stage),
            "  phases:".to_string(),
        ];
        for phase in &report.phases {
            let mut line = format!("    {}", phase.name);
            if !phase.statuses.is_empty() {
                line.push_str(&format!(" ({})", phase.statuses.join(", ")));
            }
            if phase.via_only {
                line.push_str(" [via]");
            }
            lines.push(line);
        }
        lines.push("  transitions:".to_string());
        lines.extend(
            model
                .transitions()
                .iter()
                .map(|transition| format!("    {}", transition)),
        );
        Ok(lines.join("\n"))
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout();
                if content.is_empty() || content.ends_with('\n') {
                    write!(stdout, "{}", content)?;
                } else {
                    writeln!(stdout, "{}", content)?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stateflow::StateFlowError;
    use std::fs;
    use tempfile::tempdir;

    const DOC: &str = "@StateFlow(name=Doc)\n@Flow: Draft => [ Published! via Reviewing ]";

    #[test]
    fn test_cli_parsing_render_command() {
        let args = vec![
            "stateflow",
            "render",
            "--input",
            "flow.txt",
            "--output",
            "flow.out",
            "--style",
            "unicode",
            "--comment",
            "--title",
            "Lifecycle",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                input,
                output,
                style,
                comment,
                title,
            } => {
                assert_eq!(input.unwrap().to_string_lossy(), "flow.txt");
                assert_eq!(output.unwrap().to_string_lossy(), "flow.out");
                assert_eq!(style, StyleChoice::Unicode);
                assert!(comment);
                assert_eq!(title.as_deref(), Some("Lifecycle"));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::try_parse_from(vec!["stateflow", "render"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
        match cli.command {
            Commands::Render { style, comment, .. } => {
                assert_eq!(style, StyleChoice::Ascii);
                assert!(!comment);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_inspect_command() {
        let cli = Cli::try_parse_from(vec!["stateflow", "inspect", "-i", "-", "--json"]).unwrap();
        match cli.command {
            Commands::Inspect { input, json } => {
                assert_eq!(input.unwrap().to_string_lossy(), "-");
                assert!(json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_style() {
        assert!(Cli::try_parse_from(vec!["stateflow", "render", "--style", "braille"]).is_err());
    }

    #[test]
    fn test_render_text() {
        let app = StateFlowApp::new();
        let output = app
            .render_text("@StateFlow\n@Flow: A => [ B ]", CharacterSet::Ascii, false, None)
            .unwrap();
        assert_eq!(output, "A --> B");
    }

    #[test]
    fn test_render_text_comment_title() {
        let app = StateFlowApp::new();
        let output = app
            .render_text(DOC, CharacterSet::Ascii, true, Some("Publishing"))
            .unwrap();
        assert!(output.starts_with("// Publishing:\n// ```"));
        assert!(output.contains("// Draft --> Reviewing (via)"));
    }

    #[test]
    fn test_validate_text() {
        let app = StateFlowApp::new();
        assert_eq!(
            app.validate_text(DOC).unwrap(),
            "✓ Valid state flow 'Doc' (3 phases, 1 transitions)"
        );

        let err = app
            .validate_text("@StateFlow\n@Flow: A => [ B ]\n@Flow: C => [ D ]")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StateFlowError>(),
            Some(StateFlowError::DisconnectedSubgraph { .. })
        ));
    }

    #[test]
    fn test_inspect_text() {
        let app = StateFlowApp::new();
        let output = app.inspect_text(DOC, false).unwrap();
        assert_eq!(
            output,
            [
                "State flow 'Doc'",
                "  init: Draft",
                "  phases:",
                "    Draft",
                "    Published",
                "    Reviewing [via]",
                "  transitions:",
                "    Draft -> Published ! via Reviewing else Draft",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_inspect_json() {
        let app = StateFlowApp::new();
        let output = app.inspect_text(DOC, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "Doc");
        assert_eq!(value["init_stage"], "Draft");
        assert_eq!(value["phases"][2]["via_only"], true);
        assert_eq!(value["transitions"][0]["approval"], "required");
        assert_eq!(value["transitions"][0]["fallback"], "Draft");
    }

    #[test]
    fn test_read_input_from_file() {
        let app = StateFlowApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flow.txt");
        fs::write(&file_path, DOC).unwrap();

        assert_eq!(app.read_input(Some(file_path)).unwrap(), DOC);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = StateFlowApp::new();
        let dir = tempdir().unwrap();
        let err = app.read_input(Some(dir.path().join("missing.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = StateFlowApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flow.out");

        app.write_output(Some(file_path.clone()), "A --> B").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "A --> B");
    }

    #[test]
    fn test_render_command_writes_file() {
        let app = StateFlowApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("flow.txt");
        let output = dir.path().join("flow.out");
        fs::write(&input, "@StateFlow\n@Flow: A => [ B, C ]").unwrap();

        app.render_command(Some(input), Some(output.clone()), StyleChoice::Ascii, false, None, false)
            .unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "     +--> B\nA -->+\n     +--> C"
        );
    }
}
