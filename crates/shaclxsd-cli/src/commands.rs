//! CLI command definitions and handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shaclxsd_core::vocab::sh;
use shaclxsd_core::{parse_turtle, GraphStore, ShapeGraph};
use shaclxsd_lower::{convert_with_summary, shape_name, ConversionConfig, PropertyShapeView};
use thiserror::Error;
use tracing::info;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "shaclxsd")]
#[command(about = "Convert SHACL shapes graphs into XML Schema")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a Turtle shapes file into an XSD document
    Convert {
        /// Input Turtle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file, defaults to the input path with `.xsd` appended
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON conversion config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the schema target namespace
        #[arg(long)]
        target_namespace: Option<String>,
    },

    /// List the shapes found in a Turtle file
    Shapes {
        /// Input Turtle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show system information
    Info,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("input file {} does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("output path {} is the input file", .0.display())]
    OutputIsInput(PathBuf),
}

/// Command execution result
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// One line of `shapes` output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeEntry {
    pub kind: &'static str,
    pub name: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Execute CLI commands
pub struct CommandExecutor {
    config: ConversionConfig,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::with_config(ConversionConfig::default())
    }

    /// Executor whose conversions start from `config`
    pub fn with_config(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Execute a CLI command
    pub fn execute(&mut self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Convert {
                input,
                output,
                config,
                target_namespace,
            } => self.execute_convert(input, output, config, target_namespace),
            Commands::Shapes { input, format } => self.execute_shapes(input, format),
            Commands::Info => self.execute_info(),
        }
    }

    fn execute_convert(
        &self,
        input: PathBuf,
        output: Option<PathBuf>,
        config: Option<PathBuf>,
        target_namespace: Option<String>,
    ) -> Result<CommandResult> {
        let mut conversion = match config {
            Some(path) => ConversionConfig::from_file(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => self.config.clone(),
        };
        if let Some(namespace) = target_namespace {
            conversion = conversion.with_target_namespace(namespace);
        }

        let output = output.unwrap_or_else(|| default_output_path(&input));
        if output == input {
            return Err(CliError::OutputIsInput(output).into());
        }

        let store = load_shapes(&input)?;
        if !has_shapes(&store) {
            return Ok(CommandResult {
                success: false,
                message: format!("no SHACL shapes found in {}", input.display()),
                data: None,
            });
        }
        let (document, summary) = convert_with_summary(&store, &conversion);
        let xml = shaclxsd_xsd::render(&document)
            .with_context(|| format!("failed to render schema for {}", input.display()))?;
        std::fs::write(&output, &xml)
            .with_context(|| format!("failed to write {}", output.display()))?;

        info!(input = %input.display(), output = %output.display(), "schema written");
        println!("XSD written to {}", output.display());

        Ok(CommandResult {
            success: true,
            message: format!("Converted {} to {}", input.display(), output.display()),
            data: Some(serde_json::json!({
                "output": output.display().to_string(),
                "summary": summary,
            })),
        })
    }

    fn execute_shapes(&self, input: PathBuf, format: OutputFormat) -> Result<CommandResult> {
        let store = load_shapes(&input)?;
        let entries = list_shapes(&store, &self.config);

        let result = match format {
            OutputFormat::Text => {
                let mut output = format!("Found {} shapes:\n", entries.len());
                for entry in &entries {
                    output.push_str(&format!("  {:<8} {:<24} {}", entry.kind, entry.name, entry.id));
                    if let Some(detail) = &entry.detail {
                        output.push_str(&format!(" ({})", detail));
                    }
                    output.push('\n');
                }
                output
            }
            OutputFormat::Json => serde_json::to_string(&entries)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&entries)?,
        };

        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: format!("Found {} shapes", entries.len()),
            data: Some(serde_json::json!({ "shapes": entries })),
        })
    }

    fn execute_info(&self) -> Result<CommandResult> {
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "repository": env!("CARGO_PKG_REPOSITORY"),
            "input_formats": ["turtle"],
            "output_formats": ["xsd"],
            "config": self.config,
        });

        let result = serde_json::to_string_pretty(&info)?;
        println!("{}", result);

        Ok(CommandResult {
            success: true,
            message: "System information".to_string(),
            data: Some(info),
        })
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// `<input>.xsd`
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(".xsd");
    PathBuf::from(path)
}

fn load_shapes(input: &Path) -> Result<GraphStore> {
    if !input.exists() {
        return Err(CliError::MissingInput(input.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let store =
        parse_turtle(&content).with_context(|| format!("failed to parse {}", input.display()))?;
    info!(triples = store.len(), input = %input.display(), "shapes graph loaded");
    Ok(store)
}

fn has_shapes(store: &GraphStore) -> bool {
    !store.subjects_of_type(sh::NODE_SHAPE).is_empty()
        || !store.subjects_of_type(sh::PROPERTY_SHAPE).is_empty()
}

/// Node shapes, then property shapes, in graph order
pub fn list_shapes(store: &GraphStore, config: &ConversionConfig) -> Vec<ShapeEntry> {
    let nodes = store.subjects_of_type(sh::NODE_SHAPE).into_iter().map(|id| {
        let base = store.value_of(id, sh::NODE).map(|base| shape_name(store, base));
        ShapeEntry {
            kind: "node",
            name: shape_name(store, id),
            id: id.to_string(),
            detail: base.map(|base| format!("extends {}", base)),
        }
    });

    let properties = store.subjects_of_type(sh::PROPERTY_SHAPE).into_iter().map(|id| {
        let view = PropertyShapeView::read(store, id, &config.attribute_marker);
        let detail = match (&view.path, view.is_attribute) {
            (None, _) => "no path".to_string(),
            (Some(_), true) => "attribute".to_string(),
            (Some(_), false) => "element".to_string(),
        };
        ShapeEntry {
            kind: "property",
            name: view.name,
            id: id.to_string(),
            detail: Some(detail),
        }
    });

    nodes.chain(properties).collect()
}
