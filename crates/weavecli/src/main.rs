// crates/weavecli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use weavecore::{NodeSpec, Workflow, Workspace};
use weaveruntime::{FlowRuntime, NodeRegistry, RuntimeConfig};

#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "Node graph workflow runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file once
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Workspace root (defaults to $WEAVE_WORKSPACE, then ./WORKSPACE)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check that a workflow file parses and can be ordered
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            workspace,
            verbose,
        } => {
            init_logging(if verbose { "debug" } else { "info" });
            run_workflow(&file, workspace).await?;
        }

        Commands::Validate { file } => {
            init_logging("warn");
            validate_workflow(&file)?;
        }

        Commands::Nodes => {
            init_logging("warn");
            list_nodes()?;
        }

        Commands::Init { output } => {
            create_example_workflow(&output)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the command's default level
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid workflow in {}", file.display()))
}

fn build_runtime(config: &RuntimeConfig) -> Result<FlowRuntime> {
    let workspace = config.open_workspace().with_context(|| {
        format!(
            "Failed to open workspace {}",
            config.workspace_root.display()
        )
    })?;
    Ok(FlowRuntime::with_registry(
        Arc::new(standard_registry(&workspace)),
        workspace,
    ))
}

fn standard_registry(workspace: &Workspace) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    weavenodes::register_all(&mut registry, workspace);
    registry
}

/// Registry for commands that never touch files; the workspace is not created.
fn listing_registry(config: &RuntimeConfig) -> Result<NodeRegistry> {
    let workspace = Workspace::at(&config.workspace_root).with_context(|| {
        format!(
            "Invalid workspace root {}",
            config.workspace_root.display()
        )
    })?;
    Ok(standard_registry(&workspace))
}

async fn run_workflow(file: &Path, workspace: Option<PathBuf>) -> Result<()> {
    eprintln!("🚀 Loading workflow from: {}", file.display());
    let workflow = load_workflow(file)?;
    eprintln!("   Nodes: {}", workflow.nodes.len());
    eprintln!("   Links: {}", workflow.links.len());

    let mut config = RuntimeConfig::from_env();
    if let Some(root) = workspace {
        config = config.with_workspace_root(root);
    }
    let runtime = build_runtime(&config)?;

    match runtime.run(&workflow).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!("✨ Workflow completed ({} log entries)", report.logs.len());
            Ok(())
        }
        Err(failure) => {
            eprintln!("💥 Workflow failed after {} log entries", failure.logs.len());
            for entry in &failure.logs {
                eprintln!(
                    "   [{}] {} ({}) {:?}{}",
                    entry.step,
                    entry.node,
                    entry.node_type,
                    entry.status,
                    entry
                        .error
                        .as_deref()
                        .map(|e| format!(": {}", e))
                        .unwrap_or_default()
                );
            }
            Err(failure.into())
        }
    }
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    let registry = listing_registry(&RuntimeConfig::from_env())?;
    let order = weaveruntime::schedule(&workflow)?;

    // Unknown types only fail at run time, so they are reported, not rejected
    println!("✅ Execution order:");
    for (i, node) in order.iter().enumerate() {
        let marker = if registry.contains(&node.node_type) {
            ""
        } else {
            "  ⚠️ no handler registered"
        };
        println!("   {}. {} ({}){}", i + 1, node.id, node.node_type, marker);
    }

    Ok(())
}

fn list_nodes() -> Result<()> {
    println!("📦 Available Node Types:");
    println!();

    let registry = listing_registry(&RuntimeConfig::from_env())?;

    for node_type in registry.list_node_types() {
        if let Some(metadata) = registry.get_metadata(&node_type) {
            println!("  • {} ({})", node_type, metadata.category);
            println!("    {}", metadata.description);
            for port in &metadata.inputs {
                let required = if port.required { ", required" } else { "" };
                println!("    in  {}{}: {}", port.name, required, port.description);
            }
            for port in &metadata.outputs {
                println!("    out {}: {}", port.name, port.description);
            }
        } else {
            println!("  • {}", node_type);
        }
    }

    Ok(())
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let mut workflow = Workflow::new();

    let text_id = workflow.add_node(
        NodeSpec::new("text_1", "Text")
            .with_config("text", "Hello world")
            .with_position(60.0, 60.0),
    );
    let write_id = workflow.add_node(
        NodeSpec::new("write_1", "WriteFile")
            .with_config("path", "notes/out.txt")
            .with_config("overwrite", true)
            .with_position(420.0, 60.0),
    );

    workflow.connect(text_id, "text", write_id, "text");

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  weave run --file {}", output.display());

    Ok(())
}
