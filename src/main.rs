use anyhow::{Context, Result};
use clap::Parser;
use schemaview::ViewerConfig;
use schemaview::ir::compile;
use schemaview::schema::SchemaMetadata;
use schemaview::serializer::{Grammar, serialize};
use std::fs;
use std::path::PathBuf;

/// Compile relational schema metadata (JSON) into ER diagram text.
#[derive(Parser, Debug)]
#[command(name = "schemaview", version)]
struct Cli {
    /// Schema metadata JSON: an array of tables
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Diagram grammar: mermaid, erd (overrides the config file)
    #[arg(short, long, value_parser = parse_grammar)]
    grammar: Option<Grammar>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_grammar(s: &str) -> Result<Grammar, String> {
    Grammar::from_str(s).ok_or_else(|| format!("invalid grammar '{s}' (expected mermaid or erd)"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let grammar = cli.grammar.unwrap_or(config.diagram.grammar);

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let schema = SchemaMetadata::from_json(&input)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    let ir = compile(&schema);
    log::info!(
        "{}: {} tables, {} relationships",
        cli.input.display(),
        ir.nodes.len(),
        ir.edges.len()
    );
    let text = serialize(&ir, grammar);

    match &cli.output {
        Some(path) => fs::write(path, &text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", text),
    }

    Ok(())
}
