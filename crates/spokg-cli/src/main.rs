//! SPOKG CLI - Command-line interface
//!
//! Usage:
//!   spokg extract <path> [--dot graph.dot] [--json graph.json] [--triples-json triples.json]
//!   spokg segment <path>
//!   spokg graph <triples.json> [--dot graph.dot] [--json graph.json]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use spokg_core::{
    AppConfig, ExtractionPolicy, LoggingConfig, ParseFailurePolicy, SegmentationMode, Triple,
};
use spokg_extractor::{ConlluParser, DependencyParser, HttpParser, Pipeline, TextPreparer};
use spokg_graph::KnowledgeGraph;

#[derive(Parser)]
#[command(name = "spokg")]
#[command(about = "Subject-predicate-object extraction and knowledge graph CLI")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalOptions {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve parses from a CoNLL-U file instead of the HTTP parser
    #[arg(long, global = true)]
    conllu: Option<PathBuf>,

    /// Base URL of the HTTP parse service
    #[arg(long, global = true)]
    parser_url: Option<String>,

    /// Segmentation mode (parser | regex-compound)
    #[arg(long, global = true)]
    mode: Option<SegmentationMode>,

    /// Extraction policy (root-anchored | subject-anchored)
    #[arg(long, global = true)]
    policy: Option<ExtractionPolicy>,

    /// Parse failure policy (skip | abort)
    #[arg(long, global = true)]
    on_parse_failure: Option<ParseFailurePolicy>,

    /// Drop triples whose subject or object is a personal pronoun
    #[arg(long, global = true, overrides_with = "no_exclude_pronouns")]
    exclude_pronouns: bool,

    /// Keep pronoun triples even when the config or environment excludes them
    #[arg(long, global = true, overrides_with = "exclude_pronouns")]
    no_exclude_pronouns: bool,

    /// Minimum words per sentence in parser segmentation mode
    #[arg(long, global = true)]
    min_words: Option<usize>,

    /// Ignore text before this marker (e.g. "STAVE I")
    #[arg(long, global = true)]
    start_marker: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract triples from a text file and build the knowledge graph
    Extract {
        /// Path to the text file
        path: PathBuf,

        /// Number of sample triples to print
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        output: GraphOutput,

        /// Write the extracted triple sequence as JSON
        #[arg(long)]
        triples_json: Option<PathBuf>,
    },
    /// Print the sentences the configured segmenter produces
    Segment {
        /// Path to the text file
        path: PathBuf,
    },
    /// Build a graph from a saved triple sequence
    Graph {
        /// Triple JSON written by `extract --triples-json`
        triples: PathBuf,

        #[command(flatten)]
        output: GraphOutput,
    },
}

#[derive(Args)]
struct GraphOutput {
    /// Write the graph as Graphviz DOT
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Write the graph as JSON node/edge lists
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.options)?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            path,
            limit,
            output,
            triples_json,
        } => {
            let text = read_document(&path, &cli.options)?;
            let parser = build_parser(&cli.options, &config)?;
            let pipeline = Pipeline::from_config(&config.extraction, parser)?;
            let report = pipeline.run(&text)?;

            println!("Sentences processed: {}", report.sentences_processed);
            println!("Sentences skipped:   {}", report.sentences_skipped);
            println!("Without triples:     {}", report.sentences_without_triples);
            println!("Triples extracted:   {}", report.triple_count());
            if !report.is_empty() {
                println!();
                println!("First {} triples:", limit.min(report.triple_count()));
                for triple in report.triples.iter().take(limit) {
                    println!("  {triple}");
                }
            }

            if let Some(file) = triples_json {
                let json = serde_json::to_string_pretty(&report.triples)?;
                write_file(&file, &json)?;
            }

            let kg = KnowledgeGraph::from_triples(&report.triples);
            println!();
            println!("Graph: {} nodes, {} edges", kg.node_count(), kg.edge_count());
            write_graph(&kg, &output)?;
        }
        Commands::Segment { path } => {
            let text = read_document(&path, &cli.options)?;
            let parser = build_parser(&cli.options, &config)?;
            let pipeline = Pipeline::from_config(&config.extraction, parser)?;
            for (i, sentence) in pipeline.segment(&text)?.enumerate() {
                println!("{:>4}  {}", i + 1, sentence);
            }
        }
        Commands::Graph {
            triples: path,
            output,
        } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let triples: Vec<Triple> = serde_json::from_str(&content)
                .with_context(|| format!("invalid triple JSON in {}", path.display()))?;

            let kg = KnowledgeGraph::from_triples(&triples);
            println!("Graph: {} nodes, {} edges", kg.node_count(), kg.edge_count());
            write_graph(&kg, &output)?;
        }
    }

    Ok(())
}

/// File or defaults, then environment, then command-line flags
fn load_config(options: &GlobalOptions) -> anyhow::Result<AppConfig> {
    let base = match &options.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    let mut config = base.with_env_override()?;

    let extraction = &mut config.extraction;
    if let Some(mode) = options.mode {
        extraction.segmentation_mode = mode;
    }
    if let Some(policy) = options.policy {
        extraction.extraction_policy = policy;
    }
    if let Some(policy) = options.on_parse_failure {
        extraction.on_parse_failure = policy;
    }
    if let Some(min_words) = options.min_words {
        extraction.min_sentence_words = min_words;
    }
    if options.exclude_pronouns {
        extraction.exclude_pronouns = true;
    } else if options.no_exclude_pronouns {
        extraction.exclude_pronouns = false;
    }
    if let Some(url) = &options.parser_url {
        config.parser.base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_parser(
    options: &GlobalOptions,
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn DependencyParser>> {
    match &options.conllu {
        Some(path) => {
            let parser = ConlluParser::from_file(path)?;
            tracing::info!(
                sentences = parser.len(),
                path = %path.display(),
                "Using CoNLL-U parses"
            );
            Ok(Arc::new(parser))
        }
        None => {
            let parser = HttpParser::new(&config.parser)?;
            tracing::info!(endpoint = parser.endpoint(), "Using HTTP parser");
            Ok(Arc::new(parser))
        }
    }
}

fn read_document(path: &Path, options: &GlobalOptions) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut preparer = TextPreparer::new();
    if let Some(marker) = &options.start_marker {
        preparer = preparer.with_start_marker(marker.as_str());
    }
    Ok(preparer.prepare(&raw))
}

fn write_graph(kg: &KnowledgeGraph, output: &GraphOutput) -> anyhow::Result<()> {
    if let Some(file) = &output.dot {
        write_file(file, &kg.to_dot())?;
    }
    if let Some(file) = &output.json {
        write_file(file, &kg.to_json()?)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
