//! apacheconf - inspect and validate Apache httpd configuration
//!
//! This is the main entry point for the apacheconf CLI.

use anyhow::Context;
use apacheconf_parser::{
    enumerate_lines, validate, ConfigFile, Error, Loader, NodeId, Order, OsFileSystem,
    ParseOptions, Tree,
};
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// apacheconf - lossless Apache httpd configuration tool
#[derive(Parser)]
#[command(name = "apacheconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with parse options
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Directory relative Include paths are resolved against
    #[arg(long, global = true)]
    server_root: Option<PathBuf>,

    /// Do not load files named by Include / IncludeOptional
    #[arg(long, global = true)]
    no_includes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a configuration file exactly as parsed
    Print {
        /// Path to the configuration file
        #[arg(default_value = "httpd.conf")]
        config: PathBuf,
    },

    /// Show the directive tree
    Tree {
        #[arg(default_value = "httpd.conf")]
        config: PathBuf,
    },

    /// List directives with their line numbers
    Lines {
        #[arg(default_value = "httpd.conf")]
        config: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a configuration file
    Validate {
        #[arg(default_value = "httpd.conf")]
        config: PathBuf,
    },

    /// Show version information
    Version,
}

/// One row of `apacheconf lines`
#[derive(Debug, Serialize)]
struct LineEntry {
    file: PathBuf,
    line: usize,
    kind: &'static str,
    name: Option<String>,
    arguments: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let options = load_options(&cli)?;

    match &cli.command {
        Commands::Print { config } => {
            let config = open(config, &options)?;
            print!("{}", config);
        }

        Commands::Tree { config } => {
            let config = open(config, &options)?;
            print_tree(config.tree(), config.root());
        }

        Commands::Lines { config, json } => {
            let config = open(config, &options)?;
            let entries = line_entries(&config);
            if *json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!(
                        "{}:{}: {} {}",
                        entry.file.display(),
                        entry.line,
                        entry.name.as_deref().unwrap_or(entry.kind),
                        entry.arguments.join(" ")
                    );
                }
            }
        }

        Commands::Validate { config: path } => {
            tracing::info!("Validating config: {}", path.display());
            let config = open(path, &options)?;

            let mut problems = 0;
            for file in config.files() {
                let file_path = config.tree()[file].path().unwrap_or(path);
                for diagnostic in validate(config.tree(), &[file]) {
                    eprintln!(
                        "❌ {}:{}: {}",
                        file_path.display(),
                        diagnostic.line,
                        diagnostic.message
                    );
                    problems += 1;
                }
            }

            if problems > 0 {
                eprintln!("❌ Configuration '{}' has {} problem(s)", path.display(), problems);
                std::process::exit(1);
            }
            println!("✅ Configuration '{}' is valid!", path.display());
        }

        Commands::Version => {
            println!("apacheconf v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Options file first, then flags on top
fn load_options(cli: &Cli) -> anyhow::Result<ParseOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Invalid options file {}", path.display()))?
        }
        None => ParseOptions::default(),
    };

    if let Some(root) = &cli.server_root {
        options.server_root = Some(root.clone());
    }
    if cli.no_includes {
        options.resolve_includes = false;
    }
    tracing::debug!("Parse options: {:?}", options);
    Ok(options)
}

fn open(path: &Path, options: &ParseOptions) -> anyhow::Result<ConfigFile> {
    let loader = Loader::new(&OsFileSystem, options.clone());
    match ConfigFile::open_with(&loader, path) {
        Ok(config) => Ok(config),
        Err(e) => {
            if let Error::Lex { file, offset, text, .. } = &e {
                report_lex_error(file.as_deref().unwrap_or(path), *offset, text);
            }
            Err(e).with_context(|| format!("Failed to load config {}", path.display()))
        }
    }
}

/// Render a lex error against the file it came from
fn report_lex_error(path: &Path, offset: usize, text: &str) {
    let Ok(source) = std::fs::read_to_string(path) else {
        return;
    };
    let name = path.display().to_string();
    // ariadne counts characters, the parser counts bytes
    let start = source
        .get(..offset)
        .map_or(0, |prefix| prefix.chars().count());
    let span = start..start + text.chars().count().max(1);

    let report = Report::build(ReportKind::Error, (name.as_str(), span.clone()))
        .with_message("Unexpected input")
        .with_label(
            Label::new((name.as_str(), span))
                .with_message(format!("cannot lex {:?}", text))
                .with_color(Color::Red),
        )
        .finish();
    if let Err(e) = report.eprint((name.as_str(), Source::from(source.as_str()))) {
        tracing::debug!("Failed to render error report: {}", e);
    }
}

fn print_tree(tree: &Tree, root: NodeId) {
    tree.walk(&[root], Order::DepthFirst, |id, node| {
        let indent = "  ".repeat(tree.depth(id));
        if let Some(path) = node.path() {
            println!("{}{} {}", indent, node.kind().label(), path.display());
            return;
        }
        if node.type_token().is_none() {
            return;
        }
        match node.name() {
            Some(name) => println!(
                "{}{} {} {}",
                indent,
                node.kind().label(),
                name,
                node.arguments().join(" ")
            ),
            None => println!("{}{}", indent, node.kind().label()),
        }
    });
}

fn line_entries(config: &ConfigFile) -> Vec<LineEntry> {
    let tree = config.tree();
    let mut entries = Vec::new();
    for file in config.files() {
        let path = tree[file].path().map(Path::to_path_buf).unwrap_or_default();
        for (id, line) in enumerate_lines(tree, &[file]) {
            let node = &tree[id];
            entries.push(LineEntry {
                file: path.clone(),
                line,
                kind: node.kind().label(),
                name: node.name().map(str::to_string),
                arguments: node.arguments().into_iter().map(str::to_string).collect(),
            });
        }
    }
    entries
}
