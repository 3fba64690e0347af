use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use completion_tree::{
    render_to_string, render_tree, CompletionBatch, Config, NoDecoder, RenderOptions,
    TokenDecoder, TreeSummary, VocabDecoder,
};

/// completion-tree - shared-prefix trees of sampled model completions
#[derive(Parser)]
#[command(name = "completion-tree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: completion-tree.toml in this or a parent directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the completion tree of a batch as an outline
    Show {
        /// Batch JSON: {"completions": [[...], ...], "scores": [...]}
        #[arg(value_name = "BATCH")]
        batch: PathBuf,

        /// Vocabulary JSON mapping token ids to text
        #[arg(long, value_name = "FILE")]
        vocab: Option<PathBuf>,

        /// Truncate token labels to this many characters
        #[arg(long)]
        max_label_len: Option<usize>,

        /// Print repeated subtrees in full
        #[arg(long)]
        no_collapse: bool,

        /// Write the outline to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Summarize a batch file, or every *.json batch under a directory
    Summary {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover()?,
        };

        match self.command {
            Commands::Show {
                batch,
                vocab,
                max_label_len,
                no_collapse,
                output,
            } => {
                let mut options = RenderOptions::from(&config);
                if let Some(len) = max_label_len {
                    options.max_label_len = len;
                }
                if no_collapse {
                    options.collapse_repeated = false;
                }
                let vocab = vocab.or(config.vocab);
                show(&batch, vocab.as_deref(), options, output.as_deref())
            }
            Commands::Summary { path, json } => summarize(&path, json),
        }
    }
}

fn show(
    batch_path: &Path,
    vocab: Option<&Path>,
    options: RenderOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = CompletionBatch::load(batch_path)?.build_tree()?;
    info!(
        batch = %batch_path.display(),
        sequences = tree.num_sequences(),
        nodes = tree.node_count(),
        "built completion tree"
    );

    let vocab_decoder = vocab.map(VocabDecoder::load).transpose()?;
    let decoder: &dyn TokenDecoder = match &vocab_decoder {
        Some(v) => v,
        None => &NoDecoder,
    };

    match output {
        Some(path) => {
            render_tree(&tree, decoder, options, path)?;
            println!("Wrote tree to: {:?}", path);
        }
        None => print!("{}", render_to_string(&tree, decoder, options)),
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRecord {
    path: String,
    #[serde(flatten)]
    summary: TreeSummary,
}

fn summarize(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = collect_summaries(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No batches found in {:?}", path);
        return Ok(());
    }

    for record in &records {
        print!("{}", format_summary(record));
    }
    Ok(())
}

/// Summaries for one batch file, or for every readable `*.json` batch
/// under a directory in file-name order
fn collect_summaries(path: &Path) -> Result<Vec<SummaryRecord>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Path not found: {:?}", path).into());
    }
    if path.is_file() {
        let tree = CompletionBatch::load(path)?.build_tree()?;
        return Ok(vec![SummaryRecord {
            path: path.display().to_string(),
            summary: tree.summary(),
        }]);
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let tree = match CompletionBatch::load(entry.path()).and_then(|b| b.build_tree()) {
            Ok(tree) => tree,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping batch");
                continue;
            }
        };
        records.push(SummaryRecord {
            path: entry.path().display().to_string(),
            summary: tree.summary(),
        });
    }

    Ok(records)
}

fn format_summary(record: &SummaryRecord) -> String {
    let s = &record.summary;
    let score = match s.root_score {
        Some(score) => format!("{:.1}%", score * 100.0),
        None => "-".to_string(),
    };
    format!(
        "{}\n  sequences:  {}\n  nodes:      {}\n  terminals:  {}\n  max depth:  {}\n  distinct:   {}\n  repeated:   {}\n  root score: {}\n",
        record.path,
        s.sequences,
        s.nodes,
        s.terminals,
        s.max_depth,
        s.distinct_subtrees,
        s.repeated_subtrees,
        score
    )
}
