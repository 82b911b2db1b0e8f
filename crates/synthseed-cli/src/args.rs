use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "synthseed",
    about = "Generate statistically realistic, referentially valid demo datasets from a schema document",
    version,
    after_help = "Examples:\n  synthseed validate schemas/lending.json\n  synthseed generate schemas/lending.json --seed 42 --output seed.json\n  synthseed generate schemas/retail.json --table-rows orders=5000 --format csv\n  synthseed generate schemas/lending.json --from-lock\n  synthseed preview schemas/healthcare.json --rows 5\n  synthseed graph schemas/lending.json --format dot"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a schema document without generating data
    Validate(ValidateArgs),

    /// Generate a dataset from a schema document
    Generate(GenerateArgs),

    /// Preview a few generated rows per table
    Preview(PreviewArgs),

    /// Visualize the table dependency graph
    Graph(GraphArgs),
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the schema document (JSON)
    pub schema: PathBuf,

    /// Print a machine-readable JSON report instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Path to the schema document (JSON)
    pub schema: PathBuf,

    /// Output file path (.json, .csv); stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from file extension if not specified)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Random seed for deterministic generation
    #[arg(long, env = "SYNTHSEED_SEED")]
    pub seed: Option<u64>,

    /// Per-table row count overrides (e.g., borrowers=500,loans=2000)
    #[arg(long, value_delimiter = ',')]
    pub table_rows: Vec<String>,

    /// Worker threads per table (output is identical for any value)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Regenerate from the lock file
    #[arg(long)]
    pub from_lock: bool,

    /// Force regeneration even if the schema has changed
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Path to the schema document (JSON)
    pub schema: PathBuf,

    /// Number of sample rows to preview per table
    #[arg(long, default_value = "5")]
    pub rows: usize,

    /// Random seed for the preview
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Path to the schema document (JSON)
    pub schema: PathBuf,

    /// Output format for the dependency graph
    #[arg(long, default_value = "mermaid")]
    pub format: GraphFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GraphFormat {
    Mermaid,
    Dot,
}

impl From<OutputFormat> for synthseed_core::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => Self::Json,
            OutputFormat::Csv => Self::Csv,
        }
    }
}

impl GenerateArgs {
    /// Determine output format from the explicit flag, then the file
    /// extension, defaulting to JSON.
    pub fn output_format(&self) -> synthseed_core::output::OutputFormat {
        if let Some(fmt) = self.format {
            return fmt.into();
        }
        self.output
            .as_deref()
            .and_then(synthseed_core::output::OutputFormat::from_path)
            .unwrap_or_default()
    }

    /// Parse table row overrides like "borrowers=500,loans=2000".
    pub fn parse_table_rows(&self) -> anyhow::Result<BTreeMap<String, usize>> {
        let mut map = BTreeMap::new();
        for entry in &self.table_rows {
            let (table, count) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid --table-rows entry '{}': expected table=count", entry))?;
            let count: usize = count
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid row count '{}' for table '{}'", count, table))?;
            map.insert(table.trim().to_string(), count);
        }
        Ok(map)
    }
}
