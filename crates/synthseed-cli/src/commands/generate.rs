use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use synthseed_core::config::{self, SynthSeedConfig};
use synthseed_core::generate::{execute_plan, GenerateOptions, GenerationPlan, GeneratorRegistry};
use synthseed_core::lock::{self, types::LockFile};
use synthseed_core::output;

use crate::args::GenerateArgs;

pub async fn run(args: &GenerateArgs) -> Result<()> {
    // Load optional synthseed.toml config
    let config = config::read_config(Path::new("."))?;

    // Phase 1: Validate
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [{prefix}] {msg}")?);
    pb.set_prefix("1/3");
    pb.set_message("Validating schema...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let (raw, schema) = super::load_validated(&args.schema)?;
    if let Some(ref cfg) = config {
        for warning in cfg.validate_against_schema(&schema) {
            tracing::warn!("{}", warning);
        }
    }

    pb.finish_with_message(format!(
        "Validating schema... ✓ {} tables, {} foreign keys",
        schema.table_count(),
        schema.foreign_key_count()
    ));

    let schema_hash = lock::compute_schema_hash(&raw)?;
    let lock_path = Path::new(lock::LOCK_FILE_NAME);
    let options = resolve_options(args, config.as_ref(), &schema_hash, lock_path)?;
    tracing::debug!("Generating with seed {} and {} workers", options.seed, options.workers);

    let registry = GeneratorRegistry::with_builtins();
    let plan = GenerationPlan::build(&schema, &registry, &options)?;

    // Phase 2: Generate data
    let total_rows = plan.total_rows();
    let pb2 = ProgressBar::new(total_rows as u64);
    pb2.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.cyan} [2/3] Generating {msg}... {bar:40.cyan/dim} {pos}/{len} ({eta})",
            )?
            .progress_chars("█▓░"),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let data = {
        let cancel = cancel.clone();
        let pb2 = pb2.clone();
        tokio::task::spawn_blocking(move || {
            execute_plan(
                &plan,
                &cancel,
                Some(&|table: &str, current: usize, _total: usize| {
                    pb2.set_message(table.to_string());
                    pb2.set_position(current as u64);
                }),
            )
        })
        .await
        .context("Generation task failed")?
    };
    ctrl_c.abort();

    let data = match data {
        Ok(data) => data,
        Err(err) => {
            pb2.abandon();
            return Err(err.into());
        }
    };

    pb2.finish_with_message(format!("data ({} rows)", total_rows));

    // Phase 3: Output
    let pb3 = ProgressBar::new_spinner();
    pb3.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} [3/3] {msg}")?);
    let format = args.output_format();

    match &args.output {
        Some(path) => {
            pb3.set_message(format!("Writing to {}...", path.display()));
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_dataset(&mut writer, &data, format)?;
            writer.flush().context("Failed to flush output file")?;

            pb3.finish_with_message(format!("Writing to {}... ✓", path.display()));
            eprintln!(
                "\n✓ Generated {} rows across {} tables → {}",
                data.total_rows(),
                data.tables.len(),
                path.display()
            );
        }
        None => {
            pb3.set_message("Writing to stdout...");
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            output::write_dataset(&mut writer, &data, format)?;
            writer.flush().context("Failed to flush stdout")?;
            pb3.finish_with_message("Writing to stdout... ✓");
        }
    }

    // Write lock file (always, so teammates can reproduce)
    let lock_file = LockFile::new(schema_hash, &options);
    lock::write_lock_file(&lock_file, lock_path)?;
    eprintln!("Lock file written to {} (seed {})", lock::LOCK_FILE_NAME, options.seed);

    Ok(())
}

/// Work out the run options.
///
/// With `--from-lock`, everything that shapes the output comes from the lock
/// file. Otherwise synthseed.toml is the base and CLI flags win over it.
fn resolve_options(
    args: &GenerateArgs,
    config: Option<&SynthSeedConfig>,
    schema_hash: &str,
    lock_path: &Path,
) -> Result<GenerateOptions> {
    let workers = args
        .workers
        .or_else(|| config.and_then(|c| c.generate.workers))
        .unwrap_or(1);
    if workers == 0 {
        bail!("--workers must be at least 1");
    }

    if args.from_lock {
        if !lock_path.exists() {
            bail!(
                "No {} found in current directory. Run `synthseed generate` first to create one.",
                lock::LOCK_FILE_NAME
            );
        }
        let lock_file = lock::read_lock_file(lock_path)?;
        lock::check_schema_hash(&lock_file, schema_hash, args.force)?;
        if args.seed.is_some() || !args.table_rows.is_empty() {
            tracing::warn!(
                "--seed and --table-rows are ignored with --from-lock; using the values in {}",
                lock::LOCK_FILE_NAME
            );
        }
        return Ok(lock_file.to_generate_options(workers)?);
    }

    let mut options = match config {
        Some(cfg) => cfg.to_generate_options()?,
        None => GenerateOptions::default(),
    };

    options.seed = args
        .seed
        .or_else(|| config.and_then(|c| c.generate.seed))
        .unwrap_or_else(random_seed);

    // CLI flags override config file
    options.overrides.extend(args.parse_table_rows()?);
    options.workers = workers;

    Ok(options)
}

/// Seed for runs that did not ask for one. It is recorded in the lock file,
/// so the run stays reproducible.
fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
