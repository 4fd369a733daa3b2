use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kira_cellcohort::cli::{AnalyzeArgs, Cli, Commands, ExportArgs, LoadArgs};
use kira_cellcohort::ctx::Ctx;
use kira_cellcohort::io::{csv_input, csv_writer, summary};
use kira_cellcohort::pipeline::Pipeline;
use kira_cellcohort::store::{SampleStore, StoreError};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => {
            let store = SampleStore::open_or_init(&args.db)?;
            println!("Store {} initialized", store.path().display());
        }
        Commands::Load(args) => handle_load(args)?,
        Commands::Add(args) => {
            let store = SampleStore::open_or_init(&args.store.db)?;
            let sample = args.to_sample();
            match store.upsert_single(&sample) {
                Ok(report) => {
                    for w in &report.warnings {
                        println!("warning: {}", w);
                    }
                    println!("Sample {} added", sample.sample);
                }
                Err(err) => report_failure("adding sample", err)?,
            }
        }
        Commands::Remove(args) => {
            let store = SampleStore::open(&args.store.db)?;
            match store.delete(&args.sample) {
                Ok(()) => println!("Sample {} removed", args.sample),
                Err(err) => report_failure("removing sample", err)?,
            }
        }
        Commands::Reset(args) => {
            let store = SampleStore::open_or_init(&args.db)?;
            store.reset()?;
            println!("Store {} cleared", store.path().display());
        }
        Commands::Analyze(args) => handle_analyze(args)?,
        Commands::Export(args) => handle_export(args)?,
    }

    Ok(())
}

fn handle_load(args: LoadArgs) -> Result<()> {
    let samples = csv_input::read_samples(&args.csv)?;
    info!(rows = samples.len(), csv = %args.csv.display(), "csv_read");

    let store = SampleStore::open_or_init(&args.store.db)?;
    let result = if args.append {
        store.insert(&samples)
    } else {
        store.replace_all(&samples)
    };
    match result {
        Ok(report) => {
            for w in &report.warnings {
                warn!("{}", w);
            }
            println!(
                "Loaded {} samples into {}",
                report.inserted,
                store.path().display()
            );
            Ok(())
        }
        Err(err) => report_failure("loading data", err),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut ctx = Ctx::new(args.store.db, args.out, env!("CARGO_PKG_VERSION"));
    ctx.preset = args.filter.preset();
    ctx.filter = args.filter.cohort_filter()?;
    ctx.group_by = args.by.into();
    ctx.threads = args.threads;
    ctx.write_json = args.json;
    ctx.write_csv = args.csv;

    Pipeline::analysis().run(&mut ctx)?;

    print!("{}", summary::format_summary(&ctx));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<()> {
    let mut ctx = Ctx::new(args.store.db, std::path::PathBuf::from("."), env!("CARGO_PKG_VERSION"));
    ctx.preset = args.filter.preset();
    ctx.filter = args.filter.cohort_filter()?;

    Pipeline::cohort().run(&mut ctx)?;

    match &args.out {
        Some(path) => {
            csv_writer::write_samples(path, &ctx.cohort)
                .with_context(|| format!("failed to export cohort to {}", path.display()))?;
            eprintln!("Exported {} samples to {}", ctx.cohort.len(), path.display());
        }
        None => csv_writer::write_samples_to(std::io::stdout().lock(), &ctx.cohort)?,
    }
    Ok(())
}

/// Store failures end the command with a message and non-zero exit; the store
/// itself is left as it was.
fn report_failure(action: &str, err: StoreError) -> Result<()> {
    warn!(error = %err, "{} failed", action);
    bail!("error {}: {}", action, err)
}
