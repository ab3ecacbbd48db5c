mod artwork;
mod curate;
mod database;
mod error;
mod ingest;
mod utils;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

use crate::curate::{coverage, manifest, quality};
use crate::database::{export, ArtworkStore, CandidateQuery};
use crate::utils::config::{self, Config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a directory of artwork JSON documents into the database
    Ingest {
        input_dir: PathBuf,

        #[arg(short, long = "db")]
        db_path: Option<PathBuf>,
    },

    /// Select acceptable artworks from the database into a collection manifest
    Screen {
        #[arg(short, long = "db")]
        db_path: Option<PathBuf>,

        #[arg(long = "department")]
        departments: Vec<String>,

        #[arg(long)]
        from: Option<i64>,

        #[arg(long)]
        to: Option<i64>,

        /// Cap on candidates read from the database
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        collection_id: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(short, long)]
        out: PathBuf,
    },

    /// Resolve manifests against the database and write the collection files
    Enrich {
        #[arg(short, long = "db")]
        db_path: Option<PathBuf>,

        #[arg(short, long)]
        out_dir: PathBuf,

        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },

    /// Write every stored artwork to a flat CSV file
    ExportCsv {
        #[arg(short, long = "db")]
        db_path: Option<PathBuf>,

        #[arg(short, long, default_value = "artworks.csv")]
        out: PathBuf,
    },

    /// Report how many collection artworks have descriptions
    Coverage { collections_dir: PathBuf },

    /// Check local images against the size and aspect-ratio rules
    VetImages { image_dir: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config = config::load_or_default(&args.config)?;

    match args.command {
        Command::Ingest { input_dir, db_path } => run_ingest(&config, &input_dir, db_path),
        Command::Screen {
            db_path,
            departments,
            from,
            to,
            limit,
            collection_id,
            title,
            description,
            out,
        } => {
            let store = open_store(&config, db_path)?;
            let filter = config.filter.with_departments(&departments);
            let query = CandidateQuery {
                departments: filter.preferred_departments.clone(),
                date_from: from,
                date_to: to,
                public_domain_only: filter.require_public_domain,
                require_image: true,
                limit,
            };
            let date_range = match (from, to) {
                (Some(f), Some(t)) => format!("{}-{}", f, t),
                (Some(f), None) => format!("{}-", f),
                (None, Some(t)) => format!("-{}", t),
                (None, None) => String::new(),
            };
            let meta = manifest::ManifestMeta {
                collection_id,
                title,
                description,
                date_range,
            };
            let built = manifest::build_manifest(&store, &query, &filter, meta)?;
            manifest::save_manifest(&out, &built)?;
            info!("Wrote {} artwork ids to {:?}", built.artwork_ids.len(), out);
            Ok(())
        }
        Command::Enrich {
            db_path,
            out_dir,
            manifests,
        } => run_enrich(&config, db_path, &out_dir, &manifests),
        Command::ExportCsv { db_path, out } => run_export(&config, db_path, &out),
        Command::Coverage { collections_dir } => run_coverage(&collections_dir),
        Command::VetImages { image_dir } => {
            let results = quality::vet_directory(&image_dir, &config.filter)?;
            let accepted = results.iter().filter(|(_, v)| v.accepted).count();
            for (path, verdict) in &results {
                let mark = if verdict.accepted { "ok  " } else { "skip" };
                println!("{} {} ({})", mark, path.display(), verdict.reason);
            }
            println!("{}/{} images suitable", accepted, results.len());
            Ok(())
        }
    }
}

fn open_store(config: &Config, db_path: Option<PathBuf>) -> Result<ArtworkStore> {
    let path = db_path.unwrap_or_else(|| config.database.path.clone());
    info!("DB: {:?}", path);
    ArtworkStore::open(&path, config.ingest.commit_interval)
}

fn run_ingest(config: &Config, input_dir: &Path, db_path: Option<PathBuf>) -> Result<()> {
    info!("Input: {:?}", input_dir);
    let mut store = open_store(config, db_path)?;

    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} documents ({eta})") {
        progress.set_style(style);
    }

    let report = ingest::ingest_directory(input_dir, &mut store, &config.ingest, &progress)?;

    info!("Analyzing database for query optimization...");
    store.analyze()?;
    let total = store.count()?;

    println!("{}", serde_json::to_string(&report)?);
    info!("Database build complete: {} artworks stored", total);
    log_summary(&store)
}

fn run_export(config: &Config, db_path: Option<PathBuf>, out: &Path) -> Result<()> {
    let store = open_store(config, db_path)?;
    let file = File::create(out).with_context(|| format!("Failed to create {:?}", out))?;
    let written = export::export_csv(&store, BufWriter::new(file))?;
    info!("CSV saved: {} artworks -> {:?}", written, out);
    log_summary(&store)
}

fn log_summary(store: &ArtworkStore) -> Result<()> {
    let summary = store.summary()?;
    info!("Total artworks: {}", summary.total);
    info!("Public domain: {}", summary.public_domain);
    info!("European paintings: {}", summary.european_paintings);
    info!(
        "Public domain European paintings: {}",
        summary.public_domain_european_paintings
    );
    info!("Public domain oil on canvas: {}", summary.public_domain_oil_on_canvas);
    Ok(())
}

fn run_enrich(
    config: &Config,
    db_path: Option<PathBuf>,
    out_dir: &Path,
    manifests: &[PathBuf],
) -> Result<()> {
    let store = open_store(config, db_path)?;

    let mut built = Vec::new();
    for path in manifests {
        let result = manifest::load_manifest(path)
            .and_then(|m| manifest::enrich(&m, &store, &config.collections));
        match result {
            Ok(collection) => {
                let written = manifest::write_collection(out_dir, &collection)?;
                info!("Collection complete: {} artworks -> {:?}", collection.artwork_count, written);
                if !collection.failed.is_empty() {
                    warn!("{} ids unresolved: {:?}", collection.failed.len(), collection.failed);
                }
                built.push(collection);
            }
            Err(e) => error!("Failed to build {:?}: {:#}", path, e),
        }
    }

    let today = chrono::Local::now().date_naive();
    let index = manifest::build_index(&built, today, &config.collections);
    let index_path = manifest::write_index(out_dir, &index)?;
    info!(
        "Master index created: {} artworks across {} collections ({:?})",
        index.total_artworks, index.total_collections, index_path
    );
    Ok(())
}

fn run_coverage(collections_dir: &Path) -> Result<()> {
    let collections = coverage::load_collections(collections_dir)?;
    if collections.is_empty() {
        bail!("No collection files found in {:?}", collections_dir);
    }

    let report = coverage::description_coverage(&collections);
    for c in &report.collections {
        println!(
            "{}: total {} | with descriptions {} | empty {} | coverage {:.1}%",
            c.name,
            c.total,
            c.with_description,
            c.missing(),
            c.percent()
        );
        match c.missing_titles.len() {
            0 => {}
            n if n <= 5 => println!("   missing: {}", c.missing_titles.join(", ")),
            n => println!(
                "   missing: {} ... and {} more",
                c.missing_titles[..3].join(", "),
                n - 3
            ),
        }
    }
    println!(
        "overall: {} artworks, {} with descriptions, {:.1}% coverage",
        report.total(),
        report.with_description(),
        report.percent()
    );

    if !report.is_complete() {
        for c in report.worst().iter().take(3) {
            println!("   {}: {:.1}% ({} missing)", c.name, c.percent(), c.missing());
        }
        bail!("{} artworks still need descriptions", report.missing());
    }
    Ok(())
}
