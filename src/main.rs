//! Hajri OCR command line tool
//!
//! Extracts attendance records from dashboard screenshots, replays saved
//! OCR output, and manages the course catalog.

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use hajri_ocr::batch::run_batch;
use hajri_ocr::export::{append_entries, export_to_json, init_csv, to_pretty_json};
use hajri_ocr::ocr::OcrDump;
use hajri_ocr::{
    extract_from_lines, paths, AnchorExtractor, CourseCatalog, ExtractionContext,
    ExtractorConfig, TesseractEngine,
};

#[derive(Parser)]
#[command(name = "hajri-ocr", version, about = "Attendance extraction from dashboard screenshots")]
struct Cli {
    /// Extractor config (defaults to hajri.json next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Course catalog (defaults to course_config.json next to the executable)
    #[arg(long, global = true)]
    courses: Option<PathBuf>,

    /// Include intermediate pipeline results in the output
    #[arg(long, global = true)]
    debug: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// OCR screenshots and extract attendance
    Scan(ScanArgs),
    /// Run extraction on a saved OCR dump
    Extract {
        dump: PathBuf,
        /// Override the image width stored in the dump
        #[arg(long)]
        image_width: Option<f32>,
    },
    /// OCR one screenshot and save the raw lines as a dump
    Ocr {
        image: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        tesseract: Option<PathBuf>,
        /// Tesseract language code
        #[arg(long, default_value = "eng")]
        lang: String,
    },
    /// Manage the course catalog
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },
    /// Write the default extractor config
    InitConfig {
        path: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ScanArgs {
    #[arg(required = true)]
    images: Vec<PathBuf>,
    /// Worker threads (defaults to available cores)
    #[arg(long)]
    workers: Option<usize>,
    /// Append entries to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write results to this JSON file instead of stdout
    #[arg(long)]
    json: Option<PathBuf>,
    /// Path to the tesseract executable
    #[arg(long)]
    tesseract: Option<PathBuf>,
    /// Tesseract language code
    #[arg(long, default_value = "eng")]
    lang: String,
}

impl ScanArgs {
    fn engine(&self) -> Result<TesseractEngine> {
        Ok(TesseractEngine::discover(self.tesseract.clone())?.with_language(&self.lang))
    }
}

#[derive(Subcommand)]
enum CoursesAction {
    List,
    Add {
        code: String,
        name: String,
        #[arg(long, default_value = "")]
        abbr: String,
    },
    Remove {
        code: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    // RUST_LOG wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", to_pretty_json(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(paths::get_config_path);
    let catalog_path = cli.courses.clone().unwrap_or_else(paths::get_catalog_path);

    match cli.command {
        Command::Scan(args) => {
            let config = ExtractorConfig::load(&config_path);
            let catalog = CourseCatalog::load(&catalog_path)?;
            scan(&args, config, catalog, cli.debug)
        }
        Command::Extract { dump, image_width } => {
            let config = ExtractorConfig::load(&config_path);
            let catalog = CourseCatalog::load(&catalog_path)?;
            let dump = OcrDump::load(&dump)?;
            let ctx = ExtractionContext::new(&config).with_catalog(&catalog);
            let extraction = extract_from_lines(&dump.lines, image_width.or(dump.image_width), ctx);
            if cli.debug {
                print_json(&extraction)
            } else {
                print_json(&extraction.entries)
            }
        }
        Command::Ocr {
            image,
            output,
            tesseract,
            lang,
        } => {
            let engine = TesseractEngine::discover(tesseract)?.with_language(&lang);
            let dump = OcrDump::capture(&engine, &image)?;
            log::info!("Captured {} OCR lines from {}", dump.lines.len(), image.display());
            match output {
                Some(path) => export_to_json(&dump, &path),
                None => print_json(&dump),
            }
        }
        Command::Courses { action } => courses(action, &catalog_path),
        Command::InitConfig { path } => {
            let path = path.unwrap_or(config_path);
            if path.exists() {
                return Err(anyhow!("{} already exists", path.display()));
            }
            ExtractorConfig::save_default(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

fn scan(args: &ScanArgs, config: ExtractorConfig, catalog: CourseCatalog, debug: bool) -> Result<()> {
    let csv = args.csv.as_deref();
    let json = args.json.as_deref();

    // A single screenshot needs no worker pool
    if let [image] = args.images.as_slice() {
        let extractor = AnchorExtractor::new(args.engine()?, config).with_catalog(catalog);
        let extraction = extractor.extract_path(image)?;
        if let Some(path) = csv {
            init_csv(path)?;
            append_entries(path, image, Local::now(), &extraction.entries)?;
        }
        return match (json, debug) {
            (Some(path), true) => export_to_json(&extraction, path),
            (Some(path), false) => export_to_json(&extraction.entries, path),
            (None, true) => print_json(&extraction),
            (None, false) => print_json(&extraction.entries),
        };
    }

    let workers = args.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let ctx = ExtractionContext::new(&config).with_catalog(&catalog);
    let results = run_batch(&args.images, workers, || args.engine(), ctx, csv)?;

    let mut report = Vec::with_capacity(results.len());
    let mut failures = 0;
    for result in &results {
        let value = match &result.outcome {
            Ok(extraction) if debug => serde_json::json!({
                "image": result.image_path,
                "entries": extraction.entries,
                "trace": extraction.trace,
            }),
            Ok(extraction) => serde_json::json!({
                "image": result.image_path,
                "entries": extraction.entries,
            }),
            Err(e) => {
                failures += 1;
                serde_json::json!({
                    "image": result.image_path,
                    "error": format!("{:#}", e),
                })
            }
        };
        report.push(value);
    }

    match json {
        Some(path) => export_to_json(&report, path)?,
        None => print_json(&report)?,
    }

    if failures > 0 {
        log::warn!("{} of {} screenshots failed", failures, results.len());
    }
    Ok(())
}

fn courses(action: CoursesAction, catalog_path: &Path) -> Result<()> {
    let mut catalog = CourseCatalog::load(catalog_path)?;

    match action {
        CoursesAction::List => {
            for (code, info) in catalog.iter() {
                if info.abbr.is_empty() {
                    println!("{}\t{}", code, info.name);
                } else {
                    println!("{}\t{} ({})", code, info.name, info.abbr);
                }
            }
            Ok(())
        }
        CoursesAction::Add { code, name, abbr } => {
            catalog.upsert(&code, &name, &abbr);
            catalog.save(catalog_path)?;
            println!("Course {} added/updated", code.to_uppercase());
            Ok(())
        }
        CoursesAction::Remove { code } => {
            if !catalog.remove(&code) {
                return Err(anyhow!("Course {} not found", code));
            }
            catalog.save(catalog_path)?;
            println!("Course {} deleted", code.to_uppercase());
            Ok(())
        }
    }
}
