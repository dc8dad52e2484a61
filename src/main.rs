use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::path::PathBuf;

use ifc_property_inspector::config::{ElementFilter, NormalizeOptions, PipelineOptions};
use ifc_property_inspector::engine::StepEngine;
use ifc_property_inspector::export::{export_csv, export_json, export_log};
use ifc_property_inspector::pipeline;
use ifc_property_inspector::process_log::ProcessLog;
use ifc_property_inspector::schema::TypeSchema;
use ifc_property_inspector::session::ModelSession;
use ifc_property_inspector::ui::App;
use ifc_property_inspector::worker::EngineWorker;

#[derive(Parser, Debug)]
#[command(name = "ifc-property-inspector")]
#[command(about = "IFC Property Inspector - browse element properties, quantities and materials")]
#[command(version)]
struct Args {
    /// Path to IFC file
    #[arg(required = true)]
    file: PathBuf,

    /// Type-code schema (`export const NAME = CODE;` lines) instead of the bundled one
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Keep every spatial node, not only physical elements
    #[arg(long)]
    all: bool,

    /// Comma-separated type keywords replacing the physical-element filter
    #[arg(long, value_delimiter = ',', value_name = "KEYWORDS")]
    keywords: Option<Vec<String>>,

    /// Name unnamed properties `Property N` instead of guessing by position
    #[arg(long)]
    no_positional_names: bool,

    /// Export elements to JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Export one row per property to CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write the processing log
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

impl Args {
    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            include_all: self.all,
            filter: self
                .keywords
                .as_ref()
                .map_or_else(ElementFilter::physical, ElementFilter::new),
            normalize: NormalizeOptions {
                positional_names: !self.no_positional_names,
            },
        }
    }

    fn exports_requested(&self) -> bool {
        self.json.is_some() || self.csv.is_some() || self.log.is_some()
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let schema = match &args.schema {
        Some(path) => TypeSchema::load(path)?,
        None => TypeSchema::bundled()?,
    };
    tracing::info!(types = schema.len(), "Loaded type schema");

    let bytes = std::fs::read(&args.file)
        .wrap_err_with(|| format!("failed to read {}", args.file.display()))?;

    let mut log = ProcessLog::new();
    log.info(format!("Read {} ({} bytes)", args.file.display(), bytes.len()));

    let worker_schema = schema.clone();
    let worker = EngineWorker::spawn(move || StepEngine::new(worker_schema));
    worker.init()?;
    match worker.process(bytes.clone()) {
        Ok(summary) => log.info(format!(
            "Worker counted {} entities in {} bytes",
            summary.entity_count, summary.byte_len
        )),
        Err(err) => log.warn(format!("Worker pre-check failed: {err}")),
    }
    drop(worker);

    let mut session = ModelSession::new(StepEngine::new(schema.clone()));
    let output = match session.open(&bytes, &mut log) {
        Ok(_) => pipeline::run(&session, &schema, &args.pipeline_options(), &mut log),
        Err(err) => {
            log.error(format!("Could not open {}: {err}", args.file.display()));
            pipeline::PipelineOutput::default()
        }
    };
    session.close(&mut log);

    if args.exports_requested() {
        if let Some(json_path) = &args.json {
            export_json(&output.elements, json_path)?;
            println!("Exported to JSON: {}", json_path.display());
        }
        if let Some(csv_path) = &args.csv {
            export_csv(&output.elements, csv_path)?;
            println!("Exported to CSV: {}", csv_path.display());
        }
        if let Some(log_path) = &args.log {
            export_log(&log, log_path)?;
            println!("Wrote log: {}", log_path.display());
        }
        return Ok(());
    }

    let title = args
        .file
        .file_name()
        .map_or_else(|| args.file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let terminal = ratatui::init();
    let result = App::new(title, output, log, &schema).run(terminal);
    ratatui::restore();
    result
}
