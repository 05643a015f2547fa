//! Process command - extract fields from a single invoice image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invscan_core::{validate_and_decode, Field, ScanError, ScanOutput};

use super::{build_pipeline, load_config, resolve_model_dir};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Write the annotated image (JPEG) to this path
    #[arg(short, long)]
    annotated: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print every detected text region
    #[arg(long)]
    show_detections: bool,

    /// Print the text each field was matched from
    #[arg(long)]
    explain: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV table (header + one row)
    Csv,
    /// JSON payload with the CSV and the base64 annotated image
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing this format to disk.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    // Reject non-images before any model is loaded
    pb.set_message("Loading image...");
    pb.set_position(10);
    let bytes = fs::read(&args.input)?;
    let image = validate_and_decode(&bytes).map_err(ScanError::from)?;

    pb.set_message("Loading OCR models...");
    pb.set_position(30);
    let model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    let pipeline = build_pipeline(&config, &model_dir)?;

    pb.set_message("Scanning...");
    pb.set_position(50);
    let output = pipeline.process(&image)?;

    pb.finish_and_clear();

    if let Some(path) = &args.annotated {
        fs::write(path, &output.annotated_image)?;
        eprintln!(
            "{} Annotated image written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if args.show_detections {
        print_detections(&output);
    }

    if args.explain {
        eprintln!("{}", style("Matched fields:").bold());
        eprint!("{}", format_explanation(&output));
    }

    // Format output
    let formatted = format_output(&output, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &formatted)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", formatted);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a scan result in the requested format.
pub fn format_output(output: &ScanOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => Ok(output.csv_data.clone()),
        OutputFormat::Json => {
            let response = output.clone().into_response();
            Ok(format!("{}\n", serde_json::to_string(&response)?))
        }
        OutputFormat::Text => Ok(format_text(output)),
    }
}

fn format_text(output: &ScanOutput) -> String {
    let mut text = String::new();

    for field in Field::ALL {
        text.push_str(&format!("{}: {}\n", field.label(), output.record.get(field)));
    }

    text
}

fn print_detections(output: &ScanOutput) {
    eprintln!(
        "{} {} text regions in {}ms",
        style("ℹ").blue(),
        output.detections.len(),
        output.processing_time_ms
    );

    for detection in &output.detections {
        let corners: Vec<String> = detection
            .region
            .iter()
            .map(|p| format!("({},{})", p.x, p.y))
            .collect();
        eprintln!(
            "  {:>5.1}%  {:<40} {}",
            detection.confidence * 100.0,
            detection.text,
            style(corners.join(" ")).dim()
        );
    }
}

/// One line per field: the value and the span of joined text it was matched from.
fn format_explanation(output: &ScanOutput) -> String {
    let mut text = String::new();

    for field in Field::ALL {
        let line = match output.matches.iter().find(|(f, _)| *f == field) {
            Some((_, m)) => format!(
                "  {:<15} {:<25} from {:?} at {}..{}\n",
                field.label(),
                m.value,
                m.source,
                m.position.0,
                m.position.1
            ),
            None => format!("  {:<15} {}\n", field.label(), style("not found").yellow()),
        };
        text.push_str(&line);
    }

    text
}
