//! Batch processing command for multiple invoice images.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use invscan_core::{FieldRecord, ScanError, ScanOutput};

use super::process::{format_output, OutputFormat};
use super::{build_pipeline, load_config, resolve_model_dir};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Also write `<stem>_annotated.jpg` for each file
    #[arg(long)]
    annotate: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<FieldRecord>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = load_config(config_path)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image_path(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // One detector for every worker
    let model_dir = resolve_model_dir(args.model_dir.as_deref(), &config);
    let pipeline = Arc::new(build_pipeline(&config, &model_dir)?);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let jobs = args.jobs.max(1);
    let mut pending = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let result = fs::read(&path)
                    .map_err(ScanError::from)
                    .and_then(|bytes| pipeline.process_bytes(&bytes));
                (path, result, file_start.elapsed().as_millis() as u64)
            })
        })
        .buffer_unordered(jobs);

    let mut results = Vec::new();

    while let Some(joined) = pending.next().await {
        let (path, result, processing_time_ms) = joined?;

        let outcome = finish_file(result, &path, processing_time_ms, &args);
        match settle(path, outcome, args.continue_on_error) {
            Ok(row) => results.push(row),
            Err(e) => {
                overall_pb.abandon();
                return Err(e);
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    // Workers finish out of order
    results.sort_by(|a, b| a.path.cmp(&b.path));

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let totals = Totals::from_records(successful.iter().filter_map(|r| r.record.as_ref()));

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if totals.amount_count > 0 {
        println!(
            "   Total amount: {} ({} invoices)",
            style(totals.amount_sum).cyan(),
            totals.amount_count
        );
    }
    if let Some((first, last)) = totals.date_range {
        println!("   Date range: {} to {}", first, last);
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Write the per-file outputs of a successful scan.
///
/// A failed scan and a failed write are both that file's failure.
fn finish_file(
    result: Result<ScanOutput, ScanError>,
    path: &Path,
    processing_time_ms: u64,
    args: &BatchArgs,
) -> anyhow::Result<FieldRecord> {
    let output = result?;
    debug!(
        "{}: {} fields in {}ms",
        path.display(),
        output.record.found_count(),
        processing_time_ms
    );

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, path, &output, args)?;
    }

    Ok(output.record)
}

/// Turn a file's outcome into a summary row, or abort the batch.
fn settle(
    path: PathBuf,
    outcome: anyhow::Result<FieldRecord>,
    continue_on_error: bool,
) -> anyhow::Result<ProcessResult> {
    match outcome {
        Ok(record) => Ok(ProcessResult {
            path,
            record: Some(record),
            error: None,
        }),
        Err(e) if continue_on_error => {
            warn!("Failed to process {}: {}", path.display(), e);
            Ok(ProcessResult {
                path,
                record: None,
                error: Some(e.to_string()),
            })
        }
        Err(e) => {
            error!("Failed to process {}: {}", path.display(), e);
            anyhow::bail!("Processing failed for {}: {}", path.display(), e)
        }
    }
}

fn is_image_path(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice")
}

fn write_outputs(
    output_dir: &Path,
    path: &Path,
    output: &ScanOutput,
    args: &BatchArgs,
) -> anyhow::Result<()> {
    let stem = file_stem(path);

    let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
    fs::write(&output_path, format_output(output, args.format)?)?;
    debug!("Wrote output to {}", output_path.display());

    if args.annotate {
        let image_path = output_dir.join(format!("{}_annotated.jpg", stem));
        fs::write(&image_path, &output.annotated_image)?;
        debug!("Wrote annotated image to {}", image_path.display());
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "date",
        "amount",
        "invoice_number",
        "seller",
        "client",
        "tax_id",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(record) = &result.record {
            let [date, amount, number, seller, client, tax_id] = record.values();
            wtr.write_record([
                filename, "success", date, amount, number, seller, client, tax_id, "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Aggregates over the successfully processed records.
#[derive(Debug, Default, PartialEq)]
struct Totals {
    amount_sum: Decimal,
    amount_count: usize,
    date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Totals {
    fn from_records<'a>(records: impl Iterator<Item = &'a FieldRecord>) -> Self {
        let mut totals = Totals::default();

        for record in records {
            if let Some(amount) = record.amount_value() {
                totals.amount_sum += amount;
                totals.amount_count += 1;
            }
            if let Some(date) = record.date_value() {
                totals.date_range = Some(match totals.date_range {
                    Some((first, last)) => (first.min(date), last.max(date)),
                    None => (date, date),
                });
            }
        }

        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invscan_core::{DetectionSet, Field, InputError};
    use std::str::FromStr;

    fn batch_args(output_dir: Option<PathBuf>) -> BatchArgs {
        BatchArgs {
            input: "*.png".to_string(),
            output_dir,
            format: OutputFormat::Csv,
            annotate: true,
            summary: false,
            jobs: 1,
            continue_on_error: true,
            model_dir: None,
        }
    }

    fn scan_output(record: FieldRecord) -> ScanOutput {
        ScanOutput {
            detections: DetectionSet::default(),
            csv_data: invscan_core::serialize(&record).unwrap(),
            record,
            matches: Vec::new(),
            annotated_image: vec![0xFF, 0xD8],
            processing_time_ms: 1,
        }
    }

    fn record(date: Option<&str>, amount: Option<&str>) -> FieldRecord {
        let mut record = FieldRecord::default();
        record.set(Field::Date, date.map(str::to_string));
        record.set(Field::Amount, amount.map(str::to_string));
        record
    }

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("scans/a.PNG")));
        assert!(is_image_path(Path::new("b.jpeg")));
        assert!(!is_image_path(Path::new("c.pdf")));
        assert!(!is_image_path(Path::new("noext")));
    }

    #[test]
    fn test_totals() {
        let records = [
            record(Some("05/12/2024"), Some("1000.00")),
            record(Some("2024-01-31"), Some("12.50")),
            record(None, None),
        ];

        let totals = Totals::from_records(records.iter());
        assert_eq!(totals.amount_sum, Decimal::from_str("1012.50").unwrap());
        assert_eq!(totals.amount_count, 2);

        let (first, last) = totals.date_range.unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(last > first);
    }

    #[test]
    fn test_totals_empty() {
        let totals = Totals::from_records(std::iter::empty());
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        let results = [
            ProcessResult {
                path: PathBuf::from("in/a.png"),
                record: Some(record(None, Some("5.00"))),
                error: None,
            },
            ProcessResult {
                path: PathBuf::from("in/b.png"),
                record: None,
                error: Some("invalid input: file must be an image".to_string()),
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "filename,status,date,amount,invoice_number,seller,client,tax_id,error"
        );
        assert_eq!(
            lines[1],
            "a.png,success,Not found,5.00,Not found,Not found,Not found,Not found,"
        );
        assert_eq!(
            lines[2],
            "b.png,error,,,,,,,invalid input: file must be an image"
        );
    }

    #[test]
    fn test_finish_file_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let args = batch_args(Some(dir.path().to_path_buf()));
        let scanned = scan_output(record(None, Some("5.00")));

        let record = finish_file(Ok(scanned), Path::new("in/a.png"), 1, &args).unwrap();
        assert_eq!(record.amount, "5.00");
        assert!(dir.path().join("a.csv").exists());
        assert!(dir.path().join("a_annotated.jpg").exists());
    }

    #[test]
    fn test_write_failure_is_recorded_when_continuing() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the output directory should be
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"").unwrap();
        let args = batch_args(Some(blocked));
        let path = PathBuf::from("in/a.png");

        let outcome = finish_file(Ok(scan_output(FieldRecord::default())), &path, 1, &args);
        assert!(outcome.is_err());

        let row = settle(path, outcome, true).unwrap();
        assert!(row.record.is_none());
        assert!(row.error.is_some());
    }

    #[test]
    fn test_failure_aborts_without_continue() {
        let args = batch_args(None);
        let path = PathBuf::from("in/b.png");

        let outcome = finish_file(Err(InputError::NotAnImage.into()), &path, 1, &args);
        let err = settle(path, outcome, false).unwrap_err();
        assert!(err.to_string().contains("invalid input: file must be an image"));
    }

    #[test]
    fn test_scan_failure_row_keeps_message() {
        let args = batch_args(None);
        let path = PathBuf::from("in/b.png");

        let outcome = finish_file(Err(InputError::Empty.into()), &path, 1, &args);
        let row = settle(path, outcome, true).unwrap();
        assert_eq!(row.error.as_deref(), Some("invalid input: file is empty"));
    }
}
