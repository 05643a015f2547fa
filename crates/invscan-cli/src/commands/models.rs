//! Models command - download and inspect OCR model files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use invscan_core::ScanConfig;

use super::{load_config, resolve_model_dir};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check model status
    Status(StatusArgs),

    /// Download models
    Download(DownloadArgs),
}

#[derive(Args)]
struct StatusArgs {
    /// Model directory to inspect
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Args)]
struct DownloadArgs {
    /// Base URL the model files are fetched from (`<from>/<file name>`)
    #[arg(long, required = true)]
    from: String,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

/// Per-user directory that downloaded models go into.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invscan")
        .join("models")
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command {
        ModelsCommand::Status(status_args) => {
            let model_dir = resolve_model_dir(status_args.model_dir.as_deref(), &config);
            check_status(&config, &model_dir)
        }
        ModelsCommand::Download(download_args) => download_models(&config, download_args).await,
    }
}

async fn download_models(config: &ScanConfig, args: DownloadArgs) -> anyhow::Result<()> {
    let output_dir = args.output.unwrap_or_else(default_model_dir);
    fs::create_dir_all(&output_dir)?;

    println!(
        "{} Downloading models to {}",
        style("ℹ").blue(),
        output_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("invscan-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for filename in config.models.files() {
        let path = output_dir.join(filename);

        // Check if already exists
        if path.exists() && !args.force {
            let size = fs::metadata(&path)?.len();
            if size > 0 {
                println!(
                    "  {} {} (already exists, {})",
                    style("✓").green(),
                    filename,
                    format_size(size)
                );
                skip_count += 1;
                continue;
            }
        }

        let url = model_url(&args.from, filename);

        let pb = multi_progress.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(filename.to_string());

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count > 0 {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        anyhow::bail!("{} model file(s) failed to download", error_count);
    }

    println!(
        "{} Models downloaded successfully!",
        style("✓").green().bold()
    );
    if skip_count > 0 {
        println!(
            "   {} downloaded, {} already present",
            success_count, skip_count
        );
    }

    println!();
    check_status(config, &output_dir)
}

fn model_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename)
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    // Get content length if available
    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    // Create temp file first
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    // Stream download with progress
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    // Rename temp to final
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn check_status(config: &ScanConfig, model_dir: &Path) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("{} {}", style("▸").bold(), model_dir.display());

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for filename in config.models.files() {
        let path = model_dir.join(filename);

        let (status, size_str) = match fs::metadata(&path) {
            Ok(metadata) if metadata.len() > 0 => {
                total_size += metadata.len();
                (style("✓").green(), format_size(metadata.len()))
            }
            Ok(_) => {
                all_present = false;
                (style("⚠").yellow(), "empty".to_string())
            }
            Err(_) => {
                all_present = false;
                (style("✗").red(), "missing".to_string())
            }
        };

        println!("    {} {:<25} {:>10}", status, filename, size_str);
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'invscan models download --from <base-url>' to download",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2_000), "2.0KB");
        assert_eq!(format_size(4_500_000), "4.5MB");
        assert_eq!(format_size(1_200_000_000), "1.2GB");
    }

    #[test]
    fn test_model_url_joins_base() {
        assert_eq!(
            model_url("https://host/models/", "det.onnx"),
            "https://host/models/det.onnx"
        );
        assert_eq!(
            model_url("https://host/models", "latin_dict.txt"),
            "https://host/models/latin_dict.txt"
        );
    }

    #[test]
    fn test_default_model_dir_is_namespaced() {
        assert!(default_model_dir().ends_with("invscan/models"));
    }
}
