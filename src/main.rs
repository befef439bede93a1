use anyhow::Result;
use clap::{Arg, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use ytconvert_client::{
    ApiClient, ClientConfig, JobController, Mode, Phase, VideoMetadata, ViewEvents,
};

/// Parse the --mode argument.
fn parse_mode(value: &str) -> Result<Mode> {
    match value {
        "audio" => Ok(Mode::Audio),
        "video" => Ok(Mode::Video),
        other => Err(anyhow::anyhow!(
            "Unknown mode: {} (expected audio or video)",
            other
        )),
    }
}

/// Logs controller events to the terminal.
struct ConsoleView;

impl ViewEvents for ConsoleView {
    fn on_preview(&self, metadata: &VideoMetadata) {
        info!(
            "🎬 {} — {} ({})",
            metadata.title,
            metadata.channel,
            metadata.formatted_duration()
        );
    }

    fn on_progress(&self, message: &str, percent: u8) {
        info!("⏳ {:>3}% {}", percent, message);
    }

    fn on_completed(&self) {
        info!("✅ Conversion completed");
    }

    fn on_failed(&self, message: &str) {
        error!("❌ {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("ytconvert_client=info,ytconvert=info,warn")
        .init();

    let matches = Command::new("YT Converter Client")
        .version("0.1.0")
        .about("Convert a video URL through the converter backend")
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("Video URL to convert")
                .required(true),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Conversion mode: audio or video")
                .default_value("audio"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("ID")
                .help("Format preset id (e.g. mp3-128, mp4-1080)"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Backend API base URL"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file path"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to TOML config file"),
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ClientConfig::load(Path::new(path))?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config.base_url = base_url.clone();
    }

    let url = matches.get_one::<String>("url").unwrap();
    let mode = parse_mode(matches.get_one::<String>("mode").unwrap())?;

    let client = Arc::new(ApiClient::new(&config.base_url, config.request_timeout())?);
    let mut controller = JobController::with_poll_interval(client, config.poll_interval());
    controller.subscribe(Arc::new(ConsoleView)).await;
    controller.set_mode(mode);

    if let Some(format) = matches.get_one::<String>("format") {
        if !controller.select_format(format) {
            return Err(anyhow::anyhow!("Unknown format preset: {}", format));
        }
    }

    info!("🚀 Converting {} to {}", url, controller.selection().selected_id());
    controller.submit(url).await?;

    // Wait for the job to reach a terminal phase
    loop {
        tokio::time::sleep(Duration::from_millis(200)).await;
        match controller.snapshot().await.phase {
            Phase::Completed => break,
            Phase::Failed => {
                let message = controller
                    .snapshot()
                    .await
                    .job
                    .and_then(|job| job.error_message)
                    .unwrap_or_else(|| "Conversion failed".to_string());
                return Err(anyhow::anyhow!(message));
            }
            _ => {}
        }
    }

    if let Some(bytes) = controller.request_download().await? {
        let extension = match mode {
            Mode::Audio => "mp3",
            Mode::Video => "mp4",
        };
        let output = matches
            .get_one::<String>("output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("converted.{}", extension)));

        tokio::fs::write(&output, &bytes).await?;
        info!("💾 Saved {} bytes to {}", bytes.len(), output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!(parse_mode("audio").unwrap(), Mode::Audio);
        assert_eq!(parse_mode("video").unwrap(), Mode::Video);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(parse_mode("banana").is_err());
    }
}
