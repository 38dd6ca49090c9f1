use anyhow::{Context, Result};
use clap::Parser;
use dalle_viewer::cli::CliOptions;
use dalle_viewer::client::OpenAiClient;
use dalle_viewer::config::setup_logging;
use dalle_viewer::driver;
use dalle_viewer::processor::ImageProcessor;
use dalle_viewer::viewer::{HeadlessViewer, ImageDisplay, WindowViewer};
use tracing::{error, info};

async fn run_app(cli: &CliOptions) -> Result<()> {
    let client = OpenAiClient::new(&cli.client_settings()).context("Configuration error")?;

    let processor = ImageProcessor::new(
        client.http_client().clone(),
        &cli.out_dir,
        cli.retry_policy(),
    );

    let mut viewer: Box<dyn ImageDisplay> = if cli.no_display {
        Box::new(HeadlessViewer)
    } else {
        Box::new(WindowViewer)
    };

    let summary = driver::run(&client, &processor, viewer.as_mut(), &cli.request())
        .await
        .context("Image generation failed")?;

    info!(
        "Run {} saved {} image(s), displayed {}",
        summary.stem,
        summary.saved.len(),
        summary.displayed
    );
    Ok(())
}

// Failures are reported on the console but still exit 0.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    if let Err(err) = run_app(&cli).await {
        error!("{:#}", err);
    }
}
