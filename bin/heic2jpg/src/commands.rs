//! Command handlers. Results go to stdout, diagnostics to the log.

use std::path::Path;

use anyhow::Context;
use heic2jpg_client::{ConversionClient, ResultSummary, SelectedFile, Session};
use tracing::info;

use crate::cli::ConvertArgs;

/// Name used when a download URL has no usable last segment.
const FALLBACK_FILENAME: &str = "converted.jpg";

pub async fn convert(client: &ConversionClient, args: ConvertArgs) -> anyhow::Result<()> {
    let mut session = Session::with_max_upload_bytes(client.config().max_upload_bytes);

    if let Some(preset) = args.preset {
        session.apply_preset(preset);
    }
    for (field, value) in args.option_edits() {
        session.set_option(field, &value)?;
    }

    let file = SelectedFile::from_path(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    session.select(file)?;

    info!(
        file = %args.input.display(),
        options = ?session.options(),
        "converting"
    );
    let result = session.convert(client).await?.clone();

    println!(
        "{}",
        ResultSummary::new(&result, client.resolve_url(&result.download_url))
    );

    if !args.no_download {
        let path = client
            .download_to(&result.download_url, &args.output, &result.filename)
            .await?;
        println!("Saved:      {}", path.display());
    }

    Ok(())
}

pub async fn download(
    client: &ConversionClient,
    url: &str,
    output: &Path,
    filename: Option<&str>,
) -> anyhow::Result<()> {
    let filename = filename.unwrap_or_else(|| filename_from_url(url));
    let path = client.download_to(url, output, filename).await?;
    println!("Saved: {}", path.display());
    Ok(())
}

pub async fn health(client: &ConversionClient) -> anyhow::Result<()> {
    let health = client.health().await?;
    let timestamp = health
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_owned());

    println!(
        "{}: {} (version {}, {})",
        client.base_url(),
        health.status,
        health.version,
        timestamp
    );

    if !health.is_ok() {
        anyhow::bail!("service reported status {:?}", health.status);
    }
    Ok(())
}

fn filename_from_url(url: &str) -> &str {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
}
