//! `splitget probe <url>`: print what a download would do.

use anyhow::{Context, Result};
use splitget_core::config::SplitgetConfig;
use splitget_core::url_model::derive_filename;
use splitget_core::{CurlTransport, RangeSupport, Transport};

pub async fn run_probe(cfg: &SplitgetConfig, url: &str) -> Result<()> {
    let transport = CurlTransport::from_config(cfg);
    let probe = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || transport.probe(&url)
    })
    .await
    .context("probe task join")?
    .with_context(|| format!("probe {}", url))?;

    let size = match probe.size {
        Some(bytes) => format!("{} bytes ({:.2} MiB)", bytes, bytes as f64 / 1_048_576.0),
        None => "unknown".to_string(),
    };
    let ranges = match probe.range_support {
        RangeSupport::Bytes => "yes",
        RangeSupport::Refused => "no",
        RangeSupport::Unknown => "not advertised",
    };
    let name_source = probe.effective_url.as_deref().unwrap_or(url);

    println!("  {:<12} {}", "URL", url);
    if let Some(effective) = probe.effective_url.as_deref().filter(|e| *e != url) {
        println!("  {:<12} {}", "Redirected", effective);
    }
    println!("  {:<12} {}", "Size", size);
    println!("  {:<12} {}", "Ranges", ranges);
    println!(
        "  {:<12} {}",
        "Filename",
        derive_filename(name_source, probe.suggested_filename.as_deref())
    );
    Ok(())
}
