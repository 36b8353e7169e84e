//! `splitget get`: download one URL with a segmented transfer.

use anyhow::{Context, Result};
use splitget_core::config::SplitgetConfig;
use splitget_core::{
    CancellationToken, CurlTransport, DownloadError, DownloadReport, DownloadRequest, NoProgress,
    ProgressSink, TransferCoordinator,
};
use std::io;
use std::path::PathBuf;

use crate::cli::progress::BarSink;
use crate::cli::prompt::Prompter;

#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub url: Option<String>,
    pub output: Option<PathBuf>,
    pub threads: Option<usize>,
    pub quiet: bool,
}

/// Fill in what the command line left out. Without a URL the session is
/// interactive: threads, URL, then path, like the classic prompt flow.
fn resolve_args<P: FnOnce() -> Result<(usize, String, Option<PathBuf>)>>(
    cfg: &SplitgetConfig,
    args: &GetArgs,
    ask: P,
) -> Result<(usize, String, Option<PathBuf>)> {
    match &args.url {
        Some(url) => Ok((
            args.threads.unwrap_or(cfg.segments),
            url.clone(),
            args.output.clone(),
        )),
        None => ask(),
    }
}

pub async fn run_get(cfg: &SplitgetConfig, args: GetArgs) -> Result<()> {
    let (threads, url, output) = resolve_args(cfg, &args, || {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        let threads = match args.threads {
            Some(n) => n,
            None => prompter.threads(cfg.segments)?,
        };
        let url = prompter.url()?;
        let output = match args.output.clone() {
            Some(p) => Some(p),
            None => prompter.path()?,
        };
        Ok((threads, url, output))
    })?;

    let mut request = DownloadRequest::new(url, threads).output_dir(std::env::current_dir()?);
    if let Some(path) = output {
        request = request.destination(path);
    }
    tracing::info!(url = %request.url, segments = threads, "starting download");

    let coordinator = TransferCoordinator::new(CurlTransport::from_config(cfg), cfg);
    let cancel = CancellationToken::new();
    let quiet = args.quiet;
    let mut task = tokio::task::spawn_blocking({
        let cancel = cancel.clone();
        move || {
            let sink: Box<dyn ProgressSink> = if quiet {
                Box::new(NoProgress)
            } else {
                Box::new(BarSink::new())
            };
            coordinator.download(&request, sink.as_ref(), &cancel)
        }
    });

    let joined = tokio::select! {
        res = &mut task => res,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\ninterrupted, cancelling download...");
            cancel.cancel();
            task.await
        }
    };

    match joined.context("download task join")? {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(DownloadError::Cancelled) => {
            tracing::info!("download cancelled by user");
            anyhow::bail!("download cancelled, partial data removed")
        }
        Err(e) => Err(anyhow::Error::new(e).context("download failed")),
    }
}

fn print_report(report: &DownloadReport) {
    let rule = "─".repeat(72);
    println!("{}", rule);
    println!(
        "Your download is finished -> {}",
        report.destination.display()
    );
    println!(
        "  {:.2} MiB in {:.1}s ({:.2} MiB/s, {} segment{})",
        report.bytes as f64 / 1_048_576.0,
        report.elapsed.as_secs_f64(),
        report.bytes_per_sec() / 1_048_576.0,
        report.segments,
        if report.segments == 1 { "" } else { "s" }
    );
    println!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_on_command_line_skips_prompts() {
        let cfg = SplitgetConfig::default();
        let args = GetArgs {
            url: Some("https://example.org/f.iso".to_string()),
            ..GetArgs::default()
        };
        let (threads, url, output) =
            resolve_args(&cfg, &args, || panic!("should not prompt")).unwrap();
        assert_eq!(threads, cfg.segments);
        assert_eq!(url, "https://example.org/f.iso");
        assert!(output.is_none());
    }

    #[test]
    fn explicit_threads_and_output_are_kept() {
        let cfg = SplitgetConfig::default();
        let args = GetArgs {
            url: Some("https://example.org/f.iso".to_string()),
            threads: Some(8),
            output: Some(PathBuf::from("/tmp/f.iso")),
            quiet: true,
        };
        let (threads, _, output) = resolve_args(&cfg, &args, || panic!("should not prompt")).unwrap();
        assert_eq!(threads, 8);
        assert_eq!(output, Some(PathBuf::from("/tmp/f.iso")));
    }

    #[test]
    fn missing_url_asks() {
        let cfg = SplitgetConfig::default();
        let (threads, url, _) = resolve_args(&cfg, &GetArgs::default(), || {
            Ok((2, "https://asked.example/x".to_string(), None))
        })
        .unwrap();
        assert_eq!(threads, 2);
        assert_eq!(url, "https://asked.example/x");
    }
}
