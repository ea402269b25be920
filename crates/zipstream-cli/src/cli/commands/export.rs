//! `zipstream export` – stream a descriptor's files into one ZIP archive.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use zipstream_core::config::ZipstreamConfig;
use zipstream_core::control::CancelToken;
use zipstream_core::export::{ExportSummary, Exporter};

use super::source::resolve_source;

/// Where the archive bytes go.
#[derive(Debug, PartialEq, Eq)]
enum Destination {
    Stdout,
    File(PathBuf),
}

/// `-` is stdout; an existing directory gets the suggested filename; no
/// argument means the suggested filename in the current directory.
fn destination(output: Option<&Path>, suggested: &str) -> Destination {
    match output {
        Some(p) if p == Path::new("-") => Destination::Stdout,
        Some(p) if p.is_dir() => Destination::File(p.join(suggested)),
        Some(p) => Destination::File(p.to_path_buf()),
        None => Destination::File(PathBuf::from(suggested)),
    }
}

pub async fn run_export(
    cfg: ZipstreamConfig,
    descriptor: &str,
    output: Option<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let source = resolve_source(descriptor)?;
    let token = CancelToken::new();
    let exporter = Exporter::new(cfg).cancel_token(token.clone());

    let mut task = tokio::task::spawn_blocking(move || -> Result<(Destination, ExportSummary)> {
        let mut descriptor = exporter.open(&source).context("failed to open descriptor")?;
        if let Some(name) = name {
            descriptor = descriptor.with_suggested_filename(name);
        }
        let dest = destination(output.as_deref(), &descriptor.escaped_suggested_filename());
        let summary = match &dest {
            Destination::Stdout => exporter.write(descriptor, std::io::stdout())?,
            Destination::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                match exporter.write(descriptor, BufWriter::new(file)) {
                    Ok(summary) => summary,
                    Err(e) => {
                        // Without a central directory the file is not a usable archive.
                        let _ = fs::remove_file(path);
                        return Err(e.into());
                    }
                }
            }
        };
        Ok((dest, summary))
    });

    let joined = tokio::select! {
        res = &mut task => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, cancelling export");
            token.cancel();
            task.await
        }
    };
    let (dest, summary) = joined.context("export task join")??;

    let target = match &dest {
        Destination::Stdout => "stdout".to_string(),
        Destination::File(p) => p.display().to_string(),
    };
    eprintln!(
        "wrote {} file(s) to {} ({} bytes, {} skipped)",
        summary.written, target, summary.bytes, summary.skipped
    );
    if summary.stream_end.is_truncated() {
        eprintln!("warning: descriptor pagination stopped early; see log for details");
    }
    Ok(())
}
