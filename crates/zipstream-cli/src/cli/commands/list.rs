//! `zipstream list` – resolve a descriptor without downloading any file.

use anyhow::{Context, Result};
use zipstream_core::config::ZipstreamConfig;
use zipstream_core::descriptor::StreamEnd;
use zipstream_core::export::Exporter;

use super::source::resolve_source;

pub async fn run_list(cfg: ZipstreamConfig, descriptor: &str) -> Result<()> {
    let source = resolve_source(descriptor)?;
    let exporter = Exporter::new(cfg);

    tokio::task::spawn_blocking(move || -> Result<()> {
        let descriptor = exporter.open(&source).context("failed to open descriptor")?;
        println!("# {}", descriptor.escaped_suggested_filename());
        let mut entries = descriptor.into_entries();
        let mut count = 0usize;
        for entry in &mut entries {
            println!("{}\t{}", entry.zip_path(), entry.url());
            count += 1;
        }
        match entries.finish() {
            StreamEnd::Truncated(e) => eprintln!("{} entries; truncated: {}", count, e),
            _ => eprintln!("{} entries", count),
        }
        Ok(())
    })
    .await
    .context("list task join")??;
    Ok(())
}
