//! Resolve the DESCRIPTOR argument into a descriptor source.

use anyhow::{Context, Result};
use std::io::Read;
use zipstream_core::export::DescriptorSource;

/// `http(s)://…` is fetched; `-` reads stdin; anything else is a file path.
pub fn resolve_source(arg: &str) -> Result<DescriptorSource> {
    let lower = arg.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(DescriptorSource::Url(arg.to_string()));
    }
    if arg == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read descriptor from stdin")?;
        return Ok(DescriptorSource::Payload(buf));
    }
    let bytes = std::fs::read(arg).with_context(|| format!("failed to read descriptor {}", arg))?;
    Ok(DescriptorSource::Payload(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_fetched() {
        match resolve_source("HTTPS://example.com/export?page=1").unwrap() {
            DescriptorSource::Url(u) => assert_eq!(u, "HTTPS://example.com/export?page=1"),
            other => panic!("expected Url, got {:?}", other),
        }
    }

    #[test]
    fn paths_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        std::fs::write(&path, br#"{"results":[]}"#).unwrap();
        match resolve_source(path.to_str().unwrap()).unwrap() {
            DescriptorSource::Payload(b) => assert_eq!(b, br#"{"results":[]}"#),
            other => panic!("expected Payload, got {:?}", other),
        }
        assert!(resolve_source(dir.path().join("missing.json").to_str().unwrap()).is_err());
    }
}
