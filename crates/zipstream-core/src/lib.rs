//! zipstream core: stream remotely hosted files into one ZIP archive.
//!
//! A descriptor (JSON, possibly paginated) lists `(url, zipPath)` pairs. The
//! [`descriptor`] module turns it into a lazily produced entry stream, the
//! [`archive`] module fetches each entry through [`fetch`] and writes it into a
//! streaming ZIP, and [`export`] wires the two together.

pub mod archive;
pub mod config;
pub mod control;
pub mod descriptor;
pub mod entry;
pub mod export;
pub mod fetch;
pub mod filename;
pub mod logging;
pub mod report;
pub mod retry;
