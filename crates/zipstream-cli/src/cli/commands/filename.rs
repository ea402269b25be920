//! `zipstream filename` – show the escaped archive filename.

use zipstream_core::filename::escape_suggested_filename;

pub fn run_filename(raw: &str) {
    println!("{}", escape_suggested_filename(raw));
}
