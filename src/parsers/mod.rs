//! Plain-text input readers feeding the assembly and comparison core.
//!
//! Both readers accept optionally gzip-compressed files and surface parse
//! failures with file and line context.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

pub mod bed;
pub mod sam;

/// Opens a file for buffered line reading, transparently decompressing
/// `.gz` inputs.
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
