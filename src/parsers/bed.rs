use std::io::BufRead;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::parsers::open_file;
use crate::types::FeatureRegion;

/// BED parser for the exon/region definition input.
///
/// Expects at least four tab-separated columns per record: chromosome,
/// start, end (exclusive) and gene name. Header-ish lines (`#`, `track`,
/// `browser`) and blank lines are skipped.
pub struct BedParser;

impl BedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<Vec<FeatureRegion>> {
        let reader = open_file(path)?;
        let mut regions = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", path.display()))?;
            let trimmed = line.trim_end();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }

            regions.push(
                self.parse_record(trimmed)
                    .with_context(|| format!("{}:{}", path.display(), index + 1))?,
            );
        }

        info!(
            path = %path.display(),
            regions = regions.len(),
            "parsed BED definitions"
        );
        Ok(regions)
    }

    fn parse_record(&self, line: &str) -> Result<FeatureRegion> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 4 {
            return Err(anyhow!(
                "invalid BED record: expected at least 4 columns, got {}",
                parts.len()
            ));
        }

        let start: u64 = parts[1]
            .parse()
            .with_context(|| format!("invalid start position: {}", parts[1]))?;
        let end: u64 = parts[2]
            .parse()
            .with_context(|| format!("invalid end position: {}", parts[2]))?;

        FeatureRegion::new(parts[0], start, end, parts[3]).map_err(Into::into)
    }
}

impl Default for BedParser {
    fn default() -> Self {
        Self::new()
    }
}
