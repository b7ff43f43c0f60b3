use std::io::BufRead;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::parsers::open_file;
use crate::types::AlignedRead;

const FLAG_UNMAPPED: u16 = 0x4;

/// Offset of the Phred+33 quality encoding.
const QUALITY_OFFSET: u8 = 33;

/// SAM parser for aligned-read input.
///
/// Reads the eleven mandatory tab-separated columns, skipping header lines
/// and records that carry no usable alignment (unmapped flag, `*` reference,
/// zero position or `*` sequence). SAM's 1-based POS is converted to the
/// 0-based coordinates the rest of the pipeline uses.
pub struct SamParser;

impl SamParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<Vec<AlignedRead>> {
        let reader = open_file(path)?;
        let mut reads = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", path.display()))?;
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('@') {
                continue;
            }

            match self
                .parse_record(trimmed)
                .with_context(|| format!("{}:{}", path.display(), index + 1))?
            {
                Some(read) => reads.push(read),
                None => skipped += 1,
            }
        }

        info!(
            path = %path.display(),
            reads = reads.len(),
            skipped,
            "parsed alignment records"
        );
        Ok(reads)
    }

    /// Parses one alignment line; `None` means a structurally valid record
    /// that carries no alignment and is skipped.
    fn parse_record(&self, line: &str) -> Result<Option<AlignedRead>> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 11 {
            return Err(anyhow!(
                "invalid SAM record: expected 11 mandatory columns, got {}",
                parts.len()
            ));
        }

        let flag: u16 = parts[1]
            .parse()
            .with_context(|| format!("invalid FLAG: {}", parts[1]))?;
        let reference = parts[2];
        let position: u64 = parts[3]
            .parse()
            .with_context(|| format!("invalid POS: {}", parts[3]))?;
        let sequence = parts[9];

        if flag & FLAG_UNMAPPED != 0 || reference == "*" || position == 0 || sequence == "*" {
            return Ok(None);
        }

        let qualities = self.decode_qualities(parts[10], sequence.len())?;
        let read = AlignedRead::new(reference, position - 1, sequence, qualities)?;
        Ok(Some(read))
    }

    fn decode_qualities(&self, qual: &str, sequence_len: usize) -> Result<Vec<u8>> {
        if qual == "*" {
            return Ok(vec![0; sequence_len]);
        }
        if qual.len() != sequence_len {
            return Err(anyhow!(
                "QUAL length {} does not match SEQ length {}",
                qual.len(),
                sequence_len
            ));
        }
        qual.bytes()
            .map(|b| {
                b.checked_sub(QUALITY_OFFSET)
                    .ok_or_else(|| anyhow!("QUAL character {:?} below Phred+33 range", b as char))
            })
            .collect()
    }
}

impl Default for SamParser {
    fn default() -> Self {
        Self::new()
    }
}
