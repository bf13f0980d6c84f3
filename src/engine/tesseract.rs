//! OCR engine backed by the `tesseract` CLI.
//!
//! Runs `tesseract <image> stdout -l <langs> --psm <n> tsv` and parses the
//! tab-separated word table it prints.

use super::{run_tool, OcrEngine, PageSegmentation, RawWord};
use anyhow::{Context, Result};
use csv::StringRecord;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

pub struct TesseractCli {
    bin: String,
}

impl TesseractCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn command(&self, path: &Path, language_hint: &str, segmentation: PageSegmentation) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(language_hint)
            .arg("--psm")
            .arg(segmentation.psm().to_string())
            .arg("tsv");
        command
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        path: &Path,
        language_hint: &str,
        segmentation: PageSegmentation,
    ) -> Result<Vec<RawWord>> {
        debug!("tesseract: recognizing {:?} (psm {})", path, segmentation.psm());
        let output = run_tool(
            "tesseract",
            &mut self.command(path, language_hint, segmentation),
        )
        .await?;
        parse_tsv(&output.stdout)
    }
}

/// Column positions resolved from the TSV header.
struct Columns {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
    text: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| format!("tesseract TSV missing column `{}`", name))
        };
        Ok(Self {
            left: find("left")?,
            top: find("top")?,
            width: find("width")?,
            height: find("height")?,
            text: find("text")?,
        })
    }
}

/// Parse tesseract TSV output into rows, in the order they were printed.
///
/// Structural rows (page, block, paragraph, line) have no text and are kept
/// as empty entries; callers filter them out.
pub fn parse_tsv(tsv: &[u8]) -> Result<Vec<RawWord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(tsv);

    let header = reader.headers().context("cannot read tesseract TSV header")?.clone();
    if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
        // No output at all, e.g. a blank image.
        return Ok(Vec::new());
    }
    let columns = Columns::from_header(&header)?;

    let mut words = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("cannot read tesseract TSV row {}", row + 1))?;
        let coord = |idx: usize| -> Result<u32> {
            let raw = record.get(idx).unwrap_or("0").trim();
            let value: i64 = raw
                .parse()
                .with_context(|| format!("bad coordinate {:?} in tesseract TSV row {}", raw, row + 1))?;
            Ok(value.clamp(0, u32::MAX as i64) as u32)
        };

        words.push(RawWord {
            text: record.get(columns.text).unwrap_or_default().to_string(),
            left: coord(columns.left)?,
            top: coord(columns.top)?,
            width: coord(columns.width)?,
            height: coord(columns.height)?,
        });
    }

    Ok(words)
}
