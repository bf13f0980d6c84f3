//! External extraction engines.
//!
//! The gateway talks to two collaborators through narrow async traits:
//! a [`DocumentExtractor`] that turns any supported file into text, and an
//! [`OcrEngine`] that returns word-level boxes for raster images. The default
//! implementations shell out to the `textract` and `tesseract` CLIs.

pub mod tesseract;
pub mod textract;

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

use crate::schema::WordBox;

/// Extensions tesseract can rasterize directly.
const OCR_IMAGE_TYPES: &[&str] = &[
    "png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp", "pnm", "pbm", "pgm", "ppm", "jp2",
];

/// Tesseract page segmentation modes used by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegmentation {
    /// `--psm 6`: assume a single uniform block of text.
    SingleBlock,
}

impl PageSegmentation {
    pub fn psm(self) -> u8 {
        match self {
            PageSegmentation::SingleBlock => 6,
        }
    }
}

/// One row of OCR output, exactly as the engine emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWord {
    pub text: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Turns a file on disk into text.
#[async_trait::async_trait]
pub trait DocumentExtractor: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the raw bytes of the extracted text.
    async fn extract(&self, path: &Path, language_hint: &str) -> Result<Vec<u8>>;
}

/// Recognizes words and their bounding boxes in an image on disk.
#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Returns every entry in emission order, including empty ones.
    async fn recognize(
        &self,
        path: &Path,
        language_hint: &str,
        segmentation: PageSegmentation,
    ) -> Result<Vec<RawWord>>;
}

/// Whether OCR can be meaningfully applied to files of this type.
pub fn ocr_applicable(file_type: &str) -> bool {
    let file_type = file_type.to_ascii_lowercase();
    OCR_IMAGE_TYPES.contains(&file_type.as_str())
}

/// Drop entries without visible text, keeping the engine's order.
pub fn word_boxes(raw: Vec<RawWord>) -> Vec<WordBox> {
    raw.into_iter()
        .filter(|w| !w.text.trim().is_empty())
        .map(|w| WordBox {
            text: w.text,
            left: w.left,
            top: w.top,
            width: w.width,
            height: w.height,
        })
        .collect()
}

/// Run a prepared command to completion and fail on a non-zero exit.
pub(crate) async fn run_tool(tool: &str, command: &mut Command) -> Result<Output> {
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("cannot run {}", tool))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} exited with {}: {}", tool, output.status, stderr.trim());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, left: u32) -> RawWord {
        RawWord {
            text: text.to_string(),
            left,
            top: 0,
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn test_word_boxes_filters_blank_and_keeps_order() {
        let boxes = word_boxes(vec![
            raw("", 0),
            raw("Hello", 1),
            raw("   ", 2),
            raw("\t", 3),
            raw("world", 4),
        ]);
        let texts: Vec<_> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world"]);
        assert_eq!(boxes[1].left, 4);
    }

    #[test]
    fn test_word_boxes_keeps_text_untrimmed() {
        let boxes = word_boxes(vec![raw(" a ", 0)]);
        assert_eq!(boxes[0].text, " a ");
    }

    #[test]
    fn test_ocr_applicable() {
        assert!(ocr_applicable("png"));
        assert!(ocr_applicable("JPG"));
        assert!(ocr_applicable("tiff"));
        assert!(!ocr_applicable("txt"));
        assert!(!ocr_applicable("pdf"));
        assert!(!ocr_applicable("docx"));
    }

    #[test]
    fn test_psm() {
        assert_eq!(PageSegmentation::SingleBlock.psm(), 6);
    }

    #[tokio::test]
    async fn test_run_tool_reports_failure() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo boom >&2; exit 3");
        let err = run_tool("sh", &mut command).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_run_tool_missing_binary() {
        let mut command = Command::new("definitely-not-a-real-binary-7f3a");
        let err = run_tool("missing", &mut command).await.unwrap_err();
        assert!(err.to_string().contains("cannot run missing"));
    }
}
