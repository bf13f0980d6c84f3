//! The extraction pipeline behind `POST /textract`.
//!
//! decode payload → scratch file → extract text → (optional) OCR → response.
//! The scratch file lives exactly as long as one call to [`Gateway::process`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::engine::{self, DocumentExtractor, OcrEngine, PageSegmentation};
use crate::error::AppError;
use crate::languages::language_hint;
use crate::schema::{ExtractionRequest, ExtractionResponse, WordBox};
use crate::scratch::ScratchFile;

const MAX_FILE_TYPE_LEN: usize = 16;

/// Runs extraction requests against a pair of engines.
#[derive(Clone)]
pub struct Gateway {
    extractor: Arc<dyn DocumentExtractor>,
    ocr: Arc<dyn OcrEngine>,
    scratch_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    language_hint: String,
}

impl Gateway {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            extractor,
            ocr,
            scratch_dir: None,
            timeout: None,
            language_hint: language_hint(),
        }
    }

    /// Create scratch files under `dir` instead of the OS temp dir.
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Bound each external tool invocation.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handle one decoded request end to end.
    pub async fn process(&self, request: ExtractionRequest) -> Result<ExtractionResponse, AppError> {
        validate_file_type(&request.file_type)?;
        let bytes = decode_payload(&request.data)?;

        info!(
            "Textract start: file_type={} ({} bytes), with_coords={}",
            request.file_type,
            bytes.len(),
            request.with_coords
        );

        let scratch =
            ScratchFile::create_async(self.scratch_dir.clone(), request.file_type.clone(), bytes)
                .await?;
        let result = self.run_engines(&scratch, &request).await;

        // Dropping the scratch file would delete it as well; removing it
        // explicitly lets us log a failed delete.
        if let Err(e) = scratch.remove() {
            warn!("Failed to remove scratch file: {}", e);
        }

        result
    }

    async fn run_engines(
        &self,
        scratch: &ScratchFile,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, AppError> {
        let path = scratch.path();

        let raw = self
            .bounded(self.extractor.name(), self.extractor.extract(path, &self.language_hint))
            .await?
            .map_err(AppError::Extraction)?;
        let text = String::from_utf8(raw)
            .map_err(|e| AppError::Extraction(anyhow::anyhow!("output is not UTF-8: {}", e)))?;
        info!("Textract text completed ({} chars)", text.chars().count());

        let mut data: Vec<WordBox> = Vec::new();
        if request.with_coords {
            if engine::ocr_applicable(&request.file_type) {
                let words = self
                    .bounded(
                        self.ocr.name(),
                        self.ocr
                            .recognize(path, &self.language_hint, PageSegmentation::SingleBlock),
                    )
                    .await?
                    .map_err(AppError::Ocr)?;
                data = engine::word_boxes(words);
                info!("Textract coords completed ({} words)", data.len());
            } else {
                debug!(
                    "Skipping OCR: file_type {} is not a raster image",
                    request.file_type
                );
            }
        }

        Ok(ExtractionResponse { text, data })
    }

    /// Apply the configured timeout, if any, to an engine call.
    async fn bounded<T>(
        &self,
        tool: &str,
        call: impl Future<Output = T>,
    ) -> Result<T, AppError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AppError::Timeout(tool.to_string())),
            None => Ok(call.await),
        }
    }
}

fn validate_file_type(file_type: &str) -> Result<(), AppError> {
    let reason = if file_type.is_empty() {
        "must not be empty"
    } else if file_type.len() > MAX_FILE_TYPE_LEN {
        "is too long"
    } else if !file_type.chars().all(|c| c.is_ascii_alphanumeric()) {
        "must be an extension made of ASCII letters and digits"
    } else {
        return Ok(());
    };

    Err(AppError::InvalidField {
        field: "file_type",
        reason: reason.to_string(),
    })
}

/// Decode standard base64, ignoring embedded whitespace from line-wrapping encoders.
fn decode_payload(data: &str) -> Result<Vec<u8>, AppError> {
    if data.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(BASE64.decode(compact)?)
    } else {
        Ok(BASE64.decode(data)?)
    }
}
