//! Document extractor backed by the `textract` CLI.

use super::{run_tool, DocumentExtractor};
use anyhow::Result;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

pub struct TextractCli {
    bin: String,
}

impl TextractCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn command(&self, path: &Path, language_hint: &str) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .arg("--option")
            .arg(format!("language={}", language_hint))
            .arg(path);
        command
    }
}

#[async_trait::async_trait]
impl DocumentExtractor for TextractCli {
    fn name(&self) -> &str {
        "textract"
    }

    async fn extract(&self, path: &Path, language_hint: &str) -> Result<Vec<u8>> {
        debug!("textract: processing {:?}", path);
        let output = run_tool("textract", &mut self.command(path, language_hint)).await?;
        Ok(output.stdout)
    }
}
