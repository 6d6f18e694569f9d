use super::Responder;
use crate::model::{AiResponse, TestContent};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Answers every prompt with the contents of a file. Lets operators score a
/// recorded answer through the full administration path.
#[derive(Debug, Clone)]
pub struct FileResponder {
    path: PathBuf,
}

impl FileResponder {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Responder for FileResponder {
    async fn respond(
        &self,
        _agent: &str,
        _prompt: &str,
        _content: &TestContent,
    ) -> anyhow::Result<AiResponse> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            anyhow::anyhow!(
                "failed to read response file '{}': {}",
                self.path.display(),
                e
            )
        })?;
        Ok(AiResponse {
            text,
            source: self.provider_name().to_string(),
            meta: serde_json::json!({ "path": self.path.display().to_string() }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "file"
    }
}
