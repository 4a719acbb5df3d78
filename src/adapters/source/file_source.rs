//! File-backed questionnaire source.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::ports::{QuestionnaireSource, SourceError};

/// Reads and writes the questionnaire XML at a fixed path.
#[derive(Debug, Clone)]
pub struct FileQuestionnaireSource {
    path: PathBuf,
}

impl FileQuestionnaireSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuestionnaireSource for FileQuestionnaireSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound(self.describe()),
            _ => SourceError::Io(e.to_string()),
        })
    }

    /// Writes to a sibling temp file first, then renames over the target.
    async fn store(&self, xml: &str) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SourceError::Io(e.to_string()))?;
        }
        let temp = self.path.with_extension("xml.tmp");
        fs::write(&temp, xml)
            .await
            .map_err(|e| SourceError::Io(e.to_string()))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| SourceError::Io(e.to_string()))?;
        info!(path = %self.path.display(), bytes = xml.len(), "Questionnaire written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
