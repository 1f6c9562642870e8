//! The document ingestor: one entry point for every delivery document.
//!
//! Routes by file extension: delimited text goes through the tabular parser,
//! photos go through the vision extractor. Either way the output is the same
//! canonical record list, so callers apply deliveries without caring where
//! they came from.

use std::time::Duration;

use mostrador_core::DeliveryRecord;
use tracing::{info, warn};

use crate::error::{IngestError, IngestResult};
use crate::tabular::parse_tabular;
use crate::vision::{parse_extraction, VisionExtractor, EXTRACTION_PROMPT};

/// What kind of document a file name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Delimited text (CSV or plain-text export).
    Tabular,
    /// A photo or scan to run through vision extraction.
    Image,
}

impl DocumentKind {
    /// Classify a file by its extension; `None` means unsupported.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = file_name.rsplit_once('.')?.1.to_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(DocumentKind::Tabular),
            "png" | "jpg" | "jpeg" | "webp" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Credential for the vision provider; `None` disables image ingestion.
    pub api_key: Option<String>,
    /// Upper bound on a single extraction call.
    pub vision_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            vision_timeout: Duration::from_secs(30),
        }
    }
}

/// Turns delivery documents into canonical records.
pub struct DocumentIngestor {
    config: IngestConfig,
    extractor: Option<Box<dyn VisionExtractor>>,
}

impl DocumentIngestor {
    /// Ingestor without vision support: tabular documents only.
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            extractor: None,
        }
    }

    /// Ingestor with a vision extractor wired in.
    pub fn with_extractor(config: IngestConfig, extractor: Box<dyn VisionExtractor>) -> Self {
        Self {
            config,
            extractor: Some(extractor),
        }
    }

    /// Replace the vision credential at runtime.
    ///
    /// An empty key clears the credential, disabling image ingestion until
    /// a real one is set again.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            warn!("vision credential cleared");
            self.config.api_key = None;
        } else {
            info!("vision credential updated");
            self.config.api_key = Some(api_key);
        }
    }

    /// Whether image documents can currently be ingested.
    pub fn vision_ready(&self) -> bool {
        self.extractor.is_some()
            && self
                .config
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }

    /// Ingest a delivery document, routing on its file name.
    pub async fn ingest(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> IngestResult<Vec<DeliveryRecord>> {
        let kind = DocumentKind::from_file_name(file_name).ok_or_else(|| {
            let extension = file_name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
                .unwrap_or_default();
            IngestError::UnsupportedDocument(extension)
        })?;

        info!(file_name, ?kind, size = bytes.len(), "ingesting delivery document");
        match kind {
            DocumentKind::Tabular => parse_tabular(bytes),
            DocumentKind::Image => self.extract_from_image(bytes).await,
        }
    }

    async fn extract_from_image(&self, image: &[u8]) -> IngestResult<Vec<DeliveryRecord>> {
        let extractor = self
            .extractor
            .as_ref()
            .ok_or(IngestError::CapabilityUnavailable)?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(IngestError::MissingCredential)?;

        let raw = tokio::time::timeout(
            self.config.vision_timeout,
            extractor.extract(api_key, image, EXTRACTION_PROMPT),
        )
        .await
        .map_err(|_| {
            IngestError::ExtractionFailed(format!(
                "timed out after {:?}",
                self.config.vision_timeout
            ))
        })??;

        parse_extraction(&raw)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Extractor that returns a fixed answer, recording nothing.
    struct CannedExtractor {
        answer: String,
    }

    #[async_trait]
    impl VisionExtractor for CannedExtractor {
        async fn extract(
            &self,
            _api_key: &str,
            _image: &[u8],
            _instruction: &str,
        ) -> IngestResult<String> {
            Ok(self.answer.clone())
        }
    }

    /// Extractor that never answers, for exercising the timeout.
    struct StalledExtractor;

    #[async_trait]
    impl VisionExtractor for StalledExtractor {
        async fn extract(
            &self,
            _api_key: &str,
            _image: &[u8],
            _instruction: &str,
        ) -> IngestResult<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn config_with_key() -> IngestConfig {
        IngestConfig {
            api_key: Some("test-key".to_string()),
            ..IngestConfig::default()
        }
    }

    #[test]
    fn classifies_extensions() {
        assert_eq!(
            DocumentKind::from_file_name("albaran.CSV"),
            Some(DocumentKind::Tabular)
        );
        assert_eq!(
            DocumentKind::from_file_name("foto.jpeg"),
            Some(DocumentKind::Image)
        );
        assert_eq!(DocumentKind::from_file_name("albaran.pdf"), None);
        assert_eq!(DocumentKind::from_file_name("no_extension"), None);
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let ingestor = DocumentIngestor::new(IngestConfig::default());
        let err = ingestor.ingest("albaran.pdf", b"%PDF").await.unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedDocument(ext) if ext == "pdf"));
    }

    #[tokio::test]
    async fn tabular_path_works_without_vision() {
        let ingestor = DocumentIngestor::new(IngestConfig::default());
        let doc = b"Codigo;Producto;Cantidad;Coste\nA-1;Leche;6;0,85\n";
        let records = ingestor.ingest("albaran.csv", doc).await.expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "A-1");
    }

    #[tokio::test]
    async fn image_without_extractor_is_unavailable() {
        let ingestor = DocumentIngestor::new(config_with_key());
        let err = ingestor.ingest("foto.png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, IngestError::CapabilityUnavailable));
    }

    #[tokio::test]
    async fn image_without_credential_is_rejected() {
        let ingestor = DocumentIngestor::with_extractor(
            IngestConfig::default(),
            Box::new(CannedExtractor {
                answer: "{}".to_string(),
            }),
        );
        let err = ingestor.ingest("foto.png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, IngestError::MissingCredential));
    }

    #[tokio::test]
    async fn image_path_parses_canned_answer() {
        let answer = r#"{"productos": [{"codigo": "A-1", "nombre": "Leche", "unidades": 6, "costo": 0.85, "venta": 1.30}]}"#;
        let ingestor = DocumentIngestor::with_extractor(
            config_with_key(),
            Box::new(CannedExtractor {
                answer: answer.to_string(),
            }),
        );
        let records = ingestor.ingest("foto.jpg", b"\xFF\xD8").await.expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Leche");
        assert_eq!(records[0].quantity, 6);
    }

    #[tokio::test]
    async fn stalled_extraction_times_out() {
        let config = IngestConfig {
            api_key: Some("test-key".to_string()),
            vision_timeout: Duration::from_millis(50),
        };
        let ingestor = DocumentIngestor::with_extractor(config, Box::new(StalledExtractor));
        let err = ingestor.ingest("foto.png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, IngestError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn api_key_can_be_updated_and_cleared() {
        let mut ingestor = DocumentIngestor::with_extractor(
            IngestConfig::default(),
            Box::new(CannedExtractor {
                answer: "{}".to_string(),
            }),
        );
        assert!(!ingestor.vision_ready());

        ingestor.set_api_key("fresh-key");
        assert!(ingestor.vision_ready());
        let records = ingestor.ingest("foto.png", b"\x89PNG").await.expect("parse");
        assert!(records.is_empty());

        ingestor.set_api_key("   ");
        assert!(!ingestor.vision_ready());
        let err = ingestor.ingest("foto.png", b"\x89PNG").await.unwrap_err();
        assert!(matches!(err, IngestError::MissingCredential));
    }
}
