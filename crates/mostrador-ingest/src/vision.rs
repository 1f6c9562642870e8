//! Vision extraction for photographed delivery notes.
//!
//! Extraction runs behind the [`VisionExtractor`] trait so the ingestor can
//! be tested with a canned extractor; [`GeminiExtractor`] is the production
//! implementation over the Gemini REST API.

use async_trait::async_trait;
use base64::Engine;
use mostrador_core::DeliveryRecord;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{IngestError, IngestResult};
use crate::normalize::round2;

/// Margin the extractor is instructed to apply when a note shows no sale
/// price, and that we apply ourselves when the answer omits one anyway.
pub const VISION_MARGIN: f64 = 1.5;

/// Instruction sent alongside the document image.
///
/// The field names are the contract: [`parse_extraction`] deserializes
/// exactly this shape.
pub const EXTRACTION_PROMPT: &str = "\
Analyze this photo of a supplier delivery note or invoice. Extract every \
product line into a JSON object with this exact structure:\n\
{\"productos\": [{\"codigo\": \"...\", \"nombre\": \"...\", \"unidades\": 1, \
\"costo\": 0.0, \"venta\": 0.0}]}\n\
Rules:\n\
- \"codigo\" is the product code or SKU printed on the line\n\
- \"nombre\" is the product description\n\
- \"unidades\" is the delivered quantity; use 1 if it is not legible\n\
- \"costo\" is the unit cost as a decimal number\n\
- \"venta\" is the sale price if printed; otherwise suggest costo * 1.5\n\
Respond ONLY with the JSON object, no explanations and no markdown fences.";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Model used when the caller does not pick one.
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";

/// A provider that can turn a document image into the extraction payload.
#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Run the instruction against the image, returning the raw model text.
    async fn extract(&self, api_key: &str, image: &[u8], instruction: &str) -> IngestResult<String>;
}

/// Vision extractor backed by the Gemini `generateContent` endpoint.
pub struct GeminiExtractor {
    client: reqwest::Client,
    model: String,
}

impl GeminiExtractor {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
        }
    }
}

impl Default for GeminiExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_VISION_MODEL)
    }
}

fn sniff_mime_type(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, ..] => "image/jpeg",
        [b'R', b'I', b'F', b'F', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

#[async_trait]
impl VisionExtractor for GeminiExtractor {
    async fn extract(&self, api_key: &str, image: &[u8], instruction: &str) -> IngestResult<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": instruction },
                    { "inline_data": {
                        "mime_type": sniff_mime_type(image),
                        "data": encoded,
                    }},
                ],
            }],
        });

        let url = format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IngestError::ExtractionFailed(format!(
                "provider returned {status}: {detail}"
            )));
        }

        let answer: serde_json::Value = response.json().await?;
        answer["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.to_string())
            .ok_or_else(|| {
                IngestError::ExtractionFailed("provider answer carried no text part".to_string())
            })
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

fn default_units() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct ExtractionPayload {
    #[serde(default)]
    productos: Vec<ExtractedItem>,
}

#[derive(Debug, Deserialize)]
struct ExtractedItem {
    codigo: String,
    nombre: String,
    #[serde(default = "default_units")]
    unidades: i64,
    #[serde(default)]
    costo: f64,
    #[serde(default)]
    venta: Option<f64>,
}

/// Strip markdown code fences that models wrap around JSON despite being
/// told not to.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag ("json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Interpret the raw model answer as canonical delivery records.
pub fn parse_extraction(raw: &str) -> IngestResult<Vec<DeliveryRecord>> {
    let cleaned = strip_code_fences(raw);
    let payload: ExtractionPayload = serde_json::from_str(cleaned)
        .map_err(|e| IngestError::MalformedExtraction(e.to_string()))?;

    let records = payload
        .productos
        .into_iter()
        .map(|item| {
            let price = item
                .venta
                .unwrap_or_else(|| round2(item.costo * VISION_MARGIN));
            DeliveryRecord {
                code: item.codigo,
                name: item.nombre,
                cost: item.costo,
                price,
                quantity: item.unidades,
            }
        })
        .collect::<Vec<_>>();

    debug!(records = records.len(), "parsed vision extraction payload");
    Ok(records)
}

// =============================================================================
// Tests
// =============================================================================
