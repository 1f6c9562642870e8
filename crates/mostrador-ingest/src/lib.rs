//! # Mostrador Ingest
//!
//! Turns supplier delivery documents into canonical [`DeliveryRecord`]s.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DocumentIngestor                       │
//! │                                                             │
//! │   albaran.csv ──► tabular ──► schema ──► normalize ──┐      │
//! │                                                      ├──►   │
//! │   foto.jpg ─────► vision (trait) ──► parse payload ──┘      │
//! │                                                             │
//! │               Vec<DeliveryRecord>  (no database access)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two document families, one output shape:
//!
//! - **Tabular**: semicolon/European convention first, comma/Standard as the
//!   fallback; columns identified by keyword sniffing.
//! - **Image**: a vision extractor (behind [`VisionExtractor`]) answers with
//!   a JSON payload that is fence-stripped and deserialized.
//!
//! Applying the records to the ledger is `mostrador-db`'s job.

pub mod error;
pub mod ingestor;
pub mod normalize;
pub mod schema;
pub mod tabular;
pub mod vision;

pub use error::{IngestError, IngestResult};
pub use ingestor::{DocumentIngestor, DocumentKind, IngestConfig};
pub use mostrador_core::DeliveryRecord;
pub use normalize::{NumberFormat, TABULAR_MARGIN};
pub use schema::{resolve_columns, ColumnMap};
pub use tabular::parse_tabular;
pub use vision::{
    GeminiExtractor, VisionExtractor, DEFAULT_VISION_MODEL, EXTRACTION_PROMPT, VISION_MARGIN,
};
