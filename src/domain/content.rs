//! Shape of the portfolio content document.
//!
//! The document itself is handled as a `serde_json::Value` so that any node can
//! be addressed by a [`FieldPath`](super::FieldPath). The typed structs below
//! exist to describe its shape: their JSON Schema is compiled once and used to
//! check documents coming out of storage and every candidate write.

use std::sync::LazyLock;

use jsonschema::{Validator, validator_for};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::image::ImageEntry;

pub const MAX_IMAGES_PER_SERIES: usize = 10;
pub const MIN_IMAGES_PER_SERIES: usize = 1;

macro_rules! default_document_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/content/default.portfolio.json"
        ))
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioContent {
    pub hero: Hero,
    pub about: About,
    pub art_series: Vec<ArtSeries>,
    pub design: Design,
    pub research: Research,
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hero {
    pub name: String,
    pub roles: Vec<String>,
    pub tagline: String,
    pub intro: String,
    /// Hero artwork, owned separately from the series galleries.
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct About {
    pub bio: String,
    pub statement: String,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Education {
    pub year: String,
    pub degree: String,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Experience {
    pub year: String,
    pub role: String,
    pub place: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArtSeries {
    pub id: String,
    pub title: String,
    pub description: String,
    #[schemars(length(min = 1, max = 10))]
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub brand_name: String,
    pub concept: String,
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Collection {
    pub title: String,
    pub desc: String,
    pub image: ImageEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Research {
    pub title: String,
    pub subtitle: String,
    pub context: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Contact {
    pub email: String,
    pub location: String,
    pub copyright: String,
}

static DEFAULT_DOCUMENT: LazyLock<Value> = LazyLock::new(|| {
    serde_json::from_str(default_document_source!())
        .expect("invalid content/default.portfolio.json")
});

static CONTENT_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    let schema = serde_json::to_value(schemars::schema_for!(PortfolioContent))
        .expect("content schema serializes");
    validator_for(&schema).expect("content schema compiles")
});

/// The built-in document served when nothing usable is stored.
pub fn default_document() -> Value {
    DEFAULT_DOCUMENT.clone()
}

/// JSON Schema describing a well-formed content document.
pub fn content_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(PortfolioContent)).unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.issues))]
pub struct SchemaViolation {
    pub issues: Vec<String>,
}

fn summarize(issues: &[String]) -> String {
    match issues.first() {
        Some(first) if issues.len() > 1 => {
            format!("{first} (and {} more issue(s))", issues.len() - 1)
        }
        Some(first) => first.clone(),
        None => "document does not match the content schema".to_string(),
    }
}

/// Checks `document` against the content schema.
pub fn validate_document(document: &Value) -> Result<(), SchemaViolation> {
    if CONTENT_VALIDATOR.is_valid(document) {
        return Ok(());
    }
    let issues = CONTENT_VALIDATOR
        .iter_errors(document)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let location = if pointer.is_empty() {
                "<root>".to_string()
            } else {
                pointer
            };
            format!("{location}: {error}")
        })
        .collect();
    Err(SchemaViolation { issues })
}
