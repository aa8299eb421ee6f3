//! Tag extraction: normalised receipt text → structured `TagSet`.
//!
//! One completion call per receipt. The service is asked for a fixed
//! three-field JSON object; the response is parsed defensively and every
//! failure mode degrades to `TagSet::unknown()` — extraction trouble must
//! never abort an ingestion that already paid for storage and OCR.

use std::sync::Arc;

use kvitta_db::TagSet;
use kvitta_llm::{LlmBackend, LlmRequest, Message};
use tracing::{debug, warn};

/// Extraction result: the tags plus, when the fallback was used, the reason.
///
/// `degraded: Some(_)` distinguishes "the receipt genuinely had no vendor"
/// from "the extraction service failed"; both carry usable tags.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub tags: TagSet,
    pub degraded: Option<String>,
}

pub struct TagExtractor {
    backend: Arc<dyn LlmBackend>,
}

impl TagExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Extract vendor / items / price from normalised receipt text.
    pub async fn extract(&self, receipt_text: &str) -> ExtractionOutcome {
        let request = LlmRequest {
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(receipt_text),
            }],
            model: None,
            max_tokens: Some(1024),
            temperature: Some(0.0),
        };

        match self.backend.complete(request).await {
            Ok(response) => match parse_tags(&response.content) {
                Some(tags) => {
                    debug!(model = %response.model, vendor = %tags.vendor, "tags extracted");
                    ExtractionOutcome {
                        tags,
                        degraded: None,
                    }
                }
                None => degraded("no parsable JSON object in extraction response"),
            },
            Err(e) => degraded(format!("extraction backend failed: {e}")),
        }
    }
}

fn degraded(reason: impl Into<String>) -> ExtractionOutcome {
    let reason = reason.into();
    warn!(reason = %reason, "tag extraction degraded, using fallback tags");
    ExtractionOutcome {
        tags: TagSet::unknown(),
        degraded: Some(reason),
    }
}

/// The extraction contract: three fields, only explicit information,
/// `"Unknown"`/`0` for gaps, JSON only.
fn build_prompt(receipt_text: &str) -> String {
    format!(
        r#"You are a strict data extractor. Given a raw receipt text, extract exactly this information:

- "vendor": Store name
- "product_or_service": A comma-separated list of purchased items
- "price": Total paid amount in SEK as a number (float)

Do not guess or invent any information.
Only use what is explicitly visible in the receipt text.
If any field is missing, return "Unknown" or 0.

Return only valid JSON in this format:
{{
  "vendor": "...",
  "product_or_service": "...",
  "price": ...
}}

Here is the receipt text:
"""
{receipt_text}
"""
"#
    )
}

/// Pull the JSON object out of a possibly chatty response.
///
/// Takes the substring from the first `{` to the last `}` inclusive, so
/// conversational wrapping ("Sure! … thanks") is tolerated.
fn parse_tags(raw: &str) -> Option<TagSet> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
    value.as_object()?;

    Some(TagSet {
        vendor: string_field(&value, "vendor"),
        product_or_service: string_field(&value, "product_or_service"),
        price: coerce_price(&value["price"]),
    })
}

fn string_field(value: &serde_json::Value, key: &str) -> String {
    match value[key].as_str() {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Coerce whatever the model put in `price` to a non-negative float.
fn coerce_price(value: &serde_json::Value) -> f64 {
    let price = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    price.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = r#"Sure! {"vendor":"ICA","product_or_service":"Milk","price":19.9} thanks"#;
        let tags = parse_tags(raw).unwrap();
        assert_eq!(tags.vendor, "ICA");
        assert_eq!(tags.product_or_service, "Milk");
        assert_eq!(tags.price, 19.9);
    }

    #[test]
    fn missing_fields_become_unknown() {
        let tags = parse_tags("{}").unwrap();
        assert_eq!(tags, TagSet::unknown());
    }

    #[test]
    fn garbage_is_unparsable() {
        assert!(parse_tags("no json here").is_none());
        assert!(parse_tags("} backwards {").is_none());
        assert!(parse_tags(r#"[1, 2, 3]"#).is_none());
    }

    #[test]
    fn price_coercion_handles_strings_and_junk() {
        assert_eq!(coerce_price(&json!(42.5)), 42.5);
        assert_eq!(coerce_price(&json!("19.90")), 19.9);
        assert_eq!(coerce_price(&json!("not a price")), 0.0);
        assert_eq!(coerce_price(&json!(null)), 0.0);
        assert_eq!(coerce_price(&json!(-3.0)), 0.0);
    }

    #[test]
    fn prompt_embeds_the_receipt_verbatim() {
        let prompt = build_prompt("Coop\n123.45");
        assert!(prompt.contains("Coop\n123.45"));
        assert!(prompt.contains(r#""vendor""#));
    }
}
