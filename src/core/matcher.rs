//! Payment matcher - turns a bank notification into a credited employee.
//!
//! The matching itself happens in an external model; this module owns the
//! request/response contract and the rules for what may be credited.

use crate::{
    config::app::MatcherConfig,
    errors::{Error, Result},
    models::Employee,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;

/// Result returned by a matcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMatch {
    /// Best-guess employee id, `None` when unsure
    #[serde(default)]
    pub matched_employee_id: Option<String>,
    /// Amount found in the text
    pub amount: f64,
    /// Short reason for the choice
    #[serde(default)]
    pub confidence: String,
}

impl PaymentMatch {
    /// The amount as whole currency units, if it can be credited.
    ///
    /// Only finite, positive amounts qualify.
    #[must_use]
    pub fn credit_amount(&self) -> Option<i64> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return None;
        }
        let rounded = self.amount.round();
        // Cast safety: finite and positive; anything beyond i64 saturates and is still positive.
        #[allow(clippy::cast_possible_truncation)]
        let units = rounded as i64;
        (units > 0).then_some(units)
    }
}

/// A candidate employee sent to the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Employee id
    pub id: String,
    /// Employee name
    pub name: String,
}

impl From<&Employee> for Candidate {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id.clone(),
            name: employee.name.clone(),
        }
    }
}

/// Something that can match payment text against employees.
///
/// One call, no retries. Any failure is reported as an error and must not
/// change state.
pub trait PaymentMatcher: Send + Sync {
    /// Finds the amount and the most likely payer in `text`.
    fn match_payment(
        &self,
        text: &str,
        candidates: &[Candidate],
    ) -> impl Future<Output = Result<PaymentMatch>> + Send;
}

/// Matcher backed by the Gemini `generateContent` REST API.
#[derive(Clone, Debug)]
pub struct GeminiMatcher {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiMatcher {
    /// Creates a matcher using `config` for the model and endpoint.
    #[must_use]
    pub fn new(api_key: String, config: &MatcherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// Prompt sent to the model.
#[must_use]
pub fn build_prompt(text: &str, candidates: &[Candidate]) -> String {
    let employee_list = candidates
        .iter()
        .map(|candidate| format!("{}: {}", candidate.id, candidate.name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a finance assistant reading a bank notification or transfer message.\n\
         \n\
         Employees (ID: Name):\n\
         {employee_list}\n\
         \n\
         Text to analyse:\n\
         \"{text}\"\n\
         \n\
         1. Find the transferred amount.\n\
         2. Using the sender name and transfer description, pick the best matching employee above.\n\
         3. Return that employee's ID if the name matches or nearly matches, otherwise null.\n\
         \n\
         Answer in JSON."
    )
}

fn request_body(prompt: &str) -> serde_json::Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "matchedEmployeeId": { "type": "STRING", "nullable": true },
                    "amount": { "type": "NUMBER" },
                    "confidence": {
                        "type": "STRING",
                        "description": "Short reason for choosing this employee"
                    }
                },
                "required": ["amount"]
            }
        }
    })
}

/// Extracts the JSON answer from a `generateContent` response body.
///
/// # Errors
/// Returns [`Error::Matcher`] when the body has no text part or the text is
/// not a valid [`PaymentMatch`].
pub fn parse_response(body: &str) -> Result<PaymentMatch> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| Error::Matcher {
            message: format!("unexpected response shape: {e}"),
        })?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::Matcher {
            message: "empty response from the model".to_string(),
        })?;

    serde_json::from_str(&text).map_err(|e| Error::Matcher {
        message: format!("could not parse model answer: {e}"),
    })
}

impl PaymentMatcher for GeminiMatcher {
    async fn match_payment(&self, text: &str, candidates: &[Candidate]) -> Result<PaymentMatch> {
        let prompt = build_prompt(text, candidates);
        tracing::debug!(model = %self.model, candidates = candidates.len(), "Calling payment matcher");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(&prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Matcher {
                message: format!("model endpoint returned {status}"),
            });
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_response_extracts_first_part() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "{\"matchedEmployeeId\": \"e1\", \"amount\": 150000, \"confidence\": \"name matches\"}"}]
                }
            }]
        }"#;

        let result = parse_response(body).unwrap();
        assert_eq!(result.matched_employee_id.as_deref(), Some("e1"));
        assert_eq!(result.credit_amount(), Some(150_000));
        assert_eq!(result.confidence, "name matches");
    }

    #[test]
    fn test_parse_response_null_match() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"matchedEmployeeId\": null, \"amount\": 20000}"}]}}]}"#;
        let result = parse_response(body).unwrap();
        assert!(result.matched_employee_id.is_none());
        assert!(result.confidence.is_empty());
    }

    #[test]
    fn test_parse_response_failures() {
        assert!(matches!(parse_response("{}"), Err(Error::Matcher { .. })));
        assert!(matches!(parse_response("garbage"), Err(Error::Matcher { .. })));
        let not_json = r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#;
        assert!(matches!(parse_response(not_json), Err(Error::Matcher { .. })));
    }

    #[test]
    fn test_credit_amount_rules() {
        let with_amount = |amount: f64| PaymentMatch {
            matched_employee_id: Some("e1".to_string()),
            amount,
            confidence: String::new(),
        };
        assert_eq!(with_amount(35_000.4).credit_amount(), Some(35_000));
        assert_eq!(with_amount(0.0).credit_amount(), None);
        assert_eq!(with_amount(-10.0).credit_amount(), None);
        assert_eq!(with_amount(f64::NAN).credit_amount(), None);
        assert_eq!(with_amount(0.2).credit_amount(), None);
    }

    #[test]
    fn test_prompt_lists_candidates() {
        let candidates = vec![Candidate {
            id: "e1".to_string(),
            name: "Lan".to_string(),
        }];
        let prompt = build_prompt("CK 50000 tu LAN", &candidates);
        assert!(prompt.contains("e1: Lan"));
        assert!(prompt.contains("\"CK 50000 tu LAN\""));
    }

    #[test]
    fn test_gemini_url() {
        let matcher = GeminiMatcher::new(
            "key".to_string(),
            &MatcherConfig {
                model: "m".to_string(),
                endpoint: "http://localhost/v1beta/".to_string(),
            },
        );
        assert_eq!(matcher.url(), "http://localhost/v1beta/models/m:generateContent");
    }
}
