use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ParseResult, Transaction};
use crate::parser::{ParseRequest, Parser};

const TEXT_PROMPT: &str = "You are a financial parser. Extract transaction details into JSON. Text: ";
const IMAGE_PROMPT: &str = "Extract transaction details from this receipt, screenshot, or payment alert into JSON format.";
const AUDIO_PROMPT: &str = "This is a voice recording of someone describing an expense. Extract the transaction details into JSON format.";
const INSIGHT_PROMPT: &str = "You are Axiony, a calm, supportive financial AI. Based on these recent micro-spends: [{summary}], provide a single-sentence pearl of wisdom about financial awareness. Be encouraging, never judgmental.";

#[derive(Debug, Error)]
enum GeminiError {
    #[error("Gemini request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String
    },
    #[error("Gemini returned no text")]
    EmptyResponse
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiParser {
    client: Client,
    api_key: String,
    endpoint: String
}

impl GeminiParser {
    pub fn new(api_key: &str, model: &str, api_base: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}/v1beta/models/{model}:generateContent", api_base.trim_end_matches('/'))
        })
    }

    async fn generate(&self, body: &GenerateRequest) -> Result<String, GeminiError> {
        let response = self.client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status { status, body });
        }

        let decoded: GenerateResponse = response.json().await?;
        response_text(&decoded).ok_or(GeminiError::EmptyResponse)
    }
}

impl Parser for GeminiParser {
    async fn parse(&self, request: ParseRequest) -> Option<ParseResult> {
        let body = parse_request_body(&request);

        match self.generate(&body).await {
            Ok(text) => {
                debug!("Gemini answered: {text}");
                let parsed = ParseResult::from_json(&text);
                if parsed.is_none() {
                    warn!("Gemini answer was not a JSON object");
                }
                parsed
            }
            Err(GeminiError::EmptyResponse) => Some(ParseResult::default()),
            Err(error) => {
                warn!("{error}");
                None
            }
        }
    }

    async fn insight(&self, recent: &[Transaction]) -> Option<String> {
        let body = insight_request_body(recent);

        match self.generate(&body).await {
            Ok(text) => Some(text.trim().to_string()),
            Err(GeminiError::EmptyResponse) => Some(String::new()),
            Err(error) => {
                warn!("{error}");
                None
            }
        }
    }
}

fn transaction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "amount": { "type": "NUMBER", "description": "The transaction amount as a number" },
            "merchant": { "type": "STRING", "description": "Name of the merchant or recipient" },
            "category": {
                "type": "STRING",
                "description": "One of: Food, Travel, Subscriptions, Impulse, Misc, Utilities"
            },
            "timestamp": { "type": "STRING", "description": "ISO 8601 timestamp" }
        },
        "required": ["amount", "merchant", "category", "timestamp"]
    })
}

pub(crate) fn parse_request_body(request: &ParseRequest) -> GenerateRequest {
    let parts = match request {
        ParseRequest::Text(text) => vec![Part::Text { text: format!("{TEXT_PROMPT}\"{text}\"") }],
        ParseRequest::Image { bytes, mime } => vec![inline_part(bytes, mime), Part::Text { text: IMAGE_PROMPT.to_string() }],
        ParseRequest::Audio { bytes, mime } => vec![inline_part(bytes, mime), Part::Text { text: AUDIO_PROMPT.to_string() }]
    };

    GenerateRequest {
        contents: vec![Content { parts }],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json",
            response_schema: transaction_schema()
        })
    }
}

pub(crate) fn insight_request_body(recent: &[Transaction]) -> GenerateRequest {
    let summary = recent.iter()
        .map(|transaction| format!("₹{} at {} ({})", transaction.amount, transaction.merchant, transaction.category))
        .collect::<Vec<_>>()
        .join(", ");

    GenerateRequest {
        contents: vec![Content { parts: vec![Part::Text { text: INSIGHT_PROMPT.replace("{summary}", &summary) }] }],
        generation_config: None
    }
}

fn inline_part(bytes: &[u8], mime: &str) -> Part {
    Part::Inline {
        inline_data: InlineData {
            mime_type: mime.to_string(),
            data: STANDARD.encode(bytes)
        }
    }
}

/// Text of the first candidate, `None` when it has none.
pub(crate) fn response_text(response: &GenerateResponse) -> Option<String> {
    let text: String = response.candidates.first()?
        .content.as_ref()?
        .parts.iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}
