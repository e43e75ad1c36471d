/// Edit service client
///
/// Thin boundary to the remote image-editing service. One request carries
/// the uploaded image inline plus the instruction text; the first inline
/// image part of the response is the edited result. Endpoint, model and
/// API key come from the environment, which is the service's own setup
/// and not part of the workflow core.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Public endpoint used when `GEMINI_API_BASE` is not set.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Image-capable model used when `GEMINI_IMAGE_MODEL` is not set.
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// What the workflow hands over for one edit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Base64 payload of the uploaded image, no data-URI prefix
    pub image_base64: String,
    /// Media type of the uploaded image (e.g., "image/png")
    pub media_type: String,
    /// Trimmed instruction text
    pub prompt: String,
}

/// The service's answer: the edited image payload and its decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    pub payload: String,
    pub bytes: Vec<u8>,
}

/// Service failures. `Display` is the text shown to the user, verbatim.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No API key set. Export GEMINI_API_KEY (or GOOGLE_API_KEY) and restart.")]
    MissingApiKey,
    #[error("The edit request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Error message reported by the service itself
    #[error("{0}")]
    Api(String),
    #[error("The edit service returned no image data.")]
    EmptyResponse,
    #[error("The edit service returned an image that could not be decoded.")]
    UndecodablePayload(#[from] base64::DecodeError),
}

/// Client for the remote edit service.
#[derive(Debug, Clone)]
pub struct EditClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
}

impl EditClient {
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: non_empty_env("GEMINI_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: non_empty_env("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn api_key() -> Option<String> {
        non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }

    /// Submit one edit request.
    ///
    /// Exactly one attempt; the user re-invokes Generate to try again.
    pub async fn edit(&self, request: EditRequest) -> Result<EditedImage, ServiceError> {
        let api_key = Self::api_key().ok_or(ServiceError::MissingApiKey)?;

        println!(
            "🚀 Requesting edit from {} ({} payload chars)",
            self.model,
            request.image_base64.len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&request.to_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("The edit service returned HTTP {status}."));
            return Err(ServiceError::Api(message));
        }

        let body: GenerateContentResponse = response.json().await?;
        let payload = first_image_payload(body).ok_or(ServiceError::EmptyResponse)?;
        let bytes = BASE64.decode(payload.as_bytes())?;

        println!("✅ Edit complete ({} bytes returned)", bytes.len());

        Ok(EditedImage { payload, bytes })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentBody {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

impl EditRequest {
    /// The image part goes first, the instruction text second.
    fn to_body(&self) -> GenerateContentBody {
        GenerateContentBody {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: self.media_type.clone(),
                            data: self.image_base64.clone(),
                        },
                    },
                    Part::Text {
                        text: self.prompt.clone(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    // The service spells this both ways depending on the route
    #[serde(rename = "inlineData", alias = "inline_data", default)]
    inline_data: Option<ResponseInline>,
}

#[derive(Debug, Deserialize)]
struct ResponseInline {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// First non-empty inline image across all candidates and parts.
fn first_image_payload(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .map(|inline| inline.data)
        .find(|data| !data.is_empty())
}
