//! Gemini `generateContent` client.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hokusai_core::{AspectRatio, ImageSize};
use hokusai_error::{HokusaiResult, RenderError, RenderErrorKind, StorageError, StorageErrorKind};
use hokusai_interface::RenderDriver;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Image-generation client for the Gemini REST API.
///
/// Reference artifacts are read from storage and attached to the request as
/// inline base64 JPEG parts ahead of the instruction's text part. The
/// response may carry the image either as an `inlineData` part or embedded in
/// a markdown data URL inside a text part; both forms are handled.
pub struct GeminiImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiImageClient {
    /// Build a client with explicit configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> HokusaiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RenderError::new(RenderErrorKind::ClientCreation(e.to_string())))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Build a client from the environment.
    ///
    /// `GEMINI_API_KEY` is required. `GEMINI_API_BASE_URL`,
    /// `HOKUSAI_IMAGE_MODEL`, and `HOKUSAI_RENDER_TIMEOUT_SECS` override the
    /// defaults.
    pub fn from_env() -> HokusaiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| RenderError::new(RenderErrorKind::MissingApiKey))?;
        let base_url =
            std::env::var("GEMINI_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("HOKUSAI_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("HOKUSAI_RENDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(api_key, base_url, model, Duration::from_secs(timeout_secs))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn load_reference(&self, location: &str) -> HokusaiResult<String> {
        let bytes = tokio::fs::read(location).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{location}: {e}")))
        })?;
        Ok(BASE64.encode(bytes))
    }
}

#[async_trait]
impl RenderDriver for GeminiImageClient {
    #[tracing::instrument(skip(self, instruction, reference_artifacts), fields(model = %self.model, references = reference_artifacts.len()))]
    async fn render(
        &self,
        instruction: &str,
        reference_artifacts: &[String],
        size_hint: ImageSize,
        aspect_ratio: AspectRatio,
    ) -> HokusaiResult<Vec<u8>> {
        let mut parts = vec![RequestPart::text(instruction)];
        for location in reference_artifacts {
            parts.push(RequestPart::inline_jpeg(self.load_reference(location).await?));
        }

        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
                image_config: ImageConfig {
                    image_size: size_hint.to_string(),
                    aspect_ratio: aspect_ratio.to_string(),
                },
            },
        };

        tracing::debug!(endpoint = %self.endpoint(), "dispatching render call");
        let response = self
            .http
            .post(format!("{}?key={}", self.endpoint(), self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RenderError::new(RenderErrorKind::Timeout(self.timeout_secs))
                } else {
                    RenderError::new(RenderErrorKind::Request(e.to_string()))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RenderError::new(RenderErrorKind::Request(e.to_string())))?;
        if !status.is_success() {
            return Err(RenderError::new(RenderErrorKind::HttpError {
                status_code: status.as_u16(),
                message: truncate(&body, 500),
            })
            .into());
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RenderError::new(RenderErrorKind::Request(e.to_string())))?;
        let image_base64 = extract_image(&parsed)?;

        let bytes = BASE64
            .decode(image_base64.as_bytes())
            .map_err(|e| RenderError::new(RenderErrorKind::Base64Decode(e.to_string())))?;
        tracing::debug!(bytes = bytes.len(), "render call produced an image");
        Ok(bytes)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl<'a> RequestPart<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline_jpeg(data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg",
                data,
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    image_size: String,
    aspect_ratio: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default, rename = "inlineData")]
    inline_data: Option<ResponseInline>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseInline {
    #[serde(default, rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn markdown_image_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!\[.*?\]\((data:image/[^)]+)\)").unwrap_or_else(|e| {
            unreachable!("invalid markdown image pattern: {e}");
        })
    })
}

fn extract_image(response: &GenerateResponse) -> HokusaiResult<String> {
    if let Some(error) = &response.error {
        return Err(RenderError::new(RenderErrorKind::NoImage(error.message.clone())).into());
    }
    let Some(candidate) = response.candidates.first() else {
        return Err(RenderError::new(RenderErrorKind::NoImage(
            "response carried no candidates".to_string(),
        ))
        .into());
    };

    for part in &candidate.content.parts {
        if let Some(inline) = &part.inline_data {
            if inline.mime_type.starts_with("image/") {
                return Ok(inline.data.clone());
            }
        }
        if let Some(text) = &part.text {
            if let Some(caps) = markdown_image_pattern().captures(text) {
                let data_url = &caps[1];
                if let Some((_, data)) = data_url.split_once(',') {
                    return Ok(data.to_string());
                }
            }
        }
    }

    Err(RenderError::new(RenderErrorKind::NoImage(
        "no image part in any candidate".to_string(),
    ))
    .into())
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inline_image_part() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "here is your page"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "aGVsbG8="}}
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(extract_image(&response).unwrap(), "aGVsbG8=");
    }

    #[test]
    fn extracts_markdown_data_url() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "![page](data:image/png;base64,aGVsbG8=)"}
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(extract_image(&response).unwrap(), "aGVsbG8=");
    }

    #[test]
    fn imageless_response_is_an_error() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "sorry, no image"}]}}]
        }))
        .unwrap();
        let err = extract_image(&response).unwrap_err();
        assert!(err.to_string().contains("No image data"));
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "error": {"message": "quota exceeded"}
        }))
        .unwrap();
        let err = extract_image(&response).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn request_payload_shape_matches_the_wire_contract() {
        let payload = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    RequestPart::text("draw a page"),
                    RequestPart::inline_jpeg("aGVsbG8=".to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
                image_config: ImageConfig {
                    image_size: "2K".to_string(),
                    aspect_ratio: "3:4".to_string(),
                },
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "draw a page");
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
        assert_eq!(
            value["generationConfig"]["imageConfig"]["imageSize"],
            "2K"
        );
        assert_eq!(
            value["generationConfig"]["responseModalities"][0],
            "TEXT"
        );
    }
}
