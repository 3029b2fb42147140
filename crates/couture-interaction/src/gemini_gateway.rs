//! GeminiGateway - Generation Gateway over the Gemini REST API.
//!
//! Suggestions use a JSON response schema; try-on renders ask for the IMAGE
//! response modality and are attempted one candidate at a time.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use couture_core::config::GeminiConfig;
use couture_core::error::{CoutureError, Result};
use couture_core::generation::{GenerationError, GenerationGateway, SuggestionRequest};
use couture_core::image::{ImageRef, UploadedImage};
use couture_core::outfit::{OutfitCategory, OutfitKind, OutfitVariation, validate_suggestions};

use crate::prompts::{suggestion_prompt, try_on_prompt};
use crate::schema::outfit_response_schema;

const JSON_MIME_TYPE: &str = "application/json";
const IMAGE_MODALITY: &str = "IMAGE";
const NO_IMAGES_MESSAGE: &str = "The AI model failed to generate any images";

/// Generation Gateway that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    base_url: String,
    suggestion_model: String,
    render_model: String,
    render_candidates: usize,
}

impl GeminiGateway {
    /// Creates a gateway from the `[gemini]` config section.
    ///
    /// The API key is passed separately because it may come from the
    /// environment rather than the file.
    pub fn from_config(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CoutureError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            suggestion_model: config.suggestion_model.clone(),
            render_model: config.render_model.clone(),
            render_candidates: config.render_candidates.max(1),
        })
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, GenerationError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                // reqwest includes the URL, which carries the key
                GenerationError::Transport(err.without_url().to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        response
            .json()
            .await
            .map_err(|err| GenerationError::Malformed(format!("Failed to parse Gemini response: {err}")))
    }

    async fn render_once(
        &self,
        body: &GenerateContentRequest,
    ) -> std::result::Result<Vec<ImageRef>, GenerationError> {
        let response = self.send_request(&self.render_model, body).await?;
        Ok(extract_images(response))
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn suggest_outfits(
        &self,
        request: &SuggestionRequest,
    ) -> std::result::Result<Vec<OutfitCategory>, GenerationError> {
        let body = build_suggestion_request(request)?;

        tracing::info!(
            model = %self.suggestion_model,
            season = %request.season,
            occasion = %request.occasion,
            in_depth = request.in_depth,
            "Requesting outfit suggestions"
        );

        let response = self.send_request(&self.suggestion_model, &body).await?;
        let text = extract_text(response)?;
        let categories = parse_suggestions(&text)?;

        tracing::info!(categories = categories.len(), "Received outfit suggestions");
        Ok(categories)
    }

    async fn render_try_on(
        &self,
        image: &UploadedImage,
        outfit_description: &str,
    ) -> std::result::Result<Vec<ImageRef>, GenerationError> {
        let body = build_render_request(image, outfit_description, self.render_candidates)?;
        let body = &body;
        let rendered =
            collect_renders(self.render_candidates, move |_| self.render_once(body)).await?;

        tracing::info!(
            images = rendered.len(),
            attempts = self.render_candidates,
            "Rendered try-on images"
        );
        Ok(rendered)
    }
}

/// Runs `attempts` render calls one after another and pools their images.
///
/// A failed or empty attempt is logged and skipped. Only a run that
/// produced nothing at all is an error.
async fn collect_renders<F, Fut>(
    attempts: usize,
    mut render: F,
) -> std::result::Result<Vec<ImageRef>, GenerationError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = std::result::Result<Vec<ImageRef>, GenerationError>>,
{
    let mut rendered = Vec::new();

    for attempt in 1..=attempts {
        match render(attempt).await {
            Ok(images) => {
                if images.is_empty() {
                    tracing::warn!(attempt, "Render attempt returned no image");
                }
                rendered.extend(images);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Render attempt failed");
            }
        }
    }

    if rendered.is_empty() {
        return Err(GenerationError::Empty(NO_IMAGES_MESSAGE.to_string()));
    }
    Ok(rendered)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineDataPayload>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Suggestion response entry, as the schema names its fields.
#[derive(Deserialize)]
struct SuggestionDto {
    #[serde(rename = "type")]
    kind: OutfitKind,
    outfits: Vec<VariationDto>,
}

#[derive(Deserialize)]
struct VariationDto {
    description: String,
    #[serde(default)]
    items: Vec<String>,
}

impl From<SuggestionDto> for OutfitCategory {
    fn from(dto: SuggestionDto) -> Self {
        OutfitCategory::new(
            dto.kind,
            dto.outfits
                .into_iter()
                .map(|v| OutfitVariation::new(v.description, v.items))
                .collect(),
        )
    }
}

// ============================================================================
// Request building and response decoding
// ============================================================================

fn image_part(image: &UploadedImage) -> Part {
    Part::InlineData {
        inline_data: InlineDataPayload {
            mime_type: image.mime_type().to_string(),
            data: image.base64_payload(),
        },
    }
}

fn user_content(image: &UploadedImage, prompt: String) -> Vec<Content> {
    vec![Content {
        role: "user".to_string(),
        parts: vec![image_part(image), Part::Text { text: prompt }],
    }]
}

fn build_suggestion_request(
    request: &SuggestionRequest,
) -> std::result::Result<GenerateContentRequest, GenerationError> {
    let prompt = suggestion_prompt(&request.season, &request.occasion, request.in_depth)?;
    Ok(GenerateContentRequest {
        contents: user_content(&request.image, prompt),
        generation_config: Some(GenerationConfig {
            response_mime_type: Some(JSON_MIME_TYPE.to_string()),
            response_schema: Some(outfit_response_schema()),
            ..Default::default()
        }),
    })
}

fn build_render_request(
    image: &UploadedImage,
    outfit_description: &str,
    candidates: usize,
) -> std::result::Result<GenerateContentRequest, GenerationError> {
    let prompt = try_on_prompt(outfit_description, candidates)?;
    Ok(GenerateContentRequest {
        contents: user_content(image, prompt),
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec![IMAGE_MODALITY.to_string()]),
            ..Default::default()
        }),
    })
}

fn candidate_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text(
    response: GenerateContentResponse,
) -> std::result::Result<String, GenerationError> {
    let text: String = candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(GenerationError::Empty(
            "Gemini API returned no text in the response candidates".to_string(),
        ));
    }
    Ok(text)
}

fn extract_images(response: GenerateContentResponse) -> Vec<ImageRef> {
    candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.inline_data)
        .filter(|inline| !inline.data.is_empty())
        .map(|inline| ImageRef::from_inline(&inline.mime_type, &inline.data))
        .collect()
}

/// Decodes and validates the JSON suggestion payload.
fn parse_suggestions(text: &str) -> std::result::Result<Vec<OutfitCategory>, GenerationError> {
    let json = strip_code_fence(text.trim());
    let dtos: Vec<SuggestionDto> = serde_json::from_str(json)
        .map_err(|e| GenerationError::Malformed(format!("suggestions are not valid JSON: {e}")))?;
    validate_suggestions(dtos.into_iter().map(OutfitCategory::from).collect())
}

fn strip_code_fence(text: &str) -> &str {
    text.strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(text)
}

fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    GenerationError::Backend {
        status: Some(status.as_u16()),
        message,
        retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo() -> UploadedImage {
        UploadedImage::new(b"photo".to_vec(), "image/jpeg").unwrap()
    }

    fn variation_json(n: usize) -> Value {
        json!({ "description": format!("Look {n}"), "items": [format!("Item {n}")] })
    }

    fn category_json(kind: &str) -> Value {
        json!({ "type": kind, "outfits": [variation_json(1), variation_json(2), variation_json(3)] })
    }

    #[test]
    fn test_suggestion_request_shape() {
        let request = SuggestionRequest {
            image: photo(),
            season: "Summer".to_string(),
            occasion: "Party Look".to_string(),
            in_depth: false,
        };
        let body = serde_json::to_value(build_suggestion_request(&request).unwrap()).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], photo().base64_payload());
        assert!(parts[1]["text"].as_str().unwrap().contains("'Party Look'"));

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert!(config["responseSchema"].is_object());
        assert!(config.get("responseModalities").is_none());
    }

    #[test]
    fn test_render_request_asks_for_images() {
        let body =
            serde_json::to_value(build_render_request(&photo(), "Red gown", 3).unwrap()).unwrap();
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert!(body["generationConfig"].get("responseSchema").is_none());
        assert!(
            body["contents"][0]["parts"][1]["text"]
                .as_str()
                .unwrap()
                .contains("\"Red gown\"")
        );
    }

    #[test]
    fn test_parse_full_suggestion_set() {
        let text = json!([
            category_json("Formal"),
            category_json("Casual"),
            category_json("Stylish")
        ])
        .to_string();

        let categories = parse_suggestions(&text).unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[1].kind, OutfitKind::Casual);
        assert_eq!(categories[2].variations[2].description, "Look 3");
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let text = format!("```json\n{}\n```", json!([category_json("Formal")]));
        assert_eq!(parse_suggestions(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_rejects_wrong_variation_count() {
        let text = json!([{ "type": "Formal", "outfits": [variation_json(1)] }]).to_string();
        assert!(matches!(
            parse_suggestions(&text),
            Err(GenerationError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert!(matches!(parse_suggestions("[]"), Err(GenerationError::Empty(_))));
        assert!(matches!(
            parse_suggestions("not json"),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestions(&json!([category_json("Sporty")]).to_string()),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_images_as_data_uris() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                    { "inlineData": { "mimeType": "image/png", "data": "" } }
                ]}
            }]
        }))
        .unwrap();

        let images = extract_images(response);
        assert_eq!(images, vec![ImageRef::from("data:image/png;base64,AAAA")]);
    }

    #[test]
    fn test_extract_text_requires_content() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(extract_text(response), Err(GenerationError::Empty(_))));
    }

    #[test]
    fn test_map_http_error() {
        let body = json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })
        .to_string();
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body,
            Some(Duration::from_secs(7)),
        );

        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "RESOURCE_EXHAUSTED: Quota exceeded");
        match err {
            GenerationError::Backend {
                status,
                retry_after,
                ..
            } => {
                assert_eq!(status, Some(429));
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = map_http_error(StatusCode::BAD_REQUEST, "plain text".to_string(), None);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "plain text");
    }

    #[test]
    fn test_parse_retry_after() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));

        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    fn scripted(
        replies: Vec<std::result::Result<Vec<ImageRef>, GenerationError>>,
    ) -> impl FnMut(usize) -> std::future::Ready<std::result::Result<Vec<ImageRef>, GenerationError>>
    {
        let mut replies = replies.into_iter();
        move |_| {
            std::future::ready(
                replies
                    .next()
                    .unwrap_or_else(|| panic!("more render attempts than scripted")),
            )
        }
    }

    fn backend_down() -> GenerationError {
        GenerationError::Transport("connection reset".to_string())
    }

    #[tokio::test]
    async fn test_collect_renders_skips_failed_attempts() {
        let image = ImageRef::from_inline("image/png", "AAAA");
        let mut calls = Vec::new();
        let mut script = scripted(vec![
            Err(backend_down()),
            Ok(vec![image.clone()]),
            Err(backend_down()),
        ]);

        let rendered = collect_renders(3, |attempt| {
            calls.push(attempt);
            script(attempt)
        })
        .await
        .unwrap();

        assert_eq!(rendered, vec![image]);
        assert_eq!(calls, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_collect_renders_keeps_partial_results() {
        let first = ImageRef::from_inline("image/png", "AAAA");
        let second = ImageRef::from_inline("image/png", "BBBB");

        let rendered = collect_renders(
            3,
            scripted(vec![
                Ok(vec![first.clone()]),
                Ok(Vec::new()),
                Ok(vec![second.clone()]),
            ]),
        )
        .await
        .unwrap();

        assert_eq!(rendered, vec![first, second]);
    }

    #[tokio::test]
    async fn test_collect_renders_empty_when_every_attempt_fails() {
        let err = collect_renders(
            3,
            scripted(vec![Err(backend_down()), Ok(Vec::new()), Err(backend_down())]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GenerationError::Empty(ref msg) if msg == NO_IMAGES_MESSAGE));
    }
}
