use std::io::{BufRead, BufReader};

use serde::Deserialize;

use super::gemini_types::{ApiErrorBody, GenerateContentRequest, StreamChunk};
use super::types::{FragmentStream, GenerationConfig, GenerativeModel, TextFragment};
use super::GenerationError;
use crate::config::GeminiSettings;

/// Gemini HTTP client for hosted streaming generation.
///
/// Built once at startup from `GeminiSettings` and shared by reference.
/// Only a connect timeout is set: once the stream is open the client waits
/// for fragments indefinitely.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GenerationError> {
        if !settings.has_api_key() {
            tracing::warn!("GOOGLE_API_KEY is not set; generation requests will be rejected");
        }

        let client = reqwest::blocking::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(&GeminiSettings::from_env())
    }

    /// Streaming endpoint for the configured model, SSE framing.
    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

impl GenerativeModel for GeminiClient {
    fn stream_generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<FragmentStream<'_>, GenerationError> {
        let body = GenerateContentRequest::user_prompt(prompt, config.temperature);

        let response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GenerationError::Connection(self.base_url.clone())
                } else {
                    GenerationError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: api_error_message(&body),
            });
        }

        Ok(Box::new(SseFragments::new(BufReader::new(response))))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

/// Pull the human-readable message out of a Gemini error body, falling back
/// to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.to_string())
}

// ═══════════════════════════════════════════════════════════
// SSE decoding
// ═══════════════════════════════════════════════════════════

/// Blocking iterator over the `data:` events of a Gemini SSE body.
///
/// Each event with text becomes one fragment. Events with no text are
/// skipped. The first error ends iteration.
pub struct SseFragments<R> {
    reader: R,
    line: String,
    next_index: usize,
    done: bool,
}

impl<R: BufRead> SseFragments<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            next_index: 0,
            done: false,
        }
    }

    fn fail(&mut self, error: GenerationError) -> Option<Result<TextFragment, GenerationError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<R: BufRead> Iterator for SseFragments<R> {
    type Item = Result<TextFragment, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => return self.fail(GenerationError::Stream(e.to_string())),
            }

            // Comments, event names, ids and blank separators carry no payload
            let Some(payload) = self.line.strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim();
            if payload.is_empty() {
                continue;
            }

            let chunk: StreamChunk = match serde_json::from_str(payload) {
                Ok(chunk) => chunk,
                Err(e) => return self.fail(GenerationError::ResponseParsing(e.to_string())),
            };

            if let Some(error) = chunk.error {
                return self.fail(GenerationError::Api {
                    status: error.code,
                    body: error.message,
                });
            }

            let text = chunk.text();
            if text.is_empty() {
                if let Some(reason) = chunk.block_reason() {
                    return self.fail(GenerationError::Blocked(reason));
                }
                continue;
            }

            let index = self.next_index;
            self.next_index += 1;
            return Some(Ok(TextFragment { index, text }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn data(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":{}}}],\"role\":\"model\"}}}}]}}\r\n\r\n",
            serde_json::to_string(text).unwrap()
        )
    }

    fn collect(body: &str) -> Vec<Result<TextFragment, GenerationError>> {
        SseFragments::new(Cursor::new(body.to_string().into_bytes())).collect()
    }

    #[test]
    fn decodes_fragments_in_order() {
        let body = format!("{}{}{}", data("The "), data("patient "), data("reports"));
        let items = collect(&body);

        let texts: Vec<_> = items.iter().map(|i| i.as_ref().unwrap().text.as_str()).collect();
        assert_eq!(texts, vec!["The ", "patient ", "reports"]);
        let indexes: Vec<_> = items.iter().map(|i| i.as_ref().unwrap().index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[test]
    fn preserves_markdown_and_newlines_in_text() {
        let items = collect(&data("### 🔍 Explain Symptoms\n\n- item"));
        assert_eq!(items[0].as_ref().unwrap().text, "### 🔍 Explain Symptoms\n\n- item");
    }

    #[test]
    fn skips_comments_and_textless_events() {
        let body = format!(
            ": keep-alive\n\nevent: message\n{}data: {{\"usageMetadata\":{{\"totalTokenCount\":9}}}}\n\n{}",
            data("A"),
            data("B")
        );
        let texts: Vec<_> = collect(&body)
            .into_iter()
            .map(|i| i.unwrap().text)
            .collect();
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[test]
    fn empty_body_yields_nothing() {
        assert!(collect("").is_empty());
    }

    #[test]
    fn error_event_ends_stream() {
        let body = format!(
            "{}data: {{\"error\":{{\"code\":500,\"message\":\"Internal error\"}}}}\n\n{}",
            data("A"),
            data("never")
        );
        let items = collect(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().text, "A");
        assert_eq!(
            items[1],
            Err(GenerationError::Api {
                status: 500,
                body: "Internal error".into()
            })
        );
    }

    #[test]
    fn blocked_prompt_is_error() {
        let items = collect("data: {\"promptFeedback\":{\"blockReason\":\"SAFETY\"}}\n\n");
        assert_eq!(items, vec![Err(GenerationError::Blocked("SAFETY".into()))]);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let items = collect("data: {not json\n\n");
        assert!(matches!(items[0], Err(GenerationError::ResponseParsing(_))));
        assert_eq!(items.len(), 1);
    }

    /// Reader that serves `prefix` and then fails like a dropped connection.
    struct BrokenReader {
        prefix: Cursor<Vec<u8>>,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.prefix.read(buf)?;
            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                ));
            }
            Ok(n)
        }
    }

    #[test]
    fn io_failure_mid_stream_is_stream_error() {
        let reader = BufReader::new(BrokenReader {
            prefix: Cursor::new(data("partial").into_bytes()),
        });
        let items: Vec<_> = SseFragments::new(reader).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().text, "partial");
        assert!(matches!(items[1], Err(GenerationError::Stream(_))));
    }

    #[test]
    fn api_error_message_prefers_json_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn client_builds_streaming_url() {
        let settings = GeminiSettings {
            base_url: "http://localhost:8080/".into(),
            model: "gemini-1.5-flash".into(),
            ..Default::default()
        };
        let client = GeminiClient::new(&settings).unwrap();
        assert_eq!(
            client.stream_url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:streamGenerateContent?alt=sse"
        );
        assert_eq!(client.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn client_builds_from_environment() {
        let client = GeminiClient::from_env().unwrap();
        assert_eq!(client.model_name(), GeminiSettings::from_env().model);
    }

    #[test]
    fn unreachable_service_is_connection_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let settings = GeminiSettings {
            base_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        let client = GeminiClient::new(&settings).unwrap();
        let result = client.stream_generate("prompt", &GenerationConfig::with_creativity(0.7));
        assert!(matches!(
            result,
            Err(GenerationError::Connection(_)) | Err(GenerationError::Http(_))
        ));
    }
}
