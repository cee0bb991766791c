use crate::config::VisionConfig;
use crate::error::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// 视觉模型能力：给一段提示词和一张 JPEG 页面图，返回模型的原始文本回复
///
/// 回复内容由调用方解析；传输失败或接口报错返回 Err。
pub trait VisionOracle {
    fn extract(
        &self,
        prompt: &str,
        image_jpeg: &[u8],
        max_tokens: u32,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// OpenAI 兼容的 /chat/completions 客户端
#[derive(Debug, Clone)]
pub struct OpenAiVisionClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiVisionClient {
    /// API key 从 OPENAI_API_KEY 读取
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Vision("OPENAI_API_KEY environment variable not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            http_client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str, image_jpeg: &[u8], max_tokens: u32) -> ChatRequest<'a> {
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_jpeg);

        ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{image_b64}"),
                        },
                    },
                ],
            }],
            max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        }
    }
}

impl VisionOracle for OpenAiVisionClient {
    async fn extract(&self, prompt: &str, image_jpeg: &[u8], max_tokens: u32) -> Result<String> {
        let request = self.build_request(prompt, image_jpeg, max_tokens);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Vision(format!("request failed with status {status}: {body}")));
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Vision(format!("unreadable response: {e}")))?;

        // 没有内容时按空回复处理，交给调用方当作解析失败
        match chat.choices.into_iter().next().and_then(|c| c.message.content) {
            Some(content) => Ok(content),
            None => {
                tracing::warn!("视觉模型返回为空");
                Ok(String::new())
            }
        }
    }
}
