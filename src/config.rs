use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 上传体积上限（字节）
    pub max_upload_bytes: usize,
}

/// 视觉模型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    pub api_base: String,
    pub model: String,
    /// 只保留该店铺的纳品书页
    pub store_name: String,
    pub delivery_note_max_tokens: u32,
    pub shipping_label_max_tokens: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub pdftoppm_path: String,
    pub dpi: u32,
    /// 每个文档最多处理的页数，不设则全部处理
    #[serde(default)]
    pub max_pages: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf, // run 命令的默认输出根目录，每次运行在其下新建子目录
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 64 * 1024 * 1024,
            },
            vision: VisionConfig {
                api_base: std::env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: "gpt-4.1-mini".to_string(),
                store_name: "メイアイストア amazon店".to_string(),
                delivery_note_max_tokens: 300,
                shipping_label_max_tokens: 200,
                request_timeout_secs: 120,
            },
            render: RenderConfig {
                pdftoppm_path: "pdftoppm".to_string(),
                dpi: 150,
                max_pages: None,
            },
            output: OutputConfig {
                dir: std::env::temp_dir(),
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 内置默认值 < label-reorder.toml < 环境变量 (LABEL_REORDER_SERVER__PORT 等)
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.max_upload_bytes", defaults.server.max_upload_bytes as i64)?
            .set_default("vision.api_base", defaults.vision.api_base)?
            .set_default("vision.model", defaults.vision.model)?
            .set_default("vision.store_name", defaults.vision.store_name)?
            .set_default("vision.delivery_note_max_tokens", i64::from(defaults.vision.delivery_note_max_tokens))?
            .set_default("vision.shipping_label_max_tokens", i64::from(defaults.vision.shipping_label_max_tokens))?
            .set_default("vision.request_timeout_secs", defaults.vision.request_timeout_secs as i64)?
            .set_default("render.pdftoppm_path", defaults.render.pdftoppm_path)?
            .set_default("render.dpi", i64::from(defaults.render.dpi))?
            .set_default("output.dir", defaults.output.dir.to_string_lossy().into_owned())?
            .add_source(File::with_name("label-reorder").required(false))
            .add_source(
                Environment::with_prefix("LABEL_REORDER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_vision_contract() {
        let config = AppConfig::default();
        assert_eq!(config.vision.delivery_note_max_tokens, 300);
        assert_eq!(config.vision.shipping_label_max_tokens, 200);
        assert_eq!(config.render.dpi, 150);
        assert!(config.render.max_pages.is_none());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.vision.store_name, "メイアイストア amazon店");
        assert_eq!(config.render.pdftoppm_path, "pdftoppm");
    }
}
