use thiserror::Error;

/// 统一错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 缺少必需的输入文件（纳品书或送り状）
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: usize },

    #[error("page {0} selected more than once")]
    DuplicatePage(u32),

    #[error("vision api error: {0}")]
    Vision(String),

    #[error("page render failed: {0}")]
    Render(String),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
