use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    #[error("服务器返回 HTTP 状态码 {0}")]
    HttpStatus(u16),

    #[error("读取目录文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("目录解析失败: {0}")]
    Parse(String),

    #[error("无效的目录地址: {0}")]
    InvalidSource(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
