use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("启动播放器失败: {0}")]
    Spawn(std::io::Error),

    #[error("连接播放器 IPC 失败: {0}")]
    IpcConnect(String),

    #[error("播放器 IPC 协议错误: {0}")]
    IpcProtocol(String),

    #[error("播放器拒绝命令 {0}: {1}")]
    CommandRejected(String, String),

    #[error("命令序列化失败: {0}")]
    Encode(#[from] serde_json::Error),
}
