use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::player::errors::PlayerError;

// 等 mpv 建好 IPC 套接字的重试节奏
const CONNECT_ATTEMPTS: u32 = 50;
const CONNECT_INTERVAL: Duration = Duration::from_millis(100);
// 单条命令等响应的上限；超时按协议错误处理，由调用方决定是否忽略
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

// -----------------------------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct IpcRequest<'a> {
    command: &'a [Value],
    request_id: u64,
}

#[derive(Debug, Deserialize)]
struct IpcReply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<u64>,
    #[serde(default)]
    event: Option<String>,
}

/// 序列化一条 IPC 命令行（不含换行符）
pub fn command_line(args: &[Value], request_id: u64) -> Result<String, PlayerError> {
    Ok(serde_json::to_string(&IpcRequest {
        command: args,
        request_id,
    })?)
}

// -----------------------------------------------------------------------------------------------

/// 唯一的播放器实例：按需拉起一个 mpv 进程，通过 JSON IPC 套接字驱动。
/// 播放本身是"发出去就不管"，装载/播放命令的失败记日志后吞掉。
pub struct MpvPlayer {
    mpv_path: String,
    socket_path: PathBuf,
    child: Option<Child>,
    next_request_id: u64,
}

impl MpvPlayer {
    pub fn new(mpv_path: impl Into<String>, socket_path: PathBuf) -> Self {
        Self {
            mpv_path: mpv_path.into(),
            socket_path,
            child: None,
            next_request_id: 1,
        }
    }

    /// 装载新视频并开始播放。
    /// 顺序：清掉旧字幕轨 -> 换源 -> 按需挂新字幕 -> 取消暂停。
    pub async fn load(&mut self, url: &str, subtitle: Option<&str>) -> Result<(), PlayerError> {
        // 旧字幕轨可能不存在，拒绝不算错
        if let Err(e) = self.command(&[json!("sub-remove")]).await {
            debug!("清除字幕轨被拒绝（可忽略）: {}", e);
        }

        self.command(&[json!("loadfile"), json!(url), json!("replace")])
            .await?;

        if let Some(sub) = subtitle {
            // 字幕文件可能根本不存在，挂载失败不影响播放
            if let Err(e) = self
                .command(&[json!("sub-add"), json!(sub), json!("select")])
                .await
            {
                warn!("挂载字幕 {} 失败（已忽略）: {}", sub, e);
            }
        }

        self.set_pause(false).await
    }

    pub async fn set_pause(&mut self, pause: bool) -> Result<(), PlayerError> {
        self.command(&[json!("set_property"), json!("pause"), json!(pause)])
            .await
    }

    /// 退出播放器：先礼貌地发 quit，进程还在就强杀。
    /// 只对还活着的进程发命令，免得 ensure_running 把 mpv 又拉起来。
    pub async fn quit(&mut self) {
        let running = matches!(
            self.child.as_mut().map(|c| c.try_wait()),
            Some(Ok(None))
        );
        if running {
            if let Err(e) = self.command(&[json!("quit")]).await {
                debug!("quit 命令未送达: {}", e);
            }
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                debug!("结束 mpv 进程失败: {}", e);
            }
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }

    // -------------------------------------------------------------------------------------------

    async fn command(&mut self, args: &[Value]) -> Result<(), PlayerError> {
        self.ensure_running().await?;

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let line = command_line(args, request_id)?;
        debug!("mpv ipc -> {}", line);

        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| PlayerError::IpcConnect(e.to_string()))?;
        let (reader, mut writer) = stream.into_split();

        writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .map_err(|e| PlayerError::IpcProtocol(e.to_string()))?;

        let mut lines = BufReader::new(reader).lines();
        let reply = tokio::time::timeout(REPLY_TIMEOUT, async {
            // mpv 会在响应之间穿插事件行，跳过直到等到本次请求的回执
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| PlayerError::IpcProtocol(e.to_string()))?
            {
                let reply: IpcReply = match serde_json::from_str(&line) {
                    Ok(reply) => reply,
                    Err(e) => {
                        debug!("无法解析的 IPC 行 {}: {}", line, e);
                        continue;
                    }
                };
                if reply.event.is_some() {
                    continue;
                }
                if reply.request_id == Some(request_id) || reply.request_id.is_none() {
                    return Ok(reply);
                }
            }
            Err(PlayerError::IpcProtocol("连接在响应前关闭".to_string()))
        })
        .await
        .map_err(|_| PlayerError::IpcProtocol("等待响应超时".to_string()))??;

        match reply.error.as_deref() {
            Some("success") => Ok(()),
            Some(other) => Err(PlayerError::CommandRejected(
                args.first()
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string(),
                other.to_string(),
            )),
            None => Err(PlayerError::IpcProtocol("响应缺少 error 字段".to_string())),
        }
    }

    /// mpv 不在就拉起来，并等 IPC 套接字就绪
    async fn ensure_running(&mut self) -> Result<(), PlayerError> {
        if let Some(child) = &mut self.child {
            match child.try_wait() {
                Ok(None) => return Ok(()),
                Ok(Some(status)) => {
                    warn!("mpv 已退出 ({})，重新拉起", status);
                    self.child = None;
                }
                Err(e) => return Err(PlayerError::Spawn(e)),
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);
        let child = Command::new(&self.mpv_path)
            .arg("--idle=yes")
            .arg(format!(
                "--input-ipc-server={}",
                self.socket_path.display()
            ))
            .arg("--force-window=yes")
            .arg("--really-quiet")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(PlayerError::Spawn)?;
        debug!("已启动 mpv: {}", self.mpv_path);
        self.child = Some(child);

        for _ in 0..CONNECT_ATTEMPTS {
            if UnixStream::connect(&self.socket_path).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(CONNECT_INTERVAL).await;
        }
        Err(PlayerError::IpcConnect(format!(
            "套接字 {} 一直未就绪",
            self.socket_path.display()
        )))
    }
}

// -----------------------------------------------------------------------------------------------
