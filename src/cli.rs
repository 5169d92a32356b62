use clap::Parser;
use std::path::PathBuf;

/// 课程视频目录播放器
#[derive(Parser, Debug)]
#[command(name = "courseplay")]
#[command(version)]
#[command(about = "在终端里浏览课程视频目录并用 mpv 播放", long_about = None)]
pub struct Cli {
    /// 目录文档地址 (支持 http(s) 链接和本地文件路径)
    #[arg(long, value_name = "URL|PATH")]
    #[arg(default_value = "videos_index.json")]
    pub catalog: String,

    /// mpv 可执行文件路径
    #[arg(long, value_name = "PATH")]
    #[arg(default_value = "mpv")]
    pub mpv_path: String,

    /// 字幕语言代码，用于从视频地址派生字幕文件名
    #[arg(long, value_name = "LANG")]
    #[arg(default_value = "zh")]
    pub sub_lang: String,

    /// 不挂载字幕轨
    #[arg(long, default_value_t = false)]
    pub no_subtitle: bool,

    /// 纯浏览模式，不启动播放器
    #[arg(long, default_value_t = false)]
    pub no_player: bool,

    /// 目录请求超时时间（秒）
    #[arg(long, value_name = "SECS")]
    #[arg(default_value_t = 10)]
    pub timeout: u64,

    /// 调试日志写到指定文件（不给则只在标准错误输出严重错误）
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
