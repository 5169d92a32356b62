use clap::Parser;
use tracing::{error, info};

use course_player::catalog::{CatalogLoader, SectionIndex, SubtitleConfig};
use course_player::cli::Cli;
use course_player::common::logger::PrettyLogger;
use course_player::player::{MpvPlayer, PlayerBackend, PlayerController};
use course_player::tui::{
    self,
    app::{App, LOAD_ERROR_PREFIX},
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn init_tracing(args: &Cli) -> Result<()> {
    match &args.log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // 不写文件时把日志压到最低，别污染 TUI
        None => {
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::ERROR)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn build_controller(args: &Cli) -> PlayerController {
    let subtitle = SubtitleConfig {
        lang: args.sub_lang.clone(),
        ext: "vtt".to_string(),
        enabled: !args.no_subtitle,
    };

    let backend = if args.no_player {
        PrettyLogger::warning("未启用播放器，仅浏览目录");
        PlayerBackend::Disabled
    } else {
        let socket_path = std::env::temp_dir().join(format!(
            "courseplay-mpv-{}.sock",
            std::process::id()
        ));
        PlayerBackend::Mpv(MpvPlayer::new(args.mpv_path.clone(), socket_path))
    };

    PlayerController::new(backend, subtitle)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args)?;

    PrettyLogger::title("课程视频目录");
    info!("开始加载视频目录: {}", args.catalog);

    let controller = build_controller(&args);

    // 加载失败不退出：界面在目录面板的位置显示错误信息
    let mut app = match CatalogLoader::new(&args.catalog, args.timeout) {
        Ok(loader) => match loader.load().await {
            Ok(catalog) => {
                let index = SectionIndex::build(&catalog);
                PrettyLogger::info(format!("共加载 {} 个视频小节", index.len()));
                App::new(catalog, index, controller)
            }
            Err(e) => {
                error!("加载目录失败: {}", e);
                PrettyLogger::error(format!("{}: {}", LOAD_ERROR_PREFIX, e));
                App::failed(format!("{}: {}", LOAD_ERROR_PREFIX, e), controller)
            }
        },
        Err(e) => {
            error!("目录地址无效: {}", e);
            PrettyLogger::error(format!("{}: {}", LOAD_ERROR_PREFIX, e));
            App::failed(format!("{}: {}", LOAD_ERROR_PREFIX, e), controller)
        }
    };

    tui::run(&mut app).await?;

    // 收尾：关掉 mpv 进程
    app.controller.shutdown().await;
    PrettyLogger::separator();
    PrettyLogger::success("已退出");
    Ok(())
}
