use tracing::{debug, warn};

use crate::catalog::{SectionId, SectionIndex, SubtitleConfig, resolve_subtitle_url};
use crate::player::models::{PlayerState, Selection, ViewMode};
use crate::player::mpv::MpvPlayer;

// -----------------------------------------------------------------------------------------------

/// 播放后端：真实的 mpv，或者纯浏览模式下的空实现。
/// 空实现让控制器的状态机在没有 mpv 的环境里照常运转（也方便测试）。
pub enum PlayerBackend {
    Mpv(MpvPlayer),
    Disabled,
}

impl PlayerBackend {
    async fn load(&mut self, url: &str, subtitle: Option<&str>) {
        match self {
            // 播放请求失败只记录，不打断界面状态更新
            PlayerBackend::Mpv(player) => {
                if let Err(e) = player.load(url, subtitle).await {
                    warn!("播放请求失败（已忽略）: {}", e);
                }
            }
            PlayerBackend::Disabled => debug!("播放器未启用，跳过装载 {}", url),
        }
    }

    async fn set_pause(&mut self, pause: bool) {
        match self {
            PlayerBackend::Mpv(player) => {
                if let Err(e) = player.set_pause(pause).await {
                    warn!("暂停命令失败（已忽略）: {}", e);
                }
            }
            PlayerBackend::Disabled => {}
        }
    }

    async fn quit(&mut self) {
        if let PlayerBackend::Mpv(player) = self {
            player.quit().await;
        }
    }
}

// -----------------------------------------------------------------------------------------------

/// 播放控制器：唯一持有"当前选中"和"显示模式"的地方。
/// 两个目录视图都只读它的状态来画高亮，选中一律从这里走一遍，
/// 不存在视图之间互相触发选中的回路。
pub struct PlayerController {
    backend: PlayerBackend,
    subtitle: SubtitleConfig,
    state: PlayerState,
}

impl PlayerController {
    pub fn new(backend: PlayerBackend, subtitle: SubtitleConfig) -> Self {
        Self {
            backend,
            subtitle,
            state: PlayerState::default(),
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    pub fn active(&self) -> Option<SectionId> {
        self.state.active
    }

    pub fn current_url(&self) -> Option<&str> {
        self.state.current_url.as_deref()
    }

    pub fn subtitle_config(&self) -> &SubtitleConfig {
        &self.subtitle
    }

    /// 选中一个小节：切到播放视图，换源（地址相同不重载，不打断播放进度），
    /// 更新选中标记。失效的 id 整个操作都是空操作。
    pub async fn select_section(
        &mut self,
        id: SectionId,
        index: &SectionIndex,
    ) -> Option<Selection> {
        let entry = match index.resolve(id) {
            Some(entry) => entry,
            None => {
                debug!("选中的小节 {:?} 已失效，忽略", id);
                return None;
            }
        };

        self.state.view_mode = ViewMode::Player;

        let reloaded = self.state.current_url.as_deref() != Some(entry.section.url.as_str());
        if reloaded {
            let subtitle = resolve_subtitle_url(&entry.section, &self.subtitle);
            self.backend
                .load(&entry.section.url, subtitle.as_deref())
                .await;
            self.state.current_url = Some(entry.section.url.clone());
        }

        self.state.active = Some(id);
        Some(Selection { id, reloaded })
    }

    /// 回到目录视图：暂停播放，选中标记保留。
    /// 之后切回播放视图不会自动续播，只有选中新地址才会重新发播放命令。
    pub async fn return_to_list(&mut self) {
        if self.state.view_mode == ViewMode::Player {
            self.backend.set_pause(true).await;
        }
        self.state.view_mode = ViewMode::List;
    }

    /// 会话结束时关掉播放器进程
    pub async fn shutdown(&mut self) {
        self.backend.quit().await;
    }
}

// -----------------------------------------------------------------------------------------------
