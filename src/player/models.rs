use crate::catalog::SectionId;

/// 互斥的显示模式：目录浏览 vs 播放
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Player,
}

/// 播放控制器的全部可变状态。
/// 单写者：只有控制器自己改，界面各处只读。
#[derive(Debug, Default)]
pub struct PlayerState {
    pub view_mode: ViewMode,
    pub active: Option<SectionId>,   // 当前选中（高亮/播放）的小节
    pub current_url: Option<String>, // 播放器里已装载的视频地址
}

/// 一次选中操作的结果，界面据此同步两个目录视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub id: SectionId,
    pub reloaded: bool, // 是否真的重新装载了视频（相同地址不重载）
}
