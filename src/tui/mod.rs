pub mod app;
pub mod browse;
pub mod nav;
pub mod player_view;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::player::ViewMode;
use app::{App, EMPTY_NOTICE, Focus};

// -----------------------------------------------------------------------------------------------

/// 接管终端跑完整个会话，退出前恢复终端
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app).await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        match events.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                app.handle_key(key).await;
            }
            Some(Ok(_)) => {} // 窗口尺寸等事件，下一轮重画即可
            Some(Err(e)) => return Err(e).context("读取终端事件失败"),
            None => break,
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------------------------

/// 整屏绘制入口
pub fn draw(frame: &mut Frame, app: &mut App) {
    let [main, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    if let Some(message) = app.load_error.clone() {
        draw_notice_panes(frame, main, &message, Style::default().fg(Color::Red));
    } else if app.is_empty() {
        draw_notice_panes(frame, main, EMPTY_NOTICE, Style::default().fg(Color::DarkGray));
    } else {
        match app.controller.view_mode() {
            ViewMode::List => draw_list(frame, main, app),
            ViewMode::Player => {
                let entry = app.controller.active().and_then(|id| app.index.resolve(id));
                let subtitle = app.controller.subtitle_config().clone();
                player_view::draw(frame, main, entry, &subtitle);
            }
        }
    }

    draw_status(frame, status, app);
}

fn draw_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let [nav_area, browse_area] =
        Layout::horizontal([Constraint::Percentage(32), Constraint::Percentage(68)]).areas(area);

    let active = app.controller.active();
    nav::draw(
        frame,
        nav_area,
        &mut app.nav,
        active,
        app.focus == Focus::Nav,
    );
    browse::draw(
        frame,
        browse_area,
        &app.catalog,
        &app.browse,
        active,
        &app.index,
        app.focus == Focus::Browse,
    );
}

/// 目录加载失败/目录为空时，在两个目录面板的位置各画一份提示
fn draw_notice_panes(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let [nav_area, browse_area] =
        Layout::horizontal([Constraint::Percentage(32), Constraint::Percentage(68)]).areas(area);

    for (pane, title) in [(nav_area, " 目录 "), (browse_area, " 目录浏览 ")] {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(pane);
        frame.render_widget(block, pane);
        frame.render_widget(
            Paragraph::new(Line::styled(message.to_string(), style)).wrap(Wrap { trim: false }),
            inner,
        );
    }
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let hint = if app.load_error.is_some() || app.is_empty() {
        "q 退出"
    } else {
        match app.controller.view_mode() {
            ViewMode::List => {
                "↑↓ 移动  Enter 选择/展开  Tab 切换面板  [ ] 课程  , . 学期  q 退出"
            }
            ViewMode::Player => "Esc 返回列表  q 退出",
        }
    };
    frame.render_widget(
        Paragraph::new(Line::styled(hint, Style::default().fg(Color::DarkGray))),
        area,
    );
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SectionIndex, SubtitleConfig};
    use crate::player::{PlayerBackend, PlayerController};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// 整屏画到测试后端，拼出去掉空格的纯文本。
    /// 宽字符后面的占位格是空格，去掉后才能按子串断言。
    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            text.push('\n');
        }
        text.replace(' ', "")
    }

    fn controller() -> PlayerController {
        PlayerController::new(PlayerBackend::Disabled, SubtitleConfig::default())
    }

    #[test]
    fn empty_catalog_renders_placeholder_in_both_panes() {
        let catalog = Catalog::from_json_str("[]").unwrap();
        let index = SectionIndex::build(&catalog);
        let mut app = App::new(catalog, index, controller());

        let text = render(&mut app);
        assert_eq!(text.matches(EMPTY_NOTICE).count(), 2);
    }

    #[test]
    fn load_failure_renders_status_code_in_place_of_containers() {
        let message = format!(
            "{}: {}",
            app::LOAD_ERROR_PREFIX,
            crate::catalog::CatalogError::HttpStatus(404)
        );
        let mut app = App::failed(message, controller());

        let text = render(&mut app);
        assert_eq!(text.matches("404").count(), 2);
        // 错误状态下不画任何目录行
        assert!(!text.contains("▸"));
    }

    #[tokio::test]
    async fn selection_renders_player_view_with_composed_title() {
        let catalog = Catalog::from_json_str(
            r#"[{ "title": "第1学期", "courses": [{ "title": "课程A", "weeks": [
                { "title": "第1周", "sections": [
                    { "title": "第0小节", "url": "a/w1c0.mp4" }
                ]}
            ]}]}]"#,
        )
        .unwrap();
        let index = SectionIndex::build(&catalog);
        let mut app = App::new(catalog, index, controller());

        app.apply_selection(crate::catalog::SectionId(0)).await;
        let text = render(&mut app);
        assert!(text.contains("正在播放"));
        assert!(text.contains("第1学期/课程A/第1周/第0小节"));
    }
}
