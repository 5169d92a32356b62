use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::catalog::{SectionEntry, SubtitleConfig, resolve_subtitle_url};

/// 秒数格式化成 mm:ss（超过一小时带小时段）
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// 画播放视图：正在播放的小节信息，视频本身在 mpv 窗口里
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    entry: Option<&SectionEntry>,
    subtitle_config: &SubtitleConfig,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 正在播放 ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(entry) = entry else {
        frame.render_widget(
            Paragraph::new(Line::styled(
                "尚未选择视频",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    };

    let duration = entry
        .section
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "--:--".to_string());
    let description = entry
        .section
        .description
        .clone()
        .unwrap_or_else(|| "暂无简介".to_string());
    let subtitle = match resolve_subtitle_url(&entry.section, subtitle_config) {
        Some(url) => format!("字幕: {}", url),
        None => "字幕: 无".to_string(),
    };

    let lines = vec![
        Line::styled(
            entry.display_title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw(format!("时长: {}", duration)),
        Line::styled(subtitle, Style::default().fg(Color::DarkGray)),
        Line::raw(""),
        Line::raw(description),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_minutes_and_seconds() {
        assert_eq!(format_duration(0.0), "00:00");
        assert_eq!(format_duration(65.0), "01:05");
        assert_eq!(format_duration(1805.2), "30:05");
    }

    #[test]
    fn duration_formats_hours() {
        assert_eq!(format_duration(3723.0), "1:02:03");
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        assert_eq!(format_duration(-5.0), "00:00");
    }
}
