use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::catalog::{Catalog, Course, SectionHandle, SectionId, SectionIndex, SectionPath};

// 一屏最多排几列周
const WEEK_COLUMNS: usize = 4;

// -----------------------------------------------------------------------------------------------

/// 浏览视图状态：一次显示一个学期块，块内是课程 Tab + 周列 + 小节列表。
/// 每个学期记住自己激活的课程 Tab，首个 Tab 默认激活。
pub struct BrowseState {
    pub semester: usize,
    pub tabs: Vec<usize>, // 每个学期激活的课程 Tab
    pub week: usize,      // 光标所在周列
    pub item: usize,      // 周内小节光标
}

impl BrowseState {
    /// 登记所有小节的浏览句柄并初始化 Tab 状态
    pub fn build(catalog: &Catalog, index: &mut SectionIndex) -> Self {
        for (si, semester) in catalog.semesters.iter().enumerate() {
            for (ci, course) in semester.courses.iter().enumerate() {
                for (wi, week) in course.weeks.iter().enumerate() {
                    for ni in 0..week.sections.len() {
                        let path = SectionPath {
                            semester: si,
                            course: ci,
                            week: wi,
                            section: ni,
                        };
                        if let Some(id) = index.id_by_path(path) {
                            index.register_handle(
                                id,
                                SectionHandle::BrowseItem {
                                    semester: si,
                                    course: ci,
                                    week: wi,
                                    item: ni,
                                },
                            );
                        }
                    }
                }
            }
        }
        Self {
            semester: 0,
            tabs: vec![0; catalog.semesters.len()],
            week: 0,
            item: 0,
        }
    }

    pub fn active_tab(&self) -> usize {
        self.tabs.get(self.semester).copied().unwrap_or(0)
    }

    fn current_course<'a>(&self, catalog: &'a Catalog) -> Option<&'a Course> {
        catalog
            .semesters
            .get(self.semester)?
            .courses
            .get(self.active_tab())
    }

    pub fn switch_semester(&mut self, catalog: &Catalog, delta: i64) {
        if catalog.semesters.is_empty() {
            return;
        }
        let last = catalog.semesters.len() as i64 - 1;
        self.semester = (self.semester as i64 + delta).clamp(0, last) as usize;
        self.week = 0;
        self.item = 0;
        self.clamp(catalog);
    }

    pub fn switch_tab(&mut self, catalog: &Catalog, delta: i64) {
        let Some(semester) = catalog.semesters.get(self.semester) else {
            return;
        };
        if semester.courses.is_empty() {
            return;
        }
        let last = semester.courses.len() as i64 - 1;
        let tab = (self.active_tab() as i64 + delta).clamp(0, last) as usize;
        self.tabs[self.semester] = tab;
        self.week = 0;
        self.item = 0;
    }

    pub fn move_week(&mut self, catalog: &Catalog, delta: i64) {
        let Some(course) = self.current_course(catalog) else {
            return;
        };
        if course.weeks.is_empty() {
            return;
        }
        let last = course.weeks.len() as i64 - 1;
        self.week = (self.week as i64 + delta).clamp(0, last) as usize;
        self.clamp(catalog);
    }

    pub fn move_item(&mut self, catalog: &Catalog, delta: i64) {
        let Some(course) = self.current_course(catalog) else {
            return;
        };
        let Some(week) = course.weeks.get(self.week) else {
            return;
        };
        if week.sections.is_empty() {
            return;
        }
        let last = week.sections.len() as i64 - 1;
        self.item = (self.item as i64 + delta).clamp(0, last) as usize;
    }

    fn clamp(&mut self, catalog: &Catalog) {
        if let Some(course) = self.current_course(catalog) {
            if self.week >= course.weeks.len() {
                self.week = course.weeks.len().saturating_sub(1);
            }
            if let Some(week) = course.weeks.get(self.week) {
                if self.item >= week.sections.len() {
                    self.item = week.sections.len().saturating_sub(1);
                }
            }
        }
    }

    /// 光标指向的小节路径
    pub fn selected_path(&self, catalog: &Catalog) -> Option<SectionPath> {
        let course = self.current_course(catalog)?;
        let week = course.weeks.get(self.week)?;
        if week.sections.is_empty() {
            return None;
        }
        Some(SectionPath {
            semester: self.semester,
            course: self.active_tab(),
            week: self.week,
            section: self.item.min(week.sections.len() - 1),
        })
    }

    /// 选中同步：切到小节所在的学期块、激活它的课程 Tab、光标对位
    pub fn reveal(&mut self, path: &SectionPath) {
        self.semester = path.semester;
        if let Some(tab) = self.tabs.get_mut(path.semester) {
            *tab = path.course;
        }
        self.week = path.week;
        self.item = path.section;
    }
}

// -----------------------------------------------------------------------------------------------

/// 画右侧浏览视图
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    catalog: &Catalog,
    browse: &BrowseState,
    active: Option<SectionId>,
    index: &SectionIndex,
    focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 目录浏览 ")
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(semester) = catalog.semesters.get(browse.semester) else {
        return;
    };

    let [header, tabs_area, weeks_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .areas(inner);

    // 学期块标题
    let pager = format!(
        " {} ({}/{}) ",
        semester.title,
        browse.semester + 1,
        catalog.semesters.len()
    );
    frame.render_widget(
        Paragraph::new(Line::styled(
            pager,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        header,
    );

    // 课程 Tab，默认第一个激活
    let titles: Vec<Line> = semester
        .courses
        .iter()
        .map(|c| Line::raw(c.title.clone()))
        .collect();
    frame.render_widget(
        Tabs::new(titles)
            .select(browse.active_tab())
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        tabs_area,
    );

    let Some(course) = semester.courses.get(browse.active_tab()) else {
        return;
    };
    if course.weeks.is_empty() {
        return;
    }

    // 周按页分列，光标所在页可见
    let page_start = (browse.week / WEEK_COLUMNS) * WEEK_COLUMNS;
    let visible_weeks: Vec<_> = course
        .weeks
        .iter()
        .enumerate()
        .skip(page_start)
        .take(WEEK_COLUMNS)
        .collect();

    let constraints =
        vec![Constraint::Ratio(1, visible_weeks.len() as u32); visible_weeks.len()];
    let columns = Layout::horizontal(constraints).split(weeks_area);

    for ((wi, week), column) in visible_weeks.into_iter().zip(columns.iter()) {
        let mut lines = vec![Line::styled(
            week.title.clone(),
            Style::default().add_modifier(Modifier::UNDERLINED),
        )];
        for (ni, section) in week.sections.iter().enumerate() {
            let id = index.id_by_path(SectionPath {
                semester: browse.semester,
                course: browse.active_tab(),
                week: wi,
                section: ni,
            });
            let is_active = id.is_some() && id == active;
            let mut style = if is_active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            if focused && wi == browse.week && ni == browse.item {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let marker = if is_active { "▶ " } else { "· " };
            lines.push(Line::styled(format!("{}{}", marker, section.title), style));
        }
        frame.render_widget(Paragraph::new(lines), *column);
    }
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SectionIndex};

    fn fixture() -> (Catalog, SectionIndex, BrowseState) {
        let catalog = Catalog::from_json_str(
            r#"[
                { "title": "第1学期", "courses": [
                    { "title": "课程A", "weeks": [
                        { "title": "第1周", "sections": [
                            { "title": "第0小节", "url": "a/w1c0.mp4" },
                            { "title": "第1小节", "url": "a/w1c1.mp4" }
                        ]}
                    ]},
                    { "title": "课程B", "weeks": [
                        { "title": "第1周", "sections": [
                            { "title": "第0小节", "url": "b/w1c0.mp4" }
                        ]}
                    ]}
                ]},
                { "title": "第2学期", "courses": [
                    { "title": "课程C", "weeks": [
                        { "title": "第1周", "sections": [
                            { "title": "第0小节", "url": "c/w1c0.mp4" }
                        ]}
                    ]}
                ]}
            ]"#,
        )
        .unwrap();
        let mut index = SectionIndex::build(&catalog);
        let browse = BrowseState::build(&catalog, &mut index);
        (catalog, index, browse)
    }

    #[test]
    fn first_course_tab_active_by_default() {
        let (_, _, browse) = fixture();
        assert_eq!(browse.active_tab(), 0);
        assert_eq!(browse.semester, 0);
    }

    #[test]
    fn every_section_gets_a_browse_handle() {
        let (_, index, _) = fixture();
        for entry in index.iter() {
            assert!(
                entry
                    .handles
                    .iter()
                    .any(|h| matches!(h, SectionHandle::BrowseItem { .. })),
                "{} 没有浏览句柄",
                entry.display_title
            );
        }
    }

    #[test]
    fn tab_switch_resets_cursor_and_is_per_semester() {
        let (catalog, _, mut browse) = fixture();
        browse.item = 1;
        browse.switch_tab(&catalog, 1);
        assert_eq!(browse.active_tab(), 1);
        assert_eq!(browse.item, 0);

        // 另一个学期的 Tab 状态独立
        browse.switch_semester(&catalog, 1);
        assert_eq!(browse.semester, 1);
        assert_eq!(browse.active_tab(), 0);
        browse.switch_semester(&catalog, -1);
        assert_eq!(browse.active_tab(), 1);
    }

    #[test]
    fn selected_path_resolves_to_unique_section() {
        let (catalog, index, mut browse) = fixture();
        browse.move_item(&catalog, 1);
        let path = browse.selected_path(&catalog).unwrap();
        let id = index.id_by_path(path).unwrap();
        assert_eq!(index.resolve(id).unwrap().section.url, "a/w1c1.mp4");
    }

    #[test]
    fn reveal_activates_matching_tab_and_block() {
        let (catalog, index, mut browse) = fixture();
        // 第2学期课程C的小节
        let entry = index
            .iter()
            .find(|e| e.section.url == "c/w1c0.mp4")
            .unwrap();
        browse.reveal(&entry.path);
        assert_eq!(browse.semester, 1);
        assert_eq!(browse.active_tab(), 0);
        assert_eq!(browse.selected_path(&catalog), Some(entry.path));
    }

    #[test]
    fn cursor_clamps_at_bounds() {
        let (catalog, _, mut browse) = fixture();
        browse.move_item(&catalog, 100);
        assert_eq!(browse.item, 1);
        browse.move_item(&catalog, -100);
        assert_eq!(browse.item, 0);
        browse.switch_semester(&catalog, 100);
        assert_eq!(browse.semester, 1);
    }
}
