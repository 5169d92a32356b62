use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::catalog::{Catalog, SectionHandle, SectionId, SectionIndex, SectionPath};

// -----------------------------------------------------------------------------------------------

/// 可折叠分组的键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Semester(usize),
    Course(usize, usize),
    Week(usize, usize, usize),
}

/// 导航树的一行
#[derive(Debug, Clone)]
pub enum NavNode {
    Semester {
        index: usize,
        title: String,
    },
    Course {
        semester: usize,
        index: usize,
        title: String,
    },
    Week {
        semester: usize,
        course: usize,
        index: usize,
        title: String,
    },
    Section {
        id: SectionId,
        path: SectionPath,
        title: String,
    },
}

#[derive(Debug, Clone)]
pub struct NavRow {
    pub depth: u8,
    pub node: NavNode,
}

/// 光标行上按下确认键的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    None,
    Toggled,
    Select(SectionId),
}

// -----------------------------------------------------------------------------------------------

/// 侧边导航树：学期 -> 课程 -> 周 -> 小节 的先序行列表，
/// 分组可折叠，光标只在可见行上移动。
pub struct NavTree {
    rows: Vec<NavRow>,
    expanded: HashSet<GroupKey>,
    pub cursor: usize, // 可见行序列中的位置
    pub offset: usize, // 滚动偏移
}

impl NavTree {
    /// 扁平化目录树，并把每个小节行登记进索引
    pub fn build(catalog: &Catalog, index: &mut SectionIndex) -> Self {
        let mut rows = Vec::new();
        let mut expanded = HashSet::new();

        for (si, semester) in catalog.semesters.iter().enumerate() {
            rows.push(NavRow {
                depth: 0,
                node: NavNode::Semester {
                    index: si,
                    title: semester.title.clone(),
                },
            });
            // 学期默认展开，课程和周折叠
            expanded.insert(GroupKey::Semester(si));

            for (ci, course) in semester.courses.iter().enumerate() {
                rows.push(NavRow {
                    depth: 1,
                    node: NavNode::Course {
                        semester: si,
                        index: ci,
                        title: course.title.clone(),
                    },
                });
                for (wi, week) in course.weeks.iter().enumerate() {
                    rows.push(NavRow {
                        depth: 2,
                        node: NavNode::Week {
                            semester: si,
                            course: ci,
                            index: wi,
                            title: week.title.clone(),
                        },
                    });
                    for (ni, section) in week.sections.iter().enumerate() {
                        let path = SectionPath {
                            semester: si,
                            course: ci,
                            week: wi,
                            section: ni,
                        };
                        if let Some(id) = index.id_by_path(path) {
                            index.register_handle(id, SectionHandle::NavRow(rows.len()));
                            rows.push(NavRow {
                                depth: 3,
                                node: NavNode::Section {
                                    id,
                                    path,
                                    title: section.title.clone(),
                                },
                            });
                        }
                    }
                }
            }
        }

        Self {
            rows,
            expanded,
            cursor: 0,
            offset: 0,
        }
    }

    /// 当前可见的行（折叠分组的子行被跳过）
    pub fn visible(&self) -> Vec<&NavRow> {
        self.rows
            .iter()
            .filter(|row| self.is_visible(row))
            .collect()
    }

    fn is_visible(&self, row: &NavRow) -> bool {
        match &row.node {
            NavNode::Semester { .. } => true,
            NavNode::Course { semester, .. } => self.expanded.contains(&GroupKey::Semester(*semester)),
            NavNode::Week {
                semester, course, ..
            } => {
                self.expanded.contains(&GroupKey::Semester(*semester))
                    && self.expanded.contains(&GroupKey::Course(*semester, *course))
            }
            NavNode::Section { path, .. } => {
                self.expanded.contains(&GroupKey::Semester(path.semester))
                    && self
                        .expanded
                        .contains(&GroupKey::Course(path.semester, path.course))
                    && self.expanded.contains(&GroupKey::Week(
                        path.semester,
                        path.course,
                        path.week,
                    ))
            }
        }
    }

    fn group_key(node: &NavNode) -> Option<GroupKey> {
        match node {
            NavNode::Semester { index, .. } => Some(GroupKey::Semester(*index)),
            NavNode::Course {
                semester, index, ..
            } => Some(GroupKey::Course(*semester, *index)),
            NavNode::Week {
                semester,
                course,
                index,
                ..
            } => Some(GroupKey::Week(*semester, *course, *index)),
            NavNode::Section { .. } => None,
        }
    }

    pub fn move_cursor(&mut self, delta: i64) {
        let count = self.visible().len();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        let cursor = self.cursor as i64 + delta;
        self.cursor = cursor.clamp(0, count as i64 - 1) as usize;
    }

    pub fn current(&self) -> Option<&NavRow> {
        self.visible().get(self.cursor).copied()
    }

    /// 确认键：分组翻转折叠，小节交给调用方去选中
    pub fn activate(&mut self) -> NavAction {
        let (key, section) = match self.current() {
            Some(row) => match &row.node {
                NavNode::Section { id, .. } => (None, Some(*id)),
                node => (Self::group_key(node), None),
            },
            None => return NavAction::None,
        };
        if let Some(id) = section {
            return NavAction::Select(id);
        }
        if let Some(key) = key {
            if !self.expanded.remove(&key) {
                self.expanded.insert(key);
            }
            self.clamp_cursor();
            return NavAction::Toggled;
        }
        NavAction::None
    }

    pub fn expand_current(&mut self) {
        if let Some(key) = self.current().and_then(|row| Self::group_key(&row.node)) {
            self.expanded.insert(key);
        }
    }

    pub fn collapse_current(&mut self) {
        if let Some(key) = self.current().and_then(|row| Self::group_key(&row.node)) {
            self.expanded.remove(&key);
            self.clamp_cursor();
        }
    }

    fn clamp_cursor(&mut self) {
        let count = self.visible().len();
        if count == 0 {
            self.cursor = 0;
        } else if self.cursor >= count {
            self.cursor = count - 1;
        }
    }

    /// 展开某个小节的全部祖先分组，并把光标挪过去。
    /// 选中同步走这里，滚动进视口由渲染时的 ensure_visible 完成。
    pub fn reveal(&mut self, path: &SectionPath) {
        self.expanded.insert(GroupKey::Semester(path.semester));
        self.expanded
            .insert(GroupKey::Course(path.semester, path.course));
        self.expanded
            .insert(GroupKey::Week(path.semester, path.course, path.week));

        let position = self.visible().iter().position(|row| {
            matches!(&row.node, NavNode::Section { path: p, .. } if p == path)
        });
        if let Some(position) = position {
            self.cursor = position;
        }
    }

    /// 按视口高度调整滚动偏移，保证光标行可见
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }
}

// -----------------------------------------------------------------------------------------------

/// 画左侧导航树
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    nav: &mut NavTree,
    active: Option<SectionId>,
    focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 目录 ")
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    nav.ensure_visible(height);

    let visible = nav.visible();
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(nav.offset)
        .take(height)
        .map(|(pos, row)| {
            let indent = "  ".repeat(row.depth as usize);
            let (marker, title, mut style) = match &row.node {
                NavNode::Semester { index, title } => {
                    let open = nav.expanded.contains(&GroupKey::Semester(*index));
                    (
                        if open { "▾ " } else { "▸ " },
                        title,
                        Style::default().add_modifier(Modifier::BOLD),
                    )
                }
                NavNode::Course {
                    semester, index, title,
                } => {
                    let open = nav.expanded.contains(&GroupKey::Course(*semester, *index));
                    (if open { "▾ " } else { "▸ " }, title, Style::default())
                }
                NavNode::Week {
                    semester,
                    course,
                    index,
                    title,
                } => {
                    let open = nav
                        .expanded
                        .contains(&GroupKey::Week(*semester, *course, *index));
                    (if open { "▾ " } else { "▸ " }, title, Style::default())
                }
                NavNode::Section { id, title, .. } => {
                    let is_active = active == Some(*id);
                    let style = if is_active {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    (if is_active { "▶ " } else { "· " }, title, style)
                }
            };
            if pos == nav.cursor && focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::styled(format!("{}{}{}", indent, marker, title), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

// -----------------------------------------------------------------------------------------------
