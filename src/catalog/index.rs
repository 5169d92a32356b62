use crate::catalog::models::{Catalog, Section};

// -----------------------------------------------------------------------------------------------

/// 小节的稳定标识：按目录遍历顺序编号，整个会话内不变。
/// 高亮、选中、视图同步都只认这个 id，不持有任何界面句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub usize);

/// 小节在目录树里的完整路径（各层下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionPath {
    pub semester: usize,
    pub course: usize,
    pub week: usize,
    pub section: usize,
}

/// 某个视图里一处小节条目的句柄。
/// 渲染构建时注册进索引，选中时按小节直接取回，不再全量扫描界面。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionHandle {
    /// 导航树里的行号（完整行序列下标）
    NavRow(usize),
    /// 浏览视图里的位置：学期块 / 课程 Tab / 周列 / 列表项
    BrowseItem {
        semester: usize,
        course: usize,
        week: usize,
        item: usize,
    },
}

/// 索引里的一条小节记录
#[derive(Debug, Clone)]
pub struct SectionEntry {
    pub id: SectionId,
    pub path: SectionPath,
    pub semester_title: String,
    pub course_title: String,
    pub week_title: String,
    pub section: Section,
    pub display_title: String, // 组合标题：学期 / 课程 / 周 / 小节
    pub handles: Vec<SectionHandle>,
}

// -----------------------------------------------------------------------------------------------

/// 小节索引：目录加载后构建一次，之后只追加视图句柄
#[derive(Debug, Default)]
pub struct SectionIndex {
    entries: Vec<SectionEntry>,
}

impl SectionIndex {
    /// 递归走一遍目录树，按遍历顺序给每个小节编号
    pub fn build(catalog: &Catalog) -> Self {
        let mut entries = Vec::with_capacity(catalog.section_count());
        for (si, semester) in catalog.semesters.iter().enumerate() {
            for (ci, course) in semester.courses.iter().enumerate() {
                for (wi, week) in course.weeks.iter().enumerate() {
                    for (ni, section) in week.sections.iter().enumerate() {
                        let id = SectionId(entries.len());
                        entries.push(SectionEntry {
                            id,
                            path: SectionPath {
                                semester: si,
                                course: ci,
                                week: wi,
                                section: ni,
                            },
                            semester_title: semester.title.clone(),
                            course_title: course.title.clone(),
                            week_title: week.title.clone(),
                            section: section.clone(),
                            display_title: format!(
                                "{} / {} / {} / {}",
                                semester.title, course.title, week.title, section.title
                            ),
                            handles: Vec::new(),
                        });
                    }
                }
            }
        }
        Self { entries }
    }

    /// 按 id 取回记录；失效 id 返回 None，调用方按无操作处理
    pub fn resolve(&self, id: SectionId) -> Option<&SectionEntry> {
        self.entries.get(id.0)
    }

    /// 按树路径找 id。条目本身就按路径序排列，二分即可。
    pub fn id_by_path(&self, path: SectionPath) -> Option<SectionId> {
        let key = (path.semester, path.course, path.week, path.section);
        self.entries
            .binary_search_by_key(&key, |e| {
                (e.path.semester, e.path.course, e.path.week, e.path.section)
            })
            .ok()
            .map(SectionId)
    }

    /// 渲染构建时登记一处视图条目
    pub fn register_handle(&mut self, id: SectionId, handle: SectionHandle) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.handles.push(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionEntry> {
        self.entries.iter()
    }
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::Catalog;

    fn sample_catalog() -> Catalog {
        Catalog::from_json_str(
            r#"[
                { "title": "第1学期", "courses": [
                    { "title": "课程A", "weeks": [
                        { "title": "第1周", "sections": [
                            { "title": "第0小节", "url": "t1/a/a-w1c0.mp4" },
                            { "title": "第1小节", "url": "t1/a/a-w1c1.mp4" }
                        ]},
                        { "title": "第2周", "sections": [
                            { "title": "第0小节", "url": "t1/a/a-w2c0.mp4" }
                        ]}
                    ]}
                ]},
                { "title": "第2学期", "courses": [
                    { "title": "课程B", "weeks": [
                        { "title": "第1周", "sections": [
                            { "title": "第0小节", "url": "t2/b/b-w1c0.mp4" }
                        ]}
                    ]}
                ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn index_has_one_entry_per_section() {
        let catalog = sample_catalog();
        let index = SectionIndex::build(&catalog);
        assert_eq!(index.len(), catalog.section_count());
        assert_eq!(index.len(), 4);
        // 每个 id 唯一可解析，且解析回自身
        for entry in index.iter() {
            let resolved = index.resolve(entry.id).unwrap();
            assert_eq!(resolved.id, entry.id);
            assert_eq!(resolved.section.url, entry.section.url);
        }
    }

    #[test]
    fn duplicate_titles_stay_distinct() {
        // 不同周里同名的"第0小节"必须有不同的 id 和不同的地址
        let index = SectionIndex::build(&sample_catalog());
        let dupes: Vec<_> = index
            .iter()
            .filter(|e| e.section.title == "第0小节")
            .collect();
        assert_eq!(dupes.len(), 3);
        let urls: std::collections::HashSet<_> =
            dupes.iter().map(|e| e.section.url.as_str()).collect();
        assert_eq!(urls.len(), 3);
    }

    #[test]
    fn display_title_joins_all_four_levels() {
        let index = SectionIndex::build(&sample_catalog());
        let entry = index.resolve(SectionId(0)).unwrap();
        assert_eq!(entry.display_title, "第1学期 / 课程A / 第1周 / 第0小节");
    }

    #[test]
    fn stale_id_resolves_to_none() {
        let index = SectionIndex::build(&sample_catalog());
        assert!(index.resolve(SectionId(999)).is_none());
    }

    #[test]
    fn id_by_path_round_trips() {
        let index = SectionIndex::build(&sample_catalog());
        for entry in index.iter() {
            assert_eq!(index.id_by_path(entry.path), Some(entry.id));
        }
        assert_eq!(
            index.id_by_path(SectionPath {
                semester: 9,
                course: 0,
                week: 0,
                section: 0
            }),
            None
        );
    }

    #[test]
    fn registered_handles_accumulate() {
        let mut index = SectionIndex::build(&sample_catalog());
        let id = SectionId(1);
        index.register_handle(id, SectionHandle::NavRow(5));
        index.register_handle(
            id,
            SectionHandle::BrowseItem {
                semester: 0,
                course: 0,
                week: 0,
                item: 1,
            },
        );
        assert_eq!(index.resolve(id).unwrap().handles.len(), 2);
        // 失效 id 的注册安静忽略
        index.register_handle(SectionId(999), SectionHandle::NavRow(0));
    }
}
