use serde_json::Value;

use crate::catalog::errors::CatalogError;

// -----------------------------------------------------------------------------------------------

// 目录树：学期 -> 课程 -> 周 -> 小节，加载完成后不再变动
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub semesters: Vec<Semester>, // 学期列表（保持文档顺序）
}

#[derive(Debug, Clone)]
pub struct Semester {
    pub title: String,       // 学期标题
    pub courses: Vec<Course>, // 课程列表
}

#[derive(Debug, Clone)]
pub struct Course {
    pub title: String,    // 课程标题
    pub weeks: Vec<Week>, // 周列表
}

#[derive(Debug, Clone)]
pub struct Week {
    pub title: String,          // 周标题
    pub sections: Vec<Section>, // 小节列表
}

/// 小节：目录树的叶子，对应一个可播放的视频
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,               // 小节标题
    pub url: String,                 // 视频地址（兼容 src 字段）
    pub duration: Option<f64>,       // 时长（秒）
    pub description: Option<String>, // 简介（兼容 desc 字段）
    pub subtitle: Option<String>,    // 显式指定的字幕地址（兼容 subtitle_url 字段）
}

// -----------------------------------------------------------------------------------------------

impl Catalog {
    /// 从 JSON 文本解析目录树。
    ///
    /// 每一层既接受对象数组，也接受"键即标题"的对象编码，
    /// 两种写法的遍历顺序都与文档一致。解析失败直接报错，不产出半棵树。
    pub fn from_json_str(body: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(body)?;
        Ok(Self {
            semesters: parse_semesters(&root)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }

    /// 目录中小节总数
    pub fn section_count(&self) -> usize {
        self.semesters
            .iter()
            .flat_map(|s| &s.courses)
            .flat_map(|c| &c.weeks)
            .map(|w| w.sections.len())
            .sum()
    }
}

// -----------------------------------------------------------------------------------------------
// 逐层递归下钻：数组元素自带 title 字段，对象编码用键名兜底

fn parse_semesters(root: &Value) -> Result<Vec<Semester>, CatalogError> {
    walk_level(root, "学期", |title, body| {
        Ok(Semester {
            title,
            courses: parse_courses(children_of(body, "courses"))?,
        })
    })
}

fn parse_courses(node: &Value) -> Result<Vec<Course>, CatalogError> {
    walk_level(node, "课程", |title, body| {
        Ok(Course {
            title,
            weeks: parse_weeks(children_of(body, "weeks"))?,
        })
    })
}

fn parse_weeks(node: &Value) -> Result<Vec<Week>, CatalogError> {
    walk_level(node, "周", |title, body| {
        Ok(Week {
            title,
            sections: parse_sections(children_of(body, "sections"))?,
        })
    })
}

fn parse_sections(node: &Value) -> Result<Vec<Section>, CatalogError> {
    match node {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(|item| parse_section(None, item)).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, body)| parse_section(Some(key.as_str()), body))
            .collect(),
        other => Err(CatalogError::Parse(format!(
            "小节列表必须是数组或对象，实际为 {}",
            type_name(other)
        ))),
    }
}

fn parse_section(key: Option<&str>, body: &Value) -> Result<Section, CatalogError> {
    let obj = body.as_object().ok_or_else(|| {
        CatalogError::Parse(format!("小节必须是对象，实际为 {}", type_name(body)))
    })?;

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .or(key)
        .ok_or_else(|| CatalogError::Parse("小节缺少 title 字段".to_string()))?
        .to_string();

    let url = obj
        .get("url")
        .or_else(|| obj.get("src"))
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::Parse(format!("小节 {} 缺少 url 字段", title)))?
        .to_string();

    Ok(Section {
        title,
        url,
        duration: obj.get("duration").and_then(Value::as_f64),
        description: obj
            .get("description")
            .or_else(|| obj.get("desc"))
            .and_then(Value::as_str)
            .map(str::to_string),
        subtitle: obj
            .get("subtitle")
            .or_else(|| obj.get("subtitle_url"))
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// 遍历一个非叶子层级，对每个条目取出标题后交给 build 继续下钻
fn walk_level<T>(
    node: &Value,
    level_name: &str,
    build: impl Fn(String, &Value) -> Result<T, CatalogError>,
) -> Result<Vec<T>, CatalogError> {
    match node {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let title = item
                    .get("title")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        CatalogError::Parse(format!("{}条目缺少 title 字段", level_name))
                    })?
                    .to_string();
                out.push(build(title, item)?);
            }
            Ok(out)
        }
        // 对象编码：键即标题，显式 title 字段优先
        Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (key, body) in map {
                let title = body
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(key.as_str())
                    .to_string();
                out.push(build(title, body)?);
            }
            Ok(out)
        }
        other => Err(CatalogError::Parse(format!(
            "{}列表必须是数组或对象，实际为 {}",
            level_name,
            type_name(other)
        ))),
    }
}

static NULL: Value = Value::Null;

/// 取子层容器：对象里有对应键就用它，否则条目本身就是子层容器
/// （键即标题编码下的对象，或直接挂数组的写法）
fn children_of<'a>(body: &'a Value, key: &str) -> &'a Value {
    match body.get(key) {
        Some(children) => children,
        None => match body {
            Value::Array(_) => body,
            // 带 title 的对象是条目自述，不是子层容器
            Value::Object(map) if !map.contains_key("title") => body,
            _ => &NULL,
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// -----------------------------------------------------------------------------------------------
