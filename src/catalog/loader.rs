use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::errors::CatalogError;
use crate::catalog::models::Catalog;

// -----------------------------------------------------------------------------------------------

/// 目录文档的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Http(Url),
    File(PathBuf),
}

/// 判断输入是网络地址还是本地文件路径
pub fn detect_source(input: &str) -> Result<CatalogSource, CatalogError> {
    lazy_static! {
        static ref HTTP_PATTERN: Regex = Regex::new(r"^https?://").unwrap();
    }

    let input = input.trim();
    if input.is_empty() {
        return Err(CatalogError::InvalidSource("目录地址为空".to_string()));
    }

    if HTTP_PATTERN.is_match(input) {
        let url = Url::parse(input)
            .map_err(|e| CatalogError::InvalidSource(format!("{}: {}", input, e)))?;
        Ok(CatalogSource::Http(url))
    } else {
        Ok(CatalogSource::File(PathBuf::from(input)))
    }
}

// -----------------------------------------------------------------------------------------------

/// 取回的目录文档正文，网络来源附带基准地址用于解析相对路径
pub struct FetchedDocument {
    pub body: String,
    pub base: Option<Url>,
}

#[async_trait]
trait CatalogFetcher {
    async fn fetch(&self) -> Result<FetchedDocument, CatalogError>;
}

struct HttpFetcher {
    client: Client,
    url: Url,
}

impl HttpFetcher {
    fn new(url: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("zh-CN,zh;q=0.9"),
        );
        headers.insert(
            USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!(
                "course-player/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let client = ClientBuilder::new()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl CatalogFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<FetchedDocument, CatalogError> {
        debug!("请求目录文档: {}", self.url);
        let resp = self.client.get(self.url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus(status.as_u16()));
        }

        Ok(FetchedDocument {
            body: resp.text().await?,
            base: Some(self.url.clone()),
        })
    }
}

struct FileFetcher {
    path: PathBuf,
}

#[async_trait]
impl CatalogFetcher for FileFetcher {
    async fn fetch(&self) -> Result<FetchedDocument, CatalogError> {
        debug!("读取目录文件: {:?}", self.path);
        let body = tokio::fs::read_to_string(&self.path).await?;
        Ok(FetchedDocument { body, base: None })
    }
}

// -----------------------------------------------------------------------------------------------

/// 目录加载器：整个会话只发起一次取回，失败不重试
pub struct CatalogLoader {
    source: CatalogSource,
    timeout: Duration,
}

impl CatalogLoader {
    pub fn new(input: &str, timeout_secs: u64) -> Result<Self, CatalogError> {
        Ok(Self {
            source: detect_source(input)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// 取回并解析目录。解析失败是致命的，不产出半棵树。
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        let spinner = loading_spinner();

        let result = self.fetch_and_parse().await;
        match &result {
            Ok(catalog) => {
                spinner.finish_and_clear();
                info!("目录加载完成，共 {} 个视频小节", catalog.section_count());
            }
            Err(e) => {
                spinner.finish_and_clear();
                warn!("目录加载失败: {}", e);
            }
        }
        result
    }

    async fn fetch_and_parse(&self) -> Result<Catalog, CatalogError> {
        let doc = match &self.source {
            CatalogSource::Http(url) => {
                HttpFetcher::new(url.clone(), self.timeout)?.fetch().await?
            }
            CatalogSource::File(path) => FileFetcher { path: path.clone() }.fetch().await?,
        };

        let mut catalog = Catalog::from_json_str(&doc.body)?;
        if let Some(base) = &doc.base {
            resolve_relative_urls(&mut catalog, base);
        }
        Ok(catalog)
    }
}

fn loading_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("正在加载视频目录...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// 网络目录里的相对地址按目录文档地址补全
fn resolve_relative_urls(catalog: &mut Catalog, base: &Url) {
    for semester in &mut catalog.semesters {
        for course in &mut semester.courses {
            for week in &mut course.weeks {
                for section in &mut week.sections {
                    resolve_in_place(&mut section.url, base);
                    if let Some(subtitle) = &mut section.subtitle {
                        resolve_in_place(subtitle, base);
                    }
                }
            }
        }
    }
}

fn resolve_in_place(field: &mut String, base: &Url) {
    if Url::parse(field).is_ok() {
        return; // 已是绝对地址
    }
    match base.join(field) {
        Ok(joined) => *field = joined.to_string(),
        Err(e) => debug!("相对地址 {} 无法解析: {}", field, e),
    }
}

// -----------------------------------------------------------------------------------------------
