use course_player::catalog::{
    Catalog, CatalogError, CatalogLoader, SectionIndex, derive_subtitle_url,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const SAMPLE_CATALOG: &str = r#"[
    {
        "title": "第2学期",
        "courses": [
            {
                "title": "课程：final",
                "weeks": [
                    {
                        "title": "第7周",
                        "sections": [
                            { "title": "第0小节", "url": "term2/final/final-w7c0.mp4" },
                            { "title": "回顾总结", "url": "term2/final/final-w7recap.mp4", "duration": 1805 }
                        ]
                    },
                    {
                        "title": "第8周",
                        "sections": [
                            { "title": "第0小节", "url": "term2/final/final-w8c0.mp4" }
                        ]
                    }
                ]
            }
        ]
    }
]"#;

/// 起一个只回一次响应的本地 HTTP 服务
async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });
    format!("http://{}/videos_index.json", addr)
}

#[tokio::test]
async fn test_load_catalog_over_http() {
    let url = one_shot_server("HTTP/1.1 200 OK", SAMPLE_CATALOG).await;

    let loader = CatalogLoader::new(&url, 5).unwrap();
    let catalog = loader.load().await.unwrap();
    println!("✅ 目录加载成功: {} 个小节", catalog.section_count());

    assert_eq!(catalog.semesters.len(), 1);
    assert_eq!(catalog.section_count(), 3);

    // 相对地址已按目录文档地址补全
    let first = &catalog.semesters[0].courses[0].weeks[0].sections[0];
    assert!(
        first.url.starts_with("http://127.0.0.1"),
        "相对地址未补全: {}",
        first.url
    );
    assert!(first.url.ends_with("/term2/final/final-w7c0.mp4"));
}

#[tokio::test]
async fn test_http_404_reports_status_in_error() {
    let url = one_shot_server("HTTP/1.1 404 Not Found", "not here").await;

    let loader = CatalogLoader::new(&url, 5).unwrap();
    let err = loader.load().await.unwrap_err();
    println!("✅ 预期的加载失败: {}", err);

    match &err {
        CatalogError::HttpStatus(status) => assert_eq!(*status, 404),
        other => panic!("期望 HttpStatus 错误，实际 {:?}", other),
    }
    // 界面展示的错误文案里必须带状态码
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_parse_failure_is_fatal() {
    let url = one_shot_server("HTTP/1.1 200 OK", "{ 这不是合法的JSON ").await;

    let loader = CatalogLoader::new(&url, 5).unwrap();
    let err = loader.load().await.unwrap_err();
    println!("✅ 预期的解析失败: {}", err);
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test]
async fn test_load_catalog_from_file() {
    let dir = std::env::temp_dir().join(format!("courseplay-test-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("videos_index.json");
    tokio::fs::write(&path, SAMPLE_CATALOG).await.unwrap();

    let loader = CatalogLoader::new(path.to_str().unwrap(), 5).unwrap();
    let catalog = loader.load().await.unwrap();
    assert_eq!(catalog.section_count(), 3);
    // 本地文件没有基准地址，相对路径保持原样
    assert_eq!(
        catalog.semesters[0].courses[0].weeks[0].sections[0].url,
        "term2/final/final-w7c0.mp4"
    );

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[test]
fn test_index_covers_every_section_exactly_once() {
    let catalog = Catalog::from_json_str(SAMPLE_CATALOG).unwrap();
    let index = SectionIndex::build(&catalog);

    assert_eq!(index.len(), catalog.section_count());
    for entry in index.iter() {
        let resolved = index.resolve(entry.id).unwrap();
        assert_eq!(resolved.path, entry.path);
        // 组合标题带全部四级
        assert!(resolved.display_title.contains("第2学期"));
        assert!(resolved.display_title.contains("课程：final"));
    }
}

#[test]
fn test_subtitle_derivation_matches_convention() {
    assert_eq!(
        derive_subtitle_url("a/b/lecture01.mp4", "zh", "vtt"),
        Some("a/b/lecture01.zh.vtt".to_string())
    );
}

#[test]
fn test_both_catalog_encodings_agree() {
    let keyed = r#"{
        "第2学期": {
            "课程：final": {
                "第7周": [
                    { "title": "第0小节", "url": "term2/final/final-w7c0.mp4" },
                    { "title": "回顾总结", "url": "term2/final/final-w7recap.mp4", "duration": 1805 }
                ],
                "第8周": [
                    { "title": "第0小节", "url": "term2/final/final-w8c0.mp4" }
                ]
            }
        }
    }"#;

    let a = Catalog::from_json_str(SAMPLE_CATALOG).unwrap();
    let b = Catalog::from_json_str(keyed).unwrap();

    let urls = |c: &Catalog| -> Vec<String> {
        c.semesters
            .iter()
            .flat_map(|s| &s.courses)
            .flat_map(|c| &c.weeks)
            .flat_map(|w| &w.sections)
            .map(|s| s.url.clone())
            .collect()
    };
    // 两种编码解析出完全一致的遍历顺序
    assert_eq!(urls(&a), urls(&b));
}
