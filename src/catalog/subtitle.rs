use crate::catalog::models::Section;

/// 字幕轨配置
#[derive(Debug, Clone)]
pub struct SubtitleConfig {
    pub lang: String, // 语言代码，拼入派生文件名
    pub ext: String,  // 字幕格式扩展名
    pub enabled: bool,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            lang: "zh".to_string(),
            ext: "vtt".to_string(),
            enabled: true,
        }
    }
}

/// 解析小节的字幕地址：显式字段优先，否则按视频地址派生
pub fn resolve_subtitle_url(section: &Section, config: &SubtitleConfig) -> Option<String> {
    if !config.enabled {
        return None;
    }
    match &section.subtitle {
        Some(explicit) => Some(explicit.clone()),
        None => derive_subtitle_url(&section.url, &config.lang, &config.ext),
    }
}

/// 去掉视频地址的扩展名，拼上语言代码和字幕扩展名：
/// `a/b/lecture01.mp4` -> `a/b/lecture01.zh.vtt`
///
/// 最后一段路径里没有扩展名时无法派生，返回 None。
pub fn derive_subtitle_url(media_url: &str, lang: &str, ext: &str) -> Option<String> {
    // 查询串里可能也有点号，先裁掉
    let path = media_url
        .split_once('?')
        .map(|(p, _)| p)
        .unwrap_or(media_url);
    let dot = path.rfind('.')?;
    if let Some(slash) = path.rfind('/') {
        if dot < slash {
            return None;
        }
    }
    Some(format!("{}.{}.{}", &path[..dot], lang, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(url: &str, subtitle: Option<&str>) -> Section {
        Section {
            title: "小节".to_string(),
            url: url.to_string(),
            duration: None,
            description: None,
            subtitle: subtitle.map(str::to_string),
        }
    }

    #[test]
    fn derive_strips_extension_and_tags_language() {
        assert_eq!(
            derive_subtitle_url("a/b/lecture01.mp4", "zh", "vtt"),
            Some("a/b/lecture01.zh.vtt".to_string())
        );
    }

    #[test]
    fn derive_ignores_query_string() {
        assert_eq!(
            derive_subtitle_url("https://v.example.com/w7c0.mp4?token=1.5", "zh", "vtt"),
            Some("https://v.example.com/w7c0.zh.vtt".to_string())
        );
    }

    #[test]
    fn derive_without_extension_yields_none() {
        assert_eq!(derive_subtitle_url("a/b/lecture01", "zh", "vtt"), None);
        // 域名里的点号不算扩展名
        assert_eq!(derive_subtitle_url("https://v.example.com/stream", "zh", "vtt"), None);
    }

    #[test]
    fn explicit_subtitle_wins() {
        let s = section("a/b/lecture01.mp4", Some("subs/lecture01.srt"));
        assert_eq!(
            resolve_subtitle_url(&s, &SubtitleConfig::default()),
            Some("subs/lecture01.srt".to_string())
        );
    }

    #[test]
    fn disabled_config_yields_none() {
        let s = section("a/b/lecture01.mp4", Some("subs/lecture01.srt"));
        let config = SubtitleConfig {
            enabled: false,
            ..SubtitleConfig::default()
        };
        assert_eq!(resolve_subtitle_url(&s, &config), None);
    }

    #[test]
    fn fallback_derivation_from_media_url() {
        let s = section("a/b/lecture01.mp4", None);
        assert_eq!(
            resolve_subtitle_url(&s, &SubtitleConfig::default()),
            Some("a/b/lecture01.zh.vtt".to_string())
        );
    }
}
