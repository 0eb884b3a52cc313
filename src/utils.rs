//! Utility functions shared by the client and the exporter.

use crate::anilist::model::Response;
use crate::error::AnilistError;
use regex::Regex;
use scraper::Html;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;

/// Runs of HTML whitespace.
static WHITESPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("Invalid WHITESPACE_RUN_REGEX"));

/// `<br>` in any of its spellings, with the spaces around it.
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) ?<br\s*/?> ?").expect("Invalid LINE_BREAK_REGEX"));

/// Three or more newlines in a row.
static BLANK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid BLANK_RUN_REGEX"));

/// Characters not allowed in directory names on common filesystems.
static UNSAFE_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("Invalid UNSAFE_PATH_REGEX"));

/// Reads a GraphQL response body, keeping AniList's `errors` array even on
/// a non-2xx status.
///
/// A failed request whose body is not a GraphQL envelope becomes an
/// [`AnilistError::Api`] carrying the status code and body.
pub async fn decode_graphql_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Response<T>, AnilistError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&text)?);
    }

    match serde_json::from_str::<Response<T>>(&text) {
        Ok(envelope) if !envelope.errors.is_empty() => Ok(envelope),
        _ => Err(AnilistError::Api(format!("HTTP {}: {}", status, text))),
    }
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

/// Turns an HTML description into plain text.
///
/// Source whitespace collapses to single spaces as a browser would render
/// it, `<br>` becomes a newline, other tags are dropped and entities
/// decoded. Newline runs collapse to one blank line.
pub fn html_to_text(html: &str) -> String {
    let collapsed = WHITESPACE_RUN_REGEX.replace_all(html, " ");
    let with_breaks = LINE_BREAK_REGEX.replace_all(&collapsed, "\n");

    let fragment = Html::parse_fragment(&with_breaks);
    let text: String = fragment.root_element().text().collect();

    BLANK_RUN_REGEX
        .replace_all(text.trim(), "\n\n")
        .into_owned()
}

/// Makes a title usable as a single directory name.
pub fn sanitize_dir_name(title: &str) -> String {
    let cleaned = UNSAFE_PATH_REGEX.replace_all(title, "_");
    let trimmed = cleaned.trim().trim_end_matches('.').trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_breaks_and_entities() {
        let text = html_to_text("Line one.<br><br>\nLine two &amp; more.<BR/>Line <i>three</i>.");
        assert_eq!(text, "Line one.\n\nLine two & more.\nLine three.");
    }

    #[test]
    fn test_html_to_text_collapses_blank_runs() {
        let text = html_to_text("a<br><br><br><br>b");
        assert_eq!(text, "a\n\nb");
    }

    #[test]
    fn test_html_to_text_source_newline_is_space() {
        assert_eq!(html_to_text("First line\nSecond line"), "First line Second line");
        assert_eq!(html_to_text("a\r\n  b"), "a b");
        assert_eq!(html_to_text("a \n<br>\n b"), "a\nb");
    }

    #[test]
    fn test_html_to_text_plain() {
        assert_eq!(html_to_text("  plain  "), "plain");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_sanitize_dir_name() {
        assert_eq!(sanitize_dir_name("Re:Zero"), "Re_Zero");
        assert_eq!(sanitize_dir_name("What?"), "What_");
        assert_eq!(sanitize_dir_name("Dr. Stone..."), "Dr. Stone");
        assert_eq!(sanitize_dir_name("  "), "untitled");
    }
}
