pub mod comments;
pub mod config;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod summarize;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

pub use normalize::{Fallback, Summary, normalize};
pub use pipeline::{Content, Fetcher, Limits, Pipeline, RunError, RunState, Stage, Summarizer, Workflow};

static WATCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:www\.|m\.|music\.)?youtube\.com/watch\?(?:.*&)?v=([a-zA-Z0-9_-]{11})(?:[&#].*)?$")
        .expect("valid watch regex")
});

static SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^youtu\.be/([a-zA-Z0-9_-]{11})(?:[?#].*)?$").expect("valid short regex")
});

/// One `key=value` query pair, ASCII only so surrounding prose is never swallowed
const QUERY_PAIR: &str = r"[A-Za-z0-9_.%~-]+=[A-Za-z0-9_.%~-]*";

static URL_IN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let watch = format!(
        r"https?://(?:(?:www|m|music)\.)?youtube\.com/watch\?(?:{QUERY_PAIR}&)*v=[A-Za-z0-9_-]+(?:&{QUERY_PAIR})*"
    );
    let short = format!(r"https?://youtu\.be/[A-Za-z0-9_-]+(?:\?{QUERY_PAIR}(?:&{QUERY_PAIR})*)?");
    Regex::new(&format!("{watch}|{short}")).expect("valid url-in-text regex")
});

static ANY_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

static SCRIPT_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:scripts?|transcripts?|subtitles?|captions?)\b").expect("valid script keyword regex")
});

static COMMENT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcomments?\b").expect("valid comment keyword regex"));

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn valid_id(candidate: &str) -> Option<String> {
    if !candidate.is_empty() && candidate.chars().all(is_id_char) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Structured parse of a full URL with a scheme
fn id_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(&host);

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match host {
        "youtu.be" => valid_id(segments.next()?),
        "youtube.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .and_then(|(_, v)| valid_id(&v)),
            "embed" | "shorts" | "live" => valid_id(segments.next()?),
            _ => None,
        },
        _ => None,
    }
}

/// Regex match for scheme-less inputs such as `youtu.be/ID`
fn id_from_pattern(input: &str) -> Option<String> {
    [&*WATCH_RE, &*SHORT_RE]
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
}

/// Extract video ID from the watch-URL and short-URL forms.
///
/// Full URLs are parsed structurally first; the regex patterns only run
/// when that yields nothing. Anything that is not a YouTube URL shape
/// returns `None`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    id_from_url(input).or_else(|| id_from_pattern(input))
}

/// Find the first YouTube URL inside a free-text message
pub fn find_video_url(text: &str) -> Option<&str> {
    URL_IN_TEXT_RE.find(text).map(|m| m.as_str())
}

/// Workflows a chat message asks for, script first. Defaults to the script workflow.
///
/// URLs are removed before matching; English keywords only count as whole words.
pub fn workflows_for_message(text: &str) -> Vec<Workflow> {
    let prose = ANY_URL_RE.replace_all(text, " ");
    let mut workflows = Vec::new();
    if prose.contains("스크립트") || prose.contains("자막") || SCRIPT_WORD_RE.is_match(&prose) {
        workflows.push(Workflow::Script);
    }
    if prose.contains("댓글") || COMMENT_WORD_RE.is_match(&prose) {
        workflows.push(Workflow::Comments);
    }
    if workflows.is_empty() {
        workflows.push(Workflow::Script);
    }
    workflows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc12345678"),
            Some("abc12345678".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/abc12345678"),
            Some("abc12345678".to_string())
        );
    }

    #[test]
    fn test_short_url_with_share_param() {
        assert_eq!(
            extract_video_id("https://youtu.be/sLe6jgHoYtk?si=BP39AJQL1PvIoWBe"),
            Some("sLe6jgHoYtk".to_string())
        );
    }

    #[test]
    fn test_short_url_returns_whole_path_segment() {
        assert_eq!(extract_video_id("https://youtu.be/short"), Some("short".to_string()));
    }

    #[test]
    fn test_embed_and_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_mobile_host() {
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_scheme_less_fallback() {
        assert_eq!(
            extract_video_id("www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url_without_v() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?list=PL123"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_invalid_inputs() {
        for input in [
            "",
            "   ",
            "not-a-valid-id",
            "dQw4w9WgXcQ",
            "https://vimeo.com/123456",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/channel/UC123",
            "ftp://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/",
            "://::",
            "유튜브 링크",
        ] {
            assert_eq!(extract_video_id(input), None, "input: {input:?}");
        }
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(
            extract_video_id("  https://youtu.be/dQw4w9WgXcQ  "),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_find_video_url_in_message() {
        let msg = "https://www.youtube.com/watch?v=itJE4neqDJw 이거 댓글 리포트 만들어줘";
        assert_eq!(find_video_url(msg), Some("https://www.youtube.com/watch?v=itJE4neqDJw"));
        assert_eq!(
            find_video_url("스크립트 요약해줘 https://youtu.be/sLe6jgHoYtk"),
            Some("https://youtu.be/sLe6jgHoYtk")
        );
        assert_eq!(find_video_url("no link here"), None);
    }

    #[test]
    fn test_find_video_url_stops_at_punctuation() {
        let url = find_video_url("이 영상 https://youtu.be/abc12345678, 댓글 요약해줘").unwrap();
        assert_eq!(url, "https://youtu.be/abc12345678");
        assert_eq!(extract_video_id(url), Some("abc12345678".to_string()));

        let url = find_video_url("(https://www.youtube.com/watch?v=abc12345678) 스크립트").unwrap();
        assert_eq!(url, "https://www.youtube.com/watch?v=abc12345678");
        assert_eq!(extract_video_id(url), Some("abc12345678".to_string()));
    }

    #[test]
    fn test_find_video_url_stops_at_glued_hangul() {
        let url = find_video_url("https://youtu.be/abc12345678요약해줘").unwrap();
        assert_eq!(extract_video_id(url), Some("abc12345678".to_string()));

        let url = find_video_url("https://www.youtube.com/watch?v=abc12345678댓글").unwrap();
        assert_eq!(extract_video_id(url), Some("abc12345678".to_string()));
    }

    #[test]
    fn test_find_video_url_keeps_query_pairs() {
        assert_eq!(
            find_video_url("봐봐 https://youtu.be/sLe6jgHoYtk?si=BP39AJQL1PvIoWBe!"),
            Some("https://youtu.be/sLe6jgHoYtk?si=BP39AJQL1PvIoWBe")
        );
        let url = find_video_url("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120, 스크립트").unwrap();
        assert_eq!(url, "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120");
        assert_eq!(extract_video_id(url), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_workflows_for_message() {
        assert_eq!(workflows_for_message("https://youtu.be/x 댓글 리포트 만들어줘"), [Workflow::Comments]);
        assert_eq!(
            workflows_for_message("스크립트랑 댓글 둘 다 요약해줘"),
            [Workflow::Script, Workflow::Comments]
        );
        assert_eq!(workflows_for_message("Summarize the COMMENTS please"), [Workflow::Comments]);
        assert_eq!(workflows_for_message("https://youtu.be/x"), [Workflow::Script]);
    }

    #[test]
    fn test_workflows_for_message_matches_whole_words_outside_urls() {
        assert_eq!(
            workflows_for_message("https://youtu.be/x 댓글 description 알려줘"),
            [Workflow::Comments]
        );
        assert_eq!(
            workflows_for_message("https://youtu.be/script00000 댓글 요약"),
            [Workflow::Comments]
        );
        assert_eq!(
            workflows_for_message("transcript and comments for https://youtu.be/x"),
            [Workflow::Script, Workflow::Comments]
        );
    }
}
