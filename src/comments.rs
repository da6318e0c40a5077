use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

use crate::pipeline::Fetcher;

const COMMENT_THREADS_URL: &str = "https://www.googleapis.com/youtube/v3/commentThreads";

/// The Data API caps a single page at 100 threads
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay", default)]
    text_display: String,
    #[serde(rename = "textOriginal")]
    text_original: Option<String>,
}

/// Top comments by relevance from the YouTube Data API v3
pub struct CommentFetcher {
    client: reqwest::Client,
    api_key: String,
    max_results: usize,
}

impl CommentFetcher {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, max_results: usize) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            max_results: max_results.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[async_trait]
impl Fetcher for CommentFetcher {
    async fn fetch(&self, video_id: &str) -> Result<Vec<String>> {
        debug!("Fetching up to {} comments for {video_id}", self.max_results);

        let max_results = self.max_results.to_string();
        let resp = self
            .client
            .get(COMMENT_THREADS_URL)
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("order", "relevance"),
                ("textFormat", "plainText"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if body.contains("commentsDisabled") {
                bail!("comments are disabled for video {video_id}");
            }
            bail!("YouTube Data API returned {status}: {body}");
        }

        let parsed: CommentThreadsResponse = resp.json().await?;
        let comments = comment_texts(parsed);
        debug!("Received {} comments for {video_id}", comments.len());
        Ok(comments)
    }
}

fn comment_texts(resp: CommentThreadsResponse) -> Vec<String> {
    resp.items
        .into_iter()
        .map(|thread| {
            let snippet = thread.snippet.top_level_comment.snippet;
            let text = snippet.text_original.unwrap_or(snippet.text_display);
            html_escape::decode_html_entities(&text).trim().to_string()
        })
        .filter(|text| !text.is_empty())
        .collect()
}
