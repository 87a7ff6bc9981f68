//! YouTube Data API v3 comment fetch

use super::CommentSource;
use chrono::{DateTime, Utc};
use cs_core::config::FetchConfig;
use cs_core::error::{Result, SentimentError};
use cs_core::types::CommentRecord;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Largest page the API serves
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadList {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    text_display: String,
    #[serde(default)]
    like_count: u64,
    published_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<CommentSnippet> for CommentRecord {
    fn from(snippet: CommentSnippet) -> Self {
        CommentRecord {
            author: snippet.author_display_name,
            raw_text: snippet.text_display,
            like_count: snippet.like_count,
            published_at: snippet.published_at,
            updated_at: snippet.updated_at.unwrap_or(snippet.published_at),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// Requested page size for the next call
fn page_size(configured: usize, remaining: usize) -> usize {
    configured.clamp(1, MAX_PAGE_SIZE).min(remaining)
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => format!(
            "YouTube API error ({}): {}",
            if parsed.error.code == 0 { status.as_u16() } else { parsed.error.code },
            parsed.error.message
        ),
        _ => format!("YouTube API error ({})", status),
    }
}

/// Blocking client for the `commentThreads` endpoint. No retries.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    endpoint: String,
    page_size: usize,
    order: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, config: &FetchConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SentimentError::Config(
                "YouTube API key not found; set YOUTUBE_API_KEY or pass --api-key".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SentimentError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            order: config.order.clone(),
        })
    }

    fn fetch_page(
        &self,
        video_id: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<CommentThreadList> {
        let url = format!("{}/commentThreads", self.endpoint);
        let max_results = max_results.to_string();
        let mut query = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", max_results.as_str()),
            ("textFormat", "plainText"),
            ("order", self.order.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .map_err(|e| SentimentError::Fetch(format!("YouTube request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SentimentError::Fetch(describe_error(status, &body)));
        }

        response
            .json::<CommentThreadList>()
            .map_err(|e| SentimentError::Fetch(format!("Failed to parse YouTube response: {}", e)))
    }
}

impl CommentSource for YouTubeClient {
    fn name(&self) -> &str {
        "youtube"
    }

    fn fetch_with_progress(
        &self,
        video_id: &str,
        max_comments: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<Vec<CommentRecord>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_comments {
            let remaining = max_comments - comments.len();
            let page = self.fetch_page(
                video_id,
                page_size(self.page_size, remaining),
                page_token.as_deref(),
            )?;
            debug!("Fetched page with {} threads", page.items.len());

            comments.extend(
                page.items
                    .into_iter()
                    .take(remaining)
                    .map(|thread| CommentRecord::from(thread.snippet.top_level_comment.snippet)),
            );
            progress(comments.len());

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        info!("Fetched {} comments for video {}", comments.len(), video_id);
        Ok(comments)
    }
}
