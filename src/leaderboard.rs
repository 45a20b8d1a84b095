//! Online leaderboard
//!
//! The backend speaks a tiny JSON protocol:
//! - `GET {base}/scores` returns `[{name, score}, ...]`
//! - `POST {base}/add-score` takes `{name, score}` and returns `{error?}`
//!
//! Everything here is recoverable: a failed fetch or submit becomes a UI
//! state, never an interruption of the game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entries kept by [`LocalLeaderboard`]
pub const MAX_LOCAL_SCORES: usize = 10;

pub const MSG_NAME_REQUIRED: &str = "Please enter your name.";
pub const MSG_SAVE_REJECTED: &str = "Error saving score!";
pub const MSG_SERVER_ERROR: &str = "Server error!";
pub const MSG_NO_SCORES: &str = "No scores yet.";

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// Body of the submit response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx status; `message` is the server's `error` field or `HTTP <status>`
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The server answered but refused the request
    #[error("Server rejected request: {0}")]
    Server(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Name is empty")]
    InvalidName,
}

impl LeaderboardError {
    /// Whether asking again could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            LeaderboardError::Transport(_) => true,
            LeaderboardError::Http { status, .. } => *status >= 500 || *status == 429,
            LeaderboardError::Decode(_) => true,
            LeaderboardError::Server(_) => false,
            LeaderboardError::InvalidName => false,
        }
    }
}

/// Leaderboard backend
pub trait LeaderboardClient {
    fn submit(&mut self, name: &str, score: u32) -> Result<(), LeaderboardError>;
    fn fetch(&mut self) -> Result<Vec<ScoreEntry>, LeaderboardError>;
}

// === Wire format ===

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

pub fn scores_url(base: &str) -> String {
    join(base, "scores")
}

pub fn add_score_url(base: &str) -> String {
    join(base, "add-score")
}

/// Trimmed player name, rejecting blanks
pub fn normalize_name(raw: &str) -> Result<String, LeaderboardError> {
    let name = raw.trim();
    if name.is_empty() {
        Err(LeaderboardError::InvalidName)
    } else {
        Ok(name.to_string())
    }
}

pub fn encode_submit(name: &str, score: u32) -> Result<String, LeaderboardError> {
    let entry = ScoreEntry {
        name: name.to_string(),
        score,
    };
    serde_json::to_string(&entry).map_err(|e| LeaderboardError::Decode(e.to_string()))
}

/// Interpret a submit response
///
/// Any body carrying `error` is a rejection, whatever the status.
pub fn decode_submit(status: u16, body: &str) -> Result<(), LeaderboardError> {
    let response: SubmitResponse =
        serde_json::from_str(body).map_err(|e| LeaderboardError::Decode(e.to_string()))?;
    if let Some(error) = response.error {
        return Err(LeaderboardError::Server(error));
    }
    if !(200..300).contains(&status) {
        return Err(http_error(status, None));
    }
    Ok(())
}

/// Interpret a scores response. A 2xx body that is not an array means no scores.
pub fn decode_scores(status: u16, body: &str) -> Result<Vec<ScoreEntry>, LeaderboardError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<SubmitResponse>(body)
            .ok()
            .and_then(|r| r.error);
        return Err(http_error(status, message));
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LeaderboardError::Decode(e.to_string()))?;
    if !value.is_array() {
        log::warn!("Scores response is not an array, treating as empty");
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| LeaderboardError::Decode(e.to_string()))
}

fn http_error(status: u16, message: Option<String>) -> LeaderboardError {
    LeaderboardError::Http {
        status,
        message: message.unwrap_or_else(|| format!("HTTP {status}")),
    }
}

// === In-memory backend ===

/// Leaderboard held in memory: top 10, highest first, earlier entry wins ties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    pub entries: Vec<ScoreEntry>,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_LOCAL_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert a score. Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, name: String, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = ScoreEntry { name, score };
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_LOCAL_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

impl LeaderboardClient for LocalLeaderboard {
    fn submit(&mut self, name: &str, score: u32) -> Result<(), LeaderboardError> {
        let name = normalize_name(name)?;
        match self.add_score(name, score) {
            Some(rank) => log::info!("Score {} ranked #{}", score, rank),
            None => log::info!("Score {} did not make the top {}", score, MAX_LOCAL_SCORES),
        }
        Ok(())
    }

    fn fetch(&mut self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        Ok(self.entries.clone())
    }
}

// === UI state ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    /// Request in flight; further submits are refused
    Submitting { name: String },
    Saved(String),
    Failed(String),
}

/// Game-over name entry form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitForm {
    pub score: u32,
    pub status: SubmitStatus,
}

impl SubmitForm {
    pub fn new(score: u32) -> Self {
        Self {
            score,
            status: SubmitStatus::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, SubmitStatus::Submitting { .. })
    }

    /// Text to show under the form
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            SubmitStatus::Saved(msg) | SubmitStatus::Failed(msg) => Some(msg),
            SubmitStatus::Idle | SubmitStatus::Submitting { .. } => None,
        }
    }

    /// Validate the typed name and mark the form busy
    ///
    /// Returns the name to send, or None if nothing should be sent.
    pub fn begin(&mut self, raw_name: &str) -> Option<String> {
        if self.is_busy() {
            log::debug!("Submit ignored: already submitting");
            return None;
        }
        match normalize_name(raw_name) {
            Ok(name) => {
                self.status = SubmitStatus::Submitting { name: name.clone() };
                Some(name)
            }
            Err(_) => {
                self.status = SubmitStatus::Failed(MSG_NAME_REQUIRED.to_string());
                None
            }
        }
    }

    /// Record the outcome of the request started by [`SubmitForm::begin`]
    pub fn finish(&mut self, result: Result<(), LeaderboardError>) {
        let SubmitStatus::Submitting { name } = &self.status else {
            return;
        };
        let name = name.clone();
        self.status = match result {
            Ok(()) => SubmitStatus::Saved(format!("Score saved successfully {name}!")),
            Err(e @ (LeaderboardError::Server(_) | LeaderboardError::Http { .. })) => {
                log::warn!("Score not saved: {}", e);
                SubmitStatus::Failed(MSG_SAVE_REJECTED.to_string())
            }
            Err(e) => {
                log::warn!("Score submit failed: {}", e);
                SubmitStatus::Failed(MSG_SERVER_ERROR.to_string())
            }
        };
    }

    /// Submit through a synchronous client
    pub fn submit_with(&mut self, client: &mut impl LeaderboardClient, raw_name: &str) {
        if let Some(name) = self.begin(raw_name) {
            let result = client.submit(&name, self.score);
            self.finish(result);
        }
    }
}

/// Leaderboard drawer contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    Loading,
    Loaded(Vec<ScoreEntry>),
    Empty,
    Failed { message: String, retryable: bool },
}

impl LeaderboardView {
    pub fn from_result(result: Result<Vec<ScoreEntry>, LeaderboardError>) -> Self {
        match result {
            Ok(entries) if entries.is_empty() => LeaderboardView::Empty,
            Ok(entries) => LeaderboardView::Loaded(entries),
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                LeaderboardView::Failed {
                    message: format!("Failed to fetch scores: {e}"),
                    retryable: e.is_retryable(),
                }
            }
        }
    }

    /// Rows as (`"{rank}. {name}"`, score)
    pub fn rows(&self) -> Vec<(String, u32)> {
        match self {
            LeaderboardView::Loaded(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, e)| (format!("{}. {}", i + 1, e.name), e.score))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Status line, if the view shows one instead of rows
    pub fn status_text(&self) -> Option<String> {
        match self {
            LeaderboardView::Loading => Some("Loading…".to_string()),
            LeaderboardView::Empty => Some(MSG_NO_SCORES.to_string()),
            LeaderboardView::Failed { message, .. } => Some(format!("Error: {message}")),
            LeaderboardView::Loaded(_) => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::HttpLeaderboard;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestCache, RequestInit, RequestMode, Response};

    use super::*;

    /// Leaderboard backend reached with `fetch`
    #[derive(Debug, Clone)]
    pub struct HttpLeaderboard {
        base: String,
    }

    fn transport(err: JsValue) -> LeaderboardError {
        LeaderboardError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }

    impl HttpLeaderboard {
        pub fn new(base: impl Into<String>) -> Self {
            Self { base: base.into() }
        }

        async fn send(request: Request) -> Result<(u16, String), LeaderboardError> {
            let window = web_sys::window()
                .ok_or_else(|| LeaderboardError::Transport("no window".to_string()))?;
            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(transport)?
                .dyn_into()
                .map_err(transport)?;
            let text = JsFuture::from(response.text().map_err(transport)?)
                .await
                .map_err(transport)?;
            Ok((response.status(), text.as_string().unwrap_or_default()))
        }

        pub async fn fetch_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
            let opts = RequestInit::new();
            opts.set_method("GET");
            opts.set_mode(RequestMode::Cors);
            opts.set_cache(RequestCache::NoStore);
            let request =
                Request::new_with_str_and_init(&scores_url(&self.base), &opts).map_err(transport)?;

            let (status, body) = Self::send(request).await?;
            decode_scores(status, &body)
        }

        pub async fn submit_score(&self, name: &str, score: u32) -> Result<(), LeaderboardError> {
            let body = encode_submit(name, score)?;
            let opts = RequestInit::new();
            opts.set_method("POST");
            opts.set_mode(RequestMode::Cors);
            opts.set_body(&JsValue::from_str(&body));
            let request = Request::new_with_str_and_init(&add_score_url(&self.base), &opts)
                .map_err(transport)?;
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(transport)?;

            let (status, body) = Self::send(request).await?;
            decode_submit(status, &body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        assert_eq!(scores_url("https://api.example.com"), "https://api.example.com/scores");
        assert_eq!(add_score_url("https://api.example.com/"), "https://api.example.com/add-score");
    }

    #[test]
    fn test_encode_submit_body() {
        let body = encode_submit("Ada", 12).expect("encodes");
        assert_eq!(body, r#"{"name":"Ada","score":12}"#);
    }

    #[test]
    fn test_decode_scores() {
        let body = r#"[{"name":"Ada","score":12},{"name":"Bob","score":3}]"#;
        let scores = decode_scores(200, body).expect("decodes");
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], ScoreEntry { name: "Ada".into(), score: 12 });

        assert_eq!(decode_scores(200, r#"{"rows":[]}"#), Ok(Vec::new()));
        assert!(matches!(decode_scores(200, "<html>"), Err(LeaderboardError::Decode(_))));
    }

    #[test]
    fn test_decode_scores_http_errors() {
        let err = decode_scores(500, r#"{"error":"db down"}"#).unwrap_err();
        assert_eq!(err.to_string(), "db down");
        assert!(err.is_retryable());

        let err = decode_scores(404, "not json").unwrap_err();
        assert_eq!(
            err,
            LeaderboardError::Http {
                status: 404,
                message: "HTTP 404".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_decode_submit() {
        assert_eq!(decode_submit(200, "{}"), Ok(()));
        assert_eq!(
            decode_submit(200, r#"{"error":"duplicate"}"#),
            Err(LeaderboardError::Server("duplicate".into()))
        );
        assert!(matches!(decode_submit(502, "{}"), Err(LeaderboardError::Http { status: 502, .. })));
        assert!(matches!(decode_submit(200, ""), Err(LeaderboardError::Decode(_))));
    }

    #[test]
    fn test_local_leaderboard_keeps_top_ten() {
        let mut board = LocalLeaderboard::new();
        for i in 0..12u32 {
            board.add_score(format!("p{i}"), i * 10);
        }
        assert_eq!(board.entries.len(), MAX_LOCAL_SCORES);
        assert_eq!(board.top_score(), Some(110));
        assert_eq!(board.entries.last().map(|e| e.score), Some(20));
        assert!(!board.qualifies(20));
        assert_eq!(board.add_score("late".into(), 5), None);
    }

    #[test]
    fn test_local_leaderboard_ties_keep_first() {
        let mut board = LocalLeaderboard::new();
        board.add_score("first".into(), 10);
        assert_eq!(board.add_score("second".into(), 10), Some(2));
        assert_eq!(board.entries[0].name, "first");
    }

    #[test]
    fn test_form_requires_name() {
        let mut form = SubmitForm::new(9);
        let mut board = LocalLeaderboard::new();
        form.submit_with(&mut board, "   ");
        assert_eq!(form.message(), Some(MSG_NAME_REQUIRED));
        assert!(board.entries.is_empty());
    }

    #[test]
    fn test_form_success_message() {
        let mut form = SubmitForm::new(9);
        let mut board = LocalLeaderboard::new();
        form.submit_with(&mut board, "  Ada ");
        assert_eq!(form.message(), Some("Score saved successfully Ada!"));
        assert_eq!(board.entries, vec![ScoreEntry { name: "Ada".into(), score: 9 }]);
    }

    #[test]
    fn test_form_rejects_double_submit() {
        let mut form = SubmitForm::new(4);
        assert_eq!(form.begin("Ada"), Some("Ada".to_string()));
        assert!(form.is_busy());
        assert_eq!(form.begin("Ada"), None);

        form.finish(Err(LeaderboardError::Server("nope".into())));
        assert_eq!(form.message(), Some(MSG_SAVE_REJECTED));
        assert!(!form.is_busy());

        assert!(form.begin("Ada").is_some());
        form.finish(Err(LeaderboardError::Transport("offline".into())));
        assert_eq!(form.message(), Some(MSG_SERVER_ERROR));
    }

    #[test]
    fn test_view_states() {
        assert_eq!(LeaderboardView::from_result(Ok(Vec::new())), LeaderboardView::Empty);
        assert_eq!(LeaderboardView::Empty.status_text().as_deref(), Some("No scores yet."));

        let view = LeaderboardView::from_result(Ok(vec![
            ScoreEntry { name: "Ada".into(), score: 12 },
            ScoreEntry { name: "Bob".into(), score: 3 },
        ]));
        assert_eq!(view.rows(), vec![("1. Ada".to_string(), 12), ("2. Bob".to_string(), 3)]);
        assert_eq!(view.status_text(), None);

        let view = LeaderboardView::from_result(Err(LeaderboardError::Transport("offline".into())));
        match view {
            LeaderboardView::Failed { message, retryable } => {
                assert_eq!(message, "Failed to fetch scores: Network error: offline");
                assert!(retryable);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
