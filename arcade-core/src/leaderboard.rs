//! Leaderboard records, the rules the score service applies to incoming submissions,
//! and the best-effort client the game uses to talk to it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_PLAYER_NAME, LEADERBOARD_SIZE, PLAYER_NAME_MAX_CHARS};
use crate::error::ClientError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// `DD/MM/YYYY`, as formatted by the service.
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
}

impl ScoreSubmission {
    pub fn new(name: &str, score: u32) -> Self {
        Self {
            name: clean_player_name(name),
            score: score.min(i32::MAX as u32),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Trims, caps at 20 characters and falls back to the default name when nothing is
/// left.
pub fn clean_player_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(PLAYER_NAME_MAX_CHARS).collect();
    if name.is_empty() {
        DEFAULT_PLAYER_NAME.to_string()
    } else {
        name
    }
}

/// Name from an untrusted JSON body. Anything other than a string gets the default.
pub fn sanitize_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(raw)) => clean_player_name(raw),
        _ => DEFAULT_PLAYER_NAME.to_string(),
    }
}

/// Score from an untrusted JSON body.
///
/// Numbers are truncated toward zero and strings contribute their leading integer
/// (`"42abc"` is 42), the way a browser's `parseInt` reads them. Everything else is 0.
/// The result is clamped to `0..=i32::MAX` so it fits the score column.
pub fn coerce_score(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
        }),
        Some(Value::String(raw)) => leading_integer(raw),
        _ => None,
    };

    parsed
        .map(|score| score.clamp(0, i64::from(i32::MAX)) as u32)
        .unwrap_or(0)
}

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Network side of the leaderboard. Implementations block; callers that cannot block
/// run them on a worker thread.
pub trait ScoreTransport {
    fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError>;

    /// Stores `submission` and returns the refreshed top list.
    fn submit_score(
        &self,
        submission: &ScoreSubmission,
    ) -> Result<Vec<LeaderboardEntry>, ClientError>;
}

/// Keeps the last leaderboard the service returned. Failures are logged and leave the
/// list untouched; nothing here can interrupt a game.
pub struct LeaderboardClient<T> {
    transport: T,
    entries: Vec<LeaderboardEntry>,
}

impl<T: ScoreTransport> LeaderboardClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            entries: Vec::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self, count: usize) -> &[LeaderboardEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// Returns `true` when the list was refreshed.
    pub fn load(&mut self) -> bool {
        match self.transport.fetch_leaderboard() {
            Ok(entries) => {
                self.replace(entries);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "leaderboard fetch failed");
                false
            }
        }
    }

    /// Returns `true` when the score was stored and the list refreshed.
    pub fn submit(&mut self, name: &str, score: u32) -> bool {
        let submission = ScoreSubmission::new(name, score);
        match self.transport.submit_score(&submission) {
            Ok(entries) => {
                tracing::info!(name = %submission.name, score = submission.score, "score submitted");
                self.replace(entries);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, score = submission.score, "score submission failed");
                false
            }
        }
    }

    /// Installs a list fetched elsewhere, e.g. by a background worker.
    pub fn replace(&mut self, mut entries: Vec<LeaderboardEntry>) {
        entries.truncate(LEADERBOARD_SIZE);
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
            date: "01/02/2024".to_string(),
        }
    }

    #[derive(Default)]
    struct MemoryTransport {
        rows: RefCell<Vec<LeaderboardEntry>>,
        submissions: RefCell<Vec<ScoreSubmission>>,
    }

    impl ScoreTransport for MemoryTransport {
        fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
            Ok(self.rows.borrow().clone())
        }

        fn submit_score(
            &self,
            submission: &ScoreSubmission,
        ) -> Result<Vec<LeaderboardEntry>, ClientError> {
            self.submissions.borrow_mut().push(submission.clone());
            let mut rows = self.rows.borrow_mut();
            rows.push(entry(&submission.name, submission.score));
            rows.sort_by(|a, b| b.score.cmp(&a.score));
            Ok(rows.clone())
        }
    }

    struct OfflineTransport;

    impl ScoreTransport for OfflineTransport {
        fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
            Err(ClientError::Unavailable {
                reason: "connection refused".to_string(),
            })
        }

        fn submit_score(&self, _: &ScoreSubmission) -> Result<Vec<LeaderboardEntry>, ClientError> {
            Err(ClientError::Status {
                code: 500,
                message: "Database error".to_string(),
            })
        }
    }

    #[test]
    fn names_are_trimmed_capped_and_defaulted() {
        assert_eq!(clean_player_name("  Ann  "), "Ann");
        assert_eq!(clean_player_name("   "), DEFAULT_PLAYER_NAME);
        assert_eq!(
            clean_player_name("abcdefghijklmnopqrstuvwxyz"),
            "abcdefghijklmnopqrst"
        );
        assert_eq!(clean_player_name("ééééééééééééééééééééé").chars().count(), 20);
    }

    #[test]
    fn non_string_names_get_the_default() {
        assert_eq!(sanitize_name(None), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_name(Some(&json!(null))), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_name(Some(&json!(17))), DEFAULT_PLAYER_NAME);
        assert_eq!(sanitize_name(Some(&json!(" Bo "))), "Bo");
    }

    #[test]
    fn scores_follow_integer_prefix_parsing() {
        assert_eq!(coerce_score(Some(&json!(42))), 42);
        assert_eq!(coerce_score(Some(&json!(42.9))), 42);
        assert_eq!(coerce_score(Some(&json!("  77 points"))), 77);
        assert_eq!(coerce_score(Some(&json!("+8"))), 8);
        assert_eq!(coerce_score(Some(&json!("not-a-number"))), 0);
        assert_eq!(coerce_score(Some(&json!(""))), 0);
        assert_eq!(coerce_score(Some(&json!(true))), 0);
        assert_eq!(coerce_score(None), 0);
    }

    #[test]
    fn scores_are_clamped_to_the_column_range() {
        assert_eq!(coerce_score(Some(&json!(-5))), 0);
        assert_eq!(coerce_score(Some(&json!("-12"))), 0);
        assert_eq!(coerce_score(Some(&json!(1u64 << 40))), i32::MAX as u32);
        assert_eq!(
            coerce_score(Some(&json!("99999999999999999999999"))),
            i32::MAX as u32
        );
    }

    #[test]
    fn load_fills_entries() {
        let transport = MemoryTransport::default();
        transport.rows.borrow_mut().extend([entry("A", 30), entry("B", 20)]);

        let mut client = LeaderboardClient::new(transport);
        assert!(client.load());
        assert_eq!(client.entries().len(), 2);
        assert_eq!(client.top(1), &[entry("A", 30)]);
        assert_eq!(client.top(5).len(), 2);
    }

    #[test]
    fn submit_replaces_entries_with_service_list() {
        let mut client = LeaderboardClient::new(MemoryTransport::default());
        client.replace(vec![entry("Old", 1)]);

        assert!(client.submit("  Ann ", 42));
        assert_eq!(client.entries()[0].name, "Ann");
        assert_eq!(client.entries()[0].score, 42);

        let sent = client.transport().submissions.borrow().clone();
        assert_eq!(
            sent,
            vec![ScoreSubmission {
                name: "Ann".to_string(),
                score: 42
            }]
        );
    }

    #[test]
    fn replace_keeps_only_the_top_ten() {
        let mut client = LeaderboardClient::new(MemoryTransport::default());
        client.replace((0..15).map(|index| entry("P", 100 - index)).collect());
        assert_eq!(client.entries().len(), LEADERBOARD_SIZE);
    }

    #[test]
    fn offline_service_leaves_list_alone() {
        let mut client = LeaderboardClient::new(OfflineTransport);
        assert!(!client.load());
        assert!(client.entries().is_empty());

        client.replace(vec![entry("Kept", 5)]);
        assert!(!client.submit("Ann", 42));
        assert_eq!(client.entries(), &[entry("Kept", 5)]);
    }
}
