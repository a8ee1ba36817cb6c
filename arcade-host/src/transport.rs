use std::time::Duration;

use arcade_core::leaderboard::SubmitResponse;
use arcade_core::{ClientError, LeaderboardEntry, ScoreSubmission, ScoreTransport};
use serde::de::DeserializeOwned;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocking HTTP client for the score service.
pub struct HttpTransport {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn leaderboard_url(&self) -> String {
        format!("{}/api/leaderboard", self.base_url)
    }

    pub fn score_url(&self) -> String {
        format!("{}/api/score", self.base_url)
    }
}

impl ScoreTransport for HttpTransport {
    fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let response = self
            .agent
            .get(&self.leaderboard_url())
            .call()
            .map_err(map_ureq_error)?;
        decode_body(response)
    }

    fn submit_score(
        &self,
        submission: &ScoreSubmission,
    ) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let response = self
            .agent
            .post(&self.score_url())
            .send_json(submission)
            .map_err(map_ureq_error)?;
        let body: SubmitResponse = decode_body(response)?;
        if !body.success {
            return Err(ClientError::Decode {
                reason: "service reported success=false".to_string(),
            });
        }
        Ok(body.leaderboard)
    }
}

fn decode_body<T: DeserializeOwned>(response: ureq::Response) -> Result<T, ClientError> {
    response.into_json().map_err(|err| ClientError::Decode {
        reason: err.to_string(),
    })
}

fn map_ureq_error(err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Status(code, response) => ClientError::Status {
            code,
            message: error_message(response),
        },
        ureq::Error::Transport(transport) => ClientError::Unavailable {
            reason: transport.to_string(),
        },
    }
}

/// Pulls `error` out of a `{success: false, error}` body, falling back to the raw text.
fn error_message(response: ureq::Response) -> String {
    let text = response.into_string().unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let transport = HttpTransport::new(" http://scores.local:8080/ ");
        assert_eq!(transport.base_url(), "http://scores.local:8080");
        assert_eq!(
            transport.leaderboard_url(),
            "http://scores.local:8080/api/leaderboard"
        );
        assert_eq!(transport.score_url(), "http://scores.local:8080/api/score");
    }

    #[test]
    fn unreachable_service_reports_unavailable() {
        // Nothing listens on the loopback discard port.
        let transport =
            HttpTransport::with_timeout("http://127.0.0.1:9", Duration::from_millis(500));

        assert!(matches!(
            transport.fetch_leaderboard(),
            Err(ClientError::Unavailable { .. })
        ));
        assert!(matches!(
            transport.submit_score(&ScoreSubmission::new("Ann", 42)),
            Err(ClientError::Unavailable { .. })
        ));
    }
}
