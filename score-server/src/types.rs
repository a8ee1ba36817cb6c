use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) database_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stored_scores: Option<usize>,
    pub(crate) leaderboard_limit: usize,
}
