use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;

/// What the router knows about an incoming request.
///
/// The transport layer fills it in: form/query parameters, the user agent
/// and the deadline every fetch must respect.
#[derive(Debug, Clone, Default)]
pub struct Request {
    params: HashMap<String, String>,
    user_agent: Option<String>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the deadline to `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self.timeout = Some(timeout);
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The trimmed value of the query variable, empty when absent.
    pub fn query(&self, query_var: &str) -> String {
        self.param(query_var).unwrap_or_default().trim().to_string()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The timeout the deadline was derived from.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| d <= Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed() {
        let req = Request::new().with_param("q", "  AAPL quote \n");
        assert_eq!(req.query("q"), "AAPL quote");
    }

    #[test]
    fn missing_query_is_empty() {
        assert_eq!(Request::new().query("q"), "");
        assert_eq!(Request::new().with_param("query", "x").query("q"), "");
    }

    #[test]
    fn deadline_follows_timeout() {
        let req = Request::new().with_timeout(Duration::from_secs(60));
        assert_eq!(req.timeout(), Some(Duration::from_secs(60)));
        assert!(req.deadline().is_some());
        assert!(!req.is_expired());

        let expired = Request::new().with_timeout(Duration::ZERO);
        assert!(expired.is_expired());
        assert!(!Request::new().is_expired());
    }
}
