//! Echo the caller's user agent back: `what's my user agent`.

use async_trait::async_trait;
use regex::Regex;

use super::{Answer, Answerer, Fixture, Solution};
use crate::{
    error::{Error, Result},
    request::Request,
};

pub const KIND: &str = "user agent";

const TRIGGERS: &[&str] = &[
    "what is my user agent",
    "what's my user agent",
    "my user agent",
    "user agent",
];

pub struct UserAgent {
    regexes: Vec<Regex>,
}

impl UserAgent {
    pub fn new() -> Result<Self> {
        let pattern = format!(
            r"(?i)^(?P<trigger>{})(?P<remainder>)\??$",
            TRIGGERS.join("|")
        );
        let regex = Regex::new(&pattern).map_err(|e| Error::InvalidAnswerer {
            kind: KIND,
            reason: e.to_string(),
        })?;
        Ok(Self {
            regexes: vec![regex],
        })
    }
}

#[async_trait]
impl Answerer for UserAgent {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn regexes(&self) -> &[Regex] {
        &self.regexes
    }

    fn set_user_agent(&self, answer: &mut Answer, request: &Request) {
        answer.user_agent = request.user_agent().map(str::to_string);
    }

    async fn solve(
        &self,
        answer: &mut Answer,
        _request: &Request,
    ) -> Result<Solution> {
        answer
            .user_agent
            .clone()
            .filter(|ua| !ua.is_empty())
            .map(Solution::UserAgent)
            .ok_or_else(|| Error::Fetch("request has no user agent".into()))
    }

    fn fixtures(&self) -> Vec<Fixture> {
        const FIREFOX: &str =
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
        vec![
            Fixture {
                query: "what's my user agent?",
                user_agent: Some(FIREFOX),
                remainder: "",
                solution: Solution::UserAgent(FIREFOX.into()),
            },
            Fixture {
                query: "User Agent",
                user_agent: Some("curl/8.5.0"),
                remainder: "",
                solution: Solution::UserAgent("curl/8.5.0".into()),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{instant::Registry, language::LanguageTag};

    fn registry() -> Registry {
        Registry::new("q", vec![Box::new(UserAgent::new().unwrap())]).unwrap()
    }

    #[tokio::test]
    async fn echoes_request_user_agent() {
        let req = Request::new()
            .with_param("q", "my user agent")
            .with_user_agent("curl/8.5.0");
        let answer = registry().detect(&req, &LanguageTag::english()).await.unwrap();

        assert_eq!(answer.kind, KIND);
        assert!(!answer.cache);
        assert_eq!(answer.solution, Some(Solution::UserAgent("curl/8.5.0".into())));
    }

    #[tokio::test]
    async fn missing_user_agent_is_an_error() {
        let req = Request::new().with_param("q", "user agent");
        let answer = registry().detect(&req, &LanguageTag::english()).await.unwrap();

        assert!(answer.triggered);
        assert_eq!(answer.solution, None);
        assert!(answer.err.is_some());
    }

    #[tokio::test]
    async fn trailing_words_do_not_trigger() {
        let req = Request::new()
            .with_param("q", "user agent switcher")
            .with_user_agent("curl/8.5.0");
        assert!(registry().detect(&req, &LanguageTag::english()).await.is_none());
    }
}
