//! Instant answers.
//!
//! An [`Answerer`] recognizes a class of queries with its trigger regexes
//! and produces a typed [`Solution`], usually by calling a fetcher. The
//! [`Registry`] tries answerers in order and stops at the first whose regex
//! matches, so at most one answer is produced per query.
//!
//! Adding an answerer means implementing the trait, adding a [`Solution`]
//! variant for its payload and registering it.

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use crate::{
    error::{Error, Result},
    language::LanguageTag,
    request::Request,
};

pub mod stock;
pub mod user_agent;

pub use stock::StockQuote;
pub use user_agent::UserAgent;

/// Named group a trigger regex captures the answerer's parameter in.
pub const REMAINDER_GROUP: &str = "remainder";

/// Named group a trigger regex captures the trigger phrase in.
pub const TRIGGER_GROUP: &str = "trigger";

/// The typed payload of a triggered answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Solution {
    StockQuote(stock::Quote),
    UserAgent(String),
}

/// Why a triggered answer has no solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerError {
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl From<Error> for AnswerError {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout(after) => AnswerError::Timeout {
                after_ms: after.as_millis().try_into().unwrap_or(u64::MAX),
            },
            Error::Fetch(message) => AnswerError::Fetch { message },
            other => AnswerError::Fetch {
                message: other.to_string(),
            },
        }
    }
}

/// One answerer's view of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// False means the answerer abstained.
    pub triggered: bool,
    pub remainder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Solution>,
    pub cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<AnswerError>,
    pub language: LanguageTag,
    #[serde(skip)]
    pub query: String,
    #[serde(skip)]
    pub user_agent: Option<String>,
}

impl Answer {
    /// An untriggered scaffold holding the request's raw query.
    pub fn new(request: &Request, query_var: &str) -> Self {
        Self {
            kind: "",
            triggered: false,
            remainder: String::new(),
            solution: None,
            cache: false,
            err: None,
            language: LanguageTag::default(),
            query: request.query(query_var),
            user_agent: None,
        }
    }
}

/// A query the answerer must answer, and what it must answer with.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub query: &'static str,
    pub user_agent: Option<&'static str>,
    pub remainder: &'static str,
    pub solution: Solution,
}

#[async_trait]
pub trait Answerer: Send + Sync {
    /// Short type tag, e.g. `"stock quote"`.
    fn kind(&self) -> &'static str;

    /// Trigger regexes, tried in order. Each defines the named groups
    /// [`TRIGGER_GROUP`] and [`REMAINDER_GROUP`].
    fn regexes(&self) -> &[Regex];

    fn cacheable(&self) -> bool {
        false
    }

    fn set_user_agent(&self, _answer: &mut Answer, _request: &Request) {}

    /// Produce the solution for a triggered answer. `answer.remainder` holds
    /// the captured parameter and may be normalized in place.
    async fn solve(&self, answer: &mut Answer, request: &Request)
    -> Result<Solution>;

    /// Queries this answerer must answer, given its sample fetcher.
    fn fixtures(&self) -> Vec<Fixture> {
        Vec::new()
    }
}

/// The ordered, read-only answerer registry.
pub struct Registry {
    query_var: String,
    answerers: Vec<Box<dyn Answerer>>,
}

impl Registry {
    pub fn new(
        query_var: impl Into<String>,
        answerers: Vec<Box<dyn Answerer>>,
    ) -> Result<Self> {
        let query_var = query_var.into();
        if query_var.trim().is_empty() {
            return Err(Error::Config("query variable is empty".into()));
        }

        for answerer in &answerers {
            validate(answerer.as_ref())?;
        }

        Ok(Self {
            query_var,
            answerers,
        })
    }

    pub fn query_var(&self) -> &str {
        &self.query_var
    }

    pub fn answerers(&self) -> &[Box<dyn Answerer>] {
        &self.answerers
    }

    pub fn len(&self) -> usize {
        self.answerers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answerers.is_empty()
    }

    /// Run the pipeline. `None` means no answerer triggered and the query
    /// should fall through to regular search.
    pub async fn detect(
        &self,
        request: &Request,
        language: &LanguageTag,
    ) -> Option<Answer> {
        for answerer in &self.answerers {
            let answerer = answerer.as_ref();

            let mut answer = Answer::new(request, &self.query_var);
            answerer.set_user_agent(&mut answer, request);
            answer.language = language.clone();
            answer.kind = answerer.kind();
            answer.cache = answerer.cacheable();

            let Some(remainder) = first_match(answerer.regexes(), &answer.query)
            else {
                continue;
            };

            tracing::debug!(kind = answer.kind, %remainder, "answerer triggered");
            answer.triggered = true;
            answer.remainder = remainder;
            solve(answerer, &mut answer, request).await;
            return Some(answer);
        }

        None
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("query_var", &self.query_var)
            .field(
                "answerers",
                &self.answerers.iter().map(|a| a.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn validate(answerer: &dyn Answerer) -> Result<()> {
    let invalid = |reason: String| Error::InvalidAnswerer {
        kind: answerer.kind(),
        reason,
    };

    if answerer.kind().is_empty() {
        return Err(invalid("empty type tag".into()));
    }

    if answerer.regexes().is_empty() {
        return Err(invalid("no trigger regexes".into()));
    }

    for regex in answerer.regexes() {
        for group in [TRIGGER_GROUP, REMAINDER_GROUP] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(invalid(format!(
                    "regex {:?} has no '{group}' group",
                    regex.as_str()
                )));
            }
        }
    }

    Ok(())
}

/// The remainder captured by the first regex that matches with a
/// participating trigger or remainder group.
fn first_match(regexes: &[Regex], query: &str) -> Option<String> {
    regexes.iter().find_map(|regex| {
        let captures = regex.captures(query)?;
        let trigger = captures.name(TRIGGER_GROUP);
        let remainder = captures.name(REMAINDER_GROUP);
        if trigger.is_none() && remainder.is_none() {
            return None;
        }
        Some(remainder.map(|m| m.as_str().to_string()).unwrap_or_default())
    })
}

async fn solve(answerer: &dyn Answerer, answer: &mut Answer, request: &Request) {
    let outcome = match request.deadline() {
        Some(deadline) => {
            match tokio::time::timeout_at(deadline, answerer.solve(answer, request))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Timeout(request.timeout().unwrap_or_default())),
            }
        }
        None => answerer.solve(answer, request).await,
    };

    match outcome {
        Ok(solution) => answer.solution = Some(solution),
        Err(err) => {
            tracing::warn!(kind = answer.kind, error = %err, "answerer failed");
            answer.solution = None;
            answer.err = Some(err.into());
        }
    }
}
