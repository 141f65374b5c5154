//! Query routing: a `!bang` redirect first, then an instant answer, else
//! regular search.

use std::{sync::Arc, time::Duration};

use serde::Serialize;

use crate::{
    bangs::{self, Bangs, Results, Suggester},
    config::Settings,
    error::{Error, Result},
    instant::{
        Answer,
        Answerer,
        Registry,
        StockQuote,
        UserAgent,
        stock::StaticQuotes,
    },
    language::{LanguageTag, Region},
    request::Request,
};

/// Where a query goes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    /// A bang matched; send the caller to `url`.
    Redirect { url: String },
    /// An answerer triggered. The answer may carry an error instead of a
    /// solution.
    Answer(Answer),
    /// Nothing matched; run a regular search for `query`.
    Search { query: String },
}

/// Both registries and the suggester, shared read-only across requests.
pub struct Router {
    bangs: Bangs,
    instant: Registry,
    suggester: Box<dyn Suggester>,
    default_timeout: Option<Duration>,
}

impl Router {
    /// Rebuild the suggester's index from `bangs` and assemble the router.
    pub fn new(
        bangs: Bangs,
        instant: Registry,
        mut suggester: Box<dyn Suggester>,
    ) -> Result<Self> {
        bangs::rebuild(suggester.as_mut(), bangs.bangs())?;

        Ok(Self {
            bangs,
            instant,
            suggester,
            default_timeout: None,
        })
    }

    /// Build everything `settings` describes. The stock answerer is only
    /// registered when a quotes file is configured.
    pub fn from_settings(
        settings: &Settings,
        suggester: Box<dyn Suggester>,
    ) -> Result<Self> {
        let bangs = settings.build_bangs()?;

        let mut answerers: Vec<Box<dyn Answerer>> = Vec::new();
        match &settings.stock.quotes_file {
            Some(path) => {
                let quotes = StaticQuotes::from_json_file(path)?;
                answerers.push(Box::new(StockQuote::new(Arc::new(quotes))?));
            }
            None => tracing::debug!("no quotes file, stock answers disabled"),
        }
        answerers.push(Box::new(UserAgent::new()?));

        let instant = Registry::new(settings.query_var.clone(), answerers)?;
        Ok(Self::new(bangs, instant, suggester)?
            .with_default_timeout(settings.timeout()))
    }

    /// Deadline for requests that arrive without one.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn bangs(&self) -> &Bangs {
        &self.bangs
    }

    pub fn instant(&self) -> &Registry {
        &self.instant
    }

    pub async fn route(
        &self,
        request: &Request,
        region: &Region,
        language: &LanguageTag,
    ) -> Route {
        let scoped;
        let request = match (request.deadline(), self.default_timeout) {
            (None, Some(timeout)) => {
                scoped = request.clone().with_timeout(timeout);
                &scoped
            }
            _ => request,
        };

        let query = request.query(self.instant.query_var());

        if let Some(url) = self.bangs.detect(&query, region, language) {
            return Route::Redirect { url };
        }

        if let Some(answer) = self.instant.detect(request, language).await {
            return Route::Answer(answer);
        }

        tracing::debug!(%query, "no bang or answer, falling through to search");
        Route::Search { query }
    }

    /// Autocomplete bang triggers. Fails without touching the index when the
    /// request's deadline has already passed.
    pub fn suggest(
        &self,
        request: &Request,
        term: &str,
        size: usize,
    ) -> Result<Results> {
        if request.is_expired() {
            return Err(Error::Timeout(request.timeout().unwrap_or_default()));
        }
        self.bangs.suggest(self.suggester.as_ref(), term, size)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("bangs", &self.bangs.len())
            .field("instant", &self.instant)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
