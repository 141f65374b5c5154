//! Stock quotes: `AAPL quote`, `stock quote msft`, `$tsla`.

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Answer, Answerer, Fixture, Solution};
use crate::{
    error::{Error, Result},
    request::Request,
};

pub const KIND: &str = "stock quote";

/// Trigger phrases, each with an optional plural `s`.
const TRIGGERS: &[&str] = &["quote", "stock", "stock quote"];

/// One to five letters, an optional leading `$` and an optional share class
/// suffix such as `.A`.
const TICKER: &str = r"[$]?[A-Za-z]{1,5}[.]?[A-Za-z]?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Nasdaq,
    Nyse,
    #[serde(other)]
    Other,
}

/// The most recent trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Last {
    pub price: f64,
    pub time: DateTime<Utc>,
    pub change: f64,
    pub change_percent: f64,
}

/// End-of-day summary for one trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eod {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub name: String,
    pub exchange: Exchange,
    pub last: Last,
    #[serde(default)]
    pub history: Vec<Eod>,
    pub provider: String,
}

impl Quote {
    /// Order the history ascending by date. Entries on the same date keep
    /// their relative order.
    pub fn sort_historical(mut self) -> Self {
        self.history.sort_by_key(|eod| eod.date);
        self
    }
}

/// Where quotes come from. Implementations must be safe to share between
/// concurrent requests.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Fetch the quote for an uppercase ticker without a `$` prefix.
    async fn fetch(&self, ticker: &str) -> Result<Quote>;
}

/// Quotes held in memory, keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    quotes: HashMap<String, Quote>,
}

impl StaticQuotes {
    pub fn new(quotes: impl IntoIterator<Item = Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|q| (q.ticker.to_uppercase(), q))
                .collect(),
        }
    }

    /// Load a JSON array of quotes.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let quotes: Vec<Quote> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), quotes = quotes.len(), "loaded quotes");
        Ok(Self::new(quotes))
    }

    /// A small fixed data set with `AAPL` and `BRK.A`.
    pub fn samples() -> Self {
        Self::new(samples())
    }

    pub fn quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }
}

#[async_trait]
impl QuoteFetcher for StaticQuotes {
    async fn fetch(&self, ticker: &str) -> Result<Quote> {
        self.quotes
            .get(ticker)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("no quote for {ticker}")))
    }
}

pub struct StockQuote {
    fetcher: Arc<dyn QuoteFetcher>,
    regexes: Vec<Regex>,
}

impl StockQuote {
    pub fn new(fetcher: Arc<dyn QuoteFetcher>) -> Result<Self> {
        let triggers = TRIGGERS
            .iter()
            .map(|t| format!("{t}[s]?"))
            .collect::<Vec<_>>()
            .join("|");

        let patterns = [
            format!(r"^(?P<trigger>{triggers})?\s?(?P<remainder>{TICKER})$"),
            format!(r"^(?P<remainder>{TICKER})\s(?P<trigger>{triggers})?$"),
        ];

        let regexes = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidAnswerer {
                kind: KIND,
                reason: e.to_string(),
            })?;

        Ok(Self { fetcher, regexes })
    }
}

#[async_trait]
impl Answerer for StockQuote {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn regexes(&self) -> &[Regex] {
        &self.regexes
    }

    fn cacheable(&self) -> bool {
        true
    }

    async fn solve(
        &self,
        answer: &mut Answer,
        _request: &Request,
    ) -> Result<Solution> {
        answer.remainder = answer.remainder.to_uppercase().replace('$', "");

        let quote = self.fetcher.fetch(&answer.remainder).await?;
        Ok(Solution::StockQuote(quote.sort_historical()))
    }

    fn fixtures(&self) -> Vec<Fixture> {
        let aapl = Solution::StockQuote(apple().sort_historical());
        let brk = Solution::StockQuote(berkshire().sort_historical());

        vec![
            Fixture {
                query: "AAPL quote",
                user_agent: None,
                remainder: "AAPL",
                solution: aapl.clone(),
            },
            Fixture {
                query: "brk.a",
                user_agent: None,
                remainder: "BRK.A",
                solution: brk,
            },
            Fixture {
                query: "stock quote $aapl",
                user_agent: None,
                remainder: "AAPL",
                solution: aapl,
            },
        ]
    }
}

fn samples() -> Vec<Quote> {
    vec![apple(), berkshire()]
}

fn trade_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_522_090_355, 0).unwrap_or_default()
}

fn march_2013(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2013, 3, day).unwrap_or_default()
}

// History is newest first, the way providers usually return it.
fn apple() -> Quote {
    Quote {
        ticker: "AAPL".into(),
        name: "Apple Inc.".into(),
        exchange: Exchange::Nasdaq,
        last: Last {
            price: 171.42,
            time: trade_time(),
            change: 6.48,
            change_percent: 0.0393,
        },
        history: vec![
            Eod {
                date: march_2013(27),
                open: 64.38,
                close: 64.58,
                high: 65.12,
                low: 63.85,
                volume: 82_465_900,
            },
            Eod {
                date: march_2013(26),
                open: 65.87,
                close: 65.47,
                high: 66.01,
                low: 65.24,
                volume: 73_428_200,
            },
        ],
        provider: "IEX".into(),
    }
}

fn berkshire() -> Quote {
    Quote {
        ticker: "BRK.A".into(),
        name: "Berkshire Hathaway Inc.".into(),
        exchange: Exchange::Nyse,
        last: Last {
            price: 300_100.0,
            time: trade_time(),
            change: -1_900.0,
            change_percent: -0.0063,
        },
        history: vec![Eod {
            date: march_2013(26),
            open: 156_000.0,
            close: 156_480.0,
            high: 156_900.0,
            low: 155_650.0,
            volume: 410,
        }],
        provider: "IEX".into(),
    }
}
