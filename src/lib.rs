//! queryroute - decide where a search query goes before any search runs.
//!
//! A query either carries a `!bang` and redirects to another site's search
//! page, triggers an instant answer (a stock quote, the caller's user
//! agent), or falls through to regular search. Bang triggers are also
//! offered as autocomplete suggestions from a
//! [Tantivy](https://github.com/quickwit-oss/tantivy) index.
//!
//! # Quick start
//!
//! ```no_run
//! use queryroute::{LanguageTag, Region, Request, Route, Router, Settings};
//! use queryroute::bangs::MemorySuggester;
//!
//! # async fn run() -> queryroute::Result<()> {
//! let settings = Settings::load(None)?;
//! let router = Router::from_settings(&settings, Box::new(MemorySuggester::new()))?;
//!
//! let request = Request::new().with_param("q", "!w rust language");
//! match router.route(&request, &Region::none(), &LanguageTag::english()).await {
//!     Route::Redirect { url } => println!("go to {url}"),
//!     Route::Answer(answer) => println!("{} answer", answer.kind),
//!     Route::Search { query } => println!("search for {query}"),
//! }
//!
//! let suggestions = router.suggest(&Request::new(), "am", 10)?;
//! for s in &suggestions.suggestions {
//!     println!("!{} ({})", s.trigger, s.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bangs;
pub mod config;
pub mod data_dir;
pub mod error;
pub mod instant;
pub mod language;
pub mod request;
pub mod router;

pub use bangs::{Bang, Bangs};
pub use config::Settings;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use instant::{Answer, Answerer};
pub use language::{LanguageTag, Region};
pub use request::Request;
pub use router::{Route, Router};
