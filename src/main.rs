use std::path::PathBuf;

use clap::Parser;
use queryroute::{
    DataDir,
    Error,
    LanguageTag,
    Region,
    Request,
    Route,
    Router,
    Settings,
    bangs::{self, MemorySuggester, TantivySuggester},
    error,
};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{BangsAction, Cli, Command};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("QUERYROUTE_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let settings = load_settings(cli.config, &data_dir)?;

    match cli.command {
        Command::Route(args) => {
            let region = Region::parse(&args.region)?;
            let language = language_or_default(args.lang.as_deref(), &settings)?;

            let mut request =
                Request::new().with_param(settings.query_var.clone(), args.query);
            if let Some(user_agent) = args.user_agent {
                request = request.with_user_agent(user_agent);
            }

            let router =
                Router::from_settings(&settings, Box::new(MemorySuggester::new()))?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let route =
                runtime.block_on(router.route(&request, &region, &language));

            if args.json {
                println!("{}", serde_json::to_string_pretty(&route)?);
            } else {
                print_route(&route)?;
            }
        }
        Command::Bang(args) => {
            let region = Region::parse(&args.region)?;
            let language = language_or_default(args.lang.as_deref(), &settings)?;
            let bangs = settings.build_bangs()?;

            match bangs.detect(&args.query, &region, &language) {
                Some(url) => println!("{url}"),
                None => {
                    return Err(Error::NotFound {
                        kind: "bang",
                        name: args.query,
                    });
                }
            }
        }
        Command::Suggest(args) => {
            let bangs = settings.build_bangs()?;
            let mut suggester =
                TantivySuggester::open(&data_dir.suggest_index_dir())?;
            // Settings may have changed the registry since the last run.
            bangs::rebuild(&mut suggester, bangs.bangs())?;

            let size = args.count.unwrap_or(settings.suggest.size);
            let results = bangs.suggest(&suggester, &args.term, size)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Index => {
            let bangs = settings.build_bangs()?;
            let dir = data_dir.suggest_index_dir();
            let mut suggester = TantivySuggester::open(&dir)?;
            bangs::rebuild(&mut suggester, bangs.bangs())?;
            eprintln!(
                "Indexed {} bangs into {}",
                bangs.len(),
                dir.display()
            );
        }
        Command::Bangs { action } => {
            let bangs = settings.build_bangs()?;
            match action {
                BangsAction::List { json } => {
                    if json {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(bangs.bangs())?
                        );
                    } else {
                        for bang in bangs.bangs() {
                            let regions =
                                bang.regions.keys().cloned().collect::<Vec<_>>();
                            println!(
                                "{}\t{}\t{}",
                                bang.name,
                                bang.triggers.join(","),
                                regions.join(",")
                            );
                        }
                    }
                }
                BangsAction::Check => {
                    let collisions = bangs.collisions();
                    if collisions.is_empty() {
                        println!("No trigger collisions in {} bangs.", bangs.len());
                    } else {
                        for c in &collisions {
                            println!(
                                "{}\t{} shadows {}",
                                c.trigger,
                                c.winner,
                                c.shadowed.join(", ")
                            );
                        }
                        return Err(Error::Config(format!(
                            "{} trigger collision(s)",
                            collisions.len()
                        )));
                    }
                }
            }
        }
        Command::Completions(args) => args.generate(),
    }

    Ok(())
}

/// An explicit `--config` must exist; the data directory's file is optional.
fn load_settings(
    explicit: Option<PathBuf>,
    data_dir: &DataDir,
) -> error::Result<Settings> {
    let path = explicit.or_else(|| data_dir.existing_settings_file());
    Settings::load(path.as_deref())
}

fn language_or_default(
    lang: Option<&str>,
    settings: &Settings,
) -> error::Result<LanguageTag> {
    match lang {
        Some(lang) => LanguageTag::parse(lang),
        None => Ok(settings.default_language.clone()),
    }
}

fn print_route(route: &Route) -> error::Result<()> {
    match route {
        Route::Redirect { url } => println!("redirect\t{url}"),
        Route::Search { query } => println!("search\t{query}"),
        Route::Answer(answer) => {
            println!("answer\t{}\t{}", answer.kind, answer.remainder);
            if let Some(solution) = &answer.solution {
                println!("{}", serde_json::to_string_pretty(solution)?);
            }
            if let Some(err) = &answer.err {
                println!("error\t{err}");
            }
        }
    }
    Ok(())
}
