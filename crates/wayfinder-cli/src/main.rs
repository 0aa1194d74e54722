//! wayfinder CLI
//!
//! Command-line tool for inspecting route patterns and route precedence.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use wayfinder::{Method, PathPattern, PatternOptions, Request, Response, Router, Stage};

/// Route pattern compiler and matcher.
#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with pattern options.
    #[arg(short, long, env = "WAYFINDER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disallow an optional trailing delimiter.
    #[arg(long, env = "WAYFINDER_STRICT", global = true)]
    strict: bool,

    /// Match path prefixes instead of whole paths.
    #[arg(long, env = "WAYFINDER_PARTIAL", global = true)]
    partial: bool,

    /// Characters that become a capture's prefix.
    #[arg(long, env = "WAYFINDER_PREFIXES", global = true)]
    prefixes: Option<String>,

    /// Characters excluded from the default capture pattern.
    #[arg(long, env = "WAYFINDER_DELIMITER", global = true)]
    delimiter: Option<String>,

    /// Characters that may also terminate a match.
    #[arg(long, env = "WAYFINDER_ENDS_WITH", global = true)]
    ends_with: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the regex and capture keys compiled from a pattern.
    Compile {
        /// Route pattern, e.g. `/users/:id`.
        pattern: String,
    },

    /// Match paths against a pattern.
    Match {
        /// Route pattern.
        pattern: String,

        /// Paths to match.
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show which of several routes handles a request.
    Resolve {
        /// Route as "METHOD PATTERN", in registration order.
        #[arg(short, long = "route", required = true)]
        routes: Vec<String>,

        /// Request method.
        method: String,

        /// Request path.
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = load_options(&cli)?;
    debug!(?options, "pattern options");

    match cli.command {
        Commands::Compile { pattern } => {
            let compiled = PathPattern::with_options(&pattern, &options)
                .with_context(|| format!("invalid pattern {pattern}"))?;
            let summary = serde_json::json!({
                "pattern": compiled.pattern(),
                "regex": compiled.regex().as_str(),
                "keys": compiled.keys(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Match { pattern, paths } => {
            let compiled = PathPattern::with_options(&pattern, &options)
                .with_context(|| format!("invalid pattern {pattern}"))?;
            for path in &paths {
                match compiled.match_path(path) {
                    Some(params) => println!("{path}: {}", serde_json::to_string(&params)?),
                    None => println!("{path}: no match"),
                }
            }
        }

        Commands::Resolve {
            routes,
            method,
            path,
        } => {
            let router = build_router(&routes, options)?;
            let method: Method = method.parse()?;

            let mut req = Request::new(method, path);
            let mut res = Response::default();
            let outcome = router.dispatch(&mut req, &mut res).await;

            println!("outcome: {outcome:?}");
            println!("status: {}", res.status);
            println!("{}", res.body_string().unwrap_or_default());
        }
    }

    Ok(())
}

/// Resolves pattern options from defaults, the config file and flags, in
/// that order.
fn load_options(cli: &Cli) -> anyhow::Result<PatternOptions> {
    let mut options = match &cli.config {
        Some(path) => read_options(path)?,
        None => PatternOptions::default(),
    };

    if cli.strict {
        options.strict = true;
    }
    if cli.partial {
        options.end = false;
    }
    if let Some(prefixes) = &cli.prefixes {
        options.prefixes.clone_from(prefixes);
    }
    if let Some(delimiter) = &cli.delimiter {
        options.delimiter.clone_from(delimiter);
    }
    if let Some(ends_with) = &cli.ends_with {
        options.ends_with.clone_from(ends_with);
    }

    Ok(options)
}

fn read_options(path: &Path) -> anyhow::Result<PatternOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Splits a "METHOD PATTERN" route argument.
fn parse_route(route: &str) -> anyhow::Result<(Method, &str)> {
    let Some((method, pattern)) = route.trim().split_once(char::is_whitespace) else {
        bail!("route must be \"METHOD PATTERN\", got {route:?}");
    };
    Ok((method.parse()?, pattern.trim()))
}

/// Builds a router whose handlers report which route matched.
fn build_router(routes: &[String], options: PatternOptions) -> anyhow::Result<Router> {
    let mut builder = Router::builder().options(options);

    for (index, route) in routes.iter().enumerate() {
        let (method, pattern) = parse_route(route)?;
        let label = route.trim().to_string();
        builder = builder.route(
            method,
            pattern,
            Stage::handler(move |req: Request| {
                let report = serde_json::json!({
                    "route": index,
                    "matched": label,
                    "params": req.path_params(),
                });
                async move { Response::json(&report) }
            }),
        );
    }

    Ok(builder.build()?)
}
