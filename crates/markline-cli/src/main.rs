//! `markline` command line
//!
//! Fetches releases for a chart window and prints their overlay series.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use markline_core::{BuildResult, ReleaseSeriesBuilder, SeriesConfig, SeriesProps};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("markline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Release overlay series for time-series charts")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .env("MARKLINE_CONFIG")
                .help("TOML config file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("series")
                .about("Fetch releases and print their markers")
                .arg(
                    Arg::new("org")
                        .long("org")
                        .env("MARKLINE_ORG")
                        .required(true)
                        .help("Organization slug"),
                )
                .arg(
                    Arg::new("project")
                        .long("project")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(i64))
                        .allow_negative_numbers(true)
                        .help("Project id filter (repeatable)"),
                )
                .arg(
                    Arg::new("environment")
                        .long("environment")
                        .action(ArgAction::Append)
                        .help("Environment filter (repeatable)"),
                )
                .arg(
                    Arg::new("period")
                        .long("period")
                        .help("Relative window such as 14d or 24h"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .requires("end")
                        .conflicts_with("period")
                        .help("Window start (RFC 3339 or YYYY-MM-DD[THH:MM:SS])"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .requires("start")
                        .help("Window end"),
                )
                .arg(
                    Arg::new("emphasize")
                        .long("emphasize")
                        .action(ArgAction::Append)
                        .help("Release version to emphasize (repeatable)"),
                )
                .arg(
                    Arg::new("memoized")
                        .long("memoized")
                        .action(ArgAction::SetTrue)
                        .help("Memoize listings per query"),
                )
                .arg(
                    Arg::new("utc")
                        .long("utc")
                        .action(ArgAction::SetTrue)
                        .help("Show tooltip times in UTC"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .env("MARKLINE_TOKEN")
                        .hide_env_values(true)
                        .help("API bearer token"),
                )
                .arg(
                    Arg::new("api-base")
                        .long("api-base")
                        .help("API root, overrides config"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<SeriesConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => {
            SeriesConfig::load(path).with_context(|| format!("loading config from {path}"))
        }
        None => Ok(SeriesConfig::default()),
    }
}

fn series_props(args: &ArgMatches) -> SeriesProps {
    let strings = |id: &str| -> Vec<String> {
        args.get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    let mut props = SeriesProps::default()
        .with_projects(args.get_many::<i64>("project").into_iter().flatten().copied())
        .with_environments(strings("environment"))
        .with_emphasized(strings("emphasize"))
        .with_memoized(args.get_flag("memoized"))
        .with_utc(args.get_flag("utc"));
    props.organization = args.get_one::<String>("org").cloned();

    if let Some(period) = args.get_one::<String>("period") {
        props = props.with_period(period.clone());
    }
    if let (Some(start), Some(end)) = (args.get_one::<String>("start"), args.get_one::<String>("end")) {
        props = props.with_range(start.as_str(), end.as_str());
    }
    props
}

fn print_text(result: &BuildResult) {
    println!(
        "{} releases, {} markers ({})",
        result.releases.len(),
        result.release_series.len(),
        result.origin
    );
    for marker in &result.release_series {
        let weight = if marker.emphasized { "*" } else { " " };
        println!(
            "{weight} {:<40} {:<24} {}",
            marker.marker_label, marker.tooltip.time, marker.detail_path
        );
    }
    for version in &result.skipped {
        println!("! skipped {version}: unparsable release date");
    }
}

const REDACTED: &str = "<redacted>";

/// TOML for `markline config`, with the bearer token masked.
fn render_config(config: &SeriesConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.auth_token.is_some() {
        shown.auth_token = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
}

async fn run_series(mut config: SeriesConfig, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(api_base) = args.get_one::<String>("api-base") {
        config = config.with_api_base(api_base.clone());
    }
    if let Some(token) = args.get_one::<String>("token") {
        config = config.with_auth_token(token.clone());
    }
    config.validate()?;

    let builder = ReleaseSeriesBuilder::with_http(config).context("building HTTP client")?;
    let outcome = builder.update(series_props(args)).await?;
    let result = outcome.result();

    if args.get_flag("json") {
        let output = json!({
            "cycle": result.cycle,
            "origin": result.origin,
            "releases": &*result.releases,
            "releaseSeries": result.release_series,
            "skipped": result.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(result);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let config = load_config(&matches)?;
    tracing::debug!(api_base = %config.api_base, zone = ?config.zone, "configuration loaded");

    match matches.subcommand() {
        Some(("series", args)) => run_series(config, args).await,
        Some(("config", _)) => {
            print!("{}", render_config(&config)?);
            Ok(())
        }
        _ => unreachable!("subcommand_required"),
    }
}
