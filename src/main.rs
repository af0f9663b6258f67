mod utils;

use clap::{ ArgAction, CommandFactory, FromArgMatches, Parser };
use log::{ info, warn };
use std::{ env, path::PathBuf, process::ExitCode, time::{ Duration, Instant, SystemTime } };

use crate::utils::{
    common::format_duration,
    error::{ Error, Result },
    files::write_serverlist,
    filter::{ filter_to_vec, Criteria },
    logger::init_logger,
    models::{ ServerRecord, SortKey },
    probe::{ ProbeConfig, SchemeProbe, DEFAULT_PAYLOAD_PATH },
    rate::{ Rater, RatingEngine },
    serverlist::{ command_line, country_table, server_info, serverlist },
    sort::sort,
    store::{ default_cache_file, HttpUpstream, RecordStore, StoreConfig },
};

const PROGRAM: &str = "rankpvpn";

/// Retrieve and filter a list of the latest PrivateVPN servers
#[derive(Parser, Debug, Clone)]
#[command(name = "rankpvpn", version)]
pub struct Cli {
    /// The number of seconds to wait before a connection times out
    #[arg(long, value_name = "n", default_value_t = 5)]
    pub connection_timeout: u64,

    /// The number of seconds to wait before a download (or an rsync transfer) is abandoned
    #[arg(long, value_name = "n", default_value_t = 30)]
    pub download_timeout: u64,

    /// Display a table of the distribution of servers by country
    #[arg(long)]
    pub list_countries: bool,

    /// The cache timeout in seconds for the retrieved server list; 0 disables the cache
    #[arg(long, value_name = "n", default_value_t = 300)]
    pub cache_timeout: u64,

    /// Location of the cache file
    #[arg(long, value_name = "path")]
    pub cache_file: Option<PathBuf>,

    /// Save the serverlist to the given path
    #[arg(long, value_name = "filepath")]
    pub save: Option<PathBuf>,

    /// Sort the serverlist
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// The number of threads to use when rating servers
    #[arg(long, value_name = "n", default_value_t = 5)]
    pub threads: usize,

    /// Path of the file downloaded from each server when rating
    #[arg(long, value_name = "path", default_value = DEFAULT_PAYLOAD_PATH)]
    pub payload_path: String,

    /// Print extra information to STDERR
    #[arg(long)]
    pub verbose: bool,

    /// Print server information instead of a server list. Filter options apply
    #[arg(long)]
    pub info: bool,

    /// Only return servers that have synchronized in the last n hours
    #[arg(short, long, value_name = "n", help_heading = "Filters")]
    pub age: Option<f64>,

    /// Match one of the given countries (name or code, case-insensitive)
    #[arg(short = 'c', long = "country", value_name = "country", action = ArgAction::Append, help_heading = "Filters")]
    pub countries: Vec<String>,

    /// Return the n fastest servers that meet the other criteria
    #[arg(short, long, value_name = "n", help_heading = "Filters")]
    pub fastest: Option<usize>,

    /// Include servers whose address matches <regex>
    #[arg(short, long, value_name = "regex", action = ArgAction::Append, help_heading = "Filters")]
    pub include: Vec<String>,

    /// Exclude servers whose address matches <regex>
    #[arg(short = 'x', long, value_name = "regex", action = ArgAction::Append, help_heading = "Filters")]
    pub exclude: Vec<String>,

    /// Limit the list to the n most recently synchronized servers
    #[arg(short, long, value_name = "n", help_heading = "Filters")]
    pub latest: Option<usize>,

    /// Limit the list to the n servers with the highest score
    #[arg(long, value_name = "n", help_heading = "Filters")]
    pub score: Option<usize>,

    /// Return at most n servers
    #[arg(short, long, value_name = "n", help_heading = "Filters")]
    pub number: Option<usize>,

    /// Match one of the given protocols, e.g. "http", "rsync"
    #[arg(short = 'p', long = "protocol", value_name = "protocol", action = ArgAction::Append, help_heading = "Filters")]
    pub protocols: Vec<String>,
}

// 解析命令行参数，--sort 的帮助信息列出所有排序方式
fn parse_cli() -> Cli {
    let command = Cli::command().mut_arg("sort", |arg| {
        arg.help(format!("Sort the serverlist. {}", SortKey::help_text()))
    });
    let matches = command.get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn positive(n: Option<usize>) -> Option<usize> {
    n.filter(|n| *n > 0)
}

// 过滤 -> 最新 -> 分数 -> 最快 -> 排序 -> 数量限制
pub fn process_options<R: Rater + ?Sized>(
    cli: &Cli,
    servers: &[ServerRecord],
    criteria: &Criteria,
    rater: &R
) -> Vec<ServerRecord> {
    let mut servers = filter_to_vec(servers, criteria);

    if let Some(n) = positive(cli.latest) {
        servers = sort(servers, SortKey::Age, rater);
        servers.truncate(n);
    }
    if let Some(n) = positive(cli.score) {
        servers = sort(servers, SortKey::Score, rater);
        servers.truncate(n);
    }
    let fastest = positive(cli.fastest);
    if let Some(n) = fastest {
        servers = sort(servers, SortKey::Rate, rater);
        servers.truncate(n);
    }
    if let Some(by) = cli.sort {
        // 已经按速度测过了，不再重复测速
        if !(by == SortKey::Rate && fastest.is_some()) {
            servers = sort(servers, by, rater);
        }
    }
    if let Some(n) = positive(cli.number) {
        servers.truncate(n);
    }
    servers
}

fn run(cli: &Cli, args: &[String]) -> Result<()> {
    let mut store = RecordStore::new(
        HttpUpstream::new(
            Duration::from_secs(cli.connection_timeout),
            Duration::from_secs(cli.download_timeout)
        ),
        StoreConfig {
            cache_file: cli.cache_file.clone().unwrap_or_else(default_cache_file),
            cache_timeout: Duration::from_secs(cli.cache_timeout),
            refresh_interval: Duration::ZERO,
        }
    );
    let snapshot = store.load()?.clone();
    let retrieved_at = store.retrieved_at().unwrap_or_else(SystemTime::now);
    if let Some(e) = store.last_cache_error() {
        warn!("continuing without cache: {}", e);
    }

    if cli.list_countries {
        print!("{}", country_table(&snapshot.servers));
        return Ok(());
    }

    let criteria = Criteria::new(&cli.countries, &cli.protocols, &cli.include, &cli.exclude, cli.age)?;
    let probe = SchemeProbe::new(ProbeConfig {
        connection_timeout: Duration::from_secs(cli.connection_timeout),
        download_timeout: Duration::from_secs(cli.download_timeout),
        payload_path: cli.payload_path.clone(),
    }).map_err(|e| Error::Retrieval(e.to_string()))?;
    let engine = RatingEngine::new(probe, cli.threads);

    let servers = process_options(cli, &snapshot.servers, &criteria, &engine);
    if servers.is_empty() {
        return Err(Error::NoResults);
    }

    if cli.info {
        print!("{}", server_info(&servers));
        return Ok(());
    }

    let cmd = command_line(PROGRAM, args);
    let include_country = cli.sort == Some(SortKey::Country);
    let text = serverlist(&snapshot, retrieved_at, &servers, include_country, Some(&cmd))
        .ok_or(Error::NoResults)?;

    match &cli.save {
        Some(path) => {
            write_serverlist(path, &text)?;
            info!("saved {} servers to {}", servers.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() -> ExitCode {
    let start_time = Instant::now();
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_cli();

    if let Err(e) = init_logger(cli.verbose) {
        eprintln!("warning: failed to initialize logging ({})", e);
    }

    match run(&cli, &args) {
        Ok(()) => {
            let (elapsed, unit) = format_duration(start_time.elapsed());
            info!("finished in {:.2} {}", elapsed, unit);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
