use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use serde_json::Value;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use tablefetch_lib::fetch::HttpPageFetcher;
use tablefetch_lib::model::JsonRecord;
use tablefetch_lib::model::TableRow;
use tablefetch_lib::query::Direction;
use tablefetch_lib::query::FilterDescriptor;
use tablefetch_lib::query::Filters;
use tablefetch_lib::query::SortDescriptor;
use tablefetch_lib::request::TableConfig;
use tablefetch_lib::request::TableRequest;

#[derive(Parser)]
#[command(author, version, about = "Fetch rows from a paginated list endpoint", long_about = None)]
struct Args {
    /// List endpoint URL
    #[arg(long)]
    endpoint: String,

    /// Column to sort by
    #[arg(long, default_value = "id")]
    sort: String,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Filter as NAME=VALUE, sent to the server and matched locally
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Rows per page
    #[arg(long, default_value_t = 25)]
    page_size: usize,

    /// Maximum number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Bearer token sent with every request
    #[arg(long)]
    bearer_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{}`", raw)),
    }
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let result = match &args.log_file {
        Some(path) => match File::create(path) {
            Ok(file) => WriteLogger::init(level, Config::default(), file),
            Err(err) => {
                eprintln!("cannot open log file {}: {}", path.display(), err);
                return;
            }
        },
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
    };

    if let Err(err) = result {
        eprintln!("cannot initialize logging: {}", err);
    }
}

/// Case-insensitive substring match on a record field.
fn contains_filter(name: String, value: String) -> FilterDescriptor<JsonRecord> {
    let needle = value.to_lowercase();
    let field = name.clone();
    FilterDescriptor::new(name, value, move |record: &JsonRecord| {
        let haystack = match record.get(&field) {
            Some(Value::String(s)) => s.to_lowercase(),
            Some(Value::Null) | None => return false,
            Some(other) => other.to_string().to_lowercase(),
        };
        haystack.contains(&needle)
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let mut builder = HttpPageFetcher::<JsonRecord>::builder().endpoint(args.endpoint.as_str());
    if let Some(token) = &args.bearer_token {
        builder = builder.bearer_token(token);
    }
    if let Some(secs) = args.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let fetcher = match builder.build() {
        Ok(fetcher) => fetcher,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let direction = if args.desc { Direction::Desc } else { Direction::Asc };
    let sort = SortDescriptor::new(args.sort.as_str(), direction);
    let filters: Filters<JsonRecord> = args
        .filters
        .iter()
        .map(|(name, value)| contains_filter(name.clone(), value.clone()))
        .collect();
    let config = TableConfig::new().with_page_size(args.page_size);

    let table = TableRequest::new(fetcher, config, sort, filters);
    table.mount().await;

    let mut loaded = 1;
    while loaded < args.pages && table.fetch_next().await.is_some() {
        loaded += 1;
    }

    let snapshot = table.snapshot().await;
    let keyless = snapshot.data.iter().filter(|row| row.id().is_content()).count();
    if keyless > 0 {
        log::warn!("[cli] {} rows have no `id` field, deduplicated by content", keyless);
    }
    for row in &snapshot.data {
        match serde_json::to_string(row) {
            Ok(line) => println!("{}", line),
            Err(err) => log::warn!("[cli] cannot serialize row {:?}: {}", row, err),
        }
    }

    let total = snapshot
        .total
        .map_or_else(|| "unknown".to_string(), |total| total.to_string());
    eprintln!(
        "{} rows from {} pages, total {}, more {}",
        snapshot.data.len(),
        loaded,
        total,
        snapshot.has_next
    );

    match snapshot.error {
        Some(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
