use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use compscrape::utils::ScrapeStats;
use compscrape::{
    CompanyRecord, ResolveError, Roster, ScraperConfig, UrlTable, WebScraper, Worklist,
    parse_company_profile, resolve_worklist,
};
use futures::StreamExt;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "compscrape")]
#[command(about = "A company profile page scraper", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WorklistFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
struct SourceArgs {
    #[arg(
        long,
        value_name = "PATH",
        default_value = "directorydata.json",
        help = "JSON list of single-entry {name: url} mappings"
    )]
    table: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "JSON list of company names to resolve (defaults to the built-in roster)"
    )]
    roster: Option<PathBuf>,

    #[arg(
        long = "company",
        value_name = "NAME",
        help = "Company name to resolve; may be repeated and replaces the roster"
    )]
    companies: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the roster against the table and print the worklist
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: WorklistFormat,
    },
    /// Resolve the worklist, fetch every page and emit one record per page
    Scrape {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "jsonl",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long, value_name = "PATH", help = "Write records to a file instead of stdout")]
        out: Option<PathBuf>,

        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u16).range(1..),
            help = "Maximum number of pages fetched at once"
        )]
        concurrency: u16,

        #[arg(
            long,
            value_name = "SECS",
            default_value_t = 30,
            help = "Per-request timeout in seconds"
        )]
        timeout: u64,

        #[arg(long, help = "User agent sent with every request")]
        user_agent: Option<String>,
    },
    /// Extract a record from a saved profile page
    Parse {
        #[arg(help = "Path to the saved HTML page")]
        file: PathBuf,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Print the JSON Schema of an emitted record
    Schema,
}

fn load_worklist(source: &SourceArgs) -> Result<Worklist, ResolveError> {
    let roster = if !source.companies.is_empty() {
        Roster::from_names(source.companies.iter().cloned())
    } else if let Some(path) = &source.roster {
        Roster::from_path(path)?
    } else {
        Roster::default()
    };

    let table = UrlTable::from_path(&source.table)?;
    resolve_worklist(&table, &roster)
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

/// Destination for scraped records.
struct RecordWriter {
    out: Box<dyn Write>,
    format: OutputFormat,
    written: usize,
}

impl RecordWriter {
    fn new(path: Option<&Path>, format: OutputFormat) -> io::Result<Self> {
        let out: Box<dyn Write> = match path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                Box::new(BufWriter::new(File::create(path)?))
            }
            None => Box::new(BufWriter::new(io::stdout())),
        };

        let mut writer = Self {
            out,
            format,
            written: 0,
        };
        if let OutputFormat::Json = format {
            writeln!(writer.out, "[")?;
        }
        Ok(writer)
    }

    fn write(&mut self, record: &CompanyRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)?;
            }
            OutputFormat::Json => {
                if self.written > 0 {
                    writeln!(self.out, ",")?;
                }
                serde_json::to_writer_pretty(&mut self.out, record)?;
            }
            OutputFormat::Text => writeln!(self.out, "{}\n", record)?,
        }
        self.written += 1;
        self.out.flush()
    }

    fn finish(mut self) -> io::Result<()> {
        if let OutputFormat::Json = self.format {
            if self.written > 0 {
                writeln!(self.out)?;
            }
            writeln!(self.out, "]")?;
        }
        self.out.flush()
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Resolve { source, format } => {
            let worklist = load_worklist(&source).unwrap_or_else(|e| {
                log::error!("Error resolving company URLs: {}", e);
                process::exit(1);
            });

            match format {
                WorklistFormat::Json => serialize_json(&worklist.urls()),
                WorklistFormat::Text => {
                    for (i, url) in worklist.iter().enumerate() {
                        println!("{:>3}. {}", i + 1, url);
                    }
                }
            }
        }

        Commands::Scrape {
            source,
            format,
            out,
            concurrency,
            timeout,
            user_agent,
        } => {
            let worklist = load_worklist(&source).unwrap_or_else(|e| {
                log::error!("Error resolving company URLs: {}", e);
                process::exit(1);
            });

            let mut config = ScraperConfig {
                timeout: Duration::from_secs(timeout),
                ..Default::default()
            };
            if let Some(user_agent) = user_agent {
                config.user_agent = user_agent;
            }

            let scraper = WebScraper::with_config(config).unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let mut writer = RecordWriter::new(out.as_deref(), format).unwrap_or_else(|e| {
                log::error!("Error opening output: {}", e);
                process::exit(1);
            });

            log::info!("Scraping {} company page(s)...", worklist.len());

            let mut stats = ScrapeStats::default();
            let mut outcomes =
                std::pin::pin!(scraper.scrape_worklist(worklist.urls(), concurrency.into()));
            while let Some(outcome) = outcomes.next().await {
                stats.record(&outcome);
                if let Ok(record) = &outcome.result
                    && let Err(e) = writer.write(record)
                {
                    log::error!("Error writing record for {}: {}", outcome.url, e);
                    process::exit(1);
                }
            }

            if let Err(e) = writer.finish() {
                log::error!("Error finishing output: {}", e);
                process::exit(1);
            }

            log::info!("{}", stats);
        }

        Commands::Parse { file, format } => {
            let html = fs::read_to_string(&file).unwrap_or_else(|e| {
                log::error!("Error reading {}: {}", file.display(), e);
                process::exit(1);
            });

            let record = parse_company_profile(&html);

            match format {
                OutputFormat::Json => serialize_json(&record),
                OutputFormat::Jsonl => match serde_json::to_string(&record) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        log::error!("Error serializing to JSON: {}", e);
                        process::exit(1);
                    }
                },
                OutputFormat::Text => println!("{}", record),
            }
        }

        Commands::Schema => serialize_json(&schemars::schema_for!(CompanyRecord)),
    }
}
