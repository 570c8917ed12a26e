//! Command-line front end.
//!
//! ```bash
//! cdpscan fetch -u admin -p secret -H 192.168.1.1 -t cdp_output.txt
//! cdpscan parse cdp_output.txt --format json
//! cdpscan bulk -f switches.txt -u admin -p secret -o captures/
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use cdpscan::config::{ReaderConfig, SecurityLevel};
use cdpscan::export;
use cdpscan::neighbor::{NeighborRecord, parse_neighbors};
use cdpscan::session::{Credentials, fetch_neighbor_output};

#[derive(Parser)]
#[command(
    name = "cdpscan",
    version,
    about = "Collect CDP neighbor details and convert them to CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to one device, save the raw output and write a CSV next to it
    Fetch {
        #[command(flatten)]
        login: LoginArgs,
        /// SSH hostname or IP address
        #[arg(short = 'H', long)]
        host: String,
        /// Text file for the raw neighbor output
        #[arg(short = 't', long = "text-output")]
        text_output: PathBuf,
        /// Also write a JSON file with every parsed field
        #[arg(long)]
        json: bool,
    },
    /// Parse a saved capture without connecting
    Parse {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch from every host listed in a file, one per line
    Bulk {
        #[command(flatten)]
        login: LoginArgs,
        #[arg(short = 'f', long = "file")]
        hosts_file: PathBuf,
        /// Directory for `<host>.txt` and `<host>.csv`
        #[arg(short = 'o', long = "output-dir")]
        output_dir: PathBuf,
        /// Maximum number of devices contacted at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },
}

#[derive(Args)]
struct LoginArgs {
    #[arg(short = 'u', long)]
    username: String,
    #[arg(short = 'p', long)]
    password: String,
    /// JSON reader configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Do not retry over Telnet when SSH fails
    #[arg(long)]
    no_telnet: bool,
    /// Offer legacy SSH algorithms and skip host key verification
    #[arg(long)]
    legacy: bool,
}

impl LoginArgs {
    fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    fn reader_config(&self) -> Result<ReaderConfig> {
        let mut config = match &self.config {
            Some(path) => ReaderConfig::from_json_file(path)?,
            None => ReaderConfig::default(),
        };
        if self.no_telnet {
            config.telnet_fallback = false;
        }
        if self.legacy {
            config.security_level = SecurityLevel::LegacyCompatible;
            config.verify_host_key = false;
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn write_csv_file(path: &Path, records: &[NeighborRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    export::write_csv(records, BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))
}

fn write_json_file(path: &Path, records: &[NeighborRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    export::write_json(records, &mut writer, true)
        .with_context(|| format!("writing {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// The CSV lands next to the raw capture with the extension replaced.
fn csv_path_for(text_output: &Path) -> PathBuf {
    text_output.with_extension("csv")
}

async fn fetch(login: &LoginArgs, host: &str, text_output: &Path, json: bool) -> Result<()> {
    let config = login.reader_config()?;
    let raw = fetch_neighbor_output(host, &login.credentials(), &config)
        .await
        .with_context(|| format!("collecting neighbors from {host}"))?;

    std::fs::write(text_output, &raw)
        .with_context(|| format!("writing {}", text_output.display()))?;

    let records = parse_neighbors(&raw);
    let csv_path = csv_path_for(text_output);
    write_csv_file(&csv_path, &records)?;
    info!(
        "{}: {} neighbors written to {}",
        host,
        records.len(),
        csv_path.display()
    );

    if json {
        let json_path = text_output.with_extension("json");
        write_json_file(&json_path, &records)?;
    }
    Ok(())
}

fn parse(input: &Path, format: Format, output: Option<&Path>) -> Result<()> {
    let raw =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let records = parse_neighbors(&raw);
    info!("{}: {} neighbors", input.display(), records.len());

    match (format, output) {
        (Format::Csv, Some(path)) => write_csv_file(path, &records),
        (Format::Json, Some(path)) => write_json_file(path, &records),
        (Format::Csv, None) => Ok(export::write_csv(&records, io::stdout().lock())?),
        (Format::Json, None) => {
            let mut stdout = io::stdout().lock();
            export::write_json(&records, &mut stdout, true)?;
            writeln!(stdout)?;
            Ok(())
        }
    }
}

/// One host per line; surrounding whitespace and blank lines are ignored.
fn parse_hosts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_hosts(path: &Path) -> Result<Vec<String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_hosts(&content))
}

/// Returns the `.txt` and `.csv` paths for `host` inside `output_dir`.
///
/// The host name becomes a file name, so anything that is not a single plain
/// path component is rejected.
fn capture_paths(output_dir: &Path, host: &str) -> Result<(PathBuf, PathBuf)> {
    let mut components = Path::new(host).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || host.contains(['/', '\\']) {
        bail!("host name {host:?} cannot be used as a file name");
    }
    Ok((
        output_dir.join(format!("{host}.txt")),
        output_dir.join(format!("{host}.csv")),
    ))
}

async fn collect_host(
    host: String,
    credentials: Arc<Credentials>,
    config: Arc<ReaderConfig>,
    output_dir: Arc<PathBuf>,
) -> Result<usize> {
    let (text_path, csv_path) = capture_paths(&output_dir, &host)?;
    let raw = fetch_neighbor_output(&host, &credentials, &config)
        .await
        .with_context(|| format!("collecting neighbors from {host}"))?;
    tokio::fs::write(&text_path, &raw)
        .await
        .with_context(|| format!("writing {}", text_path.display()))?;

    let records = parse_neighbors(&raw);
    write_csv_file(&csv_path, &records)?;
    Ok(records.len())
}

/// Collects every host, at most `concurrency` at a time.
///
/// A failing host is logged and does not stop the others. Returns the number
/// of hosts that failed.
async fn bulk(
    hosts: Vec<String>,
    credentials: Credentials,
    config: ReaderConfig,
    output_dir: PathBuf,
    concurrency: usize,
) -> Result<usize> {
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let credentials = Arc::new(credentials);
    let config = Arc::new(config);
    let output_dir = Arc::new(output_dir);
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut tasks = JoinSet::new();
    for host in hosts {
        let credentials = credentials.clone();
        let config = config.clone();
        let output_dir = output_dir.clone();
        let permits = permits.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = collect_host(host.clone(), credentials, config, output_dir).await;
            (host, result)
        });
    }

    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((host, Ok(count))) => info!("Saved {} neighbors for {}", count, host),
            Ok((host, Err(err))) => {
                failed += 1;
                error!("Error fetching neighbors for {}: {:#}", host, err);
            }
            Err(err) => {
                failed += 1;
                error!("Collection task panicked: {}", err);
            }
        }
    }
    Ok(failed)
}

/// Turns a failure count into the command result; any failure is an error.
fn bulk_outcome(failed: usize) -> Result<()> {
    if failed > 0 {
        return Err(anyhow!("{failed} host(s) failed"));
    }
    Ok(())
}

async fn run_bulk(
    login: &LoginArgs,
    hosts_file: &Path,
    output_dir: PathBuf,
    concurrency: usize,
) -> Result<()> {
    let hosts = read_hosts(hosts_file)?;
    let config = login.reader_config()?;
    let failed = bulk(hosts, login.credentials(), config, output_dir, concurrency).await?;
    bulk_outcome(failed)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Fetch {
            login,
            host,
            text_output,
            json,
        } => fetch(&login, &host, &text_output, json).await,
        Commands::Parse {
            input,
            format,
            output,
        } => parse(&input, format, output.as_deref()),
        Commands::Bulk {
            login,
            hosts_file,
            output_dir,
            concurrency,
        } => run_bulk(&login, &hosts_file, output_dir, concurrency).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
