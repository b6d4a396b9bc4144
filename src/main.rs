use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zonediff::config::ZoneDiffConfig;
use zonediff::doh::DohClient;
use zonediff::http_server::ProxyServer;
use zonediff::{ExportFormat, ZoneParser, compare_records, export_results};

#[derive(Parser, Debug)]
#[command(name = "zonediff", version, about = "Compare DNS zone files against each other or against live DNS")]
struct Cli {
    /// TOML configuration file (environment variables still apply on top)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a source zone file against a destination zone file or live DNS
    Compare(CompareArgs),
    /// Parse a zone file and print the records found
    Parse {
        /// Zone file to parse
        file: PathBuf,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the DNS query proxy
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<SocketAddr>,
        /// DNS-over-HTTPS JSON endpoint to forward to
        #[arg(short, long)]
        upstream: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Source of truth zone file
    source: PathBuf,

    /// Destination zone file
    #[arg(short, long, conflicts_with = "live", required_unless_present = "live")]
    dest: Option<PathBuf>,

    /// Compare against live answers fetched through the query proxy
    #[arg(long)]
    live: bool,

    /// Base URL of the query proxy
    #[arg(long, requires = "live")]
    proxy: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Text)]
    format: ExportFormat,

    /// Write the export to this file instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    output: Option<PathBuf>,

    /// Write the export to dns-comparison.<format> in the current directory
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Logs go to stderr so exports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ZoneDiffConfig::from_file(path)?,
        None => ZoneDiffConfig::from_env()?,
    };

    match cli.command {
        Command::Compare(args) => run_compare(config, args).await,
        Command::Parse { file, json } => {
            let records = ZoneParser::new().parse_file(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}", record);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { bind, upstream } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.http_bind_addr = bind;
            }
            if let Some(upstream) = upstream {
                config.upstream_doh_url = upstream;
            }
            config.validate()?;

            ProxyServer::new(&config).start().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_compare(
    mut config: ZoneDiffConfig,
    args: CompareArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let parser = ZoneParser::new();
    let source = parser.parse_file(&args.source)?;

    let destination = match &args.dest {
        Some(dest) => parser.parse_file(dest)?,
        None => {
            if let Some(proxy) = args.proxy {
                config.proxy_url = proxy;
                config.validate()?;
            }
            DohClient::from_config(&config).fetch_records(&source).await
        }
    };

    let results = compare_records(&source, &destination);
    let summary = results.summary();
    info!(
        "{} matching, {} missing, {} different ({} source records)",
        summary.matching, summary.missing, summary.different, summary.total
    );

    let content = export_results(&results, args.format);
    match (args.output, args.save) {
        (Some(path), _) => write_export(&path, &content)?,
        (None, true) => write_export(Path::new(&args.format.file_name()), &content)?,
        (None, false) => println!("{}", content),
    }

    if results.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn write_export(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)?;
    info!("Wrote {}", path.display());
    Ok(())
}
