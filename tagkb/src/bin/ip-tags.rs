//! ip-tags: look up the tags of IPv4 addresses in a knowledge base.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tagkb::{load_index, report, Config, NetworkParsing};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Look up the tags of IPv4 addresses in a JSON knowledge base
#[derive(Parser, Debug)]
#[command(name = "ip-tags")]
#[command(about = "Print the tags of every network containing each address")]
struct Args {
    /// Knowledge base file (defaults to $IP_TAGS_KNOWLEDGE_BASE)
    #[arg(short, long)]
    knowledge_base: Option<PathBuf>,

    /// Reject networks with host bits set instead of masking them
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Addresses to look up
    #[arg(required = true)]
    addresses: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
    Html,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(path) = args.knowledge_base {
        config.knowledge_base = path;
    }
    if args.strict {
        config.network_parsing = NetworkParsing::Strict;
    }

    let index = match load_index(&config) {
        Ok(index) => index,
        Err(err) => {
            error!(error = %err, "could not load knowledge base");
            eprintln!("ip-tags: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for addr in &args.addresses {
        match index.lookup_str(addr) {
            Ok(tags) => {
                let out = match args.format {
                    Format::Text => report::tags_text(addr, &tags),
                    Format::Json => report::tags_json(&tags),
                    Format::Html => report::tags_html(addr, &tags),
                };
                println!("{out}");
            }
            Err(err) => {
                eprintln!("ip-tags: {err}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
