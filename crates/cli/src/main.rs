use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use konf_core::ResourceKind;
use konf_provider::{ConfigProvider, Resolver, ResolverOptions};

#[derive(Parser, Debug)]
#[command(name = "konfctl", version, about = "Resolve ConfigMap/Secret references")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Kind {
    Configmap,
    Secret,
}

impl From<Kind> for ResourceKind {
    fn from(k: Kind) -> Self {
        match k {
            Kind::Configmap => ResourceKind::ConfigMap,
            Kind::Secret => ResourceKind::Secret,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a resource path, e.g. "kafka/broker-config" or "my-secret"
    Get {
        /// Resource path in <namespace>/<name> form (<name> uses the
        /// client's default namespace)
        path: String,
        /// Resource kind to read
        #[arg(long = "kind", value_enum, default_value_t = Kind::Configmap)]
        kind: Kind,
        /// Key to select; literal or glob (e.g. "*.config"). Repeatable.
        /// Without any, all keys are returned.
        #[arg(long = "key")]
        keys: Vec<String>,
        /// Separator joining the values of a multi-match glob key
        #[arg(long = "separator")]
        separator: Option<String>,
    },
}

fn init_tracing() {
    let env = std::env::var("KONF_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("KONF_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid KONF_METRICS_ADDR; expected host:port");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    match cli.command {
        Commands::Get { path, kind, keys, separator } => {
            let mut options = ResolverOptions::default();
            if let Some(sep) = separator {
                options.separator = sep;
            }
            let resolver = Resolver::configure(kind.into(), options).await?;
            let requested: Option<BTreeSet<String>> =
                (!keys.is_empty()).then(|| keys.into_iter().collect());
            info!(path = %path, keys = ?requested, "get invoked");
            let result = match requested.as_ref() {
                Some(req) => resolver.get_keys(&path, req).await,
                None => resolver.get(&path).await,
            };
            match result {
                Ok(config) => match cli.output {
                    Output::Human => {
                        for (key, value) in &config {
                            println!("{}={}", key, value);
                        }
                    }
                    Output::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                },
                Err(e) => {
                    error!(error = %e, "get failed");
                    eprintln!("get error: {}", e);
                    resolver.close().await;
                    std::process::exit(1);
                }
            }
            resolver.close().await;
        }
    }
    Ok(())
}
