//! meshname: bind and resolve names against namerd.
//!
//! # Usage
//!
//! ```text
//! meshname resolve /svc/users /default --format json
//! meshname bind /svc/users --addr namerd.local:4321
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use meshname_client::{GrpcTransport, NameClient};
use meshname_core::{MeshnameConfig, Path, Strategy, parse_duration};
use tracing::debug;

mod commands;

use commands::Exit;

#[derive(Parser)]
#[command(
    name = "meshname",
    about = "Resolve names to endpoints through namerd's mesh interface",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to meshname.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// namerd address (overrides [namerd].address).
    #[arg(long, global = true, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Deadline for one bind or resolve, e.g. 500ms, 5s (overrides [namerd].op_timeout).
    #[arg(long, global = true, value_name = "DURATION")]
    timeout: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve NAME to its endpoint set under ROOT.
    ///
    /// Binds the name first, then resolves every bound identifier. The
    /// unary call is tried first and streaming is used only when the
    /// resolver reports the result as pending; --stream-only and
    /// --no-stream override this.
    ///
    /// Exits zero on a negative binding or an empty endpoint set unless
    /// -f or -F is given.
    Resolve {
        /// Name to resolve, e.g. /svc/users.
        name: Path,
        /// Namespace root (default: [resolve].root, or /default).
        root: Option<Path>,
        /// Use only StreamReplicas.
        #[arg(long, conflicts_with = "no_stream")]
        stream_only: bool,
        /// Use only GetReplicas.
        #[arg(long)]
        no_stream: bool,
        /// Exit 2 if the binding is negative.
        #[arg(short = 'f', long)]
        fail_neg: bool,
        /// Exit 3 if the endpoint set is empty.
        #[arg(short = 'F', long)]
        fail_empty: bool,
        /// Output format: text or json.
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Bind NAME under ROOT and print the bound identifiers.
    Bind {
        name: Path,
        root: Option<Path>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meshname=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(Exit::Success) => ExitCode::SUCCESS,
        Ok(exit) => {
            eprintln!("{exit}");
            ExitCode::from(exit.code())
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(Exit::UNEXPECTED)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Exit> {
    let config = MeshnameConfig::load_or_default(cli.config.as_deref())?;
    let mut options = config.client_options()?;
    if let Some(timeout) = &cli.timeout {
        options.op_timeout =
            parse_duration(timeout).with_context(|| format!("invalid --timeout {timeout:?}"))?;
    }
    let address = cli.addr.as_deref().unwrap_or(config.address());
    debug!(%address, ?options, "starting");

    let transport = GrpcTransport::connect(address, options.dial_timeout)
        .await
        .with_context(|| format!("failed to connect to namerd at {address}"))?;
    let default_strategy = options.strategy;
    let client = NameClient::new(transport, options);
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::Resolve {
            name,
            root,
            stream_only,
            no_stream,
            fail_neg,
            fail_empty,
            format,
        } => {
            let strategy = if stream_only {
                Strategy::StreamOnly
            } else if no_stream {
                Strategy::UnaryOnly
            } else {
                default_strategy
            };
            let args = commands::resolve::ResolveArgs {
                root: root.map_or_else(|| config.default_root(), Ok)?,
                name,
                strategy,
                fail_neg,
                fail_empty,
                json: format == "json",
            };
            commands::resolve::resolve(&client, &args, &mut stdout).await
        }
        Command::Bind { name, root } => {
            let root = root.map_or_else(|| config.default_root(), Ok)?;
            commands::bind::bind(&client, &root, &name, &mut stdout).await
        }
    }
}
