use anyhow::{Context, bail};
use arbiterid::{ArbiterId, GeneratorOptions};
use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;

/// Upper bound for the `MAX_BATCH` setting.
pub const MAX_BATCH_LIMIT: usize = 1_000;

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human readable.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Runtime configuration for the `arbiterid-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "arbiterid-server",
    version,
    about = "An HTTP service minting ArbiterIDs"
)]
pub struct CliArgs {
    /// Node id of this instance's generator, `0..=3`.
    ///
    /// Every concurrently running instance must use a different node id.
    ///
    /// Environment variable: `NODE_ID`
    #[arg(long, env = "NODE_ID", default_value_t = 0)]
    pub node_id: u8,

    /// TCP address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Maximum number of IDs a single `/generate` request may ask for.
    ///
    /// Environment variable: `MAX_BATCH`
    #[arg(long, env = "MAX_BATCH", default_value_t = 100)]
    pub max_batch: usize,

    /// Reject IDs that are not strictly greater than the previous one.
    ///
    /// IDs of a lower type compare lower, so clients mixing types should
    /// turn this off.
    ///
    /// Environment variable: `STRICT_MONOTONICITY`
    #[arg(long, env = "STRICT_MONOTONICITY", default_value_t = true, action = ArgAction::Set)]
    pub strict_monotonicity: bool,

    /// Log output format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub node_id: u8,
    pub server_addr: SocketAddr,
    pub max_batch: usize,
    pub options: GeneratorOptions,
    pub log_format: LogFormat,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.node_id > ArbiterId::MAX_NODE {
            bail!(
                "NODE_ID ({}) must be between 0 and {}",
                args.node_id,
                ArbiterId::MAX_NODE
            );
        }

        if args.max_batch == 0 || args.max_batch > MAX_BATCH_LIMIT {
            bail!(
                "MAX_BATCH ({}) must be between 1 and {}",
                args.max_batch,
                MAX_BATCH_LIMIT
            );
        }

        let server_addr = args
            .server_addr
            .parse()
            .with_context(|| format!("invalid SERVER_ADDR {:?}", args.server_addr))?;

        // Request handling reports failures itself.
        let options = GeneratorOptions::default()
            .with_strict_monotonicity(args.strict_monotonicity)
            .with_quiet(true);

        Ok(Self {
            node_id: args.node_id,
            server_addr,
            max_batch: args.max_batch,
            options,
            log_format: args.log_format,
        })
    }
}
