use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stateboard_server::ServerConfig;

#[derive(Parser)]
#[command(
    name = "stateboard",
    about = "Stateboard: browse and compare Terraform state versions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options shared by every subcommand. Explicit values override the
/// configuration file.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "STATEBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the state-storage service
    #[arg(long, global = true, env = "STATEBOARD_STORE_URL")]
    pub store_url: Option<String>,

    /// Directory of .tfstate files to serve instead of a remote store
    #[arg(long, global = true, env = "STATEBOARD_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "STATEBOARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: plain or json
    #[arg(long, global = true, env = "STATEBOARD_LOG_FORMAT")]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// List known states
    States,
    /// Show one version of a state
    Show(ShowArgs),
    /// List the versions of a state
    Activity(ActivityArgs),
    /// Show changes between two versions of a state
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "STATEBOARD_PORT")]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "STATEBOARD_BIND")]
    pub bind: Option<IpAddr>,

    /// URL the UI links to for logging out
    #[arg(long, env = "STATEBOARD_LOGOUT_URL")]
    pub logout_url: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub state: String,
    /// Serial to show; latest when omitted
    #[arg(long, short, default_value = "")]
    pub serial: String,
}

#[derive(Args)]
pub struct ActivityArgs {
    pub state: String,
}

#[derive(Args)]
pub struct CompareArgs {
    pub state: String,
    /// Serial to compare from; latest when omitted
    #[arg(long, default_value = "")]
    pub from: String,
    /// Serial to compare to; latest when omitted
    #[arg(long, default_value = "")]
    pub to: String,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the config file,
    /// then explicit flags and environment variables.
    pub fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.global.config {
            Some(path) => ServerConfig::from_toml_file(path)?,
            None => ServerConfig::default(),
        };
        self.global.apply(&mut config);
        if let Command::Serve(args) = &self.command {
            args.apply(&mut config);
        }
        Ok(config)
    }
}

impl GlobalArgs {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(url) = &self.store_url {
            config.store_url = Some(url.clone());
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
    }
}

impl ServeArgs {
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(url) = &self.logout_url {
            config.logout_url = Some(url.clone());
        }
    }
}
