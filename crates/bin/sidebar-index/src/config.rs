use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use sidebar_core::render::SidebarScriptStyle;
use sidebar_core::validate::ValidateOptions;
use sidebar_store::models::ItemKind;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_STYLE: &str = "legacy";
const DEFAULT_DB_NAMESPACE: &str = "sidebar";
const DEFAULT_DB_NAME: &str = "sidebar";
const DEFAULT_INGEST_ADDR: &str = "127.0.0.1:4010";
const DEFAULT_INGEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_INGEST_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "sidebar-index",
    version,
    about = "Generate, check, and serve rustdoc sidebar indexes."
)]
struct CliArgs {
    #[command(subcommand)]
    command: CommandArgs,
}

#[derive(Subcommand, Debug)]
enum CommandArgs {
    /// Write one sidebar script per module from rustdoc JSON output.
    Render(RenderArgs),
    /// Check a sidebar script for duplicate names and expected kinds.
    Check(CheckArgs),
    /// Re-render a sidebar script in another style.
    Convert(ConvertArgs),
    /// Serve the ingest and sidebar HTTP API.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long, env = "SIDEBAR_INPUT")]
    input: PathBuf,

    #[arg(long, env = "SIDEBAR_OUT_DIR")]
    out_dir: PathBuf,

    #[arg(long, env = "SIDEBAR_STYLE", default_value = DEFAULT_STYLE)]
    style: String,

    #[arg(
        long,
        env = "SIDEBAR_INCLUDE_PRIVATE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    include_private: bool,

    #[arg(
        long,
        env = "SIDEBAR_INCLUDE_HIDDEN",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    include_hidden: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(env = "SIDEBAR_FILE")]
    file: PathBuf,

    #[arg(long, env = "SIDEBAR_EXPECT_KINDS", value_delimiter = ',')]
    expect_kinds: Vec<String>,

    #[arg(long, env = "SIDEBAR_EXPECT_COUNT", value_delimiter = ',')]
    expect_count: Vec<String>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[arg(env = "SIDEBAR_FILE")]
    file: PathBuf,

    #[arg(long, env = "SIDEBAR_STYLE", default_value = DEFAULT_STYLE)]
    style: String,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "SIDEBAR_INGEST_ADDR", default_value = DEFAULT_INGEST_ADDR)]
    addr: SocketAddr,

    #[arg(
        long,
        env = "SIDEBAR_INGEST_MAX_BODY_BYTES",
        default_value_t = DEFAULT_INGEST_MAX_BODY_BYTES
    )]
    max_body_bytes: usize,

    #[arg(
        long,
        env = "SIDEBAR_INGEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_INGEST_TIMEOUT_SECS
    )]
    timeout_secs: u64,

    #[arg(long, env = "SIDEBAR_DB_NAMESPACE", default_value = DEFAULT_DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "SIDEBAR_DB_NAME", default_value = DEFAULT_DB_NAME)]
    db_name: String,

    #[arg(long, env = "SIDEBAR_SEED")]
    seed: Option<PathBuf>,

    #[arg(long, env = "SIDEBAR_SEED_PROJECT")]
    seed_project: Option<String>,

    #[arg(long, env = "SIDEBAR_SEED_MODULE")]
    seed_module: Option<String>,
}

/// A validated subcommand, loaded from CLI arguments and environment variables.
pub enum SidebarCommand {
    Render(RenderConfig),
    Check(CheckConfig),
    Convert(ConvertConfig),
    Serve(ServeConfig),
}

pub struct RenderConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub style: SidebarScriptStyle,
    pub include_private: bool,
    pub include_hidden: bool,
}

pub struct CheckConfig {
    pub file: PathBuf,
    pub options: ValidateOptions,
}

pub struct ConvertConfig {
    pub file: PathBuf,
    pub style: SidebarScriptStyle,
}

/// Sidebar script loaded into the store before the server starts.
pub struct SeedConfig {
    pub file: PathBuf,
    pub project_id: String,
    pub module_path: String,
}

pub struct ServeConfig {
    pub addr: SocketAddr,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub db_namespace: String,
    pub db_name: String,
    pub seed: Option<SeedConfig>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl SidebarCommand {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for SidebarCommand {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        Ok(match args.command {
            CommandArgs::Render(args) => Self::Render(RenderConfig::try_from(args)?),
            CommandArgs::Check(args) => Self::Check(CheckConfig::try_from(args)?),
            CommandArgs::Convert(args) => Self::Convert(ConvertConfig::try_from(args)?),
            CommandArgs::Serve(args) => Self::Serve(ServeConfig::try_from(args)?),
        })
    }
}

impl TryFrom<RenderArgs> for RenderConfig {
    type Error = ConfigError;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            input: args.input,
            out_dir: args.out_dir,
            style: parse_style(&args.style)?,
            include_private: args.include_private,
            include_hidden: args.include_hidden,
        })
    }
}

impl TryFrom<CheckArgs> for CheckConfig {
    type Error = ConfigError;

    fn try_from(args: CheckArgs) -> Result<Self, Self::Error> {
        let mut options = ValidateOptions::default();

        let kinds = args
            .expect_kinds
            .iter()
            .map(|value| parse_kind("SIDEBAR_EXPECT_KINDS", value))
            .collect::<Result<Vec<_>, _>>()?;
        if !kinds.is_empty() {
            options = options.with_expected_kinds(kinds);
        }

        for value in &args.expect_count {
            let invalid = || ConfigError::InvalidSetting {
                name: "SIDEBAR_EXPECT_COUNT",
                value: value.clone(),
            };
            let (kind, count) = value.split_once('=').ok_or_else(invalid)?;
            let kind = parse_kind("SIDEBAR_EXPECT_COUNT", kind)?;
            let count = count.trim().parse::<usize>().map_err(|_| invalid())?;
            options = options.with_expected_count(kind, count);
        }

        Ok(Self {
            file: args.file,
            options,
        })
    }
}

impl TryFrom<ConvertArgs> for ConvertConfig {
    type Error = ConfigError;

    fn try_from(args: ConvertArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            file: args.file,
            style: parse_style(&args.style)?,
        })
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = ConfigError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        if args.db_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "SIDEBAR_DB_NAMESPACE",
                value: args.db_namespace,
            });
        }
        if args.db_name.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "SIDEBAR_DB_NAME",
                value: args.db_name,
            });
        }

        let seed_project = args.seed_project.filter(|value| !value.trim().is_empty());
        let seed_module = args.seed_module.filter(|value| !value.trim().is_empty());
        let seed = match args.seed {
            Some(file) => Some(SeedConfig {
                file,
                project_id: seed_project
                    .ok_or(ConfigError::MissingSetting("SIDEBAR_SEED_PROJECT"))?,
                module_path: seed_module
                    .ok_or(ConfigError::MissingSetting("SIDEBAR_SEED_MODULE"))?,
            }),
            None => None,
        };

        Ok(Self {
            addr: args.addr,
            max_body_bytes: args.max_body_bytes,
            request_timeout: Duration::from_secs(args.timeout_secs),
            db_namespace: args.db_namespace,
            db_name: args.db_name,
            seed,
        })
    }
}

fn parse_style(value: &str) -> Result<SidebarScriptStyle, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidSetting {
        name: "SIDEBAR_STYLE",
        value: value.to_string(),
    })
}

fn parse_kind(name: &'static str, value: &str) -> Result<ItemKind, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
        })
}
