use anyhow::anyhow;
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use registration_core::CurrencySet;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to Settings.toml file holding configuration options
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level to run with the service (default: info)
    #[arg(short, long)]
    pub level: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    pub level: Option<String>,
    #[serde(default)]
    pub api_settings: APISettings,
    #[serde(default)]
    pub store_settings: StoreSettings,
    #[serde(default)]
    pub pricing_settings: PricingSettings,
}

impl Settings {
    /// Written with defaults on first start when no `--config` is given
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("./config/local.toml")
    }

    pub fn config_directory() -> PathBuf {
        PathBuf::from("./config")
    }

    /// CLI flags win over the file
    pub fn apply_cli_overrides(&mut self, cli_settings: &CliSettings) {
        if let Some(level) = &cli_settings.level {
            self.level = Some(level.clone());
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct APISettings {
    pub domain: String,
    pub port: String,
    pub origins: Vec<String>,
}

impl Default for APISettings {
    fn default() -> Self {
        APISettings {
            domain: String::from("127.0.0.1"),
            port: String::from("9990"),
            origins: vec![String::from("http://localhost:3000")],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Sanity project holding the registration documents
    pub project_id: String,
    pub dataset: String,
    /// Dated API version, e.g. `2023-05-03`
    pub api_version: String,
    /// Overrides the `https://{project_id}.api.sanity.io` host (local proxies, tests)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Read through the API CDN instead of the live API
    #[serde(default)]
    pub use_cdn: bool,
    /// File holding a read token, only needed for private datasets
    #[serde(default)]
    pub token_file: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Serve documents from an in-memory store (debug builds or `e2e-testing` only)
    #[serde(default)]
    pub mock_enabled: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            project_id: String::from("n3no08m3"),
            dataset: String::from("production"),
            api_version: String::from("2023-05-03"),
            base_url: None,
            use_cdn: false,
            token_file: None,
            timeout_secs: 10,
            max_retries: 3,
            mock_enabled: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Every price projection uses exactly these currencies
    pub currencies: CurrencySet,
    /// How close to a period change the service reports a transition
    pub transition_threshold_hours: i64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            currencies: CurrencySet::default(),
            transition_threshold_hours: 24,
        }
    }
}

pub fn get_settings() -> Result<Settings, anyhow::Error> {
    get_settings_with_cli(Cli::parse().into())
}

pub struct CliSettings {
    pub config: Option<String>,
    pub level: Option<String>,
}

impl From<Cli> for CliSettings {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            level: cli.level,
        }
    }
}

pub fn get_settings_with_cli(cli_settings: CliSettings) -> Result<Settings, anyhow::Error> {
    let mut settings: Settings = if let Some(config_path) = cli_settings.config.clone() {
        let path = PathBuf::from(config_path);

        let absolute_path = if path.is_absolute() {
            path
        } else {
            env::current_dir()?.join(path)
        };

        match File::open(absolute_path) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read config: {}", e))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to map config to settings: {}", e))?
            }
            Err(err) => return Err(anyhow!("Failed to find file: {}", err)),
        }
    } else {
        let default_path = Settings::default_config_path();
        match File::open(&default_path) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read default config: {}", e))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to parse default config: {}", e))?
            }
            Err(_) => {
                let default_settings = Settings::default();

                fs::create_dir_all(Settings::config_directory())
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;

                let toml_content = toml::to_string(&default_settings)
                    .map_err(|e| anyhow!("Failed to serialize default settings: {}", e))?;

                let mut file = fs::File::create(&default_path)
                    .map_err(|e| anyhow!("Failed to create config file: {}", e))?;
                file.write_all(toml_content.as_bytes())
                    .map_err(|e| anyhow!("Failed to write default config: {}", e))?;

                default_settings
            }
        }
    };

    settings.apply_cli_overrides(&cli_settings);

    Ok(settings)
}

pub fn setup_logger(
    level: Option<String>,
    filter_targets: Vec<String>,
) -> Result<(), fern::InitError> {
    let rust_log = get_log_level(level);
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                timestamp,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .level(rust_log)
        .filter(move |metadata| {
            !filter_targets
                .iter()
                .any(|filter| metadata.target().starts_with(filter))
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

pub fn get_log_level(level: Option<String>) -> LevelFilter {
    let level = level.unwrap_or_else(|| env::var("RUST_LOG").unwrap_or_default());
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}
