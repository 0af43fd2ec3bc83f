use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};

/// Site the accounts live on
pub const DEFAULT_BASE_URL: &str = "https://www.pixiv.net";

/// Command line and environment options.
///
/// Every option can be given as a flag or through the environment variable
/// named next to it (a `.env` file in the working directory is honored).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "follow-migrator",
    version,
    about = "Copy the users followed by one pixiv account to another account"
)]
pub struct Cli {
    /// Username of the account whose follows are copied
    #[arg(long = "old-username", env = "OLD_ACCOUNT_USERNAME")]
    pub old_username: String,

    /// Password of the account whose follows are copied
    #[arg(long = "old-password", env = "OLD_ACCOUNT_PASSWORD", hide_env_values = true)]
    pub old_password: String,

    /// Username of the account that receives the follows
    #[arg(long = "new-username", env = "NEW_ACCOUNT_USERNAME")]
    pub new_username: String,

    /// Password of the account that receives the follows
    #[arg(long = "new-password", env = "NEW_ACCOUNT_PASSWORD", hide_env_values = true)]
    pub new_password: String,

    /// Run the browser without a visible window
    #[arg(
        long,
        env = "HEADLESS",
        default_value = "false",
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub headless: bool,

    /// Write the backup file used to resume an interrupted migration
    #[arg(
        long,
        env = "GENERATE_BACKUP_FILE",
        default_value = "false",
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub generate_backup_file: bool,

    /// Location of the backup file, relative to the working directory
    #[arg(long, env = "BACKUP_FILE_PATH", default_value = "backup.json")]
    pub backup_file_path: PathBuf,

    /// Pause after each follow, in milliseconds
    #[arg(long, env = "FOLLOW_COOLDOWN_MS", default_value_t = 5000)]
    pub follow_cooldown_ms: u64,

    /// Upper bound for each wait on a page element, in milliseconds
    #[arg(long, env = "WAIT_TIMEOUT_MS", default_value_t = 30_000)]
    pub wait_timeout_ms: u64,

    /// Site root
    #[arg(long, env = "PIXIV_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Chrome/Chromium binary to launch instead of the auto-detected one
    #[arg(long, env = "CHROME_EXECUTABLE")]
    pub chrome_executable: Option<PathBuf>,
}

/// Login credentials for one account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for launching browser sessions
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub base_url: String,
    pub wait_timeout: Duration,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            wait_timeout: Duration::from_secs(30),
            chrome_executable: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Account the follows are read from
    pub source: Credentials,
    /// Account the follows are replayed on
    pub target: Credentials,
    pub browser: BrowserConfig,
    /// Whether the backup file is written at all
    pub generate_backup_file: bool,
    /// Absolute backup file location
    pub backup_path: PathBuf,
    /// Fixed pause after each follow
    pub follow_cooldown: Duration,
}

impl Config {
    /// Build the configuration, resolving relative paths against `working_dir`
    pub fn from_cli(cli: Cli, working_dir: &Path) -> Self {
        let backup_path = if cli.backup_file_path.is_absolute() {
            cli.backup_file_path
        } else {
            working_dir.join(cli.backup_file_path)
        };

        Self {
            source: Credentials::new(cli.old_username, cli.old_password),
            target: Credentials::new(cli.new_username, cli.new_password),
            browser: BrowserConfig {
                headless: cli.headless,
                base_url: cli.base_url.trim_end_matches('/').to_string(),
                wait_timeout: Duration::from_millis(cli.wait_timeout_ms),
                chrome_executable: cli.chrome_executable,
            },
            generate_backup_file: cli.generate_backup_file,
            backup_path,
            follow_cooldown: Duration::from_millis(cli.follow_cooldown_ms),
        }
    }

    /// Parse flags and environment, resolving paths against the current directory
    pub fn load() -> anyhow::Result<Self> {
        let cli = Cli::parse();
        let working_dir = std::env::current_dir()?;
        Ok(Self::from_cli(cli, &working_dir))
    }
}
