mod settings;

pub use settings::{BrowserConfig, Cli, Config, Credentials, DEFAULT_BASE_URL};
