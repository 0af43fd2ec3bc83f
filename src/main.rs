use anyhow::Result;
use follow_migrator::{ChromiumLauncher, Config, FileBackupStore, MigrationPlan, Migrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Seed the environment from ./.env before reading options
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    tracing::debug!(?config, "Loaded configuration");

    let store = FileBackupStore::new(&config.backup_path, config.generate_backup_file);
    if !store.persists() {
        tracing::warn!(
            path = %store.path().display(),
            "Backup generation disabled, progress will not survive a crash"
        );
    } else {
        tracing::info!(path = %store.path().display(), "Checkpointing to backup file");
    }
    let launcher = ChromiumLauncher::new(config.browser.clone());
    let plan = MigrationPlan {
        source: config.source.clone(),
        target: config.target.clone(),
        follow_cooldown: config.follow_cooldown,
    };

    let report = Migrator::new(launcher, store, plan).run().await.map_err(|e| {
        tracing::error!(error = %e, "Migration aborted");
        e
    })?;

    tracing::info!(
        extracted = report.extracted(),
        public = report.record.public_followers.len(),
        private = report.record.private_followers.len(),
        followed = report.followed(),
        skipped = report.skipped(),
        "Migration finished"
    );
    Ok(())
}
