use clap::Parser;
use counselflow_lib::config::{AppConfig, ConfigOverrides, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "counselflow")]
#[command(about = "Legal practice management API: policies, practice views and document generation")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to bind (overrides config file)
    #[arg(long, env = "COUNSELFLOW_HOST")]
    host: Option<String>,

    /// Port to bind (overrides config file)
    #[arg(short, long, env = "COUNSELFLOW_PORT")]
    port: Option<u16>,

    /// Directory for the database and logs
    #[arg(short, long, env = "COUNSELFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter such as `info` or `counselflow_lib=debug`
    #[arg(long, env = "COUNSELFLOW_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_overrides(ConfigOverrides {
        host: cli.host,
        port: cli.port,
        data_dir: cli.data_dir,
        log_level: cli.log_level,
    });
    config.validate()?;

    counselflow_lib::init_tracing(&config)?;
    tracing::info!(
        config = %cli.config.display(),
        data_dir = %config.storage.data_dir.display(),
        "starting counselflow"
    );

    counselflow_lib::run(config).await
}
