use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trellis::channels::{NullArchiveService, NullAuditService, NullChatService};
use trellis::config::Config;
use trellis::dispatch::CommandContextFactory;
use trellis::plugins::{LibraryLoader, PluginRuntime};
use trellis::state::MemoryStateStore;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Extensible group-chat bot host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot host
    Run {
        /// Path to the JSON config file
        #[arg(short, long, default_value = "trellis.json")]
        config: PathBuf,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run {
        config: PathBuf::from("trellis.json"),
    });
    match command {
        Commands::Version => {
            println!("trellis {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Run { config } => {
            let config = Config::load(&config)?;
            run(config).await
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone())),
        )
        .init();

    info!(bot_id = config.bot_id, "starting trellis host");

    let contexts = CommandContextFactory::new(
        Arc::new(NullChatService),
        Arc::new(NullArchiveService),
        Arc::new(NullAuditService),
        Arc::new(MemoryStateStore::new()),
    );
    let runtime = Arc::new(PluginRuntime::new(
        Arc::new(LibraryLoader),
        &config.plugins.shadow_dir,
        contexts,
    )?);

    if config.plugins.autoload {
        autoload(&runtime, &config.plugins.plugin_dir).await;
    }

    for status in runtime.list_active() {
        info!(
            plugin = %status.meta.id,
            version = %status.meta.version,
            state = ?status.state,
            "plugin registered"
        );
    }

    info!("host running, press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    runtime.shutdown().await;
    Ok(())
}

/// Load every plugin artifact found in the plugin directory.
async fn autoload(runtime: &Arc<PluginRuntime>, plugin_dir: &std::path::Path) {
    let entries = match std::fs::read_dir(plugin_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %plugin_dir.display(), error = %e, "plugin directory not readable");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_artifact = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("so") | Some("dll") | Some("dylib")
        );
        if !is_artifact {
            continue;
        }
        match runtime.load_plugin(&path).await {
            Ok(ids) => info!(artifact = %path.display(), plugins = ?ids, "artifact loaded"),
            Err(e) => error!(artifact = %path.display(), error = %e, "artifact failed to load"),
        }
    }
}
