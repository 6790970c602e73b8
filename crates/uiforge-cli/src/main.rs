#![deny(unsafe_code)]

//! uiforge CLI: run the generation server or a single generation locally.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use uiforge_config::AppConfig;
use uiforge_core::server::{self, AppState, ComponentInfo, ComponentsResponse};
use uiforge_core::{
    Catalog, CodeExtractor, ConversationEngine, EngineSettings, LlmProvider, PricingModel,
    ToolRegistry,
};

/// uiforge — generate design-system UI code from a plain-language request.
#[derive(Debug, Parser)]
#[command(
    name = "uiforge",
    version = uiforge_core::build_info::LONG_VERSION,
    about,
    long_about = None
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "uiforge.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve,

    /// Generate code for one request and print it.
    Generate {
        /// What to build, e.g. "a login screen".
        query: String,

        /// Print the model's whole final answer instead of the extracted code.
        #[arg(long)]
        raw: bool,
    },

    /// List the component catalog.
    Components {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = read_config(&cli.config).await?;
    let level = file_config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(cli.verbose, &level))),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match file_config {
        Some(config) => config,
        None => {
            info!(path = %cli.config.display(), "Config file not found, using defaults");
            AppConfig::default()
        }
    };
    config.apply_env();

    match cli.command {
        Commands::Serve => cmd_serve(config).await?,
        Commands::Generate { query, raw } => cmd_generate(config, &query, raw).await?,
        Commands::Components { json } => cmd_components(&config, json).await?,
        Commands::Config { show } => cmd_config(&config, &cli.config, show)?,
    }

    Ok(())
}

/// The `-v` count wins over the configured level.
fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

async fn read_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let config = AppConfig::load(path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(Some(config))
}

fn provider_for(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
    uiforge_core::llm::create_provider(&config.llm).map(Arc::from)
}

async fn cmd_serve(config: AppConfig) -> Result<()> {
    let provider = provider_for(&config);
    if provider.is_none() {
        warn!(
            var = %config.llm.api_key_env,
            "No API key configured; generation requests will fail"
        );
    }

    let state = AppState::from_config(&config, provider).context("building server state")?;
    let addr = format!("{}:{}", config.server.listen_addr, config.server.listen_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        catalog = %config.catalog.dir,
        model = %config.llm.model,
        environment = %config.server.environment,
        "Starting uiforge server"
    );
    server::serve(listener, Arc::new(state), server::shutdown_signal()).await?;
    Ok(())
}

async fn cmd_generate(config: AppConfig, query: &str, raw: bool) -> Result<()> {
    let Some(provider) = provider_for(&config) else {
        bail!(
            "{} environment variable is not set",
            config.llm.api_key_env
        );
    };

    let catalog = Catalog::from_config(&config.catalog);
    if catalog.list_components().await.is_empty() {
        bail!(
            "No documentation files found in {}",
            catalog.dir().display()
        );
    }

    let extractor = CodeExtractor::new(&config.agent.code_language)?;
    let engine = ConversationEngine::new(
        provider,
        Arc::new(ToolRegistry::for_catalog(catalog)),
        EngineSettings::from_config(&config),
    );

    let outcome = engine.run(query).await?;
    if raw {
        println!("{}", outcome.final_text);
    } else {
        let code = extractor.extract(&outcome.final_text);
        if code.is_empty() {
            bail!(
                "the answer contained no ```{} block (rerun with --raw to see it)",
                extractor.language()
            );
        }
        println!("{code}");
    }

    let usage = outcome.usage(&PricingModel::from_config(&config.pricing));
    eprintln!(
        "{} model calls, {} input + {} output tokens, estimated cost ${:.4}",
        usage.api_calls, usage.input_tokens, usage.output_tokens, usage.estimated_cost
    );
    Ok(())
}

async fn cmd_components(config: &AppConfig, json: bool) -> Result<()> {
    let catalog = Catalog::from_config(&config.catalog);
    let components: Vec<ComponentInfo> = catalog
        .all_metadata()
        .await
        .into_iter()
        .map(|(name, metadata)| ComponentInfo::new(name, metadata))
        .collect();

    if json {
        let listing = ComponentsResponse { components };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if components.is_empty() {
        eprintln!("No components found in {}", catalog.dir().display());
        return Ok(());
    }
    let width = components.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for component in &components {
        println!(
            "{:<width$}  {}: {}",
            component.name, component.title, component.description
        );
    }
    Ok(())
}

fn cmd_config(config: &AppConfig, path: &Path, show: bool) -> Result<()> {
    config.validate()?;
    if show {
        let toml_str = toml::to_string_pretty(&config.redacted())
            .map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verbosity_overrides_configured_level() {
        assert_eq!(log_filter(0, "warn"), "warn");
        assert_eq!(log_filter(1, "warn"), "debug");
        assert_eq!(log_filter(3, "warn"), "trace");
    }

    #[test]
    fn test_parse_generate_command() {
        let cli = Cli::try_parse_from(["uiforge", "-vv", "generate", "a login screen", "--raw"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("uiforge.toml"));
        match cli.command {
            Commands::Generate { query, raw } => {
                assert_eq!(query, "a login screen");
                assert!(raw);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_version_reports_build() {
        let err = Cli::try_parse_from(["uiforge", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(uiforge_core::build_info::LONG_VERSION));
    }

    #[test]
    fn test_generate_requires_query() {
        assert!(Cli::try_parse_from(["uiforge", "generate"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_config_file_reads_as_none() {
        let config = read_config(Path::new("/nonexistent/uiforge.toml")).await.unwrap();
        assert!(config.is_none());
    }
}
