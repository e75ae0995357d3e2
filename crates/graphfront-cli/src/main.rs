mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graphfront_config::{AppConfig, ConfigLoader};
use graphfront_frontend::{ConversionOptions, Frontend, FrontendManager};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::summary::{ModelSummary, input_variants};

#[derive(Parser)]
#[command(
    name = "graphfront",
    version,
    about = "graphfront - convert models through dynamically loaded frontends"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Configuration directory
    #[arg(long, env = "GRAPHFRONT_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured frontends and extensions
    List,

    /// Report which frontend claims the given inputs
    Probe {
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Convert a model and print a JSON summary
    Convert {
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Frontend to use instead of probing
        #[arg(long)]
        framework: Option<String>,

        #[arg(long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,

        /// Run the frontend's normalize step on the result
        #[arg(long)]
        normalize: bool,

        /// Validate the converted model
        #[arg(long)]
        validate: bool,

        /// Extra extension module to add (repeatable)
        #[arg(long = "extension", value_name = "PATH")]
        extensions: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Full,
    Partial,
    Decode,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new()?,
    };
    config_loader.ensure_dirs()?;
    let config = config_loader.load()?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)))
        .init();
    debug!(config_dir = %config_loader.config_dir().display(), "configuration loaded");

    match cli.command {
        Commands::List => {
            println!("Configured frontends:");
            if config.frontends.is_empty() {
                println!("  (none - add frontends to config.yml)");
            }
            for (name, entry) in &config.frontends {
                let status = if entry.enabled { "enabled" } else { "disabled" };
                println!("  {} [{}] - {}", name, entry.path.display(), status);
                for ext in &entry.extensions {
                    println!("    extension {}", ext.display());
                }
            }
            println!("Global extensions:");
            if config.extensions.is_empty() {
                println!("  (none)");
            }
            for ext in &config.extensions {
                println!("  {}", ext.display());
            }
        }
        Commands::Probe { inputs } => {
            let manager = build_manager(&config, false);
            let frontend = manager.load_by_model(&input_variants(&inputs))?;
            let name = frontend.as_ref().map(Frontend::name);
            println!("{}", serde_json::json!({ "frontend": name }));
        }
        Commands::Convert {
            inputs,
            framework,
            mode,
            normalize,
            validate,
            extensions,
        } => {
            let manager = build_manager(&config, validate);
            let variants = input_variants(&inputs);

            let mut frontend = match &framework {
                Some(name) => manager.load_by_framework(name)?,
                None => manager
                    .load_by_model(&variants)?
                    .with_context(|| format!("no configured frontend recognises {inputs:?}"))?,
            };
            for path in &extensions {
                frontend
                    .add_extension_from_path(path)
                    .with_context(|| format!("loading extension {}", path.display()))?;
            }

            let input = frontend.load(&variants)?;
            let mut model = match mode {
                Mode::Full => frontend.convert(&input)?,
                Mode::Partial => frontend.convert_partially(&input)?,
                Mode::Decode => frontend.decode(&input)?,
            };
            if normalize || config.conversion.normalize {
                frontend.normalize(&mut model)?;
            }
            info!(
                frontend = %frontend.name(),
                model = %model.friendly_name(),
                ?mode,
                "conversion finished"
            );

            let summary = ModelSummary::new(&model, frontend.name());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn build_manager(config: &AppConfig, validate: bool) -> FrontendManager {
    let mut manager = FrontendManager::new();
    for (name, entry) in config.enabled_frontends() {
        manager.register_frontend_with_extensions(name, &entry.path, entry.extensions.clone());
    }
    for path in &config.extensions {
        manager.add_extension_path(path);
    }
    manager.set_options(ConversionOptions {
        validate: validate || config.conversion.validate,
    });
    manager
}
