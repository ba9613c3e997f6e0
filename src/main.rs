mod cli;

use slidecast::config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

use sc_av::{ArtifactStore, ToolRegistry};
use sc_core::events::{EventBus, EventPayload};
use sc_pipeline::engines::Wav2LipAnimator;
use sc_pipeline::{default_engines, JobManager, JobRequest, Pipeline};
use tokio_util::sync::CancellationToken;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting slidecast server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    sc_server::start(config, CancellationToken::new()).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "slidecast=trace,sc_core=debug,sc_av=trace,sc_deck=debug,sc_pipeline=trace,sc_server=debug,tower_http=debug".to_string()
        } else {
            "slidecast=info,sc_av=info,sc_deck=info,sc_pipeline=info,sc_server=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Run {
            deck,
            face,
            voice,
            no_skip,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_deck(
                &deck,
                &face,
                voice,
                no_skip,
                cli.config.as_deref(),
            ))
        }
        Commands::Clean => clean(cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("slidecast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_deck(
    deck: &Path,
    face: &Path,
    voice: Option<String>,
    no_skip: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if no_skip {
        config.processing.skip_existing = false;
    }

    if !deck.exists() {
        anyhow::bail!("Presentation does not exist: {:?}", deck);
    }
    if !face.exists() {
        anyhow::bail!("Face image does not exist: {:?}", face);
    }

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    let store = ArtifactStore::new(&config.storage);
    store.ensure()?;
    let engines = default_engines(tools, &config, &store);
    let pipeline = Pipeline::new(engines, store, Arc::new(config));

    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let jobs = JobManager::new(Some(events));
    let job = jobs.admit()?;

    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.payload {
                EventPayload::JobProgress { progress, step, .. } => {
                    println!("[{progress:>3}%] {step}");
                }
                EventPayload::SlideFailed {
                    stage,
                    slide_number,
                    error,
                    ..
                } => {
                    println!("  ! {stage} failed for slide {slide_number}: {error}");
                }
                _ => {}
            }
        }
    });

    let request = JobRequest {
        deck: deck.to_path_buf(),
        face: face.to_path_buf(),
        voice,
    };

    let result = tokio::select! {
        result = pipeline.run(&job, &request) => result,
        _ = tokio::signal::ctrl_c() => {
            job.cancel.cancel();
            Err(sc_core::Error::Cancelled)
        }
    };
    printer.abort();

    let output = result.context("Processing failed")?;
    println!("\nProcessing complete!");
    println!("Output: {}", output.display());
    Ok(())
}

fn clean(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = ArtifactStore::new(&config.storage);
    let removed = store.clean()?;
    println!("Removed {removed} files under {}", store.root().display());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    let mut all_ok = true;

    for tool in tools.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    let animator = Wav2LipAnimator::new(tools, config.animation.clone());
    if animator.model_available() {
        println!("✓ Wav2Lip - {}", config.animation.wav2lip_dir.display());
    } else {
        println!(
            "✗ Wav2Lip - not found at {} (still-face videos will be used)",
            config.animation.wav2lip_dir.display()
        );
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_summary(&config);
            for warning in config.validate() {
                println!("  warning: {warning}");
            }
        }
        None => {
            println!("No config file specified, using defaults");
            print_summary(&config::Config::default());
        }
    }

    Ok(())
}

fn print_summary(config: &config::Config) {
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Storage root: {}", config.storage.root.display());
    println!(
        "  Synthesis: {} attempts, {}s timeout",
        config.synthesis.max_attempts, config.synthesis.timeout_secs
    );
    println!(
        "  Animation: {} attempts, Wav2Lip at {}",
        config.animation.max_attempts,
        config.animation.wav2lip_dir.display()
    );
    println!(
        "  Canvas: {}x{}",
        config.composition.canvas_width, config.composition.canvas_height
    );
    println!("  Skip existing: {}", config.processing.skip_existing);
}
