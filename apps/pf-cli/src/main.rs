use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use pf_app::{AppError, AppResult, BuildRequest, LayoutConfig, RouteRequest, build_service};
use pf_cache::{ArtifactStore, to_text};
use pf_components::Session;
use pf_routing::RoutingStrategy;

#[derive(Parser)]
#[command(name = "pf")]
#[command(about = "PhotonFlow CLI - cached photonic layout generation", long_about = None)]
struct Cli {
    /// Layout config file (defaults to ./photonflow.yml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered generators
    Generators {
        /// Also print each generator's default settings
        #[arg(long)]
        defaults: bool,
    },
    /// Build a component, optionally padding, tapering and routing it
    Build {
        /// Generator id (see `pf generators`)
        generator: String,
        /// Generator setting as key=value (repeatable)
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        settings: Vec<String>,
        /// Taper every optical port
        #[arg(long)]
        tapers: bool,
        /// Wrap the result in a padding keep-out
        #[arg(long)]
        pad: bool,
        /// Route all ports to an array of this many slots
        #[arg(long)]
        route_count: Option<usize>,
        /// Array pitch in um
        #[arg(long, requires = "route_count")]
        route_pitch: Option<f64>,
        /// Array origin as x,y in um
        #[arg(long, value_parser = parse_point, requires = "route_count")]
        route_origin: Option<(f64, f64)>,
        /// Direction the array slots face, in degrees
        #[arg(long, requires = "route_count")]
        route_orientation: Option<f64>,
        /// Routing strategy: direct, staggered or looped (or 0, 1, 2)
        #[arg(long, requires = "route_count")]
        strategy: Option<RoutingStrategy>,
        /// Save the result and its dependencies under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the resulting component's settings
        #[arg(long = "settings")]
        show_settings: bool,
    },
    /// List artifacts saved in a store directory
    Artifacts {
        /// Store directory (defaults to the config's store_dir)
        dir: Option<PathBuf>,
    },
    /// Show a saved artifact's metadata
    Show {
        /// Component name
        name: String,
        /// Store directory (defaults to the config's store_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{raw}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y: {e}"))?;
    Ok((x, y))
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = pf_app::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generators { defaults } => cmd_generators(defaults),
        Commands::Build {
            generator,
            settings,
            tapers,
            pad,
            route_count,
            route_pitch,
            route_origin,
            route_orientation,
            strategy,
            out,
            show_settings,
        } => {
            let route = route_count.map(|count| RouteRequest {
                count: Some(count),
                pitch: route_pitch,
                origin: route_origin,
                orientation: route_orientation,
                strategy,
            });
            let request = BuildRequest {
                tapers,
                pad,
                route,
                out,
                ..BuildRequest::new(generator, build_service::parse_settings(settings.as_slice())?)
            };
            cmd_build(&request, &config, show_settings)
        }
        Commands::Artifacts { dir } => cmd_artifacts(dir.as_deref().unwrap_or(&config.store_dir)),
        Commands::Show { name, dir } => {
            cmd_show(&name, dir.as_deref().unwrap_or(&config.store_dir))
        }
    }
}

fn cmd_generators(defaults: bool) -> AppResult<()> {
    let session = Session::in_memory();
    println!("Generators:");
    for id in build_service::list_generators(&session) {
        println!("  {}", id);
        if defaults {
            for (key, value) in build_service::generator_defaults(&session, &id)? {
                println!("      {} = {}", key, value);
            }
        }
    }
    Ok(())
}

fn cmd_build(
    request: &BuildRequest,
    config: &LayoutConfig,
    show_settings: bool,
) -> AppResult<()> {
    let session = Session::in_memory();
    let started = Instant::now();
    let response = build_service::build(&session, request, config)?;
    let elapsed = started.elapsed().as_secs_f64();

    let c = &response.component;
    println!("✓ Built {}", c.name());
    if let Some(fp) = c.fingerprint() {
        println!("  Fingerprint: {}", fp);
    }
    println!("  Ports:");
    for p in c.ports() {
        println!(
            "    {:<8} ({:.3}, {:.3})  {:>6.1} deg  width {:.3}  {}",
            p.name, p.center.x, p.center.y, p.orientation, p.width, p.kind
        );
    }
    println!("  References: {}", c.references().len());
    println!(
        "  Cache: {} built, {} hits ({:.3}s)",
        response.stats.builds, response.stats.hits, elapsed
    );

    if let Some(out) = &request.out {
        println!(
            "✓ Saved {} artifacts to {}",
            response.saved.len(),
            out.display()
        );
    }

    if show_settings {
        println!("\nSettings:");
        print!("{}", to_text(c.get_settings())?);
    }
    Ok(())
}

fn cmd_artifacts(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        return Err(AppError::InvalidInput(format!(
            "store directory not found: {}",
            dir.display()
        )));
    }
    let store = ArtifactStore::new(dir.to_path_buf())?;
    let names = store.list()?;

    if names.is_empty() {
        println!("No artifacts in {}", dir.display());
    } else {
        println!("Artifacts in {}:", dir.display());
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}

fn cmd_show(name: &str, dir: &Path) -> AppResult<()> {
    let store = ArtifactStore::new(dir.to_path_buf())?;
    let metadata = store.load_metadata(name)?;
    print!("{}", to_text(&metadata)?);

    if let Ok(netlist) = store.load_netlist(name) {
        println!("\nNetlist:");
        print!("{}", to_text(&netlist)?);
    }
    Ok(())
}
