//! Toolshelf - Main entry point
//!
//! Thin command-line front end over the shelf session.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use toolshelf::cli::{Cli, Commands};
use toolshelf::config::{self, EngineConfig};
use toolshelf::config_store::LoadOutcome;
use toolshelf::preferences::FilePreferences;
use toolshelf::render::TextRenderer;
use toolshelf::session::ShelfSession;
use toolshelf::snapshot;
use toolshelf::validation::{self, DirectoryResolver, HandleResolver, PresenceOnly};

/// Initialize tracing; `RUST_LOG` wins over the `--verbose` default
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,toolshelf={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);
    debug!("CLI arguments parsed");

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Validate { file, assets }) => validate_file(&file, assets.as_deref()),
        command => {
            let preferences = FilePreferences::open(&config.preferences_path)
                .context("Failed to open preference store")?;
            let mut session = ShelfSession::new(config, Box::new(preferences));
            run_command(&mut session, command.unwrap_or(Commands::List))
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let mut config = EngineConfig::load_or_default(&path)
        .with_context(|| format!("Failed to load engine configuration {:?}", path))?
        .with_env();
    if let Some(root) = &cli.root {
        config = config.with_root(root);
    }
    config.validate()?;
    debug!(?config, "engine configuration ready");
    Ok(config)
}

fn run_command(session: &mut ShelfSession, command: Commands) -> Result<()> {
    match command {
        Commands::List => {
            let last = session.store().last_used();
            let discovery = session.discover();
            if discovery.is_empty() {
                println!("No shelves found");
            }
            for (index, id) in discovery.identifiers.iter().enumerate() {
                let marker = if last.as_ref() == Some(id) { "*" } else { " " };
                println!("{} [{}] {}  ({})", marker, index, id.display_name(), id);
            }
        }
        Commands::Show { shelf } => {
            let outcome = open_shelf(session, &shelf)?;
            print_shelf(session, &outcome);
        }
        Commands::Validate { file, assets } => validate_file(&file, assets.as_deref())?,
        Commands::New { name, dir } => {
            let outcome = session
                .create_new(&name, dir.as_deref())
                .with_context(|| format!("Failed to create shelf '{}'", name))?;
            println!("✓ Created {}", outcome.id);
        }
        Commands::AddGroup { shelf, name } => {
            open_shelf(session, &shelf)?;
            let index = session.add_group(name.as_deref())?;
            session.save()?;
            println!("✓ Added group {}", index);
        }
        Commands::MoveGroup { shelf, from, to } => {
            open_shelf(session, &shelf)?;
            let moved = session.move_group_to(from, to)?;
            commit_move(session, moved)?;
        }
        Commands::MoveItem {
            shelf,
            group,
            from,
            to,
        } => {
            open_shelf(session, &shelf)?;
            let moved = session.move_item_to(group, from, to)?;
            commit_move(session, moved)?;
        }
        Commands::Last => match session.restore_last_used() {
            Ok(Some(outcome)) => print_shelf(session, &outcome),
            Ok(None) => println!("No shelf has been opened yet"),
            Err(e) => {
                error!("Last used shelf could not be opened: {}", e);
                return Err(e.into());
            }
        },
    }

    Ok(())
}

fn commit_move(session: &mut ShelfSession, moved: bool) -> Result<()> {
    if moved {
        session.save()?;
        println!("✓ Moved");
    } else {
        println!("Nothing to move");
    }
    Ok(())
}

/// Load a shelf named by display name or discovery index
fn open_shelf(session: &mut ShelfSession, shelf: &str) -> Result<LoadOutcome> {
    let discovery = session.discover();
    let index = discovery
        .find_by_name(shelf)
        .or_else(|| shelf.parse::<usize>().ok().filter(|&i| i < discovery.len()))
        .with_context(|| format!("No shelf named '{}'", shelf))?;
    info!(shelf, index, "opening shelf");
    Ok(session.load_by_index(index)?)
}

fn print_shelf(session: &ShelfSession, outcome: &LoadOutcome) {
    println!("{}", outcome.id.display_name());
    if let Some(collection) = session.collection() {
        let mut renderer = TextRenderer::new();
        renderer.render_collection(collection);
        for line in renderer.lines() {
            println!("{}", line);
        }
    }
    if !outcome.structural.ok {
        println!("✗ {}", outcome.structural.message);
    }
    for problem in &outcome.references.details {
        println!(
            "✗ {} #{}: {}",
            problem.group_name, problem.item_index, problem.message
        );
    }
}

fn validate_file(file: &Path, assets: Option<&Path>) -> Result<()> {
    info!("Validating snapshot file: {:?}", file);
    let collection = snapshot::read_snapshot(file)
        .with_context(|| format!("Failed to load snapshot {:?}", file))?;

    let structural = validation::validate(&collection);
    let resolver: Box<dyn HandleResolver> = match assets {
        Some(dir) => Box::new(DirectoryResolver::new(dir)),
        None => Box::new(PresenceOnly),
    };
    let references = validation::check_references(&collection, resolver.as_ref());

    if structural.ok && references.is_clean() {
        println!("✓ Snapshot is valid: {:?}", file);
        return Ok(());
    }
    if !structural.ok {
        eprintln!("✗ {}", structural.message);
    }
    for problem in &references.details {
        eprintln!(
            "✗ {} #{}: {}",
            problem.group_name, problem.item_index, problem.message
        );
    }
    anyhow::bail!(
        "Snapshot has {} invalid reference(s){}",
        references.invalid_count,
        if structural.ok { "" } else { " and structural problems" }
    )
}
