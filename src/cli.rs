use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toolshelf - manage shortcut shelves from the command line
#[derive(Parser)]
#[command(name = "toolshelf")]
#[command(about = "Inspect and edit toolshelf snapshots")]
#[command(version)]
pub struct Cli {
    /// Shelf root directory; searched first and used for new shelves
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Engine configuration file (defaults to ~/.toolshelf/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List discovered shelves
    List,
    /// Print a shelf's groups and items
    Show {
        /// Shelf display name or discovery index
        shelf: String,
    },
    /// Check a snapshot file for structural and reference problems
    Validate {
        /// Path to the snapshot file
        file: PathBuf,
        /// Project directory asset handles are resolved against
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Create a new shelf with one empty group
    New {
        /// Name of the shelf
        name: String,
        /// Directory to create it in
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Append a group to a shelf
    AddGroup {
        /// Shelf display name or discovery index
        shelf: String,
        /// Group name
        name: Option<String>,
    },
    /// Move a group to a new position
    MoveGroup {
        /// Shelf display name or discovery index
        shelf: String,
        /// Index of the group to move
        from: usize,
        /// Insertion index, counted before the group is removed
        to: usize,
    },
    /// Move an item within its group
    MoveItem {
        /// Shelf display name or discovery index
        shelf: String,
        /// Group index
        group: usize,
        /// Index of the item to move
        from: usize,
        /// Insertion index, counted before the item is removed
        to: usize,
    },
    /// Show the last used shelf
    Last,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
