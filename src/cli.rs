use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::APP_NAME;

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(about = "Terminal audiobook player", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a book from a directory of audio files, one file per chapter
    Add {
        /// Directory holding the chapters
        directory: PathBuf,

        /// Book name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List all books with their progress
    List,

    /// Open the play screen for a book
    Play {
        /// Book id as shown by `list`
        id: u64,

        /// Single status line instead of the full screen view
        #[arg(long)]
        plain: bool,
    },

    /// Show the bookmarks of a book
    Bookmarks {
        /// Book id as shown by `list`
        id: u64,
    },

    /// Show or set the sleep timer duration
    Sleep {
        /// Duration in minutes
        #[arg(value_parser = clap::value_parser!(u32).range(1..=600))]
        minutes: Option<u32>,
    },

    /// Set whether arming the sleep timer adds a bookmark (toggles when omitted)
    SleepBookmark {
        enabled: Option<bool>,
    },
}
