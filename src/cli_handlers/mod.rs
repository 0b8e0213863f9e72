mod add;
mod bookmarks;
mod list;
mod play;
mod settings;

pub use add::AddCommand;
pub use bookmarks::BookmarksCommand;
pub use list::ListCommand;
pub use play::PlayCommand;
pub use settings::{SleepBookmarkCommand, SleepCommand};

use crate::cli::Commands;
use anyhow::Result;

/// Every CLI command implements this trait.
///
/// Commands own their arguments and are consumed on execution, so they run exactly once.
pub trait CliCommand {
    fn execute(self: Box<Self>) -> Result<()>;
}

/// Converts a parsed [`Commands`] variant into a boxed [`CliCommand`] ready to execute.
pub fn from_cli(cmd: Commands) -> Box<dyn CliCommand> {
    match cmd {
        Commands::Add { directory, name } => Box::new(AddCommand { directory, name }),
        Commands::List => Box::new(ListCommand),
        Commands::Play { id, plain } => Box::new(PlayCommand { id, plain }),
        Commands::Bookmarks { id } => Box::new(BookmarksCommand { id }),
        Commands::Sleep { minutes } => Box::new(SleepCommand { minutes }),
        Commands::SleepBookmark { enabled } => Box::new(SleepBookmarkCommand { enabled }),
    }
}
