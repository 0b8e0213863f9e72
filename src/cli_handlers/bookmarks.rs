use crate::cli_handlers::CliCommand;
use crate::core::models::BookId;
use crate::core::traits::{BookRepository, BookmarkStore};
use crate::modules::storage::json_library::JsonLibrary;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::{bail, Result};

pub struct BookmarksCommand {
    pub id: u64,
}

impl CliCommand for BookmarksCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let library = JsonLibrary::new()?;
        let id = BookId(self.id);

        let Some(book) = library.book(id) else {
            bail!("No book with id {}", id);
        };

        TerminalRenderer::new().print_bookmarks(&book, &library.bookmarks(id));
        Ok(())
    }
}
