use crate::cli_handlers::CliCommand;
use crate::core::traits::BookRepository;
use crate::modules::storage::json_library::JsonLibrary;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use crate::utils::APP_NAME;
use anyhow::Result;

pub struct ListCommand;

impl CliCommand for ListCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let library = JsonLibrary::new()?;
        let books = library.books();
        let ui = TerminalRenderer::new();

        if books.is_empty() {
            ui.print_error(&format!("Library is empty. Run '{} add <DIR>' first.", APP_NAME));
            return Ok(());
        }

        ui.print_book_list(&books);

        Ok(())
    }
}
