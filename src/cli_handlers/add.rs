use crate::cli_handlers::CliCommand;
use crate::modules::library::scanner;
use crate::modules::storage::json_library::JsonLibrary;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::{bail, Result};
use log::info;
use std::path::PathBuf;

pub struct AddCommand {
    pub directory: PathBuf,
    pub name: Option<String>,
}

impl CliCommand for AddCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let ui = TerminalRenderer::new();
        ui.print_message(&format!("Scanning {}...", self.directory.display()));

        let chapters = scanner::scan_chapters(&self.directory)?;
        if chapters.is_empty() {
            bail!("No audio files found in {}", self.directory.display());
        }

        let name = self.name.unwrap_or_else(|| scanner::book_name(&self.directory));
        let cover = scanner::find_cover(&self.directory);
        info!("Adding {} with {} chapters, cover {:?}", name, chapters.len(), cover);

        let library = JsonLibrary::new()?;
        let book = library.add_book(name, chapters, cover)?;

        ui.print_message(&format!("✓ Added {}", book));
        Ok(())
    }
}
