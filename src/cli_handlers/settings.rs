use crate::cli_handlers::CliCommand;
use crate::modules::storage::config::PlayerConfig;
use crate::modules::ui::terminal::renderer::TerminalRenderer;
use anyhow::Result;

// ── Sleep timer duration ──────────────────────────────────────────────────────
pub struct SleepCommand {
    pub minutes: Option<u32>,
}

impl CliCommand for SleepCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let mut config = PlayerConfig::load()?;
        let ui = TerminalRenderer::new();

        match self.minutes {
            Some(minutes) => {
                config.sleep_timer_minutes = minutes;
                config.save()?;
                ui.print_message(&format!("Sleep timer set to: {} min", minutes));
            }
            None => {
                ui.print_message(&format!("Sleep timer: {} min", config.sleep_timer_minutes));
            }
        }

        Ok(())
    }
}

// ── Bookmark on sleep timer ───────────────────────────────────────────────────
pub struct SleepBookmarkCommand {
    pub enabled: Option<bool>,
}

impl CliCommand for SleepBookmarkCommand {
    fn execute(self: Box<Self>) -> Result<()> {
        let mut config = PlayerConfig::load()?;
        let ui = TerminalRenderer::new();

        let enabled = self.enabled.unwrap_or(!config.bookmark_on_sleep_timer);
        config.bookmark_on_sleep_timer = enabled;
        config.save()?;

        ui.print_message(&format!("Bookmark on sleep timer set to: {}", enabled));
        Ok(())
    }
}
