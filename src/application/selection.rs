/// Outcome of a selection reported by the chapter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// The user picked a different chapter
    UserChanged(usize),
    /// Selector echoed the index we already hold
    Echo,
    /// No chapter was ever set, the selector is not live yet
    Uninitialized,
}

/// Echo suppression for the chapter selector.
///
/// Programmatic updates go through [`set_programmatic`](Self::set_programmatic)
/// before the widget is told about them, so the selection callback that the
/// widget fires in return matches the current index and is reported as an
/// echo. A user pick stays current until the next programmatic update.
#[derive(Debug, Clone, Default)]
pub struct ChapterSelection {
    last_programmatic: Option<usize>,
    last_user: Option<usize>,
}

impl ChapterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_programmatic(&mut self, index: usize) {
        self.last_programmatic = Some(index);
        self.last_user = None;
    }

    /// Classify a selection callback. A user change is recorded immediately so
    /// the content-changed event it causes is read as an echo.
    pub fn on_selected(&mut self, index: usize) -> SelectionChange {
        match self.current() {
            None => SelectionChange::Uninitialized,
            Some(current) if current == index => SelectionChange::Echo,
            Some(_) => {
                self.last_user = Some(index);
                SelectionChange::UserChanged(index)
            }
        }
    }

    /// Index the selector shows: the user's pick, else the last programmatic one
    pub fn current(&self) -> Option<usize> {
        self.last_user.or(self.last_programmatic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_before_first_set_is_uninitialized() {
        let mut selection = ChapterSelection::new();
        assert_eq!(selection.on_selected(0), SelectionChange::Uninitialized);
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn programmatic_set_then_callback_is_echo() {
        let mut selection = ChapterSelection::new();
        selection.set_programmatic(2);
        assert_eq!(selection.on_selected(2), SelectionChange::Echo);
        assert_eq!(selection.current(), Some(2));
    }

    #[test]
    fn different_index_is_user_change() {
        let mut selection = ChapterSelection::new();
        selection.set_programmatic(0);
        assert_eq!(selection.on_selected(3), SelectionChange::UserChanged(3));
        assert_eq!(selection.current(), Some(3));
    }

    #[test]
    fn programmatic_update_replaces_user_pick() {
        let mut selection = ChapterSelection::new();
        selection.set_programmatic(0);
        selection.on_selected(3);
        selection.set_programmatic(1);

        assert_eq!(selection.current(), Some(1));
        assert_eq!(selection.on_selected(3), SelectionChange::UserChanged(3));
    }

    #[test]
    fn repeated_user_pick_is_echo() {
        let mut selection = ChapterSelection::new();
        selection.set_programmatic(0);
        selection.on_selected(1);
        assert_eq!(selection.on_selected(1), SelectionChange::Echo);
    }
}
