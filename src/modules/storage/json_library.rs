use crate::core::models::{Book, BookId, Bookmark, Chapter};
use crate::core::traits::{BookRepository, BookmarkStore};
use crate::utils::app_config_dir;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// On-disk layout of `library.json`
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct LibraryData {
    #[serde(default)]
    pub books: Vec<Book>,

    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

/// Book and bookmark store backed by a pretty-printed JSON file.
///
/// The whole file is kept in memory and rewritten on every change.
pub struct JsonLibrary {
    file_path: PathBuf,
    data: Mutex<LibraryData>,
}

impl JsonLibrary {
    pub fn new() -> Result<Self> {
        Self::open(app_config_dir()?.join("library.json"))
    }

    pub fn open(file_path: PathBuf) -> Result<Self> {
        let data = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read {}", file_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Corrupt library file {}", file_path.display()))?
        } else {
            LibraryData::default()
        };

        Ok(Self {
            file_path,
            data: Mutex::new(data),
        })
    }

    /// Store a new book under the next free id
    pub fn add_book(
        &self,
        name: String,
        chapters: Vec<Chapter>,
        cover_path: Option<PathBuf>,
    ) -> Result<Book> {
        let mut data = self.lock();
        let id = data.books.iter().map(|b| b.id.0).max().map_or(1, |max| max + 1);

        let book = Book {
            id: BookId(id),
            name,
            chapters,
            current_chapter: 0,
            position_ms: 0,
            cover_path,
            use_cover_replacement: false,
        };
        data.books.push(book.clone());
        self.flush(&data)?;

        Ok(book)
    }

    fn flush(&self, data: &LibraryData) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        fs::write(&self.file_path, content)
            .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, LibraryData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookRepository for JsonLibrary {
    fn book(&self, id: BookId) -> Option<Book> {
        self.lock().books.iter().find(|b| b.id == id).cloned()
    }

    fn books(&self) -> Vec<Book> {
        let mut books = self.lock().books.clone();
        books.sort_by_key(|b| b.id);
        books
    }

    fn save_book(&self, book: &Book) -> Result<()> {
        let mut data = self.lock();
        match data.books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => *existing = book.clone(),
            None => data.books.push(book.clone()),
        }
        self.flush(&data)
    }
}

impl BookmarkStore for JsonLibrary {
    fn add_bookmark(&self, bookmark: Bookmark) -> Result<()> {
        let mut data = self.lock();
        data.bookmarks.push(bookmark);
        self.flush(&data)
    }

    fn bookmarks(&self, id: BookId) -> Vec<Bookmark> {
        self.lock()
            .bookmarks
            .iter()
            .filter(|b| b.book_id == id)
            .cloned()
            .collect()
    }
}
