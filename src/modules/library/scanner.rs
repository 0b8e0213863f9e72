use crate::core::models::Chapter;
use crate::utils::{COVER_FILE_NAMES, SUPPORTED_EXTENSIONS};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One chapter per audio file below `root`, ordered by path
pub fn scan_chapters(root: &Path) -> Result<Vec<Chapter>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_audio_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    Ok(paths
        .iter()
        .enumerate()
        .map(|(index, path)| Chapter::from_path(index, path))
        .collect())
}

/// First well-known cover image directly inside `root`
pub fn find_cover(root: &Path) -> Option<PathBuf> {
    COVER_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Book name derived from its directory
pub fn book_name(root: &Path) -> String {
    root.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn book_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shelf-player-scan-{}-{}", name, std::process::id()));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(dir.join("disc2")).unwrap();
        dir
    }

    #[test]
    fn audio_files_become_ordered_chapters() {
        let dir = book_dir("ordered");
        fs::write(dir.join("02 Middle.mp3"), b"").unwrap();
        fs::write(dir.join("01 Start.MP3"), b"").unwrap();
        fs::write(dir.join("disc2").join("03 End.ogg"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();

        let chapters = scan_chapters(&dir).unwrap();
        let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["01 Start", "02 Middle", "03 End"]);
        assert_eq!(chapters[2].index, 2);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn cover_and_name_come_from_directory() {
        let dir = book_dir("cover");
        assert_eq!(find_cover(&dir), None);

        fs::write(dir.join("folder.jpg"), b"").unwrap();
        assert_eq!(find_cover(&dir), Some(dir.join("folder.jpg")));
        assert!(book_name(&dir).starts_with("shelf-player-scan-cover"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_root_is_rejected() {
        assert!(scan_chapters(Path::new("/does/not/exist")).is_err());
    }
}
