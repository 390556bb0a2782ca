//! Module to pick media files from the local file system

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::media::{MediaFileRef, MediaType};

pub fn is_media_file(path: &Path, media_type: MediaType) -> bool {
    path.to_str()
        .and_then(MediaType::of_name)
        .map(|found| found == media_type)
        .unwrap_or(false)
}

/// Recursively finds files of the given media type, sorted by path.
///
/// Sorting gives albums a predictable track order (`01 - Intro.mp3`, `02 - ...`).
pub fn scan_dir(
    root: &Path,
    media_type: MediaType,
    follow_symlinks: bool,
) -> Vec<PathBuf> {
    let root_str = root.to_string_lossy();

    let mut paths = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("error while scanning dir {root_str}, skipping an entry: {err:?}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| is_media_file(p, media_type))
        .collect::<Vec<PathBuf>>();

    paths.sort();
    paths
}

/// Best-effort check that a path points to a readable, non-empty file of the
/// expected media type. Contents are not decoded.
pub fn check_media_path(path: &Path, media_type: MediaType) -> anyhow::Result<()> {
    let meta = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.to_string_lossy()))?;

    if !meta.is_file() {
        anyhow::bail!("{} is not a file", path.to_string_lossy());
    }

    if !is_media_file(path, media_type) {
        anyhow::bail!("{} is not a {media_type} file", path.to_string_lossy());
    }

    if meta.len() == 0 {
        anyhow::bail!("{} is empty", path.to_string_lossy());
    }

    Ok(())
}

/// Selects a file from disk for a slot that expects `media_type`.
pub fn select_file(path: &Path, media_type: MediaType) -> anyhow::Result<MediaFileRef> {
    check_media_path(path, media_type)?;
    Ok(MediaFileRef::from_path(path)?)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn scan_finds_audio_files_in_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        let nested = root.join("disc2");
        std::fs::create_dir_all(&nested).unwrap();

        let song2 = root.join("02 - second.flac");
        let song1 = root.join("01 - first.mp3");
        let song3 = nested.join("03 - third.wav");
        let cover = root.join("cover.jpg");
        let notes = root.join("notes.txt");

        for path in [&song2, &song1, &song3, &cover, &notes] {
            std::fs::write(path, b"bytes").unwrap();
        }

        let files = scan_dir(root, MediaType::Audio, false);

        assert_eq!(files, vec![song1, song2, song3]);
    }

    #[test]
    fn scan_for_images() {
        let tmp = TempDir::new().unwrap();
        let cover = tmp.path().join("cover.png");
        std::fs::write(&cover, b"png").unwrap();
        std::fs::write(tmp.path().join("song.mp3"), b"mp3").unwrap();

        assert_eq!(scan_dir(tmp.path(), MediaType::Image, false), vec![cover]);
    }

    #[test]
    fn check_rejects_wrong_type_and_empty_files() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("cover.png");
        let empty = tmp.path().join("empty.mp3");
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&empty, b"").unwrap();

        assert!(check_media_path(&image, MediaType::Image).is_ok());
        assert!(check_media_path(&image, MediaType::Audio).is_err());
        assert!(check_media_path(&empty, MediaType::Audio).is_err());
        assert!(check_media_path(tmp.path(), MediaType::Audio).is_err());
        assert!(check_media_path(&tmp.path().join("missing.mp3"), MediaType::Audio).is_err());
    }

    #[test]
    fn select_file_is_ready() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let song = tmp.path().join("demo.mp3");
        std::fs::write(&song, b"demo")?;

        let file = select_file(&song, MediaType::Audio)?;

        assert!(file.is_ready());
        assert_eq!(file.display_name, "demo.mp3");
        Ok(())
    }
}
