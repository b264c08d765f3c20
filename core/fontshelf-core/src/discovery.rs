//! Family directory discovery for fontshelf-core

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tracing::warn;
use walkdir::WalkDir;

/// Extensions recognised as font files, compared case-insensitively.
pub const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "woff", "woff2"];

/// One immediate subdirectory of the input root and the font files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyDirectory {
    /// Directory name, used verbatim as the family id and slug.
    pub name: String,
    pub path: PathBuf,
    /// Font files in file-name order.
    pub fonts: Vec<PathBuf>,
}

/// Trait for enumerating family directories from some backing store.
pub trait FamilyDiscovery {
    fn discover(&self) -> Result<Vec<FamilyDirectory>>;
}

/// Filesystem walker: `root/<family>/*.{ttf,otf,woff,woff2}`.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    root: PathBuf,
    follow_symlinks: bool,
}

impl PathDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Font files directly inside `dir`. Entries that cannot be read (a
    /// dangling symlink, a permission error) are logged and left out.
    fn font_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut fonts = Vec::new();
        for entry in shallow_walk(dir, self.follow_symlinks) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(directory = %dir.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_font(entry.path()) {
                fonts.push(entry.path().to_path_buf());
            }
        }
        fonts
    }
}

impl FamilyDiscovery for PathDiscovery {
    fn discover(&self) -> Result<Vec<FamilyDirectory>> {
        if !self.root.is_dir() {
            return Err(anyhow!(
                "root path does not exist or is not a directory: {}",
                self.root.display()
            ));
        }

        let mut families = Vec::new();
        for entry in shallow_walk(&self.root, self.follow_symlinks) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %self.root.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let fonts = self.font_files(entry.path());
            families.push(FamilyDirectory {
                name,
                path: entry.path().to_path_buf(),
                fonts,
            });
        }

        Ok(families)
    }
}

fn shallow_walk(dir: &Path, follow_symlinks: bool) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(follow_symlinks)
        .sort_by_file_name()
        .into_iter()
}

/// True when the extension is one of [`FONT_EXTENSIONS`].
pub fn is_font(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };

    FONT_EXTENSIONS.contains(&ext.as_str())
}
