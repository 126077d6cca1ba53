use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const KODINI_DIR: &str = ".kodini";
pub const CONFIG_FILE: &str = ".kodini/config.yaml";
pub const STORE_FILE: &str = ".kodini/kodini.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn kodini_dir(root: &Path) -> PathBuf {
    root.join(KODINI_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_under_kodini_dir() {
        let root = Path::new("/tmp/proj");
        assert_eq!(kodini_dir(root), PathBuf::from("/tmp/proj/.kodini"));
        assert!(config_path(root).starts_with(kodini_dir(root)));
        assert!(store_path(root).ends_with("kodini.redb"));
    }
}
