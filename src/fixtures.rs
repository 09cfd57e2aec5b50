#[cfg(test)]
pub mod test {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config_file::ConfigFile;
    use crate::file::RootCandidates;

    /// Candidates pointing only at a fresh temp "home". Keep the `TempDir`
    /// alive for as long as the registry is in use.
    pub fn candidates_in() -> (TempDir, RootCandidates) {
        let home = TempDir::new().unwrap();
        let roots = RootCandidates {
            user_home: Some(home.path().to_path_buf()),
            ..Default::default()
        };
        (home, roots)
    }

    /// Empty candidates with a single field filled in by `set`.
    pub fn only(set: impl FnOnce(&mut RootCandidates)) -> RootCandidates {
        let mut roots = RootCandidates::default();
        set(&mut roots);
        roots
    }

    /// A registry opened inside a temp home, autosave off so tests control
    /// every write.
    pub fn open_registry(name: &str) -> (TempDir, ConfigFile) {
        let (home, roots) = candidates_in();
        let file = ConfigFile::builder()
            .name(name)
            .roots(roots)
            .autosave(false)
            .open()
            .unwrap();
        (home, file)
    }

    pub fn read(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn open_registry_creates_file() {
        let (_home, file) = open_registry("fixture");
        assert!(file.path().unwrap().exists());
    }
}
