//! Exchange directory discovery
//!
//! The runtime creates its exchange directory wherever the game server keeps
//! its Lua cache, which depends on how the server was installed. The resolver
//! builds the list of places it could be, best first, and picks the one that
//! looks most alive. It only ever inspects the filesystem.

use crate::config::ServerIdentity;
use panel_bridge_protocol::ExchangeDir;
use panel_bridge_protocol::exchange::BRIDGE_SUBDIR;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of dedicated-server install directories
const SERVER_FILES_PREFIX: &str = "Server_files";

/// Where a candidate path came from, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathSource {
    /// Saved by an earlier successful discovery
    Persisted,
    CacheDir,
    /// A `Server_files*` directory next to the install path
    SiblingInstall,
    InstallDir,
}

/// How far the runtime got in a candidate directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathState {
    /// `status.json` present
    Active,
    /// `.init` present, no status yet
    Initialized,
    /// Directory present
    Exists,
    /// Nothing there yet; the runtime creates it on first run
    NotCreated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub source: PathSource,
    pub state: PathState,
}

impl ResolvedPath {
    pub fn is_active(&self) -> bool {
        self.state == PathState::Active
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    server: ServerIdentity,
}

impl PathResolver {
    pub fn new(server: ServerIdentity) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &ServerIdentity {
        &self.server
    }

    /// Candidate directories, highest priority first
    ///
    /// A persisted path is only a candidate while the runtime is writing
    /// status there.
    pub fn candidates(&self, persisted: Option<&Path>) -> Vec<(PathBuf, PathSource)> {
        let suffix = Path::new(BRIDGE_SUBDIR).join(&self.server.name);
        let mut candidates = Vec::new();

        if let Some(path) = persisted {
            if ExchangeDir::new(path).is_active() {
                candidates.push((path.to_path_buf(), PathSource::Persisted));
            } else {
                debug!("Ignoring persisted bridge path {}: not active", path.display());
            }
        }

        candidates.push((self.server.cache_dir.join(&suffix), PathSource::CacheDir));

        if let Some(install) = &self.server.install_path {
            for sibling in sibling_installs(install) {
                candidates.push((sibling.join(&suffix), PathSource::SiblingInstall));
            }
            candidates.push((install.join(&suffix), PathSource::InstallDir));
        }

        candidates.dedup_by(|a, b| a.0 == b.0);
        candidates
    }

    /// Pick the most alive candidate
    ///
    /// Every candidate is checked for `status.json` before any is checked for
    /// `.init`, and so on; within one state the higher-priority candidate wins.
    pub fn resolve(&self, persisted: Option<&Path>) -> ResolvedPath {
        let candidates = self.candidates(persisted);
        let checks: [(PathState, fn(&ExchangeDir) -> bool); 3] = [
            (PathState::Active, ExchangeDir::is_active),
            (PathState::Initialized, ExchangeDir::is_initialized),
            (PathState::Exists, ExchangeDir::exists),
        ];

        for (state, check) in checks {
            for (path, source) in &candidates {
                if check(&ExchangeDir::new(path)) {
                    debug!("Resolved bridge path {} ({:?}, {:?})", path.display(), source, state);
                    return ResolvedPath {
                        path: path.clone(),
                        source: *source,
                        state,
                    };
                }
            }
        }

        // The cache dir candidate is always present
        let (path, source) = candidates
            .into_iter()
            .next()
            .unwrap_or_else(|| (self.server.cache_dir.clone(), PathSource::CacheDir));
        ResolvedPath {
            path,
            source,
            state: PathState::NotCreated,
        }
    }
}

/// `Server_files*` directories beside the install path, sorted by name
fn sibling_installs(install: &Path) -> Vec<PathBuf> {
    let Some(parent) = install.parent() else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut siblings: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.as_path() != install)
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(SERVER_FILES_PREFIX))
        })
        .collect();
    siblings.sort();
    siblings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Layout {
        tmp: TempDir,
    }

    impl Layout {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join("home/Zomboid")).unwrap();
            fs::create_dir_all(tmp.path().join("opt/pz/Server_files")).unwrap();
            fs::create_dir_all(tmp.path().join("opt/pz/Server_files_beta")).unwrap();
            Self { tmp }
        }

        fn root(&self) -> &Path {
            self.tmp.path()
        }

        fn cache(&self) -> PathBuf {
            self.root().join("home/Zomboid/Lua/panelbridge/servertest")
        }

        fn sibling(&self) -> PathBuf {
            self.root().join("opt/pz/Server_files_beta/Lua/panelbridge/servertest")
        }

        fn install(&self) -> PathBuf {
            self.root().join("opt/pz/Server_files/Lua/panelbridge/servertest")
        }

        fn resolver(&self) -> PathResolver {
            PathResolver::new(
                ServerIdentity::new("servertest", self.root().join("home/Zomboid"))
                    .with_install_path(self.root().join("opt/pz/Server_files")),
            )
        }
    }

    fn make(path: &Path, files: &[&str]) {
        fs::create_dir_all(path).unwrap();
        for file in files {
            fs::write(path.join(file), b"{}").unwrap();
        }
    }

    #[test]
    fn test_candidate_order() {
        let layout = Layout::new();
        assert_eq!(
            layout.resolver().candidates(None),
            vec![
                (layout.cache(), PathSource::CacheDir),
                (layout.sibling(), PathSource::SiblingInstall),
                (layout.install(), PathSource::InstallDir),
            ]
        );
    }

    #[test]
    fn test_nothing_created_yet() {
        let layout = Layout::new();
        let resolved = layout.resolver().resolve(None);
        assert_eq!(resolved.path, layout.cache());
        assert_eq!(resolved.source, PathSource::CacheDir);
        assert_eq!(resolved.state, PathState::NotCreated);
        assert!(!layout.cache().exists());
    }

    #[test]
    fn test_initialized_beats_existing_higher_priority() {
        let layout = Layout::new();
        make(&layout.cache(), &[]);
        make(&layout.install(), &[".init"]);

        let resolved = layout.resolver().resolve(None);
        assert_eq!(resolved.path, layout.install());
        assert_eq!(resolved.source, PathSource::InstallDir);
        assert_eq!(resolved.state, PathState::Initialized);
    }

    #[test]
    fn test_active_sibling() {
        let layout = Layout::new();
        make(&layout.cache(), &[".init"]);
        make(&layout.sibling(), &[".init", "status.json"]);

        let resolved = layout.resolver().resolve(None);
        assert_eq!(resolved.source, PathSource::SiblingInstall);
        assert!(resolved.is_active());
    }

    #[test]
    fn test_persisted_only_when_active() {
        let layout = Layout::new();
        let saved = layout.root().join("custom/bridge");
        make(&saved, &[".init"]);
        make(&layout.cache(), &[]);

        let resolved = layout.resolver().resolve(Some(&saved));
        assert_eq!(resolved.source, PathSource::CacheDir);
        assert_eq!(resolved.state, PathState::Exists);

        make(&saved, &["status.json"]);
        let resolved = layout.resolver().resolve(Some(&saved));
        assert_eq!(resolved.source, PathSource::Persisted);
        assert_eq!(resolved.path, saved);
    }

    #[test]
    fn test_without_install_path() {
        let tmp = TempDir::new().unwrap();
        let resolver = PathResolver::new(ServerIdentity::new("pvp", tmp.path()));
        assert_eq!(resolver.candidates(None).len(), 1);
        let resolved = resolver.resolve(None);
        assert!(resolved.path.ends_with("Lua/panelbridge/pvp"));
    }

    #[test]
    fn test_resolved_path_wire_format() {
        let resolved = ResolvedPath {
            path: PathBuf::from("/x"),
            source: PathSource::SiblingInstall,
            state: PathState::NotCreated,
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["source"], "siblingInstall");
        assert_eq!(json["state"], "notCreated");
    }
}
