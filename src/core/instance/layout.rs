use std::path::{Component, Path, PathBuf};

use crate::core::assets::AssetObject;
use crate::core::error::{LauncherError, LauncherResult};

/// On-disk layout of a game directory.
///
/// - `versions/<id>/<id>.jar`: client binary
/// - `versions/<id>/<id>.json`: descriptor as fetched
/// - `libraries/<path>`: library artifacts
/// - `assets/indexes/<id>.json`, `assets/objects/<xx>/<hash>`
///
/// Ids and library paths come from remote documents, so every accessor that
/// takes one refuses anything that would land outside its directory.
#[derive(Debug, Clone)]
pub struct GameLayout {
    root: PathBuf,
}

impl GameLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn client_jar(&self, version_id: &str) -> LauncherResult<PathBuf> {
        let id = checked_id(version_id)?;
        Ok(self.versions_dir().join(id).join(format!("{}.jar", id)))
    }

    pub fn descriptor_path(&self, version_id: &str) -> LauncherResult<PathBuf> {
        let id = checked_id(version_id)?;
        Ok(self.versions_dir().join(id).join(format!("{}.json", id)))
    }

    pub fn library_path(&self, relative: &str) -> LauncherResult<PathBuf> {
        Ok(self.libraries_dir().join(checked_relative(relative)?))
    }

    pub fn asset_index_path(&self, index_id: &str) -> LauncherResult<PathBuf> {
        let id = checked_id(index_id)?;
        Ok(self.assets_dir().join("indexes").join(format!("{}.json", id)))
    }

    pub fn asset_object_path(&self, object: &AssetObject) -> PathBuf {
        self.assets_dir().join(object.relative_path())
    }
}

/// A relative path made only of plain components.
fn checked_relative(relative: &str) -> LauncherResult<&Path> {
    let path = Path::new(relative);
    let plain = !relative.is_empty()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
        && relative.split(['/', '\\']).all(|segment| segment != "..");
    if plain {
        Ok(path)
    } else {
        Err(LauncherError::Format(format!(
            "refusing path outside the game directory: '{}'",
            relative
        )))
    }
}

/// A single plain path component.
fn checked_id(id: &str) -> LauncherResult<&str> {
    if id.contains(['/', '\\']) {
        return Err(LauncherError::Format(format!("invalid id '{}'", id)));
    }
    checked_relative(id).map_err(|_| LauncherError::Format(format!("invalid id '{}'", id)))?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_game_dir_convention() {
        let layout = GameLayout::new("/games/mc");
        assert_eq!(
            layout.client_jar("1.20.1").unwrap(),
            PathBuf::from("/games/mc/versions/1.20.1/1.20.1.jar")
        );
        assert_eq!(
            layout.asset_index_path("5").unwrap(),
            PathBuf::from("/games/mc/assets/indexes/5.json")
        );
        assert_eq!(
            layout.library_path("org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1.jar").unwrap(),
            PathBuf::from("/games/mc/libraries/org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1.jar")
        );
    }

    #[test]
    fn remote_paths_cannot_escape_the_game_dir() {
        let layout = GameLayout::new("/games/mc");
        for bad in [
            "/etc/cron.d/evil",
            "../../../home/user/.bashrc",
            "org/../../escape.jar",
            "org\\..\\..\\escape.jar",
            "",
        ] {
            assert!(
                matches!(layout.library_path(bad), Err(LauncherError::Format(_))),
                "{}",
                bad
            );
        }
        for bad in ["..", ".", "", "1.20/../../x", "/abs"] {
            assert!(layout.client_jar(bad).is_err(), "{}", bad);
            assert!(layout.descriptor_path(bad).is_err(), "{}", bad);
            assert!(layout.asset_index_path(bad).is_err(), "{}", bad);
        }
        assert!(layout.client_jar("1.20.1-pre1").is_ok());
    }
}
