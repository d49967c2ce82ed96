// ─── Launch Command ───
// Builds the Java invocation for an installed version. Spawning is left to the caller.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::auth::Profile;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::GameLayout;
use crate::core::version::VersionDescriptor;

const G1_FLAGS: &[&str] = &[
    "-XX:+UnlockExperimentalVMOptions",
    "-XX:+UseG1GC",
    "-XX:G1NewSizePercent=20",
    "-XX:G1ReservePercent=20",
    "-XX:MaxGCPauseMillis=50",
    "-XX:G1HeapRegionSize=32M",
];

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `<digits>` followed by `M` or `G`, e.g. `2G` or `4096M`.
fn validate_memory(memory: &str) -> LauncherResult<()> {
    let valid = match memory.char_indices().last() {
        Some((idx, unit)) => {
            let digits = &memory[..idx];
            matches!(unit, 'M' | 'G')
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(LauncherError::InvalidArgument(format!(
            "memory '{}' must look like 2G or 4096M",
            memory
        )))
    }
}

/// Asset index id from the saved descriptor, falling back to the version id.
fn asset_index_id(layout: &GameLayout, version: &str) -> String {
    layout
        .descriptor_path(version)
        .ok()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|raw| VersionDescriptor::parse(&raw).ok())
        .map(|d| d.asset_index.id)
        .unwrap_or_else(|| version.to_string())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn build_launch_command(
    profile: &Profile,
    layout: &GameLayout,
    version: &str,
    memory: &str,
) -> LauncherResult<LaunchCommand> {
    validate_memory(memory)?;

    let jar = layout.client_jar(version)?;
    if !jar.is_file() {
        return Err(LauncherError::NotFound(format!(
            "client binary for {} at {:?}",
            version, jar
        )));
    }

    let mut args = vec![format!("-Xmx{}", memory)];
    args.extend(G1_FLAGS.iter().map(|f| f.to_string()));
    args.push("-jar".into());
    args.push(path_arg(&jar));

    // ── Game arguments ──
    args.extend([
        "--username".into(),
        profile.identity().to_string(),
        "--uuid".into(),
        profile.unique_id().to_string(),
        "--gameDir".into(),
        path_arg(layout.root()),
        "--assetsDir".into(),
        path_arg(&layout.assets_dir()),
        "--assetIndex".into(),
        asset_index_id(layout, version),
    ]);
    if let Some(token) = profile.session_token() {
        args.push("--accessToken".into());
        args.push(token.to_string());
    }

    debug!("Launch command for {} built with {} args", version, args.len());
    Ok(LaunchCommand {
        program: PathBuf::from("java"),
        args,
    })
}
