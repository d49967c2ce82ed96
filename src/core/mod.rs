// ─── PMCL Core ───
// Backend for a Minecraft launcher: mirrors, downloads, accounts.
//
// Architecture:
//   core/
//     state/       — Launcher config + shared HTTP client
//     mirror/      — Mirror race, cached per session
//     version/     — Manifest + version descriptor + OS rules
//     downloader/  — Streaming transfers, pause gate, SHA-1 checks
//     assets/      — Asset index + object paths
//     install/     — Task queue + download orchestration
//     instance/    — `.minecraft` directory layout
//     auth/        — Official, third-party and offline accounts
//     credentials/ — Encrypted remembered secrets + stored profiles
//     launch/      — Java command construction

pub mod assets;
pub mod auth;
pub mod credentials;
pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod instance;
pub mod launch;
pub mod mirror;
pub mod state;
pub mod version;
