// ─── Authentication ───
// Official and third-party Yggdrasil backends plus offline accounts, all
// producing the same `Profile`. `AccountManager` persists them through
// `credentials::CredentialStore`.

pub mod manager;
pub mod offline;
pub mod profile;
pub mod provider;
pub mod session;
pub mod yggdrasil;

pub use manager::AccountManager;
pub use offline::{offline_uuid, OfflineProvider};
pub use profile::{AccountKind, OfflineIdentity, OnlineSession, Profile};
pub use provider::{AuthEndpoints, AuthProvider, Authenticator};
pub use session::{SessionEvent, SessionState};
pub use yggdrasil::YggdrasilProvider;
