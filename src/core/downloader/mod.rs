pub mod gate;
pub mod integrity;
pub mod transfer;

pub use gate::PauseGate;
pub use integrity::{ensure_file_hash, file_sha1, sha1_hex, verify_file};
pub use transfer::{ProgressFn, TransferEngine, TransferProgress, CHUNK_SIZE};
