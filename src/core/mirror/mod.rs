pub mod selector;

pub use selector::{default_mirrors, MirrorCandidate, MirrorSelector};
