pub mod layout;

pub use layout::GameLayout;
