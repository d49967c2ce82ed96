pub mod command;

pub use command::{build_launch_command, LaunchCommand};
