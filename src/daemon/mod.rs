//! Configuration, command execution and the line-driven main loop.

mod command;
mod config;
mod runtime;

pub use command::{CommandExecutor, CommandResolver, DryRunExecutor, ShellExecutor};
pub use config::{
    config_path_from, default_config_path, ConfigError, GestureConfig, SwipeCommands,
    CONFIG_RELATIVE_PATH,
};
pub use runtime::{Daemon, DaemonStats, ResolvedAction};
