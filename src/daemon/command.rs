use std::{
    io,
    process::{Child, Command, Stdio},
};

use log::{debug, info, warn};

use crate::gesture::{Direction, PinchKind, PinchSettings, SwipeSettings, TrackerSettings};

/// Maps decided gestures to shell commands and supplies tracker policy.
pub trait CommandResolver {
    /// `None` when the gesture is not bindable: fewer than two fingers, the
    /// center direction, or a finger count without a command table.
    fn resolve_swipe(&self, fingers: u32, direction: Direction) -> Option<String>;

    fn resolve_pinch(&self, kind: PinchKind) -> String;

    fn swipe_threshold(&self) -> f64;
    fn swipe_one_shot(&self) -> bool;
    fn swipe_trigger_on_release(&self) -> bool;
    fn pinch_threshold(&self) -> f64;
    fn pinch_one_shot(&self) -> bool;

    fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            swipe: SwipeSettings {
                threshold: self.swipe_threshold(),
                one_shot: self.swipe_one_shot(),
                trigger_on_release: self.swipe_trigger_on_release(),
            },
            pinch: PinchSettings {
                threshold: self.pinch_threshold(),
                one_shot: self.pinch_one_shot(),
            },
        }
    }
}

/// Runs resolved commands without waiting for them.
pub trait CommandExecutor {
    /// Blank commands are a no-op.
    fn execute(&mut self, command: &str) -> io::Result<()>;

    /// Housekeeping between input lines.
    fn poll(&mut self) {}
}

/// Spawns each command through `sh -c`.
#[derive(Debug, Default)]
pub struct ShellExecutor {
    children: Vec<Child>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Children spawned and not yet seen exiting.
    pub fn running(&self) -> usize {
        self.children.len()
    }

    /// Collects exited children so they do not linger as zombies.
    pub fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    debug!("command pid {} exited with {status}", child.id());
                }
                false
            }
            Ok(None) => true,
            Err(err) => {
                warn!("failed to poll command pid {}: {err}", child.id());
                false
            }
        });
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&mut self, command: &str) -> io::Result<()> {
        self.reap();
        if command.trim().is_empty() {
            return Ok(());
        }

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .spawn()?;
        debug!("spawned pid {} for {command:?}", child.id());
        self.children.push(child);
        Ok(())
    }

    fn poll(&mut self) {
        if !self.children.is_empty() {
            self.reap();
        }
    }
}

/// Logs and records commands instead of running them.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    executed: Vec<String>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl CommandExecutor for DryRunExecutor {
    fn execute(&mut self, command: &str) -> io::Result<()> {
        if command.trim().is_empty() {
            return Ok(());
        }
        info!("dry-run: would execute {command:?}");
        self.executed.push(command.to_owned());
        Ok(())
    }
}
