use std::{
    fmt,
    io::{self, BufRead},
};

use log::{debug, info, warn};

use super::{CommandExecutor, CommandResolver};
use crate::{
    gesture::{EventRouter, FamilySelection, GestureAction, InputEvent},
    input::parse_line,
};

/// A triggered gesture together with the command bound to it, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAction {
    pub action: GestureAction,
    pub command: Option<String>,
}

impl ResolvedAction {
    /// True when there is a non-blank command to run.
    pub fn is_bound(&self) -> bool {
        self.command
            .as_deref()
            .is_some_and(|command| !command.trim().is_empty())
    }
}

/// `action,<kind>,<fingers>,<direction>,<command>`; pinches have no finger
/// count or direction and print `-` for both.
impl fmt::Display for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let command = self.command.as_deref().unwrap_or("");
        match self.action {
            GestureAction::Swipe { direction, fingers } => {
                write!(f, "action,swipe,{fingers},{direction},{command}")
            }
            GestureAction::Pinch(kind) => write!(f, "action,{kind},-,-,{command}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DaemonStats {
    pub lines: u64,
    pub parse_errors: u64,
    pub actions: u64,
    pub executed: u64,
    pub exec_failures: u64,
}

/// Drives the gesture engine from `libinput debug-events` text.
pub struct Daemon<R, E> {
    router: EventRouter,
    resolver: R,
    executor: E,
    stats: DaemonStats,
}

impl<R: CommandResolver, E: CommandExecutor> Daemon<R, E> {
    pub fn new(resolver: R, executor: E, selection: FamilySelection) -> Self {
        Self {
            router: EventRouter::new(resolver.tracker_settings(), selection),
            resolver,
            executor,
            stats: DaemonStats::default(),
        }
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn stats(&self) -> DaemonStats {
        self.stats
    }

    /// Parses and handles one line. Unparseable lines are logged and skipped.
    pub fn feed_line(&mut self, line: &str) -> Option<ResolvedAction> {
        self.stats.lines += 1;
        self.executor.poll();
        match parse_line(line) {
            Ok(InputEvent::Ignored) => None,
            Ok(event) => self.handle_event(&event),
            Err(err) => {
                self.stats.parse_errors += 1;
                warn!("skipping line {}: {err}", self.stats.lines);
                None
            }
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> Option<ResolvedAction> {
        let action = self.router.dispatch(event)?;
        self.stats.actions += 1;

        let command = match action {
            GestureAction::Swipe { direction, fingers } => {
                self.resolver.resolve_swipe(fingers, direction)
            }
            GestureAction::Pinch(kind) => Some(self.resolver.resolve_pinch(kind)),
        };
        let resolved = ResolvedAction { action, command };

        match resolved.command.as_deref() {
            Some(command) if resolved.is_bound() => {
                info!("{action:?}: executing {command:?}");
                match self.executor.execute(command) {
                    Ok(()) => self.stats.executed += 1,
                    Err(err) => {
                        self.stats.exec_failures += 1;
                        warn!("failed to spawn {command:?}: {err}");
                    }
                }
            }
            _ => debug!("{action:?}: no command bound"),
        }

        Some(resolved)
    }

    /// Consumes `input` to the end, calling `on_action` for every trigger.
    pub fn run<B: BufRead>(
        &mut self,
        input: B,
        mut on_action: impl FnMut(&ResolvedAction),
    ) -> io::Result<DaemonStats> {
        let mut input = input;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            // Device names are raw kernel bytes and need not be UTF-8.
            let line = String::from_utf8_lossy(&buf);
            if let Some(resolved) = self.feed_line(line.trim_end_matches(['\n', '\r'])) {
                on_action(&resolved);
            }
        }
        info!(
            "input closed after {} lines: {} actions, {} executed, {} parse errors",
            self.stats.lines, self.stats.actions, self.stats.executed, self.stats.parse_errors
        );
        Ok(self.stats)
    }
}
