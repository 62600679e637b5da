//! Launchers: hand a descriptor to whatever opens it.

use super::LaunchDescriptor;
use crate::config::HandoffConfig;
use crate::error::ExplorerError;
use parking_lot::Mutex;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

/// Opens a launch descriptor in an external player
pub trait Launcher: Send + Sync {
    fn launch(&self, descriptor: &LaunchDescriptor) -> Result<(), ExplorerError>;
}

/// Records the launch in the log without opening anything
#[derive(Debug, Default)]
pub struct DryRunLauncher;

impl Launcher for DryRunLauncher {
    fn launch(&self, descriptor: &LaunchDescriptor) -> Result<(), ExplorerError> {
        info!(
            app = %descriptor.target_application_id,
            title = %descriptor.title,
            strategy = ?descriptor.strategy,
            "Launch described (dry run)"
        );
        Ok(())
    }
}

/// Spawns a local player program.
///
/// Arguments may use `{locator}`, `{title}`, `{mime}` and `{header}` placeholders; when no
/// argument mentions `{locator}` the locator is appended last.
///
/// Spawned players are kept and reaped on later launches so finished ones do not linger as
/// zombies for the life of a shell session.
#[derive(Debug)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    children: Mutex<Vec<Child>>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            children: Mutex::new(Vec::new()),
        }
    }

    /// Collect exited players. Returns how many are still running.
    pub fn reap(&self) -> usize {
        let mut children = self.children.lock();
        children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "Player exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(pid = child.id(), error = %e, "Failed to poll player");
                false
            }
        });
        children.len()
    }

    /// Process launcher when a program is configured, dry run otherwise.
    pub fn from_config(config: &HandoffConfig) -> Box<dyn Launcher> {
        match &config.launcher_program {
            Some(program) => Box::new(Self::new(program.clone(), config.launcher_args.clone())),
            None => Box::new(DryRunLauncher),
        }
    }

    pub fn command_args(&self, descriptor: &LaunchDescriptor) -> Vec<String> {
        let header = descriptor
            .auth_header
            .as_ref()
            .map(|h| format!("{}: {}", h.name, h.value))
            .unwrap_or_default();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{locator}", &descriptor.payload_locator)
                    .replace("{title}", &descriptor.title)
                    .replace("{mime}", &descriptor.mime_type)
                    .replace("{header}", &header)
            })
            .collect();
        if !self.args.iter().any(|arg| arg.contains("{locator}")) {
            args.push(descriptor.payload_locator.clone());
        }
        args
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, descriptor: &LaunchDescriptor) -> Result<(), ExplorerError> {
        self.reap();
        let args = self.command_args(descriptor);
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                warn!(program = %self.program, error = %e, "Player failed to launch");
                ExplorerError::LaunchUnavailable(format!("{}: {}", self.program, e))
            })?;
        info!(program = %self.program, pid = child.id(), title = %descriptor.title, "Player launched");
        self.children.lock().push(child);
        Ok(())
    }
}
