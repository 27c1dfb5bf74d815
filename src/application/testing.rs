//! Test doubles for the application layer

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::ports::{
    CommandOutput, RemoteCommand, RemoteShell, ShellConnector, ShellError, ShellResult,
};

#[derive(Default)]
struct Script {
    /// substring → stdout
    responses: Vec<(String, String)>,
    /// substring → exit status
    failures: Vec<(String, i32)>,
    /// substring → command times out
    timeouts: Vec<String>,
}

/// Records rendered command lines and answers from a script.
///
/// Unmatched commands succeed with empty output.
#[derive(Clone)]
pub struct ScriptedShell {
    target: String,
    script: Arc<Script>,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedShell {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            script: Arc::new(Script::default()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("script is configured before use")
    }

    pub fn respond(mut self, needle: &str, stdout: &str) -> Self {
        self.script_mut()
            .responses
            .push((needle.to_string(), stdout.to_string()));
        self
    }

    pub fn fail_when(mut self, needle: &str, status: i32) -> Self {
        self.script_mut().failures.push((needle.to_string(), status));
        self
    }

    pub fn time_out_when(mut self, needle: &str) -> Self {
        self.script_mut().timeouts.push(needle.to_string());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl RemoteShell for ScriptedShell {
    fn target(&self) -> &str {
        &self.target
    }

    fn run(&self, command: &RemoteCommand) -> ShellResult<CommandOutput> {
        let line = command.render();
        self.log.lock().unwrap().push(line.clone());

        if self.script.timeouts.iter().any(|n| line.contains(n.as_str())) {
            return Err(ShellError::Timeout {
                command: line,
                after: std::time::Duration::from_secs(1),
            });
        }
        if let Some((_, status)) = self
            .script
            .failures
            .iter()
            .find(|(n, _)| line.contains(n.as_str()))
        {
            if command.is_warn_only() {
                return Ok(CommandOutput {
                    status: *status,
                    ..Default::default()
                });
            }
            return Err(ShellError::Failed {
                command: line,
                status: *status,
                stderr: "scripted failure".to_string(),
            });
        }
        let stdout = self
            .script
            .responses
            .iter()
            .find(|(n, _)| line.contains(n.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            status: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

/// Hands out a pre-built `ScriptedShell` per host; unknown hosts get a
/// default one. Every shell shares the host's log.
#[derive(Default)]
pub struct ScriptedConnector {
    shells: Mutex<HashMap<String, ScriptedShell>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(self, shell: ScriptedShell) -> Self {
        self.shells
            .lock()
            .unwrap()
            .insert(shell.target.clone(), shell);
        self
    }

    pub fn lines(&self, host: &str) -> Vec<String> {
        self.shells
            .lock()
            .unwrap()
            .get(host)
            .map(ScriptedShell::lines)
            .unwrap_or_default()
    }
}

impl ShellConnector for ScriptedConnector {
    fn connect(&self, host: &str) -> Box<dyn RemoteShell> {
        let mut shells = self.shells.lock().unwrap();
        let shell = shells
            .entry(host.to_string())
            .or_insert_with(|| ScriptedShell::new(host))
            .clone();
        Box::new(shell)
    }
}
