//! External tool invocation
//!
//! Backends describe what they want to run as a [`CommandPlan`]: an ordered
//! list of [`ToolCommand`]s executed with `&&` semantics. Building a plan is
//! pure; running it goes through a [`ToolRunner`] so tests can record plans
//! instead of spawning processes.

use deck_core::ToolPaths;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{EngineError, Result};

/// Separator used when a plan is flattened to a single argument vector
pub const AND_THEN: &str = "&&";

/// A single external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Commands run one after another, stopping at the first failure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
    pub steps: Vec<ToolCommand>,
}

impl CommandPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, command: ToolCommand) -> Self {
        self.steps.push(command);
        self
    }

    /// Flatten to one argument vector, steps separated by `&&`
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                argv.push(AND_THEN.to_string());
            }
            argv.extend(step.argv());
        }
        argv
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured result of one finished command
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes tool commands
pub trait ToolRunner {
    /// Run a single command to completion, blocking the calling thread
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;

    /// Run every step of a plan; any non-zero exit aborts with
    /// [`EngineError::ToolExecution`]
    fn run_plan(&self, plan: &CommandPlan) -> Result<Vec<ToolOutput>> {
        let mut outputs = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            tracing::debug!("Running: {}", step);
            let output = self.run(step)?;

            if !output.success() {
                return Err(EngineError::ToolExecution {
                    command: step.to_string(),
                    exit_code: output.exit_code,
                    stderr: output.stderr.trim().to_string(),
                });
            }
            outputs.push(output);
        }

        Ok(outputs)
    }
}

/// Runs commands as child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    tools: ToolPaths,
}

impl ProcessRunner {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// Resolve the configured executable for a logical program name
    fn resolve(&self, program: &str) -> Result<std::path::PathBuf> {
        let executable = self.tools.executable(program);
        let path = Path::new(executable);

        if path.components().count() > 1 {
            return Ok(path.to_path_buf());
        }

        which::which(executable).map_err(|e| EngineError::ToolNotFound {
            program: executable.to_string(),
            message: e.to_string(),
        })
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let executable = self.resolve(&command.program)?;

        let output = Command::new(&executable)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| EngineError::ToolNotFound {
                program: executable.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
