use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SourceMapError};

use super::config::PATH_SLOT;

/// Runs the compiler for one source file.
///
/// Returns every output stream the tool produced; callers read the first.
pub trait CompilerRunner {
    fn run(&self, command_template: &str, path: &Path) -> Result<Vec<String>>;
}

/// Spawns the command described by the template as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolcRunner;

impl SolcRunner {
    /// Substitute the quoted path into the template and split it into argv.
    fn argv(command_template: &str, path: &Path) -> Result<Vec<String>> {
        let path = path.to_string_lossy();
        let quoted = shlex::try_quote(&path)
            .map_err(|_| SourceMapError::Template(command_template.to_string()))?;
        let command = command_template.replacen(PATH_SLOT, &quoted, 1);

        match shlex::split(&command) {
            Some(argv) if !argv.is_empty() => Ok(argv),
            _ => Err(SourceMapError::Template(command_template.to_string())),
        }
    }
}

impl CompilerRunner for SolcRunner {
    fn run(&self, command_template: &str, path: &Path) -> Result<Vec<String>> {
        let argv = Self::argv(command_template, path)?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| SourceMapError::Template(command_template.to_string()))?;

        tracing::debug!(%program, ?args, "running compiler");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SourceMapError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(SourceMapError::Compiler {
                command: argv.join(" "),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(vec![stdout, stderr])
    }
}
