use std::{
    env,
    ffi::OsStr,
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use crate::{LkhError, LkhResult};

#[cfg(target_os = "windows")]
const EXECUTABLE_SUFFIX: &str = ".exe";
#[cfg(not(target_os = "windows"))]
const EXECUTABLE_SUFFIX: &str = "";

/// A resolved LKH executable.
#[derive(Clone, Debug)]
pub struct LkhProcess {
    exe_path: PathBuf,
    current_dir: Option<PathBuf>,
}

impl LkhProcess {
    pub fn new(exe_path: impl Into<PathBuf>) -> Self {
        Self {
            exe_path: exe_path.into(),
            current_dir: None,
        }
    }

    /// Resolves `solver` the way a shell would: a value with a path separator
    /// must point at an existing file, a bare name is searched on `PATH`.
    pub fn resolve(solver: impl AsRef<OsStr>) -> LkhResult<Self> {
        let solver = solver.as_ref();
        let not_found = || LkhError::SolverNotFound {
            solver: solver.to_string_lossy().into_owned(),
        };

        let as_path = Path::new(solver);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            return if is_executable_file(as_path) {
                Ok(Self::new(as_path))
            } else {
                Err(not_found())
            };
        }

        let search_path = env::var_os("PATH").ok_or_else(not_found)?;
        find_on_path(solver, &search_path)
            .map(Self::new)
            .ok_or_else(not_found)
    }

    pub fn exe_path(&self) -> &Path {
        &self.exe_path
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Runs `exe <par_path>` to completion with stdin closed, so LKH's "press
    /// any key" prompt never blocks. stdout and stderr share one pipe and come
    /// back as a single stream in the order LKH wrote them. Non-zero exits
    /// become [`LkhError::ProcessFailed`] carrying that stream.
    pub fn run(&self, par_path: &Path, context: impl ToString) -> LkhResult<String> {
        let (mut reader, writer) = io::pipe()?;

        let mut command = Command::new(&self.exe_path);
        command
            .arg(par_path)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        log::debug!(
            "solver.run: start exe={} par={}",
            self.exe_path.display(),
            par_path.display()
        );
        let mut child = command.spawn()?;
        // Drop the parent's write ends so the read sees EOF when the child exits.
        drop(command);

        let mut output = Vec::new();
        let read = reader.read_to_end(&mut output);
        let status = child.wait()?;
        read?;
        log::debug!(
            "solver.run: exit status={status} output_bytes={}",
            output.len()
        );

        Self::ensure_success(&context.to_string(), status, &output)
    }

    fn ensure_success(context: &str, status: ExitStatus, output: &[u8]) -> LkhResult<String> {
        let output = String::from_utf8_lossy(output).into_owned();
        if status.success() {
            return Ok(output);
        }

        Err(LkhError::ProcessFailed {
            context: format!("{context} ({status})"),
            output,
        })
    }
}

fn find_on_path(name: &OsStr, search_path: &OsStr) -> Option<PathBuf> {
    let mut file_name = name.to_os_string();
    if !EXECUTABLE_SUFFIX.is_empty() && Path::new(name).extension().is_none() {
        file_name.push(EXECUTABLE_SUFFIX);
    }

    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| is_executable_file(candidate))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}
