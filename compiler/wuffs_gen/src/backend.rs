//! Code generators.
//!
//! Each target language has a [`CodeGenerator`]. The shipped implementation
//! is [`ProcessBackend`], which runs an external `wuffs-LANG` program and
//! captures its standard output.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::release::Version;
use crate::resolve::PackagePath;
use crate::GenError;


/// Generate one package from its source files.
#[derive(Clone, Copy, Debug)]
pub struct GenRequest<'a> {
    pub package_name: &'a str,
    pub files: &'a [PathBuf],
}

/// Build libraries from previously generated sources.
#[derive(Clone, Copy, Debug)]
pub struct GenlibRequest<'a> {
    pub dst_dir: &'a Path,
    pub src_dir: &'a Path,
    pub packages: &'a [PackagePath],
}

/// Combine generated files into one release file.
#[derive(Clone, Copy, Debug)]
pub struct ReleaseRequest<'a> {
    pub revision: &'a str,
    pub commit_date: &'a str,
    pub version: &'a Version,
    pub files: &'a [PathBuf],
}

pub trait CodeGenerator {
    /// The target language, which is also the output file extension.
    fn lang(&self) -> &str;

    /// The generated source for one package.
    fn generate(&self, request: &GenRequest<'_>) -> Result<Vec<u8>, GenError>;

    /// Build libraries for the given packages. Output goes to the
    /// request's destination directory, not back to the caller.
    fn generate_library(&self, request: &GenlibRequest<'_>) -> Result<(), GenError>;

    /// The contents of a single-file release.
    fn generate_release(&self, request: &ReleaseRequest<'_>) -> Result<Vec<u8>, GenError>;
}

/// Runs `PREFIX LANG` as a child process. Standard input is empty and
/// standard error passes through to ours.
#[derive(Clone, Debug)]
pub struct ProcessBackend {
    lang: String,
    command: String,
}

impl ProcessBackend {
    pub fn new(prefix: &str, lang: &str) -> Self {
        ProcessBackend {
            lang: lang.to_owned(),
            command: format!("{prefix}{lang}"),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run the backend. With `capture`, its standard output is returned;
    /// otherwise it is inherited.
    fn run(&self, args: Vec<OsString>, capture: bool) -> Result<Vec<u8>, GenError> {
        debug!(command = %self.command, args = args.len(), "running backend");
        let stdout = if capture {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };
        let output = Command::new(&self.command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| GenError::io(&self.command, e))?;
        if !output.status.success() {
            return Err(GenError::BackendFailed {
                command: self.command.clone(),
            });
        }
        Ok(output.stdout)
    }
}

fn push_paths(args: &mut Vec<OsString>, paths: &[PathBuf]) {
    args.extend(paths.iter().map(|p| p.as_os_str().to_owned()));
}

impl CodeGenerator for ProcessBackend {
    fn lang(&self) -> &str {
        &self.lang
    }

    fn generate(&self, request: &GenRequest<'_>) -> Result<Vec<u8>, GenError> {
        let mut args: Vec<OsString> = vec!["gen".into(), "-package_name".into(), request.package_name.into()];
        push_paths(&mut args, request.files);
        self.run(args, true)
    }

    fn generate_library(&self, request: &GenlibRequest<'_>) -> Result<(), GenError> {
        let mut args: Vec<OsString> = vec![
            "genlib".into(),
            "-dstdir".into(),
            request.dst_dir.as_os_str().to_owned(),
            "-srcdir".into(),
            request.src_dir.as_os_str().to_owned(),
        ];
        args.extend(request.packages.iter().map(|p| OsString::from(p.as_str())));
        self.run(args, false).map(drop)
    }

    fn generate_release(&self, request: &ReleaseRequest<'_>) -> Result<Vec<u8>, GenError> {
        let mut args: Vec<OsString> = vec![
            "genrelease".into(),
            "-revision".into(),
            request.revision.into(),
            "-commitdate".into(),
            request.commit_date.into(),
            "-version".into(),
            request.version.to_string().into(),
        ];
        push_paths(&mut args, request.files);
        self.run(args, true)
    }
}
