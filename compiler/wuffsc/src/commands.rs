//! Command handlers for the `wuffs` CLI.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use wuffs_gen::{
    find_root, parse_langs, Driver, GenConfig, GenError, OutputWriter, ReleaseOptions, Version,
    WriteOutcome,
};
use wuffs_ir::TokenMap;


#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown command {0:?}, run \"wuffs help\" for usage")]
    UnknownCommand(String),

    #[error("flag provided but not defined: {0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: {0}")]
    MissingValue(String),

    #[error("{command} takes no flag {flag}")]
    UnsupportedFlag { command: &'static str, flag: String },

    #[error(transparent)]
    Gen(#[from] GenError),
}

/// Flags shared by the generating commands, and the package arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub langs: Option<Vec<String>>,
    pub root: Option<PathBuf>,
    pub skip_gen_deps: bool,
    pub skip_gen: bool,
    pub version: Version,
    pub revision: String,
    pub commit_date: String,
    pub packages: Vec<String>,
}

/// Parse `-flag value`, `-flag=value` and the `--` spellings of each. The
/// first argument not starting with `-` ends the flags.
pub fn parse_options(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            break;
        };
        i += 1;
        if flag.is_empty() {
            break;
        }
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value.to_owned())),
            None => (flag, None),
        };
        let mut value = || -> Result<String, CliError> {
            if let Some(v) = &inline {
                return Ok(v.clone());
            }
            let v = args
                .get(i)
                .cloned()
                .ok_or_else(|| CliError::MissingValue(arg.clone()))?;
            i += 1;
            Ok(v)
        };
        match name {
            "langs" => options.langs = Some(parse_langs(&value()?)?),
            "root" => options.root = Some(PathBuf::from(value()?)),
            "version" => options.version = Version::parse(&value()?)?,
            "revision" => options.revision = value()?,
            "commitdate" => options.commit_date = value()?,
            "skipgendeps" => options.skip_gen_deps = parse_bool(arg, inline.as_deref())?,
            "skipgen" => options.skip_gen = parse_bool(arg, inline.as_deref())?,
            _ => return Err(CliError::UnknownFlag(arg.clone())),
        }
    }
    options.packages = args[i.min(args.len())..].to_vec();
    Ok(options)
}

fn parse_bool(arg: &str, value: Option<&str>) -> Result<bool, CliError> {
    match value {
        None | Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(_) => Err(CliError::UnknownFlag(arg.to_owned())),
    }
}

impl Options {
    fn config(&self) -> GenConfig {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let root = find_root(
            self.root.as_deref(),
            std::env::var_os(wuffs_gen::ROOT_ENV),
            &cwd,
        );
        debug!(root = %root.display(), "wuffs root");
        let mut config = GenConfig::new(root);
        if let Some(langs) = &self.langs {
            config.langs = langs.clone();
        }
        config.skip_gen_deps = self.skip_gen_deps;
        config
    }

    fn reject(&self, command: &'static str, release_only: bool) -> Result<(), CliError> {
        let flag = if self.skip_gen {
            Some("-skipgen")
        } else if release_only && self.version != Version::default() {
            Some("-version")
        } else if release_only && !self.revision.is_empty() {
            Some("-revision")
        } else if release_only && !self.commit_date.is_empty() {
            Some("-commitdate")
        } else {
            None
        };
        match flag {
            Some(flag) => Err(CliError::UnsupportedFlag {
                command,
                flag: flag.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Print each write the way the generators report them.
pub fn report(writer: &OutputWriter) {
    for (path, outcome) in writer.log() {
        match outcome {
            WriteOutcome::Wrote => println!("gen wrote:      {}", path.display()),
            WriteOutcome::Unchanged => println!("gen unchanged:  {}", path.display()),
        }
    }
}

/// Run `f` on a fresh driver, reporting its writes even when `f` fails.
fn with_driver(
    options: &Options,
    f: impl FnOnce(&mut Driver<'_>) -> Result<(), GenError>,
) -> Result<(), CliError> {
    let map = TokenMap::new();
    let mut driver = Driver::new(&map, options.config())?;
    let result = f(&mut driver);
    report(driver.writer());
    Ok(result?)
}

/// `wuffs gen [flags] [PKG...]`
pub fn gen(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args)?;
    options.reject("gen", true)?;
    with_driver(&options, |driver| driver.gen(&options.packages))
}

/// `wuffs genlib [flags] [PKG...]`
pub fn genlib(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args)?;
    options.reject("genlib", true)?;
    with_driver(&options, |driver| {
        driver.gen(&options.packages)?;
        driver.genlib()
    })
}

/// `wuffs genrelease [flags] [PKG...]`
pub fn genrelease(args: &[String]) -> Result<(), CliError> {
    let options = parse_options(args)?;
    let release = ReleaseOptions {
        version: options.version.clone(),
        revision: options.revision.clone(),
        commit_date: options.commit_date.clone(),
    };
    with_driver(&options, |driver| {
        if !options.skip_gen {
            driver.gen(&options.packages)?;
        }
        driver.genrelease(&release)
    })
}

/// `wuffs check FILE...`: verify the files as one package. Used packages'
/// stubs come from the root's `gen/wuffs` tree.
pub fn check_files(args: &[String]) -> Result<(), CliError> {
    let options = Options::default();
    let map = TokenMap::new();
    let mut driver = Driver::with_generators(&map, options.config(), Vec::new())?;
    let paths: Vec<PathBuf> = args.iter().map(PathBuf::from).collect();
    let package = driver.check_files(&paths)?;
    match &package.package_id {
        Some((id, _)) => println!("ok: package {id:?}, {} files", package.files.len()),
        None => println!("ok: {} files", package.files.len()),
    }
    Ok(())
}

/// `wuffs lex FILE`: one line per token.
pub fn lex_file(path: &str) -> Result<(), CliError> {
    for line in lex_lines(Path::new(path))? {
        println!("{line}");
    }
    Ok(())
}

fn lex_lines(path: &Path) -> Result<Vec<String>, GenError> {
    let source = std::fs::read(path).map_err(|source| GenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = TokenMap::new();
    let tokens = wuffs_lexer::lex(&map, &path.display().to_string(), &source)?;
    Ok(tokens
        .iter()
        .map(|t| format!("{:>4}  {}", t.line, map.by_id(t.id)))
        .collect())
}
