//! The generation driver.

use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use wuffs_check::{Checker, Dependencies, Package};
use wuffs_ir::ast::{DeclKind, File};
use wuffs_ir::token::unescape;
use wuffs_ir::{TokenId, TokenMap};

use crate::backend::{CodeGenerator, GenRequest, GenlibRequest, ProcessBackend, ReleaseRequest};
use crate::config::{valid_name, GenConfig};
use crate::output::OutputWriter;
use crate::release::{find_files, release_ext, release_path, Version};
use crate::resolve::{resolve, LoadError, PackageLoader, PackagePath};
use crate::stub::emit_stub;
use crate::{parse_file, parse_source, GenError, C_HEADER_ENDS_HERE};

#[cfg(test)]
mod tests;

const SOURCE_EXT: &str = "wuffs";
const ALL_STD: &str = "std/...";

/// Release metadata passed through to the backends.
#[derive(Clone, Debug, Default)]
pub struct ReleaseOptions {
    pub version: Version,
    pub revision: String,
    pub commit_date: String,
}

/// The parsed source files of one package directory.
#[derive(Default)]
struct PackageSource {
    paths: Vec<PathBuf>,
    files: Vec<File>,
}

/// Source files and subdirectory names of `dir`, each sorted.
fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<String>), GenError> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| GenError::io(dir, e))?.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                subdirs.push(name.to_owned());
            }
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXT) {
            files.push(path);
        }
    }
    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

fn package_dir(root: &Path, path: &PackagePath) -> PathBuf {
    path.as_str().split('/').fold(root.to_path_buf(), |dir, elem| dir.join(elem))
}

/// `<root>/gen/<dir>/<path>.<ext>`.
fn gen_path(root: &Path, dir: &str, path: &PackagePath, ext: &str) -> PathBuf {
    let mut out = package_dir(&root.join("gen").join(dir), path).into_os_string();
    out.push(".");
    out.push(ext);
    PathBuf::from(out)
}

/// Parsed packages, read from disk once each.
struct Sources {
    root: PathBuf,
    cache: FxHashMap<PackagePath, PackageSource>,
}

impl Sources {
    fn load(&mut self, map: &TokenMap, path: &PackagePath) -> Result<&PackageSource, GenError> {
        Ok(match self.cache.entry(path.clone()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(read_package(map, &self.root, path)?),
        })
    }
}

fn read_package(map: &TokenMap, root: &Path, path: &PackagePath) -> Result<PackageSource, GenError> {
    let dir = package_dir(root, path);
    if path.is_base() && !dir.is_dir() {
        return Ok(PackageSource::default());
    }
    let (paths, _) = list_dir(&dir)?;
    let files = paths
        .iter()
        .map(|p| parse_file(map, p))
        .collect::<Result<_, _>>()?;
    debug!(package = %path, files = paths.len(), "parsed package");
    Ok(PackageSource { paths, files })
}

fn use_paths(files: &[File]) -> impl Iterator<Item = TokenId> + '_ {
    files.iter().flat_map(|f| &f.decls).filter_map(|d| match d.kind {
        DeclKind::Use { path } => Some(path),
        _ => None,
    })
}

impl PackageLoader for Sources {
    fn uses(&mut self, map: &TokenMap, package: &PackagePath) -> Result<Vec<TokenId>, LoadError> {
        let source = self.load(map, package)?;
        Ok(use_paths(&source.files).collect())
    }
}

/// Runs `gen`, `genlib` and `genrelease` over a source tree.
pub struct Driver<'m> {
    map: &'m TokenMap,
    config: GenConfig,
    generators: Vec<Box<dyn CodeGenerator>>,
    checker: Checker<'m>,
    sources: Sources,
    /// Stubs of packages generated so far, or read from a previous run,
    /// keyed by `use` path.
    stubs: Dependencies,
    writer: OutputWriter,
    generated: FxHashSet<PackagePath>,
    affected: Vec<PackagePath>,
}

impl<'m> Driver<'m> {
    /// A driver running one [`ProcessBackend`] per configured language.
    pub fn new(map: &'m TokenMap, config: GenConfig) -> Result<Self, GenError> {
        let generators = config
            .langs
            .iter()
            .map(|lang| Box::new(ProcessBackend::new(&config.prefix, lang)) as Box<dyn CodeGenerator>)
            .collect();
        Self::with_generators(map, config, generators)
    }

    pub fn with_generators(
        map: &'m TokenMap,
        config: GenConfig,
        generators: Vec<Box<dyn CodeGenerator>>,
    ) -> Result<Self, GenError> {
        if let Some(bad) = generators.iter().find(|g| !valid_name(g.lang())) {
            return Err(GenError::InvalidName {
                what: "lang",
                name: bad.lang().to_owned(),
            });
        }
        Ok(Driver {
            map,
            sources: Sources {
                root: config.root.clone(),
                cache: FxHashMap::default(),
            },
            config,
            generators,
            checker: Checker::new(map)?,
            stubs: Dependencies::default(),
            writer: OutputWriter::new(),
            generated: FxHashSet::default(),
            affected: Vec::new(),
        })
    }

    pub fn writer(&self) -> &OutputWriter {
        &self.writer
    }

    /// Packages generated so far, in generation order.
    pub fn affected(&self) -> &[PackagePath] {
        &self.affected
    }

    /// Generate the packages named by `args`, and unless configured
    /// otherwise everything they use. A `/...` suffix also selects every
    /// package below. No arguments means `std/...`.
    pub fn gen(&mut self, args: &[String]) -> Result<(), GenError> {
        let requested = self.expand(args)?;
        let order = if self.config.skip_gen_deps {
            requested
        } else {
            resolve(&mut self.sources, self.map, &requested)?
        };
        for path in &order {
            if self.generated.insert(path.clone()) {
                self.gen_package(path)?;
            }
        }
        Ok(())
    }

    fn expand(&self, args: &[String]) -> Result<Vec<PackagePath>, GenError> {
        let default = [ALL_STD.to_owned()];
        let args = if args.is_empty() { &default[..] } else { args };
        let mut out: Vec<PackagePath> = Vec::new();
        for arg in args {
            let (arg, recursive) = match arg.strip_suffix("/...") {
                Some(prefix) => (prefix, true),
                None => (arg.as_str(), false),
            };
            if arg.is_empty() {
                continue;
            }
            let top = PackagePath::new(arg)?;
            if recursive {
                self.walk(top, &mut out)?;
            } else {
                out.push(top);
            }
        }
        let mut seen = FxHashSet::default();
        out.retain(|p| seen.insert(p.clone()));
        Ok(out)
    }

    /// Every package at or below `top` that has source files, parents
    /// before children.
    fn walk(&self, top: PackagePath, out: &mut Vec<PackagePath>) -> Result<(), GenError> {
        let mut pending = vec![top];
        while let Some(path) = pending.pop() {
            let (files, subdirs) = list_dir(&package_dir(&self.config.root, &path))?;
            if !files.is_empty() {
                out.push(path.clone());
            }
            for name in subdirs.iter().rev() {
                match PackagePath::new(&format!("{path}/{name}")) {
                    Ok(child) => pending.push(child),
                    Err(_) => debug!(dir = %name, "skipping directory"),
                }
            }
        }
        Ok(())
    }

    fn gen_package(&mut self, path: &PackagePath) -> Result<(), GenError> {
        let source = self.sources.load(self.map, path)?;
        if source.files.is_empty() {
            debug!(package = %path, "no source files");
            return Ok(());
        }
        let paths = source.paths.clone();
        let files = source.files.clone();
        debug!(package = %path, "generating");

        let package = self.check_package(files)?;
        let root = self.config.root.clone();
        for generator in &self.generators {
            let lang = generator.lang();
            let out = generator.generate(&GenRequest {
                package_name: path.name(),
                files: &paths,
            })?;
            self.writer.write(&gen_path(&root, lang, path, lang), &out)?;
            if lang == "c" {
                let sentinel = C_HEADER_ENDS_HERE.as_bytes();
                let Some(end) = out.windows(sentinel.len()).position(|w| w == sentinel) else {
                    return Err(GenError::MissingSentinel {
                        command: format!("{}{lang}", self.config.prefix),
                    });
                };
                self.writer.write(&gen_path(&root, "c", path, "h"), &out[..end])?;
            }
        }

        let stub = emit_stub(self.map, path, &package)?;
        let stub_path = gen_path(&root, "wuffs", path, "wuffs");
        let stub_file = parse_source(self.map, &stub_path.display().to_string(), stub.as_bytes())?;
        if !self.generators.is_empty() {
            self.writer.write(&stub_path, stub.as_bytes())?;
        }
        self.stubs.insert(path.as_str().to_owned(), stub_file);
        self.affected.push(path.clone());
        Ok(())
    }

    /// Check one package's files against the stubs of what they use.
    fn check_package(&mut self, files: Vec<File>) -> Result<Package, GenError> {
        let mut deps = Dependencies::default();
        let used: Vec<String> = use_paths(&files)
            .filter_map(|id| unescape(self.map.by_id(id)).map(str::to_owned))
            .collect();
        for used in used {
            if let Some(stub) = self.stub(&used)? {
                deps.insert(used, stub);
            }
        }
        Ok(self.checker.check(files, &deps)?)
    }

    /// The stub for `used`: from this run, else from a previous run's
    /// `gen/wuffs` output.
    fn stub(&mut self, used: &str) -> Result<Option<File>, GenError> {
        if let Some(stub) = self.stubs.get(used) {
            return Ok(Some(stub.clone()));
        }
        let Ok(path) = PackagePath::new(used) else {
            return Ok(None);
        };
        let on_disk = gen_path(&self.config.root, "wuffs", &path, "wuffs");
        if !on_disk.is_file() {
            return Ok(None);
        }
        debug!(stub = %on_disk.display(), "reading stub");
        let stub = parse_file(self.map, &on_disk)?;
        self.stubs.insert(used.to_owned(), stub.clone());
        Ok(Some(stub))
    }

    /// Check the given files as one package, without generating anything.
    pub fn check_files(&mut self, paths: &[PathBuf]) -> Result<Package, GenError> {
        let files = paths
            .iter()
            .map(|p| parse_file(self.map, p))
            .collect::<Result<Vec<_>, _>>()?;
        self.check_package(files)
    }

    /// Build each language's libraries from the packages generated so far.
    pub fn genlib(&mut self) -> Result<(), GenError> {
        let gen_dir = self.config.root.join("gen");
        for generator in &self.generators {
            let lang = generator.lang();
            debug!(lang, packages = self.affected.len(), "genlib");
            generator.generate_library(&GenlibRequest {
                dst_dir: &gen_dir.join("lib").join(lang),
                src_dir: &gen_dir.join(lang),
                packages: &self.affected,
            })?;
        }
        Ok(())
    }

    /// Write each language's single-file release from its generated files.
    pub fn genrelease(&mut self, options: &ReleaseOptions) -> Result<(), GenError> {
        let root = self.config.root.clone();
        for generator in &self.generators {
            let lang = generator.lang();
            let files = find_files(&root.join("gen").join(lang), release_ext(lang))?;
            let out = generator.generate_release(&ReleaseRequest {
                revision: &options.revision,
                commit_date: &options.commit_date,
                version: &options.version,
                files: &files,
            })?;
            self.writer
                .write(&release_path(&root, lang, &options.version), &out)?;
        }
        Ok(())
    }
}
