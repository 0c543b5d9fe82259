//! Boundary checks for the tracker's `domain`, `inbound` and `outbound`
//! layers.
//!
//! Each layer carries a short deny list of tracker modules and crates it
//! may not name. A name counts when it is the root of any path in a file,
//! `use` trees included. Each file reports the first offending path per
//! rule.
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use syn::visit::{self, Visit};
use thiserror::Error;

/// Top-level module of `tracker/src` a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Geofence rules and ports.
    Domain,
    /// Adapters that drive the domain.
    Inbound,
    /// Adapters the domain drives through ports.
    Outbound,
}

impl Layer {
    const ALL: [Self; 3] = [Self::Domain, Self::Inbound, Self::Outbound];

    const fn dir(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }

    fn of(path: &Utf8Path) -> Option<Self> {
        let first = path.components().next()?.as_str();
        Self::ALL.into_iter().find(|layer| layer.dir() == first)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

/// Something a layer may be forbidden to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A top-level module of the tracker crate.
    Module(&'static str),
    /// An external or workspace crate.
    Crate(&'static str),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(name) => write!(f, "crate::{name}"),
            Self::Crate(name) => write!(f, "crate `{name}`"),
        }
    }
}

struct Rule {
    layer: Layer,
    target: Target,
    reason: &'static str,
}

const fn deny(layer: Layer, target: Target, reason: &'static str) -> Rule {
    Rule {
        layer,
        target,
        reason,
    }
}

const BINARY_ONLY: &str = "the binary owns arguments, settings and subscribers";
const FILES_ARE_ADAPTERS: &str = "files are read and written by outbound adapters";
const CATALOG_FORMAT: &str = "the catalog file format stays inside the catalog repository";
const ADAPTERS_MEET_IN_DOMAIN: &str = "adapters only meet through the domain";

const RULES: &[Rule] = &[
    deny(Layer::Domain, Target::Module("config"), BINARY_ONLY),
    deny(Layer::Domain, Target::Module("inbound"), "the domain is driven, it does not drive"),
    deny(Layer::Domain, Target::Module("outbound"), "the domain reaches adapters through ports"),
    deny(Layer::Domain, Target::Crate("camino"), FILES_ARE_ADAPTERS),
    deny(Layer::Domain, Target::Crate("cap_std"), FILES_ARE_ADAPTERS),
    deny(Layer::Domain, Target::Crate("catalog_data"), CATALOG_FORMAT),
    deny(Layer::Domain, Target::Crate("clap"), BINARY_ONLY),
    deny(Layer::Domain, Target::Crate("ortho_config"), BINARY_ONLY),
    deny(Layer::Domain, Target::Crate("serde_json"), "wire formats are decoded by adapters"),
    deny(Layer::Domain, Target::Crate("tracing_subscriber"), BINARY_ONLY),
    deny(Layer::Inbound, Target::Module("outbound"), ADAPTERS_MEET_IN_DOMAIN),
    deny(Layer::Inbound, Target::Crate("catalog_data"), CATALOG_FORMAT),
    deny(Layer::Inbound, Target::Crate("clap"), BINARY_ONLY),
    deny(Layer::Inbound, Target::Crate("ortho_config"), BINARY_ONLY),
    deny(Layer::Outbound, Target::Module("inbound"), ADAPTERS_MEET_IN_DOMAIN),
    deny(Layer::Outbound, Target::Crate("clap"), BINARY_ONLY),
    deny(Layer::Outbound, Target::Crate("ortho_config"), BINARY_ONLY),
    deny(Layer::Outbound, Target::Crate("tracing_subscriber"), BINARY_ONLY),
];

/// Top-level modules of the tracker crate, recognised when named bare.
const TRACKER_MODULES: [&str; 5] = ["config", "domain", "inbound", "outbound", "test_support"];

/// A Rust file from `tracker/src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to `tracker/src`, starting with the layer directory.
    pub path: Utf8PathBuf,
    /// File contents.
    pub text: String,
}

impl SourceFile {
    /// Pair a relative path with its contents.
    pub fn new(path: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A forbidden name found in a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Offending file, relative to `tracker/src`.
    pub file: Utf8PathBuf,
    /// Layer the file belongs to.
    pub layer: Layer,
    /// What the layer named.
    pub target: Target,
    /// First path in the file that reached `target`.
    pub path: String,
    /// Why the layer may not name `target`.
    pub reason: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} names {} via `{}` ({})",
            self.file, self.layer, self.target, self.path, self.reason
        )
    }
}

/// Errors returned by the lint.
#[derive(Debug, Error)]
pub enum LintError {
    /// Reading `tracker/src` failed.
    #[error("failed to read tracker sources: {0}")]
    Io(#[from] io::Error),
    /// A file sits outside the three layers.
    #[error("{file} is not under domain/, inbound/ or outbound/")]
    OutsideLayers {
        /// Offending path.
        file: Utf8PathBuf,
    },
    /// A file is not valid Rust.
    #[error("failed to parse {file}: {message}")]
    Parse {
        /// Offending path.
        file: Utf8PathBuf,
        /// Parser message.
        message: String,
    },
    /// At least one layer named something it may not.
    #[error("{} layer boundary violation(s):{}", .0.len(), render(.0))]
    Violations(Vec<Violation>),
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("\n  {violation}"))
        .collect()
}

/// Check every `.rs` file under `tracker_dir/src/{domain,inbound,outbound}`.
///
/// # Errors
///
/// Returns [`LintError::Violations`] listing every broken rule, or the
/// first read or parse failure.
pub fn check_tracker_dir(tracker_dir: &Utf8Path) -> Result<(), LintError> {
    let src = Dir::open_ambient_dir(tracker_dir.join("src"), ambient_authority())?;
    check_sources(&read_layer_sources(&src)?)
}

/// Check in-memory sources.
///
/// # Errors
///
/// As [`check_tracker_dir`], plus [`LintError::OutsideLayers`] for a path
/// that does not start with a layer directory.
pub fn check_sources(files: &[SourceFile]) -> Result<(), LintError> {
    let mut violations = Vec::new();
    for file in files {
        violations.extend(check_file(file)?);
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LintError::Violations(violations))
    }
}

fn check_file(file: &SourceFile) -> Result<Vec<Violation>, LintError> {
    let layer = Layer::of(&file.path).ok_or_else(|| LintError::OutsideLayers {
        file: file.path.clone(),
    })?;
    let syntax = syn::parse_file(&file.text).map_err(|err| LintError::Parse {
        file: file.path.clone(),
        message: err.to_string(),
    })?;

    let mut roots = RootCollector::default();
    roots.visit_file(&syntax);

    Ok(RULES
        .iter()
        .filter(|rule| rule.layer == layer)
        .filter_map(|rule| {
            roots.first_path_to(rule.target).map(|path| Violation {
                file: file.path.clone(),
                layer,
                target: rule.target,
                path: path.to_owned(),
                reason: rule.reason,
            })
        })
        .collect())
}

/// Records, per root, the first path in source order that starts there.
#[derive(Default)]
struct RootCollector {
    modules: BTreeMap<String, String>,
    crates: BTreeMap<String, String>,
}

impl RootCollector {
    fn first_path_to(&self, target: Target) -> Option<&str> {
        match target {
            Target::Module(name) => self.modules.get(name),
            Target::Crate(name) => self.crates.get(name),
        }
        .map(String::as_str)
    }

    fn record(&mut self, segments: &[String]) {
        let (roots, root) = match segments {
            [] => return,
            [first, rest @ ..] if is_relative(first) => {
                let Some(module) = rest.iter().find(|segment| !is_relative(segment)) else {
                    return;
                };
                (&mut self.modules, module)
            }
            [first, module, ..] if first == "poi_tracker" => (&mut self.modules, module),
            [first, ..] if TRACKER_MODULES.contains(&first.as_str()) => (&mut self.modules, first),
            [first, ..] => (&mut self.crates, first),
        };
        roots
            .entry(root.clone())
            .or_insert_with(|| segments.join("::"));
    }
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

impl<'ast> Visit<'ast> for RootCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect::<Vec<_>>();
        self.record(&segments);
        visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        let mut pending = vec![(Vec::new(), &node.tree)];
        while let Some((mut prefix, tree)) = pending.pop() {
            match tree {
                syn::UseTree::Path(path) => {
                    prefix.push(path.ident.to_string());
                    pending.push((prefix, &*path.tree));
                }
                syn::UseTree::Name(name) => {
                    prefix.push(name.ident.to_string());
                    self.record(&prefix);
                }
                syn::UseTree::Rename(rename) => {
                    prefix.push(rename.ident.to_string());
                    self.record(&prefix);
                }
                syn::UseTree::Glob(_) => {
                    prefix.push("*".to_owned());
                    self.record(&prefix);
                }
                syn::UseTree::Group(group) => {
                    pending.extend(group.items.iter().rev().map(|item| (prefix.clone(), item)));
                }
            }
        }
    }
}

fn read_layer_sources(src: &Dir) -> Result<Vec<SourceFile>, LintError> {
    let mut pending = Vec::new();
    for layer in Layer::ALL {
        match src.open_dir(layer.dir()) {
            Ok(dir) => pending.push((dir, Utf8PathBuf::from(layer.dir()))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    let mut files = Vec::new();
    while let Some((dir, prefix)) = pending.pop() {
        for entry in dir.entries()? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let path = prefix.join(&name);
            if entry.file_type()?.is_dir() {
                pending.push((entry.open_dir()?, path));
            } else if path.extension() == Some("rs") {
                let text = dir.read_to_string(&name)?;
                files.push(SourceFile { path, text });
            }
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests;
