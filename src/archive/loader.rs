//! Loading of compiled `.skyc` show archives.
//!
//! A show archive is a ZIP file whose root entry (`show.json`, or `show.yaml`) may
//! point at other entries with `{"$ref": "zip:<path>"}` objects. The loader replaces
//! every reference with the content of the entry it names, one reference per step,
//! and validates the fully resolved tree.
//!
//! Binary entries are either left as `{"$asset": <path>}` placeholders or, when
//! [`LoadOptions::assets`] is set, read and stored as standard base64 text.

use std::collections::{BTreeSet, VecDeque};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use anyhow::Context as _;
use serde_json::{Value, json};
use zip::ZipArchive;

use crate::archive::resolve::{REF_KEY, Resolver, find_refs, ref_target};
use crate::foundation::error::{ShowError, ShowResult};
use crate::schema::model::ShowSpecification;
use crate::schema::validate::validate_show_specification;

/// Root entry names, in order of preference.
pub const ROOT_ENTRIES: [&str; 3] = ["show.json", "show.yaml", "show.yml"];

/// Longest chain of references followed before the archive is considered cyclic.
pub const MAX_REF_DEPTH: usize = 32;

/// Options for [`load_compiled_show`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Read binary entries into base64 strings; when false they are replaced by
    /// `Asset` placeholders.
    pub assets: bool,
}

/// State of a [`ShowLoader`] after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    /// References resolved so far.
    pub resolved: usize,
    /// References discovered but not resolved yet.
    pub pending: usize,
}

impl LoadProgress {
    /// Whether every reference has been resolved.
    pub fn is_done(&self) -> bool {
        self.pending == 0
    }
}

#[derive(Clone, Debug)]
struct PendingRef {
    pointer: String,
    target: String,
    depth: usize,
}

/// Incremental loader for one show archive.
///
/// Each [`ShowLoader::step`] resolves a single reference, so a host with a single
/// thread can interleave loading with other work.
pub struct ShowLoader<R> {
    archive: ZipArchive<R>,
    entries: BTreeSet<String>,
    resolvers: Vec<Resolver>,
    tree: Value,
    pending: VecDeque<PendingRef>,
    resolved: usize,
}

impl<R: Read + Seek> ShowLoader<R> {
    /// Open the archive in `reader` and locate its root entry.
    pub fn new(reader: R, options: LoadOptions) -> ShowResult<Self> {
        let archive = ZipArchive::new(reader).context("opening show archive")?;
        let entries: BTreeSet<String> = archive.file_names().map(str::to_string).collect();

        let root = ROOT_ENTRIES
            .iter()
            .find(|name| entries.contains(**name))
            .ok_or_else(|| {
                ShowError::schema(format!(
                    "archive has no root entry; expected one of {}",
                    ROOT_ENTRIES.join(", ")
                ))
            })?;
        let reference = format!("zip:{root}");

        let resolvers = if options.assets {
            vec![Resolver::Archive]
        } else {
            vec![Resolver::Placeholder, Resolver::Archive]
        };

        Ok(Self {
            archive,
            entries,
            resolvers,
            tree: json!({ REF_KEY: reference.clone() }),
            pending: VecDeque::from([PendingRef {
                pointer: String::new(),
                target: reference,
                depth: 0,
            }]),
            resolved: 0,
        })
    }

    /// Progress so far.
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            resolved: self.resolved,
            pending: self.pending.len(),
        }
    }

    /// The partially resolved tree.
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Resolve the next pending reference.
    ///
    /// Calling this once everything is resolved is a no-op.
    #[tracing::instrument(skip(self), fields(resolved = self.resolved))]
    pub fn step(&mut self) -> ShowResult<LoadProgress> {
        let Some(next) = self.pending.pop_front() else {
            return Ok(self.progress());
        };
        if next.depth >= MAX_REF_DEPTH {
            return Err(ShowError::schema(format!(
                "reference '{}' is nested more than {MAX_REF_DEPTH} levels deep",
                next.target
            )));
        }

        let path = ref_target(&next.target)?;
        if !self.entries.contains(&path) {
            return Err(ShowError::schema(format!(
                "reference '{}' names a missing archive entry",
                next.target
            )));
        }

        let mut value = None;
        for resolver in &self.resolvers {
            value = resolver.resolve(&mut self.archive, &path)?;
            if value.is_some() {
                break;
            }
        }
        let value = value.ok_or_else(|| {
            ShowError::schema(format!("no resolver accepted archive entry '{path}'"))
        })?;

        let mut nested = Vec::new();
        find_refs(&value, &next.pointer, &mut nested);
        for (pointer, target) in nested {
            self.pending.push_back(PendingRef {
                pointer,
                target,
                depth: next.depth + 1,
            });
        }

        let slot = self.tree.pointer_mut(&next.pointer).ok_or_else(|| {
            ShowError::schema(format!(
                "reference location '{}' disappeared while loading",
                next.pointer
            ))
        })?;
        *slot = value;
        self.resolved += 1;

        tracing::debug!(
            entry = %path,
            pointer = %next.pointer,
            pending = self.pending.len(),
            "resolved reference"
        );
        Ok(self.progress())
    }

    /// Resolve everything that is left and return the raw tree.
    pub fn into_tree(mut self) -> ShowResult<Value> {
        while !self.step()?.is_done() {}
        Ok(self.tree)
    }

    /// Resolve everything that is left and validate the result.
    pub fn finish(self) -> ShowResult<ShowSpecification> {
        let tree = self.into_tree()?;
        validate_show_specification(&tree)
    }
}

/// Load and validate the show archive at `path`.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_compiled_show(
    path: impl AsRef<Path>,
    options: LoadOptions,
) -> ShowResult<ShowSpecification> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    load_compiled_show_from_reader(BufReader::new(file), options)
}

/// Load and validate a show archive from any seekable reader.
#[tracing::instrument(skip(reader))]
pub fn load_compiled_show_from_reader<R: Read + Seek>(
    reader: R,
    options: LoadOptions,
) -> ShowResult<ShowSpecification> {
    ShowLoader::new(reader, options)?.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/archive/loader.rs"]
mod tests;
