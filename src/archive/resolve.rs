use std::io::{Read, Seek};

use anyhow::Context as _;
use base64::Engine as _;
use serde_json::Value;
use zip::ZipArchive;

use crate::foundation::error::{ShowError, ShowResult};
use crate::schema::model::Asset;

/// Key marking a JSON reference object.
pub(crate) const REF_KEY: &str = "$ref";

const ZIP_SCHEME: &str = "zip:";

/// How an archive entry is materialized in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Json,
    Yaml,
    Binary,
}

impl EntryKind {
    pub(crate) fn of(path: &str) -> Self {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Binary,
        }
    }
}

/// Strategy turning a referenced archive entry into a tree node.
///
/// Resolvers are consulted in order; the first one returning `Some` wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolver {
    /// Binary entries become [`Asset`] placeholders; the entry is never read.
    Placeholder,
    /// Text entries are parsed, binary entries become standard base64 strings.
    Archive,
}

impl Resolver {
    pub(crate) fn resolve<R: Read + Seek>(
        self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> ShowResult<Option<Value>> {
        let kind = EntryKind::of(path);
        match self {
            Self::Placeholder => Ok((kind == EntryKind::Binary).then(|| {
                Asset {
                    filename: path.to_string(),
                }
                .to_value()
            })),
            Self::Archive => {
                let mut entry = archive
                    .by_name(path)
                    .with_context(|| format!("opening archive entry '{path}'"))?;
                let value = match kind {
                    EntryKind::Json | EntryKind::Yaml => {
                        let mut text = String::new();
                        entry
                            .read_to_string(&mut text)
                            .with_context(|| format!("reading archive entry '{path}' as UTF-8"))?;
                        parse_text(kind, &text)
                            .map_err(|e| ShowError::serde(format!("{path}: {e}")))?
                    }
                    EntryKind::Binary => {
                        let mut bytes = Vec::new();
                        entry
                            .read_to_end(&mut bytes)
                            .with_context(|| format!("reading archive entry '{path}'"))?;
                        Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
                    }
                };
                Ok(Some(value))
            }
        }
    }
}

fn parse_text(kind: EntryKind, text: &str) -> Result<Value, String> {
    match kind {
        EntryKind::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        _ => serde_json::from_str(text).map_err(|e| e.to_string()),
    }
}

/// Archive entry named by a `$ref` target such as `zip:lights/0.bin`.
pub(crate) fn ref_target(reference: &str) -> ShowResult<String> {
    let Some(rest) = reference.strip_prefix(ZIP_SCHEME) else {
        let scheme = reference
            .split_once(':')
            .map_or("<none>", |(scheme, _)| scheme);
        return Err(ShowError::unsupported_protocol(format!(
            "reference '{reference}' uses scheme '{scheme}'; only 'zip:' is supported"
        )));
    };
    let path = rest.trim_start_matches("./").trim_start_matches('/');
    if path.is_empty() {
        return Err(ShowError::schema(format!(
            "reference '{reference}' does not name an archive entry"
        )));
    }
    Ok(path.to_string())
}

/// JSON pointers and targets of every reference object inside `value`.
///
/// A reference object is an object with a string `$ref` member; it is replaced as a
/// whole. Pointers are relative to `value` and prefixed with `base`.
pub(crate) fn find_refs(value: &Value, base: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get(REF_KEY) {
                out.push((base.to_string(), target.clone()));
                return;
            }
            for (key, child) in map {
                find_refs(child, &format!("{base}/{}", escape_token(key)), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                find_refs(child, &format!("{base}/{i}"), out);
            }
        }
        _ => {}
    }
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
#[path = "../../tests/unit/archive/resolve.rs"]
mod tests;
