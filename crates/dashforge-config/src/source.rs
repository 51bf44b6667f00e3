//! Key-value document sources.
//!
//! Documents are YAML or JSON, chosen by file extension. Anything that is
//! not `.json` is read as YAML.

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::path::Path;

/// Document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl Format {
    /// Pick the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Why a source could not be read.
#[derive(Debug)]
pub(crate) enum SourceError {
    /// File does not exist
    Missing,
    /// File exists but could not be read
    Io(io::Error),
    /// File content did not parse into the expected shape
    Parse(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("file not found"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Parse(msg) => f.write_str(msg),
        }
    }
}

/// Parse `text` as `format`.
///
/// # Errors
///
/// Returns the parser's message when the text is not a valid document of
/// the expected shape.
pub fn parse_str<T: DeserializeOwned>(text: &str, format: Format) -> Result<T, String> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml_ng::from_str(text).map_err(|e| e.to_string()),
    }
}

/// Read and parse a document. Blank files parse as `T::default()`.
pub(crate) fn read_source<T>(path: &Path) -> Result<T, SourceError>
where
    T: DeserializeOwned + Default,
{
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SourceError::Missing,
        _ => SourceError::Io(e),
    })?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    parse_str(&text, Format::from_path(path)).map_err(SourceError::Parse)
}

/// Mapping that keeps entries in document order.
///
/// Deserialized straight from the map visitor, so order survives for both
/// YAML and JSON without relying on the backing map type of either parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<V>(pub Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Ordered<V> {
    /// Entries in document order.
    pub fn into_entries(self) -> Vec<(String, V)> {
        self.0
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Ordered::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashforge_core::Attributes;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(&PathBuf::from("a.json")), Format::Json);
        assert_eq!(Format::from_path(&PathBuf::from("a.JSON")), Format::Json);
        assert_eq!(Format::from_path(&PathBuf::from("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(&PathBuf::from("a.yml")), Format::Yaml);
        assert_eq!(Format::from_path(&PathBuf::from("a")), Format::Yaml);
    }

    #[test]
    fn test_ordered_preserves_yaml_order() {
        let yaml = "zeta: {a: 1}\nalpha: {a: 2}\nmid: {a: 3}\n";
        let parsed: Ordered<Attributes> = parse_str(yaml, Format::Yaml).unwrap();
        let keys: Vec<_> = parsed.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_ordered_preserves_json_order() {
        let json = r#"{"zeta": {}, "alpha": {}, "mid": {}}"#;
        let parsed: Ordered<Attributes> = parse_str(json, Format::Json).unwrap();
        let keys: Vec<_> = parsed.into_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_ordered_rejects_sequence() {
        let parsed: Result<Ordered<Attributes>, _> = parse_str("- a\n- b\n", Format::Yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_json_is_strict() {
        let parsed: Result<Attributes, _> = parse_str("{'bad': json, }", Format::Json);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_read_source_missing_and_blank() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_source::<Attributes>(&dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(SourceError::Missing)));

        let blank = dir.path().join("blank.yaml");
        std::fs::write(&blank, "   \n").unwrap();
        let parsed: Attributes = read_source(&blank).unwrap();
        assert!(parsed.is_empty());
    }

    proptest! {
        #[test]
        fn prop_ordered_keeps_document_order(
            keys in proptest::collection::hash_set("k_[a-z0-9_]{0,7}", 1..16)
                .prop_map(|set| set.into_iter().collect::<Vec<String>>())
                .prop_shuffle()
        ) {
            let json = format!(
                "{{{}}}",
                keys.iter()
                    .enumerate()
                    .map(|(i, k)| format!("\"{k}\": {i}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            let yaml: String = keys
                .iter()
                .enumerate()
                .map(|(i, k)| format!("{k}: {i}\n"))
                .collect();

            for (text, format) in [(json, Format::Json), (yaml, Format::Yaml)] {
                let parsed: Ordered<i64> = parse_str(&text, format).unwrap();
                let got: Vec<String> = parsed.into_entries().into_iter().map(|(k, _)| k).collect();
                prop_assert_eq!(&got, &keys);
            }
        }
    }
}
