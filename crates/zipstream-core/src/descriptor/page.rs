//! Descriptor page JSON and the normalization of legacy field names.

use std::fmt;
use std::marker::PhantomData;

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::entry::FileEntry;

/// Decodes `T` only from a JSON object. `null` gives `T::default()`; arrays
/// and scalars are rejected even though the derived impl would take arrays.
struct ObjectOnly<T>(T);

impl<'de, T> Deserialize<'de> for ObjectOnly<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for ObjectVisitor<T>
        where
            T: Deserialize<'de> + Default,
        {
            type Value = T;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<T, E> {
                Ok(T::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
                T::deserialize(MapAccessDeserializer::new(map))
            }
        }

        deserializer
            .deserialize_any(ObjectVisitor(PhantomData))
            .map(ObjectOnly)
    }
}

fn entry_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<RawEntry>>, D::Error> {
    let list = Option::<Vec<ObjectOnly<RawEntry>>>::deserialize(deserializer)?;
    Ok(list.map(|l| l.into_iter().map(|ObjectOnly(e)| e).collect()))
}

/// One raw entry record. Current (`url`, `zipPath`) and legacy
/// (`Url`, `ZipPath`) spellings are both accepted.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "Url")]
    legacy_url: Option<String>,
    #[serde(default, rename = "zipPath")]
    zip_path: Option<String>,
    #[serde(default, rename = "ZipPath")]
    legacy_zip_path: Option<String>,
}

impl RawEntry {
    /// Current spelling wins; the legacy one is used only when the current
    /// field is absent or empty.
    pub fn normalized(&self) -> (&str, &str) {
        (
            prefer(&self.url, &self.legacy_url),
            prefer(&self.zip_path, &self.legacy_zip_path),
        )
    }

    /// Build the entry, or `None` (logged) when validation fails.
    pub fn to_file_entry(&self) -> Option<FileEntry> {
        let (url, zip_path) = self.normalized();
        match FileEntry::new(url, zip_path) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("dropping descriptor entry: {}", e);
                None
            }
        }
    }
}

fn prefer<'a>(current: &'a Option<String>, legacy: &'a Option<String>) -> &'a str {
    match current.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => legacy.as_deref().unwrap_or(""),
    }
}

/// One page of a (possibly paginated) descriptor.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DescriptorPage {
    #[serde(default, deserialize_with = "entry_list")]
    results: Option<Vec<RawEntry>>,
    /// Legacy name of `results`, read only when `results` is empty.
    #[serde(default, deserialize_with = "entry_list")]
    entries: Option<Vec<RawEntry>>,
    /// Absolute URL of the following page; `null`/absent ends pagination.
    #[serde(default)]
    next: Option<String>,
    #[serde(default, rename = "suggestedFilename")]
    suggested_filename: Option<String>,
}

impl DescriptorPage {
    /// Decode one page. The top level must be a JSON object (`null` reads
    /// as an empty page).
    pub fn from_json(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<ObjectOnly<Self>>(payload).map(|ObjectOnly(page)| page)
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn suggested_filename(&self) -> Option<&str> {
        self.suggested_filename.as_deref()
    }

    /// The entry list in effect: `results` unless empty, else `entries`.
    /// The two are never merged.
    pub fn raw_entries(&self) -> &[RawEntry] {
        match self.results.as_deref() {
            Some(results) if !results.is_empty() => results,
            _ => self.entries.as_deref().unwrap_or(&[]),
        }
    }

    /// Valid entries in list order; malformed records are skipped.
    pub fn file_entries(&self) -> impl Iterator<Item = FileEntry> + '_ {
        self.raw_entries().iter().filter_map(RawEntry::to_file_entry)
    }

    /// Split into the selected raw entries and the `next` link.
    pub fn into_parts(self) -> (Vec<RawEntry>, Option<String>) {
        let entries = match self.results {
            Some(results) if !results.is_empty() => results,
            _ => self.entries.unwrap_or_default(),
        };
        (entries, self.next)
    }
}
