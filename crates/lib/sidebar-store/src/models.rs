use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::num::TryFromIntError;
use std::str::FromStr;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of a sidebar entry, keyed by the generator's short name.
///
/// Variants are declared in key order, so the derived `Ord` sorts kinds the
/// same way the generator lays out groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "attr")]
    Attribute,
    #[serde(rename = "constant")]
    Constant,
    #[serde(rename = "derive")]
    Derive,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "fn")]
    Function,
    #[serde(rename = "foreigntype")]
    ForeignType,
    #[serde(rename = "keyword")]
    Keyword,
    #[serde(rename = "macro")]
    Macro,
    #[serde(rename = "mod")]
    Module,
    #[serde(rename = "primitive")]
    Primitive,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "struct")]
    Struct,
    #[serde(rename = "trait")]
    Trait,
    #[serde(rename = "traitalias")]
    TraitAlias,
    #[serde(rename = "type")]
    TypeAlias,
    #[serde(rename = "union")]
    Union,
}

impl ItemKind {
    pub const ALL: [Self; 16] = [
        Self::Attribute,
        Self::Constant,
        Self::Derive,
        Self::Enum,
        Self::Function,
        Self::ForeignType,
        Self::Keyword,
        Self::Macro,
        Self::Module,
        Self::Primitive,
        Self::Static,
        Self::Struct,
        Self::Trait,
        Self::TraitAlias,
        Self::TypeAlias,
        Self::Union,
    ];

    pub const KEYS: &'static [&'static str] = &[
        "attr",
        "constant",
        "derive",
        "enum",
        "fn",
        "foreigntype",
        "keyword",
        "macro",
        "mod",
        "primitive",
        "static",
        "struct",
        "trait",
        "traitalias",
        "type",
        "union",
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attr",
            Self::Constant => "constant",
            Self::Derive => "derive",
            Self::Enum => "enum",
            Self::Function => "fn",
            Self::ForeignType => "foreigntype",
            Self::Keyword => "keyword",
            Self::Macro => "macro",
            Self::Module => "mod",
            Self::Primitive => "primitive",
            Self::Static => "static",
            Self::Struct => "struct",
            Self::Trait => "trait",
            Self::TraitAlias => "traitalias",
            Self::TypeAlias => "type",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind key is not one of [`ItemKind::KEYS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseItemKindError {
    value: String,
}

impl ParseItemKindError {
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseItemKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sidebar item kind: {}", self.value)
    }
}

impl Error for ParseItemKindError {}

impl FromStr for ItemKind {
    type Err = ParseItemKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseItemKindError {
                value: value.to_string(),
            })
    }
}

/// One sidebar link: the item name and its one-line summary.
///
/// Encoded as a `[name, summary]` pair. A bare `"name"` string is accepted
/// on input and reads as an empty summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SidebarEntry {
    pub name: String,
    pub summary: String,
}

impl SidebarEntry {
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }
}

impl Serialize for SidebarEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.name)?;
        pair.serialize_element(&self.summary)?;
        pair.end()
    }
}

impl<'de> Deserialize<'de> for SidebarEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SidebarEntryVisitor)
    }
}

struct SidebarEntryVisitor;

impl<'de> Visitor<'de> for SidebarEntryVisitor {
    type Value = SidebarEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a [name, summary] pair")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(SidebarEntry::new(value, String::new()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let name: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let summary: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        Ok(SidebarEntry { name, summary })
    }
}

/// Entries sharing one kind, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarGroup {
    pub kind: ItemKind,
    pub entries: Vec<SidebarEntry>,
}

/// Ordered mapping of kind to entries for one documented module.
///
/// Group order and entry order are insertion order and survive
/// serialization unchanged. Each kind appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarIndex {
    groups: Vec<SidebarGroup>,
}

impl SidebarIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Appends an entry to the group for `kind`, opening the group at the end
    /// if it does not exist yet.
    pub fn push(&mut self, kind: ItemKind, name: impl Into<String>, summary: impl Into<String>) {
        self.ensure_group(kind)
            .entries
            .push(SidebarEntry::new(name, summary));
    }

    /// Returns the group for `kind`, opening an empty one if needed.
    pub fn ensure_group(&mut self, kind: ItemKind) -> &mut SidebarGroup {
        let position = match self.groups.iter().position(|group| group.kind == kind) {
            Some(position) => position,
            None => {
                self.groups.push(SidebarGroup {
                    kind,
                    entries: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[position]
    }

    #[must_use]
    pub fn groups(&self) -> &[SidebarGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, kind: ItemKind) -> Option<&SidebarGroup> {
        self.groups.iter().find(|group| group.kind == kind)
    }

    #[must_use]
    pub fn entries(&self, kind: ItemKind) -> &[SidebarEntry] {
        self.group(kind).map_or(&[], |group| group.entries.as_slice())
    }

    pub fn kinds(&self) -> impl Iterator<Item = ItemKind> + '_ {
        self.groups.iter().map(|group| group.kind)
    }

    #[must_use]
    pub fn find(&self, kind: ItemKind, name: &str) -> Option<&SidebarEntry> {
        self.entries(kind).iter().find(|entry| entry.name == name)
    }

    /// Iterates every entry with its kind, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, &SidebarEntry)> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.entries.iter().map(move |entry| (group.kind, entry)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.entries.is_empty())
    }

    /// Orders groups by kind key and entries by name.
    pub fn sort(&mut self) {
        self.groups.sort_by_key(|group| group.kind);
        for group in &mut self.groups {
            group.entries.sort_by(compare_entries);
        }
    }

    /// Rebuilds an index from stored entry records.
    ///
    /// `kinds` restores group order, including groups with no entries;
    /// records are placed by their `position`.
    ///
    /// # Errors
    /// Returns `ParseItemKindError` if a stored kind is not a known key.
    pub fn from_records(
        kinds: &[String],
        records: impl IntoIterator<Item = SidebarEntryRecord>,
    ) -> Result<Self, ParseItemKindError> {
        let mut index = Self::new();
        for kind in kinds {
            index.ensure_group(kind.parse()?);
        }
        let mut records: Vec<SidebarEntryRecord> = records.into_iter().collect();
        records.sort_by_key(|record| record.position);
        for record in records {
            index.push(record.kind.parse()?, record.name, record.summary);
        }
        Ok(index)
    }
}

fn compare_entries(left: &SidebarEntry, right: &SidebarEntry) -> Ordering {
    left.name
        .to_lowercase()
        .cmp(&right.name.to_lowercase())
        .then_with(|| left.name.cmp(&right.name))
}

impl Serialize for SidebarIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(group.kind.as_str(), &group.entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SidebarIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SidebarIndexVisitor)
    }
}

struct SidebarIndexVisitor;

impl<'de> Visitor<'de> for SidebarIndexVisitor {
    type Value = SidebarIndex;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of item kind to [name, summary] pairs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut index = SidebarIndex::new();
        while let Some(key) = map.next_key::<String>()? {
            let Ok(kind) = key.parse::<ItemKind>() else {
                return Err(de::Error::unknown_variant(&key, ItemKind::KEYS));
            };
            if index.group(kind).is_some() {
                return Err(de::Error::custom(format_args!("duplicate kind `{kind}`")));
            }
            let entries: Vec<SidebarEntry> = map.next_value()?;
            index.groups.push(SidebarGroup { kind, entries });
        }
        Ok(index)
    }
}

/// Sidebar metadata stored per documented module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidebarModule {
    pub project_id: String,
    pub module_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub entry_count: u32,
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// One stored sidebar entry. `position` is the entry's place in the module
/// index across all groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidebarEntryRecord {
    pub project_id: String,
    pub module_path: String,
    pub kind: String,
    pub name: String,
    pub summary: String,
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest_id: Option<String>,
}

impl SidebarEntryRecord {
    /// Flattens `index` into records, numbering positions across groups.
    ///
    /// # Errors
    /// Returns `TryFromIntError` if the index has more entries than a stored
    /// `u32` position can number.
    pub fn from_index(
        project_id: &str,
        module_path: &str,
        ingest_id: Option<&str>,
        index: &SidebarIndex,
    ) -> Result<Vec<Self>, TryFromIntError> {
        index
            .iter()
            .enumerate()
            .map(|(position, (kind, entry))| {
                u32::try_from(position).map(|position| Self {
                    project_id: project_id.to_string(),
                    module_path: module_path.to_string(),
                    kind: kind.as_str().to_string(),
                    name: entry.name.clone(),
                    summary: entry.summary.clone(),
                    position,
                    ingest_id: ingest_id.map(str::to_string),
                })
            })
            .collect()
    }
}
