//! Sidebar index validation.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::{error::Error, fmt};

use sidebar_store::models::{ItemKind, SidebarIndex};

/// Expectations checked in addition to the index invariants.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Exact set of kinds the index must contain.
    pub expected_kinds: Option<BTreeSet<ItemKind>>,
    /// Exact number of entries per kind.
    pub expected_counts: BTreeMap<ItemKind, usize>,
}

impl ValidateOptions {
    #[must_use]
    pub fn with_expected_kinds(mut self, kinds: impl IntoIterator<Item = ItemKind>) -> Self {
        self.expected_kinds = Some(kinds.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_expected_count(mut self, kind: ItemKind, count: usize) -> Self {
        self.expected_counts.insert(kind, count);
        self
    }
}

/// A single problem found in a sidebar index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateName { kind: ItemKind, name: String },
    EmptyName { kind: ItemKind, position: usize },
    InvalidName { kind: ItemKind, name: String },
    UnexpectedKind(ItemKind),
    MissingKind(ItemKind),
    CountMismatch { kind: ItemKind, expected: usize, actual: usize },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { kind, name } => {
                write!(f, "duplicate name `{name}` in `{kind}`")
            }
            Self::EmptyName { kind, position } => {
                write!(f, "empty name at position {position} in `{kind}`")
            }
            Self::InvalidName { kind, name } => {
                write!(f, "name `{name}` in `{kind}` contains whitespace")
            }
            Self::UnexpectedKind(kind) => write!(f, "unexpected kind `{kind}`"),
            Self::MissingKind(kind) => write!(f, "missing kind `{kind}`"),
            Self::CountMismatch {
                kind,
                expected,
                actual,
            } => write!(f, "`{kind}` has {actual} entries, expected {expected}"),
        }
    }
}

/// Error carrying every issue found in an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sidebar index has {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Collects every issue in `index` without failing.
#[must_use]
pub fn index_issues(index: &SidebarIndex, options: &ValidateOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for group in index.groups() {
        let mut seen = HashSet::new();
        for (position, entry) in group.entries.iter().enumerate() {
            if entry.name.is_empty() {
                issues.push(ValidationIssue::EmptyName {
                    kind: group.kind,
                    position,
                });
                continue;
            }
            if entry.name.chars().any(char::is_whitespace) {
                issues.push(ValidationIssue::InvalidName {
                    kind: group.kind,
                    name: entry.name.clone(),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                issues.push(ValidationIssue::DuplicateName {
                    kind: group.kind,
                    name: entry.name.clone(),
                });
            }
        }
    }

    if let Some(expected) = options.expected_kinds.as_ref() {
        let actual: BTreeSet<ItemKind> = index.kinds().collect();
        issues.extend(
            actual
                .difference(expected)
                .map(|kind| ValidationIssue::UnexpectedKind(*kind)),
        );
        issues.extend(
            expected
                .difference(&actual)
                .map(|kind| ValidationIssue::MissingKind(*kind)),
        );
    }

    for (kind, expected) in &options.expected_counts {
        let actual = index.entries(*kind).len();
        if actual != *expected {
            issues.push(ValidationIssue::CountMismatch {
                kind: *kind,
                expected: *expected,
                actual,
            });
        }
    }

    issues
}

/// Validates `index`, failing with every issue found.
///
/// # Errors
/// Returns `ValidationError` if any invariant or expectation does not hold.
pub fn validate_index(
    index: &SidebarIndex,
    options: &ValidateOptions,
) -> Result<(), ValidationError> {
    let issues = index_issues(index, options);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_duplicates_per_kind_only() {
        let mut index = SidebarIndex::new();
        index.push(ItemKind::Module, "ban", "");
        index.push(ItemKind::Struct, "ban", "");
        index.push(ItemKind::Struct, "GetGuild", "");
        index.push(ItemKind::Struct, "GetGuild", "again");

        let issues = index_issues(&index, &ValidateOptions::default());
        assert_eq!(
            issues,
            vec![ValidationIssue::DuplicateName {
                kind: ItemKind::Struct,
                name: "GetGuild".to_string(),
            }]
        );
    }

    #[test]
    fn reports_empty_and_whitespace_names() {
        let mut index = SidebarIndex::new();
        index.push(ItemKind::Function, "", "");
        index.push(ItemKind::Function, "get guild", "");

        let err = validate_index(&index, &ValidateOptions::default()).expect_err("should fail");
        assert_eq!(err.issues.len(), 2);
        assert!(err.to_string().contains("contains whitespace"));
    }

    #[test]
    fn checks_expected_kinds_and_counts() {
        let mut index = SidebarIndex::new();
        index.push(ItemKind::Module, "ban", "");
        index.push(ItemKind::Enum, "Kind", "");

        let options = ValidateOptions::default()
            .with_expected_kinds([ItemKind::Module, ItemKind::Struct])
            .with_expected_count(ItemKind::Module, 11);
        let issues = index_issues(&index, &options);

        assert!(issues.contains(&ValidationIssue::UnexpectedKind(ItemKind::Enum)));
        assert!(issues.contains(&ValidationIssue::MissingKind(ItemKind::Struct)));
        assert!(issues.contains(&ValidationIssue::CountMismatch {
            kind: ItemKind::Module,
            expected: 11,
            actual: 1,
        }));
    }
}
