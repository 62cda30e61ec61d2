//! The immutable catalog snapshot and its index build.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::package::PackageRecord;

/// Errors raised while building a catalog from snapshot bytes.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The snapshot is not a JSON array of package records.
    #[error("malformed package snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A package name paired with its lowercased description, the scan view
/// used by the default name-or-description search.
#[derive(Debug, Clone)]
pub struct DescEntry {
    /// The record this entry describes.
    pub record: Arc<PackageRecord>,
    /// Lowercased description (empty when the record has none).
    pub description: String,
}

/// An immutable snapshot of the package set with every index the query
/// engine needs, built once per ingest and swapped in whole.
#[derive(Debug, Default)]
pub struct Catalog {
    /// All records, sorted ascending by name.
    pub records: Vec<Arc<PackageRecord>>,
    /// Exact-name lookup. Key set matches `names`.
    pub by_name: HashMap<String, Arc<PackageRecord>>,
    /// All package names, sorted ascending.
    pub names: Vec<String>,
    /// Per-record scan view for the name-or-description search.
    pub desc_index: Vec<DescEntry>,
    /// Names bucketed by their first byte, each bucket sorted ascending.
    pub suggest_names: HashMap<u8, Vec<String>>,
    /// Distinct package bases bucketed by first byte, sorted ascending.
    pub suggest_bases: HashMap<u8, Vec<String>>,
    /// Distinct package bases, sorted ascending.
    pub bases: Vec<String>,
    /// Inverted index from `"<tag>-<token>"` to the records mentioning
    /// that token on the tagged axis.
    pub refs: HashMap<String, Vec<Arc<PackageRecord>>>,
}

impl Catalog {
    /// Parse snapshot bytes (a JSON array of package records) and build
    /// every index. A failure here never exposes a partial catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] when the bytes are not a valid
    /// record array.
    pub fn build(bytes: &[u8]) -> Result<Self, CatalogError> {
        let mut parsed: Vec<PackageRecord> = serde_json::from_slice(bytes)?;
        parsed.sort_by(|a, b| a.name.cmp(&b.name));
        let records: Vec<Arc<PackageRecord>> = parsed.into_iter().map(Arc::new).collect();

        let mut catalog = Self {
            by_name: HashMap::with_capacity(records.len()),
            names: Vec::with_capacity(records.len()),
            desc_index: Vec::with_capacity(records.len()),
            ..Self::default()
        };

        let mut seen_bases = HashSet::new();
        for record in &records {
            catalog.index_record(record);
            if seen_bases.insert(record.package_base.clone()) {
                catalog.bases.push(record.package_base.clone());
            }
        }

        // Names arrive sorted, so their buckets are already ordered;
        // bases are deduplicated in encounter order and need the sort.
        catalog.bases.sort();
        for base in &catalog.bases {
            if let Some(&b) = base.as_bytes().first() {
                catalog.suggest_bases.entry(b).or_default().push(base.clone());
            }
        }

        catalog.records = records;
        Ok(catalog)
    }

    /// Number of packages in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index_record(&mut self, record: &Arc<PackageRecord>) {
        self.by_name
            .insert(record.name.clone(), Arc::clone(record));
        self.names.push(record.name.clone());
        self.desc_index.push(DescEntry {
            record: Arc::clone(record),
            description: record
                .description
                .as_deref()
                .unwrap_or("")
                .to_lowercase(),
        });
        if let Some(&b) = record.name.as_bytes().first() {
            self.suggest_names
                .entry(b)
                .or_default()
                .push(record.name.clone());
        }

        let dep_axes: [(&str, &[String]); 7] = [
            ("dep", &record.depends),
            ("mdep", &record.make_depends),
            ("odep", &record.opt_depends),
            ("cdep", &record.check_depends),
            ("con", &record.conflicts),
            ("rep", &record.replaces),
            ("grp", &record.groups),
        ];
        for (tag, list) in dep_axes {
            for raw in list {
                self.add_ref(tag, strip_constraint(raw), record);
            }
        }
        for raw in &record.provides {
            let token = strip_constraint(raw);
            if token != record.name {
                self.add_ref("pro", token, record);
            }
        }
        for raw in &record.keywords {
            self.add_ref("key", &strip_constraint(raw).to_lowercase(), record);
        }

        let maintainer = record.maintainer.as_deref().unwrap_or("").to_lowercase();
        self.add_ref("m", &maintainer, record);
        let submitter = record.submitter.as_deref().unwrap_or("").to_lowercase();
        self.add_ref("s", &submitter, record);
        for co in &record.co_maintainers {
            self.add_ref("com", &co.to_lowercase(), record);
        }
    }

    fn add_ref(&mut self, tag: &str, token: &str, record: &Arc<PackageRecord>) {
        self.refs
            .entry(format!("{tag}-{token}"))
            .or_default()
            .push(Arc::clone(record));
    }
}

/// Cut a dependency-like entry down to the bare package name by dropping
/// everything at or after the first version-constraint or description
/// character (`>`, `<`, `:`, `=`).
#[must_use]
pub fn strip_constraint(raw: &str) -> &str {
    match raw.find(|c| matches!(c, '>' | '<' | ':' | '=')) {
        Some(i) => &raw[..i],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_constraint_cuts_at_first_marker() {
        assert_eq!(strip_constraint("glibc>=2.35"), "glibc");
        assert_eq!(strip_constraint("python<4"), "python");
        assert_eq!(strip_constraint("java-environment=17"), "java-environment");
        assert_eq!(strip_constraint("mpv: video preview"), "mpv");
        assert_eq!(strip_constraint("plain"), "plain");
    }

    #[test]
    fn build_rejects_malformed_json() {
        assert!(Catalog::build(b"{\"not\":\"an array\"}").is_err());
        assert!(Catalog::build(b"[{\"Name\":").is_err());
    }

    #[test]
    fn empty_snapshot_builds_empty_catalog() {
        let catalog = Catalog::build(b"[]").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.refs.is_empty());
    }
}
