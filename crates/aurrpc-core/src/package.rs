//! The package record as it appears in the AUR metadata snapshot.

use serde::Deserialize;

/// One package as parsed from the metadata snapshot (a JSON array of these).
///
/// Scalar fields that the snapshot may carry as `null` are `Option`s; list
/// fields default to empty when absent so downstream code never branches on
/// missing lists.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PackageRecord {
    /// Numeric package id.
    #[serde(rename = "ID")]
    pub id: i64,
    /// Package name, unique across the snapshot.
    #[serde(rename = "Name")]
    pub name: String,
    /// Numeric id of the package base this package was split from.
    #[serde(rename = "PackageBaseID")]
    pub package_base_id: i64,
    /// Name of the package base.
    #[serde(rename = "PackageBase")]
    pub package_base: String,
    /// Full version string (`pkgver-pkgrel`).
    #[serde(rename = "Version")]
    pub version: String,
    /// One-line description.
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Upstream URL.
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    /// Number of votes.
    #[serde(rename = "NumVotes", default)]
    pub num_votes: i64,
    /// Popularity score.
    #[serde(rename = "Popularity", default)]
    pub popularity: f64,
    /// Epoch seconds of the out-of-date flag, if flagged.
    #[serde(rename = "OutOfDate", default)]
    pub out_of_date: Option<i64>,
    /// Current maintainer; `None` for orphaned packages.
    #[serde(rename = "Maintainer", default)]
    pub maintainer: Option<String>,
    /// Original submitter.
    #[serde(rename = "Submitter", default)]
    pub submitter: Option<String>,
    /// Epoch seconds of first submission.
    #[serde(rename = "FirstSubmitted")]
    pub first_submitted: i64,
    /// Epoch seconds of last modification.
    #[serde(rename = "LastModified")]
    pub last_modified: i64,
    /// Snapshot tarball path relative to the AUR host.
    #[serde(rename = "URLPath", default)]
    pub url_path: Option<String>,
    /// Runtime dependencies.
    #[serde(rename = "Depends", default)]
    pub depends: Vec<String>,
    /// Build-time dependencies.
    #[serde(rename = "MakeDepends", default)]
    pub make_depends: Vec<String>,
    /// Optional dependencies (`name: reason` entries).
    #[serde(rename = "OptDepends", default)]
    pub opt_depends: Vec<String>,
    /// Check-time dependencies.
    #[serde(rename = "CheckDepends", default)]
    pub check_depends: Vec<String>,
    /// Virtual packages this package provides.
    #[serde(rename = "Provides", default)]
    pub provides: Vec<String>,
    /// Conflicting package names.
    #[serde(rename = "Conflicts", default)]
    pub conflicts: Vec<String>,
    /// Package names this package replaces.
    #[serde(rename = "Replaces", default)]
    pub replaces: Vec<String>,
    /// Package groups.
    #[serde(rename = "Groups", default)]
    pub groups: Vec<String>,
    /// Search keywords.
    #[serde(rename = "Keywords", default)]
    pub keywords: Vec<String>,
    /// License identifiers.
    #[serde(rename = "License", default)]
    pub license: Vec<String>,
    /// Co-maintainer user names.
    #[serde(rename = "CoMaintainers", default)]
    pub co_maintainers: Vec<String>,
}
