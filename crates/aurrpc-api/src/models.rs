//! Response envelope and the per-version record projections.
//!
//! The v5 surface is bug-for-bug compatible with the legacy PHP interface:
//! absent optional fields serialize as explicit `null`, `Keywords` and
//! `License` are always arrays, and list fields are elided when empty. The
//! v6 surface elides every absent-or-zero field instead.

use aurrpc_core::PackageRecord;
use serde::Serialize;

/// The JSON envelope returned by every info/search call.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResult {
    /// Error message; omitted from the JSON when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of results (0 for error envelopes).
    pub resultcount: usize,
    /// The result records; always a JSON array, never `null`.
    pub results: Vec<ResultRecord>,
    /// Query family echoed back (`multiinfo`, `search`, `msearch`, `error`).
    #[serde(rename = "type")]
    pub kind: String,
    /// API version; `null` when the request did not carry a usable one.
    pub version: Option<i64>,
}

impl RpcResult {
    /// An envelope with no results for the given query family.
    #[must_use]
    pub fn empty(kind: &str) -> Self {
        Self {
            error: None,
            resultcount: 0,
            results: Vec::new(),
            kind: kind.to_owned(),
            version: None,
        }
    }

    /// An error envelope carrying `message`.
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            error: Some(message.to_owned()),
            ..Self::empty("error")
        }
    }
}

/// One record in `results`, shaped per surface version.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultRecord {
    /// v5 info projection.
    Info(Box<InfoRecord>),
    /// v5 search projection.
    Search(Box<SearchRecord>),
    /// v6 projection with omitempty semantics.
    V6(Box<PackageData>),
}

/// v5 `info`/`multiinfo` record shape.
#[derive(Debug, Clone, Serialize)]
pub struct InfoRecord {
    #[serde(rename = "CoMaintainers", skip_serializing_if = "Vec::is_empty")]
    /// `co_maintainers` field.
    pub co_maintainers: Vec<String>,
    #[serde(rename = "CheckDepends", skip_serializing_if = "Vec::is_empty")]
    /// `check_depends` field.
    pub check_depends: Vec<String>,
    #[serde(rename = "Conflicts", skip_serializing_if = "Vec::is_empty")]
    /// `conflicts` field.
    pub conflicts: Vec<String>,
    #[serde(rename = "Depends", skip_serializing_if = "Vec::is_empty")]
    /// `depends` field.
    pub depends: Vec<String>,
    /// Serialized as `null` when absent.
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "FirstSubmitted")]
    /// `first_submitted` field.
    pub first_submitted: i64,
    #[serde(rename = "Groups", skip_serializing_if = "Vec::is_empty")]
    /// `groups` field.
    pub groups: Vec<String>,
    #[serde(rename = "ID")]
    /// `id` field.
    pub id: i64,
    /// Always present, an empty array when the package has none.
    #[serde(rename = "Keywords")]
    pub keywords: Vec<String>,
    #[serde(rename = "LastModified")]
    /// `last_modified` field.
    pub last_modified: i64,
    /// Always present, an empty array when the package has none.
    #[serde(rename = "License")]
    pub license: Vec<String>,
    /// Serialized as `null` for orphaned packages.
    #[serde(rename = "Maintainer")]
    pub maintainer: Option<String>,
    #[serde(rename = "MakeDepends", skip_serializing_if = "Vec::is_empty")]
    /// `make_depends` field.
    pub make_depends: Vec<String>,
    #[serde(rename = "Name")]
    /// `name` field.
    pub name: String,
    #[serde(rename = "NumVotes")]
    /// `num_votes` field.
    pub num_votes: i64,
    #[serde(rename = "OptDepends", skip_serializing_if = "Vec::is_empty")]
    /// `opt_depends` field.
    pub opt_depends: Vec<String>,
    /// Serialized as `null` when the package is not flagged.
    #[serde(rename = "OutOfDate")]
    pub out_of_date: Option<i64>,
    #[serde(rename = "PackageBase")]
    /// `package_base` field.
    pub package_base: String,
    #[serde(rename = "PackageBaseID")]
    /// `package_base_id` field.
    pub package_base_id: i64,
    #[serde(rename = "Popularity")]
    /// `popularity` field.
    pub popularity: f64,
    #[serde(rename = "Provides", skip_serializing_if = "Vec::is_empty")]
    /// `provides` field.
    pub provides: Vec<String>,
    #[serde(rename = "Replaces", skip_serializing_if = "Vec::is_empty")]
    /// `replaces` field.
    pub replaces: Vec<String>,
    /// Unlike `Maintainer`, never `null`: the key is omitted when the
    /// record has no submitter, and an empty name counts as none.
    #[serde(rename = "Submitter", skip_serializing_if = "is_absent")]
    pub submitter: Option<String>,
    /// Serialized as `null` when absent.
    #[serde(rename = "URL")]
    pub url: Option<String>,
    /// Serialized as `null` when absent.
    #[serde(rename = "URLPath")]
    pub url_path: Option<String>,
    #[serde(rename = "Version")]
    /// `version` field.
    pub version: String,
}

impl From<&PackageRecord> for InfoRecord {
    fn from(r: &PackageRecord) -> Self {
        Self {
            co_maintainers: r.co_maintainers.clone(),
            check_depends: r.check_depends.clone(),
            conflicts: r.conflicts.clone(),
            depends: r.depends.clone(),
            description: r.description.clone(),
            first_submitted: r.first_submitted,
            groups: r.groups.clone(),
            id: r.id,
            keywords: r.keywords.clone(),
            last_modified: r.last_modified,
            license: r.license.clone(),
            maintainer: r.maintainer.clone(),
            make_depends: r.make_depends.clone(),
            name: r.name.clone(),
            num_votes: r.num_votes,
            opt_depends: r.opt_depends.clone(),
            out_of_date: r.out_of_date,
            package_base: r.package_base.clone(),
            package_base_id: r.package_base_id,
            popularity: r.popularity,
            provides: r.provides.clone(),
            replaces: r.replaces.clone(),
            submitter: r.submitter.clone(),
            url: r.url.clone(),
            url_path: r.url_path.clone(),
            version: r.version.clone(),
        }
    }
}

/// v5 `search`/`msearch` record shape.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    /// Serialized as `null` when absent.
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "FirstSubmitted")]
    /// `first_submitted` field.
    pub first_submitted: i64,
    #[serde(rename = "ID")]
    /// `id` field.
    pub id: i64,
    #[serde(rename = "LastModified")]
    /// `last_modified` field.
    pub last_modified: i64,
    /// Serialized as `null` for orphaned packages.
    #[serde(rename = "Maintainer")]
    pub maintainer: Option<String>,
    #[serde(rename = "Name")]
    /// `name` field.
    pub name: String,
    #[serde(rename = "NumVotes")]
    /// `num_votes` field.
    pub num_votes: i64,
    /// Serialized as `null` when the package is not flagged.
    #[serde(rename = "OutOfDate")]
    pub out_of_date: Option<i64>,
    #[serde(rename = "PackageBase")]
    /// `package_base` field.
    pub package_base: String,
    #[serde(rename = "PackageBaseID")]
    /// `package_base_id` field.
    pub package_base_id: i64,
    #[serde(rename = "Popularity")]
    /// `popularity` field.
    pub popularity: f64,
    /// Serialized as `null` when absent.
    #[serde(rename = "URL")]
    pub url: Option<String>,
    /// Serialized as `null` when absent.
    #[serde(rename = "URLPath")]
    pub url_path: Option<String>,
    #[serde(rename = "Version")]
    /// `version` field.
    pub version: String,
}

impl From<&PackageRecord> for SearchRecord {
    fn from(r: &PackageRecord) -> Self {
        Self {
            description: r.description.clone(),
            first_submitted: r.first_submitted,
            id: r.id,
            last_modified: r.last_modified,
            maintainer: r.maintainer.clone(),
            name: r.name.clone(),
            num_votes: r.num_votes,
            out_of_date: r.out_of_date,
            package_base: r.package_base.clone(),
            package_base_id: r.package_base_id,
            popularity: r.popularity,
            url: r.url.clone(),
            url_path: r.url_path.clone(),
            version: r.version.clone(),
        }
    }
}

/// String-omitempty semantics: a missing value and an empty string both
/// drop the key.
fn is_absent(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, str::is_empty)
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

fn is_zero_f(v: &f64) -> bool {
    *v == 0.0
}

/// v6 record shape: every absent-or-zero field is elided.
#[derive(Debug, Clone, Serialize)]
pub struct PackageData {
    #[serde(rename = "Name", skip_serializing_if = "String::is_empty")]
    /// `name` field.
    pub name: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    /// `description` field.
    pub description: Option<String>,
    #[serde(rename = "Version", skip_serializing_if = "String::is_empty")]
    /// `version` field.
    pub version: String,
    #[serde(rename = "PackageBase", skip_serializing_if = "String::is_empty")]
    /// `package_base` field.
    pub package_base: String,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    /// `url` field.
    pub url: Option<String>,
    #[serde(rename = "URLPath", skip_serializing_if = "Option::is_none")]
    /// `url_path` field.
    pub url_path: Option<String>,
    #[serde(rename = "Maintainer", skip_serializing_if = "Option::is_none")]
    /// `maintainer` field.
    pub maintainer: Option<String>,
    #[serde(rename = "Submitter", skip_serializing_if = "is_absent")]
    /// `submitter` field.
    pub submitter: Option<String>,
    #[serde(rename = "FirstSubmitted", skip_serializing_if = "is_zero")]
    /// `first_submitted` field.
    pub first_submitted: i64,
    #[serde(rename = "LastModified", skip_serializing_if = "is_zero")]
    /// `last_modified` field.
    pub last_modified: i64,
    #[serde(rename = "OutOfDate", skip_serializing_if = "Option::is_none")]
    /// `out_of_date` field.
    pub out_of_date: Option<i64>,
    #[serde(rename = "NumVotes", skip_serializing_if = "is_zero")]
    /// `num_votes` field.
    pub num_votes: i64,
    #[serde(rename = "Popularity", skip_serializing_if = "is_zero_f")]
    /// `popularity` field.
    pub popularity: f64,
    #[serde(rename = "License", skip_serializing_if = "Vec::is_empty")]
    /// `license` field.
    pub license: Vec<String>,
    #[serde(rename = "Depends", skip_serializing_if = "Vec::is_empty")]
    /// `depends` field.
    pub depends: Vec<String>,
    #[serde(rename = "MakeDepends", skip_serializing_if = "Vec::is_empty")]
    /// `make_depends` field.
    pub make_depends: Vec<String>,
    #[serde(rename = "OptDepends", skip_serializing_if = "Vec::is_empty")]
    /// `opt_depends` field.
    pub opt_depends: Vec<String>,
    #[serde(rename = "CheckDepends", skip_serializing_if = "Vec::is_empty")]
    /// `check_depends` field.
    pub check_depends: Vec<String>,
    #[serde(rename = "Provides", skip_serializing_if = "Vec::is_empty")]
    /// `provides` field.
    pub provides: Vec<String>,
    #[serde(rename = "Conflicts", skip_serializing_if = "Vec::is_empty")]
    /// `conflicts` field.
    pub conflicts: Vec<String>,
    #[serde(rename = "Replaces", skip_serializing_if = "Vec::is_empty")]
    /// `replaces` field.
    pub replaces: Vec<String>,
    #[serde(rename = "Groups", skip_serializing_if = "Vec::is_empty")]
    /// `groups` field.
    pub groups: Vec<String>,
    #[serde(rename = "Keywords", skip_serializing_if = "Vec::is_empty")]
    /// `keywords` field.
    pub keywords: Vec<String>,
    #[serde(rename = "CoMaintainers", skip_serializing_if = "Vec::is_empty")]
    /// `co_maintainers` field.
    pub co_maintainers: Vec<String>,
}

impl From<&PackageRecord> for PackageData {
    fn from(r: &PackageRecord) -> Self {
        Self {
            name: r.name.clone(),
            description: r.description.clone(),
            version: r.version.clone(),
            package_base: r.package_base.clone(),
            url: r.url.clone(),
            url_path: r.url_path.clone(),
            maintainer: r.maintainer.clone(),
            submitter: r.submitter.clone(),
            first_submitted: r.first_submitted,
            last_modified: r.last_modified,
            out_of_date: r.out_of_date,
            num_votes: r.num_votes,
            popularity: r.popularity,
            license: r.license.clone(),
            depends: r.depends.clone(),
            make_depends: r.make_depends.clone(),
            opt_depends: r.opt_depends.clone(),
            check_depends: r.check_depends.clone(),
            provides: r.provides.clone(),
            conflicts: r.conflicts.clone(),
            replaces: r.replaces.clone(),
            groups: r.groups.clone(),
            keywords: r.keywords.clone(),
            co_maintainers: r.co_maintainers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PackageRecord {
        serde_json::from_value(serde_json::json!({
            "ID": 1, "Name": "attest", "PackageBaseID": 1, "PackageBase": "attest",
            "Version": "1.0-1", "NumVotes": 0, "Popularity": 0.0,
            "FirstSubmitted": 100, "LastModified": 200
        }))
        .unwrap()
    }

    #[test]
    fn v5_info_serializes_explicit_nulls() {
        let info = InfoRecord::from(&record());
        let value = serde_json::to_value(&info).unwrap();
        assert!(value["Description"].is_null());
        assert!(value["Maintainer"].is_null());
        assert!(value["OutOfDate"].is_null());
        assert_eq!(value["Keywords"], serde_json::json!([]));
        assert_eq!(value["License"], serde_json::json!([]));
        assert!(value.get("Depends").is_none());
        assert!(value.get("Submitter").is_none());
    }

    #[test]
    fn empty_submitter_is_omitted_like_a_missing_one() {
        let mut r = record();
        r.submitter = Some(String::new());
        let value = serde_json::to_value(InfoRecord::from(&r)).unwrap();
        assert!(value.get("Submitter").is_none());
        let value = serde_json::to_value(PackageData::from(&r)).unwrap();
        assert!(value.get("Submitter").is_none());

        r.submitter = Some("someone".to_owned());
        let value = serde_json::to_value(InfoRecord::from(&r)).unwrap();
        assert_eq!(value["Submitter"], "someone");
        // Maintainer keeps its explicit null; Submitter alone is elided.
        assert!(value["Maintainer"].is_null());
    }

    #[test]
    fn v6_elides_absent_and_zero_fields() {
        let data = PackageData::from(&record());
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("Description").is_none());
        assert!(value.get("NumVotes").is_none());
        assert!(value.get("Popularity").is_none());
        assert!(value.get("Keywords").is_none());
        assert_eq!(value["Name"], "attest");
        assert_eq!(value["FirstSubmitted"], 100);
    }

    #[test]
    fn error_is_omitted_from_ok_envelopes() {
        let value = serde_json::to_value(RpcResult::empty("search")).unwrap();
        assert!(value.get("error").is_none());
        assert!(value["version"].is_null());
        assert_eq!(value["results"], serde_json::json!([]));
    }
}
