//! Request parameter canonicalization and validation.
//!
//! Both surfaces funnel into one canonical parameter set: the legacy v5
//! query string (or POST form) and the path-based v6 tree. Path-captured
//! values always win over query/form values, and the single-valued `arg`
//! wins over the repeated `arg[]` — a legacy quirk callers depend on.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use thiserror::Error;

/// Validation failures, surfaced verbatim in the JSON error envelope.
/// The wording is frozen for compatibility with the legacy interface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// No `v` parameter.
    #[error("Please specify an API version.")]
    MissingVersion,
    /// `v` is not a supported version.
    #[error("Invalid version specified.")]
    InvalidVersion,
    /// No `type` parameter.
    #[error("No request type/data specified.")]
    MissingType,
    /// Unknown `type`.
    #[error("Incorrect request type specified.")]
    InvalidType,
    /// Unknown `by` axis.
    #[error("Incorrect by field specified.")]
    InvalidBy,
    /// Unknown match mode.
    #[error("Incorrect mode specified.")]
    InvalidMode,
    /// No `arg`/`arg[]` under v5 (maintainer searches excepted).
    #[error("No request type/data specified.")]
    MissingArg,
    /// No argument under v6 (maintainer searches excepted).
    #[error("No request data specified.")]
    MissingData,
    /// Substring search argument shorter than two characters.
    #[error("Query arg too small.")]
    ArgTooSmall,
    /// JSONP callback name fails the allowed pattern.
    #[error("Invalid callback name.")]
    InvalidCallback,
}

/// Query families accepted by the RPC surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Single-package info lookup.
    Info,
    /// Batch info lookup over multiple packages.
    MultiInfo,
    /// Full-text search.
    Search,
    /// Full-text search restricted to maintainer-scoped fields.
    MSearch,
    /// Autocomplete suggestions.
    Suggest,
    /// Autocomplete suggestions scoped to package bases.
    SuggestPkgbase,
    /// OpenSearch-format autocomplete suggestions.
    OpensearchSuggest,
    /// OpenSearch-format autocomplete suggestions scoped to package bases.
    OpensearchSuggestPkgbase,
}

impl QueryKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "info" => Some(Self::Info),
            "multiinfo" => Some(Self::MultiInfo),
            "search" => Some(Self::Search),
            "msearch" => Some(Self::MSearch),
            "suggest" => Some(Self::Suggest),
            "suggest-pkgbase" => Some(Self::SuggestPkgbase),
            "opensearch-suggest" => Some(Self::OpensearchSuggest),
            "opensearch-suggest-pkgbase" => Some(Self::OpensearchSuggestPkgbase),
            _ => None,
        }
    }

    /// Whether this is one of the suggest/autocomplete families.
    #[must_use]
    pub fn is_suggest(self) -> bool {
        matches!(
            self,
            Self::Suggest
                | Self::SuggestPkgbase
                | Self::OpensearchSuggest
                | Self::OpensearchSuggestPkgbase
        )
    }

    /// Whether this is one of the info families.
    #[must_use]
    pub fn is_info(self) -> bool {
        matches!(self, Self::Info | Self::MultiInfo)
    }

    /// The `type` value echoed in the response envelope.
    #[must_use]
    pub fn response_name(self) -> &'static str {
        match self {
            Self::Info | Self::MultiInfo => "multiinfo",
            Self::MSearch => "msearch",
            _ => "search",
        }
    }
}

/// The attribute of a package a search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Package name.
    Name,
    /// Package name and description.
    NameDesc,
    /// Package maintainer.
    Maintainer,
    /// Package submitter.
    Submitter,
    /// Package co-maintainers.
    CoMaintainers,
    /// Runtime dependencies.
    Depends,
    /// Build-time dependencies.
    MakeDepends,
    /// Optional dependencies.
    OptDepends,
    /// Check/test dependencies.
    CheckDepends,
    /// Provided package names.
    Provides,
    /// Conflicting package names.
    Conflicts,
    /// Replaced package names.
    Replaces,
    /// Package groups.
    Groups,
    /// Package keywords.
    Keywords,
}

impl Axis {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "name-desc" => Some(Self::NameDesc),
            "maintainer" => Some(Self::Maintainer),
            "submitter" => Some(Self::Submitter),
            "comaintainers" => Some(Self::CoMaintainers),
            "depends" => Some(Self::Depends),
            "makedepends" => Some(Self::MakeDepends),
            "optdepends" => Some(Self::OptDepends),
            "checkdepends" => Some(Self::CheckDepends),
            "provides" => Some(Self::Provides),
            "conflicts" => Some(Self::Conflicts),
            "replaces" => Some(Self::Replaces),
            "groups" => Some(Self::Groups),
            "keywords" => Some(Self::Keywords),
            _ => None,
        }
    }

    /// The canonical `by` parameter value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameDesc => "name-desc",
            Self::Maintainer => "maintainer",
            Self::Submitter => "submitter",
            Self::CoMaintainers => "comaintainers",
            Self::Depends => "depends",
            Self::MakeDepends => "makedepends",
            Self::OptDepends => "optdepends",
            Self::CheckDepends => "checkdepends",
            Self::Provides => "provides",
            Self::Conflicts => "conflicts",
            Self::Replaces => "replaces",
            Self::Groups => "groups",
            Self::Keywords => "keywords",
        }
    }

    /// The inverted-index tag for this axis; `None` for the two scanning
    /// axes (`name`, `name-desc`).
    #[must_use]
    pub fn ref_tag(self) -> Option<&'static str> {
        match self {
            Self::Name | Self::NameDesc => None,
            Self::Maintainer => Some("m"),
            Self::Submitter => Some("s"),
            Self::CoMaintainers => Some("com"),
            Self::Depends => Some("dep"),
            Self::MakeDepends => Some("mdep"),
            Self::OptDepends => Some("odep"),
            Self::CheckDepends => Some("cdep"),
            Self::Provides => Some("pro"),
            Self::Conflicts => Some("con"),
            Self::Replaces => Some("rep"),
            Self::Groups => Some("grp"),
            Self::Keywords => Some("key"),
        }
    }

    fn default_for(kind: QueryKind) -> Self {
        if kind.is_info() {
            Self::Name
        } else {
            Self::NameDesc
        }
    }
}

/// How the scanning axes match a term against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Substring match (the default).
    Contains,
    /// Prefix match.
    StartsWith,
}

impl MatchMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "contains" => Some(Self::Contains),
            "starts-with" => Some(Self::StartsWith),
            _ => None,
        }
    }

    /// The canonical `mode` parameter value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
        }
    }

    /// Apply the mode to a candidate string.
    #[must_use]
    pub fn matches(self, candidate: &str, term: &str) -> bool {
        match self {
            Self::Contains => candidate.contains(term),
            Self::StartsWith => candidate.starts_with(term),
        }
    }
}

/// Parameters as they arrived, before validation. Built from query/form
/// pairs, then optionally overridden with path captures.
#[derive(Debug, Default)]
pub struct RawParams {
    v: Option<String>,
    kind: Option<String>,
    by: Option<String>,
    mode: Option<String>,
    callback: Option<String>,
    /// First `arg` value.
    arg: Option<String>,
    /// All `arg` values in request order (the v6 surface accepts repeats).
    arg_values: Vec<String>,
    /// All `arg[]` values in request order.
    arg_arr: Vec<String>,
    has_arg: bool,
    has_arg_arr: bool,
    seen_any: bool,
}

impl RawParams {
    /// Collect parameters from decoded query-string or form pairs.
    /// Single-valued parameters keep their first occurrence.
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = Self {
            seen_any: !pairs.is_empty(),
            ..Self::default()
        };
        for (key, value) in pairs {
            match key.as_str() {
                "v" => set_first(&mut params.v, value),
                "type" => set_first(&mut params.kind, value),
                "by" => set_first(&mut params.by, value),
                "mode" => set_first(&mut params.mode, value),
                "callback" => set_first(&mut params.callback, value),
                "arg" => {
                    params.has_arg = true;
                    set_first(&mut params.arg, value);
                    params.arg_values.push(value.clone());
                }
                "arg[]" => {
                    params.has_arg_arr = true;
                    params.arg_arr.push(value.clone());
                }
                _ => {}
            }
        }
        params
    }

    /// Whether the request carried no parameters at all (the bare `/rpc`
    /// call that redirects to the documentation).
    #[must_use]
    pub fn is_unset(&self) -> bool {
        !self.seen_any
    }

    /// Override the API version from a path capture (`v5` → `5`).
    pub fn set_path_version(&mut self, raw: &str) {
        let version = raw.strip_prefix('v').unwrap_or(raw);
        self.v = Some(version.to_owned());
        self.seen_any = true;
    }

    /// Override the query type from a path capture.
    pub fn set_path_kind(&mut self, raw: &str) {
        self.kind = Some(raw.to_owned());
        self.seen_any = true;
    }

    /// Override the search axis from a path capture.
    pub fn set_path_by(&mut self, raw: &str) {
        self.by = Some(raw.to_owned());
        self.seen_any = true;
    }

    /// Override the match mode from a path capture.
    pub fn set_path_mode(&mut self, raw: &str) {
        self.mode = Some(raw.to_owned());
        self.seen_any = true;
    }

    /// Override the argument from a path capture; discards any query args.
    pub fn set_path_arg(&mut self, raw: &str) {
        self.has_arg = true;
        self.arg = Some(raw.to_owned());
        self.arg_values = vec![raw.to_owned()];
        self.seen_any = true;
    }

    /// Parse the `v` parameter the way the legacy surface did: anything
    /// unparsable counts as 0, which serializes as a `null` version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.v
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// The callback parameter if present and syntactically valid; used for
    /// wrapping *error* envelopes, where an invalid name is dropped rather
    /// than reported.
    #[must_use]
    pub fn safe_callback(&self) -> Option<&str> {
        self.callback
            .as_deref()
            .filter(|cb| is_valid_callback(cb))
    }
}

fn set_first(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_owned());
    }
}

/// The canonical, validated query.
#[derive(Debug, PartialEq)]
pub struct RpcQuery {
    /// Parsed API version (5 or 6 after validation).
    pub version: i64,
    /// Whether the request came in over the v6 surface.
    pub v6: bool,
    /// The query family being served.
    pub kind: QueryKind,
    /// The package attribute the search targets.
    pub axis: Axis,
    /// The match mode used when comparing arguments.
    pub mode: MatchMode,
    /// Arguments, lowercased.
    pub args: Vec<String>,
    /// First argument before lowercasing (echoed by OpenSearch suggest).
    pub raw_arg: String,
    /// Validated JSONP callback (v5 only).
    pub callback: Option<String>,
}

/// Validate a legacy v5 request.
///
/// # Errors
///
/// Returns the [`QueryError`] whose message the envelope must carry.
pub fn validate_v5(raw: &RawParams) -> Result<RpcQuery, QueryError> {
    match raw.v.as_deref() {
        None | Some("") => return Err(QueryError::MissingVersion),
        Some("5") => {}
        Some(_) => return Err(QueryError::InvalidVersion),
    }
    let kind = match raw.kind.as_deref() {
        None | Some("") => return Err(QueryError::MissingType),
        Some(t) => QueryKind::parse(t).ok_or(QueryError::InvalidType)?,
    };
    let mut axis = match raw.by.as_deref() {
        None | Some("") => Axis::default_for(kind),
        Some(by) => Axis::parse(by).ok_or(QueryError::InvalidBy)?,
    };
    if kind == QueryKind::MSearch {
        axis = Axis::Maintainer;
    }

    if !raw.has_arg && !raw.has_arg_arr && axis != Axis::Maintainer {
        return Err(QueryError::MissingArg);
    }
    // The length check looks at both spellings even though only one is
    // honored below; the legacy surface did the same.
    if kind == QueryKind::Search && axis != Axis::Maintainer {
        let arg_short = raw.has_arg && raw.arg.as_deref().unwrap_or("").len() < 2;
        let arr_short = raw.has_arg_arr && raw.arg_arr.first().map_or(0, String::len) < 2;
        if arg_short || arr_short {
            return Err(QueryError::ArgTooSmall);
        }
    }

    let callback = match raw.callback.as_deref() {
        None | Some("") => None,
        Some(cb) => {
            if !is_valid_callback(cb) {
                return Err(QueryError::InvalidCallback);
            }
            Some(cb.to_owned())
        }
    };

    // A non-empty `arg` wins; otherwise every `arg[]` is taken.
    let chosen: Vec<&str> = if raw.arg.as_deref().is_some_and(|a| !a.is_empty()) {
        vec![raw.arg.as_deref().unwrap_or("")]
    } else {
        raw.arg_arr.iter().map(String::as_str).collect()
    };

    Ok(RpcQuery {
        version: 5,
        v6: false,
        kind,
        axis,
        mode: MatchMode::Contains,
        args: chosen.iter().map(|a| a.to_lowercase()).collect(),
        raw_arg: chosen.first().copied().unwrap_or("").to_owned(),
        callback,
    })
}

/// Validate a v6 request. The path arg (if any) has already been folded
/// into `raw` and wins over repeated `arg` query parameters.
///
/// # Errors
///
/// Returns the [`QueryError`] whose message the envelope must carry.
pub fn validate_v6(raw: &RawParams) -> Result<RpcQuery, QueryError> {
    let kind = match raw.kind.as_deref() {
        None | Some("") => return Err(QueryError::MissingType),
        Some(t) => QueryKind::parse(t).ok_or(QueryError::InvalidType)?,
    };
    let axis = match raw.by.as_deref() {
        None | Some("") => Axis::default_for(kind),
        Some(by) => Axis::parse(by).ok_or(QueryError::InvalidBy)?,
    };
    let mode = match raw.mode.as_deref() {
        None | Some("") => MatchMode::Contains,
        Some(m) => MatchMode::parse(m).ok_or(QueryError::InvalidMode)?,
    };

    if raw.arg_values.is_empty() && axis != Axis::Maintainer {
        return Err(QueryError::MissingData);
    }
    if kind == QueryKind::Search
        && axis != Axis::Maintainer
        && raw.arg_values.first().map_or(0, String::len) < 2
    {
        return Err(QueryError::ArgTooSmall);
    }

    Ok(RpcQuery {
        version: 6,
        v6: true,
        kind,
        axis,
        mode,
        args: raw.arg_values.iter().map(|a| a.to_lowercase()).collect(),
        raw_arg: raw.arg_values.first().cloned().unwrap_or_default(),
        callback: None,
    })
}

/// JSONP callback names: 1–128 characters from `[A-Za-z0-9()_.]`.
fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'(' | b')' | b'_' | b'.'))
}

/// Resolve the client IP: when the immediate peer is a trusted reverse
/// proxy, prefer `X-Real-IP`, then the first `X-Forwarded-For` entry;
/// otherwise the peer address itself.
#[must_use]
pub fn client_ip(peer: Option<SocketAddr>, headers: &HeaderMap, trusted: &[String]) -> String {
    let peer_ip = peer.map_or_else(|| "127.0.0.1".to_owned(), |addr| addr.ip().to_string());
    if !trusted.iter().any(|t| *t == peer_ip) {
        return peer_ip;
    }
    if let Some(real) = headers.get("X-Real-IP").and_then(|v| v.to_str().ok()) {
        if !real.is_empty() {
            return real.to_owned();
        }
    }
    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return first.to_owned();
        }
    }
    peer_ip
}
