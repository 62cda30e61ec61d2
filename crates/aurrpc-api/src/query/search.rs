//! Search evaluation: scanning axes over the sorted views, indexed axes
//! over the inverted index.

use std::collections::BTreeMap;
use std::sync::Arc;

use aurrpc_core::{Catalog, PackageRecord};

use crate::models::{PackageData, ResultRecord, RpcResult, SearchRecord};
use crate::params::{Axis, MatchMode, RpcQuery};

/// Records matching one argument on one axis, plus whether the lookup was
/// expensive enough to be worth caching. Indexed-axis lookups are O(1) and
/// skip the cache.
pub struct AxisMatches {
    /// Matching records, in index order.
    pub records: Vec<Arc<PackageRecord>>,
    /// Whether the result should go to the search cache.
    pub cacheable: bool,
}

/// Find packages matching `arg` on `axis`. `split_terms` enables the v6
/// conjunction: the argument is split on spaces and every term must match.
#[must_use]
pub fn find_packages(
    catalog: &Catalog,
    axis: Axis,
    mode: MatchMode,
    arg: &str,
    split_terms: bool,
) -> AxisMatches {
    match axis {
        Axis::Name => {
            let terms = terms_of(arg, split_terms);
            AxisMatches {
                records: catalog
                    .records
                    .iter()
                    .filter(|r| terms.iter().all(|t| mode.matches(&r.name, t)))
                    .map(Arc::clone)
                    .collect(),
                cacheable: true,
            }
        }
        Axis::NameDesc => {
            let terms = terms_of(arg, split_terms);
            AxisMatches {
                records: catalog
                    .desc_index
                    .iter()
                    .filter(|entry| {
                        terms.iter().all(|t| {
                            mode.matches(&entry.record.name, t)
                                || mode.matches(&entry.description, t)
                        })
                    })
                    .map(|entry| Arc::clone(&entry.record))
                    .collect(),
                cacheable: true,
            }
        }
        Axis::Provides => {
            // Providers of the name, plus the package carrying the name
            // itself if one exists.
            let mut records = refs_of(catalog, "pro", arg);
            if let Some(own) = catalog.by_name.get(arg) {
                records.push(Arc::clone(own));
            }
            AxisMatches {
                records,
                cacheable: false,
            }
        }
        _ => {
            let tag = axis.ref_tag().unwrap_or_default();
            AxisMatches {
                records: refs_of(catalog, tag, arg),
                cacheable: false,
            }
        }
    }
}

fn refs_of(catalog: &Catalog, tag: &str, token: &str) -> Vec<Arc<PackageRecord>> {
    catalog
        .refs
        .get(&format!("{tag}-{token}"))
        .map(|records| records.iter().map(Arc::clone).collect())
        .unwrap_or_default()
}

fn terms_of(arg: &str, split: bool) -> Vec<&str> {
    if split {
        arg.split(' ').collect()
    } else {
        vec![arg]
    }
}

/// Evaluate a search query: union the per-argument matches by package
/// name, bail out once the union outgrows `max_results` (the dispatcher
/// turns the oversized count into the capacity error), and project the
/// survivors in ascending name order.
///
/// The second value reports whether the result may be cached.
#[must_use]
pub fn search_result(catalog: &Catalog, query: &RpcQuery, max_results: usize) -> (RpcResult, bool) {
    let mut rr = RpcResult::empty(query.kind.response_name());

    // An absent argument still searches: a maintainer query with no arg
    // matches every package whose maintainer is the empty string. The v5
    // surface only ever honors one argument.
    let args: Vec<&str> = if query.v6 && !query.args.is_empty() {
        query.args.iter().map(String::as_str).collect()
    } else {
        vec![query.args.first().map_or("", String::as_str)]
    };

    let split_terms = query.v6;
    let mut unioned: BTreeMap<String, Arc<PackageRecord>> = BTreeMap::new();
    let mut cacheable = true;
    for arg in args {
        let matches = find_packages(catalog, query.axis, query.mode, arg, split_terms);
        cacheable &= matches.cacheable;
        for record in matches.records {
            unioned.insert(record.name.clone(), record);
        }
        if unioned.len() > max_results {
            rr.resultcount = unioned.len();
            return (rr, cacheable);
        }
    }

    rr.resultcount = unioned.len();
    rr.results = unioned
        .into_values()
        .map(|record| project(&record, query.v6))
        .collect();
    (rr, cacheable)
}

fn project(record: &PackageRecord, v6: bool) -> ResultRecord {
    if v6 {
        ResultRecord::V6(Box::new(PackageData::from(record)))
    } else {
        ResultRecord::Search(Box::new(SearchRecord::from(record)))
    }
}
