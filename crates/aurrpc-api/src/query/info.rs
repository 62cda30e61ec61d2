//! Info evaluation: exact lookups by name, or per-axis unions under v6.

use std::collections::BTreeMap;
use std::sync::Arc;

use aurrpc_core::{Catalog, PackageRecord};

use crate::models::{InfoRecord, PackageData, ResultRecord, RpcResult};
use crate::params::{Axis, MatchMode, RpcQuery};
use crate::query::search::find_packages;

/// Evaluate an info query.
///
/// By name (always under v5), each argument is an exact lookup and hits
/// are emitted in argument order. Any other v6 axis unions the per-arg
/// axis matches by package name and emits them name-ascending; when the
/// union outgrows `max_results` only the count is reported and the
/// dispatcher raises the capacity error.
#[must_use]
pub fn info_result(catalog: &Catalog, query: &RpcQuery, max_results: usize) -> RpcResult {
    let mut rr = RpcResult::empty("multiinfo");

    if !query.v6 || query.axis == Axis::Name {
        for arg in &query.args {
            if let Some(record) = catalog.by_name.get(arg) {
                rr.results.push(project(record, query.v6));
            }
        }
        rr.resultcount = rr.results.len();
        return rr;
    }

    let mut unioned: BTreeMap<String, Arc<PackageRecord>> = BTreeMap::new();
    for arg in &query.args {
        let matches = find_packages(catalog, query.axis, MatchMode::Contains, arg, false);
        for record in matches.records {
            unioned.insert(record.name.clone(), record);
        }
        if unioned.len() > max_results {
            rr.resultcount = unioned.len();
            return rr;
        }
    }

    rr.resultcount = unioned.len();
    rr.results = unioned
        .into_values()
        .map(|record| project(&record, true))
        .collect();
    rr
}

fn project(record: &PackageRecord, v6: bool) -> ResultRecord {
    if v6 {
        ResultRecord::V6(Box::new(PackageData::from(record)))
    } else {
        ResultRecord::Info(Box::new(InfoRecord::from(record)))
    }
}
