//! Prefix autocomplete over the per-first-byte suggestion buckets.

use aurrpc_core::Catalog;

/// Autocomplete never returns more than this many entries.
const SUGGEST_LIMIT: usize = 20;

/// Collect up to 20 names (or distinct package bases when `pkg_base`)
/// starting with `arg`. An empty argument walks the full sorted list and
/// yields its first 20 entries.
#[must_use]
pub fn suggest(catalog: &Catalog, arg: &str, pkg_base: bool) -> Vec<String> {
    let pool: &[String] = if arg.is_empty() {
        if pkg_base {
            &catalog.bases
        } else {
            &catalog.names
        }
    } else {
        let map = if pkg_base {
            &catalog.suggest_bases
        } else {
            &catalog.suggest_names
        };
        map.get(&arg.as_bytes()[0]).map_or(&[][..], Vec::as_slice)
    };

    pool.iter()
        .filter(|entry| entry.starts_with(arg))
        .take(SUGGEST_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurrpc_core::Catalog;
    use serde_json::json;

    fn catalog() -> Catalog {
        let records: Vec<_> = (0..30)
            .map(|i| {
                json!({
                    "ID": i, "Name": format!("pkg-{i:02}"), "PackageBaseID": i,
                    "PackageBase": format!("base-{:02}", i / 2), "Version": "1-1",
                    "FirstSubmitted": 1, "LastModified": 1
                })
            })
            .collect();
        Catalog::build(&serde_json::to_vec(&records).unwrap()).unwrap()
    }

    #[test]
    fn empty_arg_returns_first_twenty() {
        let catalog = catalog();
        let names = suggest(&catalog, "", false);
        assert_eq!(names.len(), 20);
        assert_eq!(names[0], "pkg-00");
        assert_eq!(names[19], "pkg-19");
        // Bases deduplicate split packages before the cut.
        let bases = suggest(&catalog, "", true);
        assert_eq!(bases.len(), 15);
        assert_eq!(bases[0], "base-00");
    }

    #[test]
    fn prefix_match_stops_at_twenty() {
        let catalog = catalog();
        assert_eq!(suggest(&catalog, "pkg-2", false).len(), 10);
        assert_eq!(suggest(&catalog, "pkg", false).len(), 20);
        assert!(suggest(&catalog, "zzz", false).is_empty());
        assert!(suggest(&catalog, "pkg-05x", false).is_empty());
    }
}
