use aurrpc_core::Catalog;
use serde_json::json;

fn fixture() -> Vec<u8> {
    serde_json::to_vec(&json!([
        {
            "ID": 101, "Name": "zig-dev", "PackageBaseID": 101, "PackageBase": "zig-dev",
            "Version": "0.12-1", "Description": "Zig nightly", "NumVotes": 3, "Popularity": 0.5,
            "FirstSubmitted": 1600000000, "LastModified": 1650000000,
            "Maintainer": "Andrew", "Submitter": "andrew",
            "Depends": ["glibc>=2.35", "llvm"], "Provides": ["zig", "zig-dev=0.12"],
            "Keywords": ["Compiler"], "CoMaintainers": ["Helper"]
        },
        {
            "ID": 55, "Name": "acme", "PackageBaseID": 50, "PackageBase": "acme-base",
            "Version": "1.0-1", "Description": null, "NumVotes": 0, "Popularity": 0.0,
            "FirstSubmitted": 1500000000, "LastModified": 1500000000,
            "OptDepends": ["mpv: video preview"], "Conflicts": ["acme-git"],
            "Groups": ["editors"]
        },
        {
            "ID": 56, "Name": "acme-git", "PackageBaseID": 50, "PackageBase": "acme-base",
            "Version": "1.1.r3-1", "NumVotes": 1, "Popularity": 0.1,
            "FirstSubmitted": 1510000000, "LastModified": 1510000000,
            "Maintainer": "Helper", "Provides": ["acme"], "Replaces": ["acme-svn"]
        }
    ]))
    .unwrap()
}

#[test]
fn names_and_primary_map_agree() {
    let catalog = Catalog::build(&fixture()).unwrap();
    assert_eq!(catalog.len(), 3);
    for name in &catalog.names {
        assert_eq!(&catalog.by_name[name].name, name);
    }
    assert_eq!(catalog.names.len(), catalog.by_name.len());
}

#[test]
fn names_are_strictly_ascending() {
    let catalog = Catalog::build(&fixture()).unwrap();
    assert!(catalog.names.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(catalog.names, ["acme", "acme-git", "zig-dev"]);
}

#[test]
fn suggestion_buckets_hold_only_their_byte() {
    let catalog = Catalog::build(&fixture()).unwrap();
    for (b, bucket) in &catalog.suggest_names {
        assert!(bucket.iter().all(|s| s.as_bytes()[0] == *b));
        assert!(bucket.windows(2).all(|w| w[0] <= w[1]));
    }
    for (b, bucket) in &catalog.suggest_bases {
        assert!(bucket.iter().all(|s| s.as_bytes()[0] == *b));
        assert!(bucket.windows(2).all(|w| w[0] <= w[1]));
    }
    // Two split packages share acme-base; the bases list deduplicates.
    assert_eq!(catalog.bases, ["acme-base", "zig-dev"]);
}

#[test]
fn dependency_tokens_are_stripped() {
    let catalog = Catalog::build(&fixture()).unwrap();
    assert_eq!(catalog.refs["dep-glibc"][0].name, "zig-dev");
    assert_eq!(catalog.refs["dep-llvm"][0].name, "zig-dev");
    assert_eq!(catalog.refs["odep-mpv"][0].name, "acme");
    assert_eq!(catalog.refs["con-acme-git"][0].name, "acme");
    assert_eq!(catalog.refs["rep-acme-svn"][0].name, "acme-git");
    assert_eq!(catalog.refs["grp-editors"][0].name, "acme");
    assert!(!catalog.refs.contains_key("dep-glibc>=2.35"));
}

#[test]
fn people_and_keyword_tokens_are_lowercased() {
    let catalog = Catalog::build(&fixture()).unwrap();
    assert_eq!(catalog.refs["m-andrew"][0].name, "zig-dev");
    assert_eq!(catalog.refs["m-helper"][0].name, "acme-git");
    assert_eq!(catalog.refs["s-andrew"][0].name, "zig-dev");
    assert_eq!(catalog.refs["com-helper"][0].name, "zig-dev");
    assert_eq!(catalog.refs["key-compiler"][0].name, "zig-dev");
    assert!(!catalog.refs.contains_key("key-Compiler"));
    // Orphans index under the empty maintainer token.
    assert!(catalog.refs["m-"].iter().any(|r| r.name == "acme"));
}

#[test]
fn provides_never_references_itself() {
    let catalog = Catalog::build(&fixture()).unwrap();
    // "zig-dev=0.12" strips to the package's own name and is skipped.
    assert!(!catalog.refs.contains_key("pro-zig-dev"));
    assert_eq!(catalog.refs["pro-zig"][0].name, "zig-dev");
    assert_eq!(catalog.refs["pro-acme"][0].name, "acme-git");
    for (key, records) in &catalog.refs {
        if let Some(token) = key.strip_prefix("pro-") {
            assert!(records.iter().all(|r| r.name != token));
        }
    }
}

#[test]
fn refs_point_into_the_record_set() {
    let catalog = Catalog::build(&fixture()).unwrap();
    for records in catalog.refs.values() {
        for record in records {
            assert!(catalog.by_name.contains_key(&record.name));
        }
    }
}
