use steward_core::analysis::{find_duplicates, levenshtein, Normalizer, VersionClusterer};
use steward_core::storage::models::FileRecord;

fn make_test_record(id: i64, name: &str, hash: &str) -> FileRecord {
    FileRecord {
        id,
        path: format!("/root/{}", name),
        file_name: name.to_string(),
        file_size: 100,
        content_hash: hash.to_string(),
        created_at: 1700000000,
        last_modified: 1700000000,
        content: None,
        generation_id: Some(1),
    }
}

fn names(group: &[FileRecord]) -> Vec<&str> {
    group.iter().map(|r| r.file_name.as_str()).collect()
}

fn clusterer(tokens: &[&str]) -> VersionClusterer {
    VersionClusterer::new(Normalizer::new(
        tokens.iter().map(|t| t.to_string()).collect(),
    ))
}

#[test]
fn test_find_duplicates_example() {
    let records = vec![
        make_test_record(1, "a.txt", "H1"),
        make_test_record(2, "b.txt", "H1"),
        make_test_record(3, "c.txt", "H2"),
    ];
    let groups = find_duplicates(&records);
    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0]), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_find_duplicates_never_singletons_and_digests_match() {
    let records = vec![
        make_test_record(1, "a", "x"),
        make_test_record(2, "b", "y"),
        make_test_record(3, "c", "x"),
        make_test_record(4, "d", "z"),
        make_test_record(5, "e", "y"),
        make_test_record(6, "f", "x"),
    ];
    let groups = find_duplicates(&records);
    assert_eq!(groups.len(), 2);
    for group in &groups {
        assert!(group.len() > 1);
        assert!(group.iter().all(|r| r.content_hash == group[0].content_hash));
    }
    // First-seen order across groups, catalog order within.
    assert_eq!(names(&groups[0]), vec!["a", "c", "f"]);
    assert_eq!(names(&groups[1]), vec!["b", "e"]);
}

#[test]
fn test_find_duplicates_empty_catalog() {
    assert!(find_duplicates(&[]).is_empty());
}

#[test]
fn test_version_groups_example_with_marker_token() {
    let records = vec![
        make_test_record(1, "report.txt", "h1"),
        make_test_record(2, "report_v1.txt", "h2"),
        make_test_record(3, "summary.txt", "h3"),
    ];
    let groups = clusterer(&["_v1"]).find_version_groups(&records, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0]), vec!["report.txt", "report_v1.txt"]);
}

#[test]
fn test_version_threshold_is_inclusive() {
    // "notes.txt" -> "notes12.txt" is 2 edits, "notes123.txt" is 3.
    let records = vec![
        make_test_record(1, "notes.txt", "h1"),
        make_test_record(2, "notes12.txt", "h2"),
    ];
    assert_eq!(levenshtein("notes.txt", "notes12.txt"), 2);
    assert_eq!(clusterer(&[]).find_version_groups(&records, 2).len(), 1);

    let records = vec![
        make_test_record(1, "notes.txt", "h1"),
        make_test_record(2, "notes123.txt", "h2"),
    ];
    assert_eq!(levenshtein("notes.txt", "notes123.txt"), 3);
    assert!(clusterer(&[]).find_version_groups(&records, 2).is_empty());
}

#[test]
fn test_version_groups_are_seed_based_not_transitive() {
    // "ab.txt" is 1 from the seed and "abcde.txt" is 2, but they are 3
    // apart from each other. Both still join the seed's group.
    let records = vec![
        make_test_record(1, "abc.txt", "h1"),
        make_test_record(2, "ab.txt", "h2"),
        make_test_record(3, "abcde.txt", "h3"),
    ];
    assert_eq!(levenshtein("ab.txt", "abcde.txt"), 3);

    let groups = clusterer(&[]).find_version_groups(&records, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0]), vec!["abc.txt", "ab.txt", "abcde.txt"]);
}

#[test]
fn test_version_groups_compare_seed_raw_name() {
    // The seed's own name is not normalized: with "report_v1.txt" first it
    // is 3 edits from the normalized "report.txt" and seeds nothing, then
    // "report.txt" seeds a group that picks it up.
    let records = vec![
        make_test_record(1, "report_v1.txt", "h1"),
        make_test_record(2, "report.txt", "h2"),
    ];
    let groups = clusterer(&["_v1"]).find_version_groups(&records, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(names(&groups[0]), vec!["report.txt", "report_v1.txt"]);
}

#[test]
fn test_version_membership_is_exclusive() {
    let records = vec![
        make_test_record(1, "plan.doc", "h1"),
        make_test_record(2, "plan1.doc", "h2"),
        make_test_record(3, "plan2.doc", "h3"),
        make_test_record(4, "budget.xls", "h4"),
        make_test_record(5, "budget1.xls", "h5"),
    ];
    let groups = clusterer(&[]).find_version_groups(&records, 1);
    assert_eq!(groups.len(), 2);
    assert_eq!(names(&groups[0]), vec!["plan.doc", "plan1.doc", "plan2.doc"]);
    assert_eq!(names(&groups[1]), vec!["budget.xls", "budget1.xls"]);

    let total: usize = groups.iter().map(Vec::len).sum();
    assert_eq!(total, 5);
}
