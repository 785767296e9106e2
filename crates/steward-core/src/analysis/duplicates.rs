use crate::storage::models::FileRecord;
use ahash::AHashMap;

/// Partition records by exact content digest and keep only the partitions
/// with more than one member. Groups come out in first-seen order, members in
/// catalog order.
pub fn find_duplicates(records: &[FileRecord]) -> Vec<Vec<FileRecord>> {
    let mut group_index: AHashMap<&str, usize> = AHashMap::new();
    let mut groups: Vec<Vec<FileRecord>> = Vec::new();

    for record in records {
        match group_index.get(record.content_hash.as_str()) {
            Some(&i) => groups[i].push(record.clone()),
            None => {
                group_index.insert(record.content_hash.as_str(), groups.len());
                groups.push(vec![record.clone()]);
            }
        }
    }

    groups.retain(|group| group.len() > 1);
    groups
}
