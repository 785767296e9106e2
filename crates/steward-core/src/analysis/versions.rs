use super::edit_distance::levenshtein;
use super::normalize::Normalizer;
use crate::storage::models::FileRecord;
use tracing::debug;

/// Groups records whose file names look like versions of one another.
///
/// Clustering is greedy and seed-based: records are visited in catalog order,
/// each unassigned record seeds a group, and every other unassigned record
/// joins when the distance from the seed's raw name to the candidate's
/// normalized name is within `threshold`. Two members may therefore be far
/// apart from each other as long as both are close to the seed. Groups of one
/// are discarded and their seed stays available to join later groups.
#[derive(Debug, Clone, Default)]
pub struct VersionClusterer {
    normalizer: Normalizer,
}

impl VersionClusterer {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    pub fn find_version_groups(
        &self,
        records: &[FileRecord],
        threshold: usize,
    ) -> Vec<Vec<FileRecord>> {
        let normalized: Vec<String> = records
            .iter()
            .map(|r| self.normalizer.normalize(&r.file_name))
            .collect();
        let mut assigned = vec![false; records.len()];
        let mut groups = Vec::new();

        for (seed, seed_record) in records.iter().enumerate() {
            if assigned[seed] {
                continue;
            }

            let mut members = vec![seed];
            for (candidate, candidate_name) in normalized.iter().enumerate() {
                if candidate == seed || assigned[candidate] {
                    continue;
                }
                if levenshtein(&seed_record.file_name, candidate_name) <= threshold {
                    members.push(candidate);
                }
            }

            if members.len() > 1 {
                debug!(
                    "Version group seeded by '{}' with {} members",
                    seed_record.file_name,
                    members.len()
                );
                for &member in &members {
                    assigned[member] = true;
                }
                groups.push(members.iter().map(|&i| records[i].clone()).collect());
            }
        }

        groups
    }
}
