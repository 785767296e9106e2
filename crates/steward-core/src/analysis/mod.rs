pub mod duplicates;
pub mod edit_distance;
pub mod normalize;
pub mod versions;

pub use duplicates::find_duplicates;
pub use edit_distance::levenshtein;
pub use normalize::Normalizer;
pub use versions::VersionClusterer;
