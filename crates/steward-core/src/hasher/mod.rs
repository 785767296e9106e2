pub mod xxhash;

pub use xxhash::{content_digest, digest_reader};
