use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, Read};
use std::path::Path;
use twox_hash::XxHash64;

const CHUNK_LENGTH: usize = 1024; // 1KB

/// Stream a file through XxHash64 in fixed-size chunks and return the digest
/// as 16 lowercase hex characters. Memory use is bounded by the chunk size.
pub fn content_digest(file: &Path) -> io::Result<String> {
    let f = File::open(file)?;
    digest_reader(f)
}

pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut buffer = [0u8; CHUNK_LENGTH];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.write(&buffer[..bytes_read]);
    }
    Ok(format!("{:016x}", hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_digest_is_fixed_width_hex() {
        let digest = digest_reader(Cursor::new(b"hello world")).unwrap();
        assert_eq!(digest.len(), 16);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_chunked_digest_matches_single_write() {
        // Larger than several chunks so the streaming path is exercised.
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let streamed = digest_reader(Cursor::new(&data)).unwrap();

        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&data);
        assert_eq!(streamed, format!("{:016x}", hasher.finish()));
    }

    #[test]
    fn test_different_content_different_digest() {
        let a = digest_reader(Cursor::new(b"content a")).unwrap();
        let b = digest_reader(Cursor::new(b"content b")).unwrap();
        assert_ne!(a, b);
    }
}
