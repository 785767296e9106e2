use std::fs::Metadata;
use std::os::windows::fs::MetadataExt;
use std::path::Path;
use winapi::um::winnt::FILE_ATTRIBUTE_HIDDEN;

pub fn is_hidden(_path: &Path, metadata: &Metadata) -> bool {
    metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}
