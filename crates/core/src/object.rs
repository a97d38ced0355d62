//! Naming of stored objects.
//!
//! An object's public name is `hex(sha1(content)) + extension`, so identical
//! content uploaded under the same extension always lands on the same file.

use crate::hash::ContentDigest;

/// Extension of `filename`: everything from the last `.` of its final
/// `/`-separated element, dot included. Empty when there is no dot.
///
/// Only this substring of a client-supplied name is ever used, so a name like
/// `../../etc/passwd` contributes nothing but an empty extension.
pub fn extension(filename: &str) -> &str {
    let name = match filename.rfind('/') {
        Some(slash) => &filename[slash + 1..],
        None => filename,
    };
    match name.rfind('.') {
        Some(dot) => &name[dot..],
        None => "",
    }
}

/// A content-addressed object: digest plus the extension it was stored under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub digest: ContentDigest,
    pub extension: String,
}

impl StoredObject {
    /// Build an object from its digest and the client's original filename.
    pub fn new(digest: ContentDigest, original_filename: &str) -> Self {
        Self {
            digest,
            extension: extension(original_filename).to_string(),
        }
    }

    /// File name the object is published under.
    pub fn filename(&self) -> String {
        format!("{}{}", self.digest.to_hex(), self.extension)
    }
}
