//! Contract fingerprints.
//!
//! The fingerprint of a function is the first 32 bits (big-endian) of the MD5
//! digest of its wire-visible parameters, each contributing its name followed
//! by its declared type text, in order. Flattened types do not take part, so
//! the value only changes when the declaration does.

use crate::model::Parameter;

/// Fingerprint of the given (context-free) parameter list.
pub fn fingerprint(params: &[Parameter]) -> u32 {
    fingerprint_parts(params.iter().map(|p| (p.name.as_str(), p.raw_type.as_str())))
}

/// Fingerprint over `(name, raw type text)` pairs.
pub fn fingerprint_parts<'a>(parts: impl IntoIterator<Item = (&'a str, &'a str)>) -> u32 {
    let mut input = String::new();
    for (name, raw_type) in parts {
        input.push_str(name);
        input.push_str(raw_type);
    }
    let md5::Digest(bytes) = md5::compute(input.as_bytes());
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
