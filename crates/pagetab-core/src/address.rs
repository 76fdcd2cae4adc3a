//! Address classification used by translation, bookmarking and fetching.

use std::sync::LazyLock;

use regex::Regex;

/// `host.tld/path`, `host:port/path` and friends: something with a dot or
/// colon followed by a word, no whitespace anywhere.
static HOST_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+[.:]\w+/?\S*$").expect("host shape pattern is valid"));

static DRIVE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:\\").expect("drive path pattern is valid"));

const REMOTE_SCHEMES: [&str; 2] = ["http://", "https://"];
const FILE_SCHEME: &str = "file://";

/// Where an address points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Local,
    Remote,
}

/// A local document: absolute Unix path, drive-letter path or `file://` URL.
pub fn is_local(address: &str) -> bool {
    address.starts_with('/') || address.starts_with(FILE_SCHEME) || DRIVE_PATH.is_match(address)
}

pub fn is_remote(address: &str) -> bool {
    REMOTE_SCHEMES.iter().any(|scheme| address.starts_with(scheme))
}

/// Already usable for fetching without translation.
pub fn is_well_formed(address: &str) -> bool {
    is_local(address) || is_remote(address)
}

/// Has the shape of a host or URL, with or without a scheme.
pub fn looks_like_host(input: &str) -> bool {
    HOST_SHAPE.is_match(input)
}

pub fn kind(address: &str) -> AddressKind {
    if is_local(address) {
        AddressKind::Local
    } else {
        AddressKind::Remote
    }
}

/// Filesystem path for a local address.
pub fn local_path(address: &str) -> &str {
    address.strip_prefix(FILE_SCHEME).unwrap_or(address)
}
