//! Interned surface tags and tag sets.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque interned identifier emitted by surfaces and matched by mask filters.
///
/// Tags are interned by hashing their name (32-bit FNV-1a), so two tags built from
/// the same name always compare equal and the tag itself is `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceTag(u32);

impl SurfaceTag {
    /// Tag emitted by surfaces without a configured tag.
    pub const UNASSIGNED: SurfaceTag = SurfaceTag::new("");

    /// Interns a tag by name.
    pub const fn new(name: &str) -> Self {
        Self(fnv1a(name.as_bytes()))
    }

    /// Wraps an already interned value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the interned value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SurfaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceTag({:#010x})", self.0)
    }
}

impl From<&str> for SurfaceTag {
    fn from(value: &str) -> Self {
        SurfaceTag::new(value)
    }
}

const fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        i += 1;
    }
    hash
}

/// Order-independent, deduplicated set of [`SurfaceTag`]s.
///
/// Stored as a sorted vector: surface points rarely carry more than a handful of tags,
/// and sorted storage gives cheap intersection tests and a stable `Hash`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceTagSet {
    tags: Vec<SurfaceTag>,
}

impl SurfaceTagSet {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    /// Builds a set holding a single tag.
    pub fn single(tag: impl Into<SurfaceTag>) -> Self {
        Self {
            tags: vec![tag.into()],
        }
    }

    /// Inserts a tag, returning `false` if it was already present.
    pub fn insert(&mut self, tag: impl Into<SurfaceTag>) -> bool {
        let tag = tag.into();
        match self.tags.binary_search(&tag) {
            Ok(_) => false,
            Err(at) => {
                self.tags.insert(at, tag);
                true
            }
        }
    }

    /// Removes a tag, returning `true` if it was present.
    pub fn remove(&mut self, tag: SurfaceTag) -> bool {
        match self.tags.binary_search(&tag) {
            Ok(at) => {
                self.tags.remove(at);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, tag: SurfaceTag) -> bool {
        self.tags.binary_search(&tag).is_ok()
    }

    /// Returns `true` if the two sets share at least one tag.
    pub fn intersects(&self, other: &SurfaceTagSet) -> bool {
        let (mut a, mut b) = (self.tags.iter().peekable(), other.tags.iter().peekable());
        while let (Some(x), Some(y)) = (a.peek(), b.peek()) {
            match x.cmp(y) {
                std::cmp::Ordering::Less => {
                    a.next();
                }
                std::cmp::Ordering::Greater => {
                    b.next();
                }
                std::cmp::Ordering::Equal => return true,
            }
        }
        false
    }

    /// Adds every tag of `other` to this set.
    pub fn union_with(&mut self, other: &SurfaceTagSet) {
        self.extend(other.iter());
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = SurfaceTag> + '_ {
        self.tags.iter().copied()
    }

    pub fn as_slice(&self) -> &[SurfaceTag] {
        &self.tags
    }
}

impl Extend<SurfaceTag> for SurfaceTagSet {
    fn extend<I: IntoIterator<Item = SurfaceTag>>(&mut self, iter: I) {
        self.tags.extend(iter);
        self.tags.sort_unstable();
        self.tags.dedup();
    }
}

impl FromIterator<SurfaceTag> for SurfaceTagSet {
    fn from_iter<I: IntoIterator<Item = SurfaceTag>>(iter: I) -> Self {
        let mut set = SurfaceTagSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> FromIterator<&'a str> for SurfaceTagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(SurfaceTag::new).collect()
    }
}

impl<const N: usize> From<[SurfaceTag; N]> for SurfaceTagSet {
    fn from(value: [SurfaceTag; N]) -> Self {
        value.into_iter().collect()
    }
}

impl From<Vec<SurfaceTag>> for SurfaceTagSet {
    fn from(value: Vec<SurfaceTag>) -> Self {
        value.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a SurfaceTagSet {
    type Item = SurfaceTag;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, SurfaceTag>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter().copied()
    }
}
