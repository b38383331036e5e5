use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Global string interner for node and edge IDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Reserved sink id meaning "this subtree is visible in the output".
pub const PREVIEW_ID: &str = "preview";

/// A lightweight, interned identifier for nodes and edges in a page schema.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a new string as a NodeId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice. Interned strings live as long as the
    /// process.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// The reserved `preview` sink.
    pub fn preview() -> Self {
        Self::intern(PREVIEW_ID)
    }

    pub fn is_preview(&self) -> bool {
        self.as_str() == PREVIEW_ID
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

// ─── Id synthesis ────────────────────────────────────────────────────────

/// Source of fresh ids for nodes and edges the engine has to invent.
///
/// Injected into the normalizer, the fallback generator and the graph store
/// so tests can swap the wall clock for a counter.
pub trait IdGenerator {
    /// Produce a new ASCII-safe id starting with `prefix`.
    fn next_id(&mut self, prefix: &str) -> NodeId;
}

/// `prefix-<unix-millis>-<index>` ids. The timestamp is captured once, the
/// index increments per call, so ids are unique within one generator.
#[derive(Debug, Clone)]
pub struct ClockIdGenerator {
    stamp: u128,
    next: u64,
}

impl ClockIdGenerator {
    pub fn new() -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self::with_timestamp(stamp)
    }

    /// Use a fixed timestamp (fake clock).
    pub fn with_timestamp(stamp: u128) -> Self {
        Self { stamp, next: 0 }
    }
}

impl Default for ClockIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for ClockIdGenerator {
    fn next_id(&mut self, prefix: &str) -> NodeId {
        let n = self.next;
        self.next += 1;
        NodeId::intern(&format!("{}-{}-{n}", ascii_prefix(prefix), self.stamp))
    }
}

/// `prefix-<index>` ids, for deterministic tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self, prefix: &str) -> NodeId {
        let n = self.next;
        self.next += 1;
        NodeId::intern(&format!("{}-{n}", ascii_prefix(prefix)))
    }
}

/// Lower-case ASCII alphanumerics and `-`/`_`; everything else is dropped.
fn ascii_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if cleaned.is_empty() {
        "id".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_section");
        let b = NodeId::intern("hero_section");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_section");
    }

    #[test]
    fn preview_sink_is_reserved() {
        assert!(NodeId::preview().is_preview());
        assert!(!NodeId::intern("previews").is_preview());
    }

    #[test]
    fn clock_ids_follow_prefix_timestamp_index() {
        let mut ids = ClockIdGenerator::with_timestamp(1_700_000_000_000);
        assert_eq!(ids.next_id("node").as_str(), "node-1700000000000-0");
        assert_eq!(ids.next_id("edge").as_str(), "edge-1700000000000-1");
    }

    #[test]
    fn sequential_ids_are_unique() {
        let mut ids = SequentialIdGenerator::new();
        let a = ids.next_id("node");
        let b = ids.next_id("node");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "node-0");
    }

    #[test]
    fn prefixes_are_ascii_safe() {
        let mut ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id("Kärtchen Ω").as_str(), "krtchen-0");
        assert_eq!(ids.next_id("ÄÖ").as_str(), "id-1");
    }
}
