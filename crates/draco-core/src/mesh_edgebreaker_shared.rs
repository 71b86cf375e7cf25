
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgebreakerSymbol {
    Center = 0,
    Split = 1,
    Left = 2,
    Right = 3,
    End = 4,
    Hole = 5, // Not used in standard stream, handled separately?
}

impl From<u32> for EdgebreakerSymbol {
    fn from(v: u32) -> Self {
        match v {
            0 => EdgebreakerSymbol::Center,
            1 => EdgebreakerSymbol::Split,
            2 => EdgebreakerSymbol::Left,
            3 => EdgebreakerSymbol::Right,
            4 => EdgebreakerSymbol::End,
            5 => EdgebreakerSymbol::Hole,
            _ => EdgebreakerSymbol::Center, // Default/Error
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFaceName {
    LeftFaceEdge = 0,
    RightFaceEdge = 1,
}

#[derive(Debug, Clone)]
pub struct TopologySplitEventData {
    pub split_symbol_id: u32,
    pub source_symbol_id: u32,
    pub source_edge: EdgeFaceName,
}

/// Which traversal decoder reads the corner-flag bit stream: one global
/// probability (`Standard`) or one rANS context per vertex-valence bucket
/// (`ValenceAdaptive`). Written as a single byte right after the header on
/// streams new enough to carry it (see [`super::version::has_header_flags`]
/// era onward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgebreakerTraversalType {
    Standard = 0,
    ValenceAdaptive = 1,
}

impl EdgebreakerTraversalType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Standard),
            1 => Some(Self::ValenceAdaptive),
            _ => None,
        }
    }
}

/// Number of probability contexts the valence-adaptive traversal decoder
/// keeps for the corner-flag bit stream, one per bucket of
/// [`valence_context_bucket`].
pub const NUM_VALENCE_CONTEXTS: usize = 5;

/// Buckets a vertex's running reference count (how many corners have
/// already resolved to it) into one of [`NUM_VALENCE_CONTEXTS`] contexts.
/// Regular-valence vertices (the bulk of any mesh) share the middle
/// buckets; sparsely- and densely-referenced vertices get their own,
/// mirroring the per-valence rANS contexts of the source.
pub fn valence_context_bucket(count: u32) -> usize {
    match count {
        0..=3 => 0,
        4 => 1,
        5 => 2,
        6 => 3,
        _ => 4,
    }
}

/// Selects the traversal decoder type per the encoding-speed rule: standard
/// edgebreaker at speed >= 5 or on meshes too small for the context
/// overhead to pay for itself, valence-adaptive otherwise.
pub fn select_traversal_type(encoding_speed: i32, num_faces: usize) -> EdgebreakerTraversalType {
    if encoding_speed >= 5 || num_faces <= 1000 {
        EdgebreakerTraversalType::Standard
    } else {
        EdgebreakerTraversalType::ValenceAdaptive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valence_context_bucket() {
        assert_eq!(valence_context_bucket(0), 0);
        assert_eq!(valence_context_bucket(3), 0);
        assert_eq!(valence_context_bucket(4), 1);
        assert_eq!(valence_context_bucket(5), 2);
        assert_eq!(valence_context_bucket(6), 3);
        assert_eq!(valence_context_bucket(7), 4);
        assert_eq!(valence_context_bucket(1000), 4);
    }

    #[test]
    fn test_select_traversal_type() {
        // Fast encoding always gets the standard coder, regardless of size.
        assert_eq!(select_traversal_type(5, 1_000_000), EdgebreakerTraversalType::Standard);
        assert_eq!(select_traversal_type(10, 1_000_000), EdgebreakerTraversalType::Standard);
        // Tiny meshes stay on the standard coder even at the slowest speed.
        assert_eq!(select_traversal_type(0, 1000), EdgebreakerTraversalType::Standard);
        // Slow encoding on a large enough mesh picks valence-adaptive.
        assert_eq!(select_traversal_type(4, 1001), EdgebreakerTraversalType::ValenceAdaptive);
        assert_eq!(select_traversal_type(0, 5000), EdgebreakerTraversalType::ValenceAdaptive);
    }

    #[test]
    fn test_traversal_type_from_u8() {
        assert_eq!(EdgebreakerTraversalType::from_u8(0), Some(EdgebreakerTraversalType::Standard));
        assert_eq!(EdgebreakerTraversalType::from_u8(1), Some(EdgebreakerTraversalType::ValenceAdaptive));
        assert_eq!(EdgebreakerTraversalType::from_u8(2), None);
    }
}
