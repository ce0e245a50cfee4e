/// A key paired with its score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredId {
    pub id: i64,
    pub score: f64,
}

impl ScoredId {
    pub fn new(id: i64, score: f64) -> ScoredId {
        ScoredId { id, score }
    }
}

impl From<(i64, f64)> for ScoredId {
    fn from((id, score): (i64, f64)) -> Self {
        ScoredId { id, score }
    }
}

/// Builds the outputs shared by every accumulator from score-descending entries.
pub(crate) mod finish {
    use ratepack_common::Result;
    use ratepack_keys::KeyIndex;
    use ratepack_vectors::SparseVector;

    use super::ScoredId;

    /// Keeps the first (highest-scored) entry of each key.
    pub(crate) fn to_vector(ranked: &[ScoredId]) -> Result<SparseVector> {
        let mut pairs = ranked.iter().map(|s| (s.id, s.score)).collect::<Vec<_>>();
        pairs.sort_by_key(|&(id, _)| id);
        pairs.dedup_by_key(|&mut (id, _)| id);
        SparseVector::from_pairs(pairs)
    }

    pub(crate) fn to_set(ranked: &[ScoredId]) -> KeyIndex {
        KeyIndex::from_distinct(ranked.iter().map(|s| s.id))
    }
}
