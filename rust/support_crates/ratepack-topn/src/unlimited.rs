use ratepack_common::{Result, error::Error};
use ratepack_keys::KeyIndex;
use ratepack_vectors::SparseVector;

use crate::{ScoredId, ScoredItemAccumulator, scored_id::finish};

/// Retains every entry put into it and sorts them by descending score on finish.
#[derive(Clone, Debug, Default)]
pub struct UnlimitedAccumulator {
    entries: Vec<ScoredId>,
    finished: bool,
}

impl UnlimitedAccumulator {
    pub fn new() -> UnlimitedAccumulator {
        UnlimitedAccumulator::default()
    }

    fn drain(&mut self) -> Result<Vec<ScoredId>> {
        if self.finished {
            return Err(Error::invalid_operation("finish"));
        }
        self.finished = true;
        let mut ranked = std::mem::take(&mut self.entries);
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(ranked)
    }
}

impl ScoredItemAccumulator for UnlimitedAccumulator {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn put(&mut self, key: i64, score: f64) {
        self.entries.push(ScoredId::new(key, score));
        self.finished = false;
    }

    fn finish_list(&mut self) -> Result<Vec<ScoredId>> {
        self.drain()
    }

    fn finish_vector(&mut self) -> Result<SparseVector> {
        finish::to_vector(&self.drain()?)
    }

    fn finish_set(&mut self) -> Result<KeyIndex> {
        Ok(finish::to_set(&self.drain()?))
    }
}
