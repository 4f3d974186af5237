//! Animator pool - advance many characters per tick
//!
//! Orchestrator instances are fully independent, so across characters the
//! work is embarrassingly parallel. Below the threshold the pool iterates
//! sequentially (thread overhead exceeds the win); at or above it, rayon
//! fans the characters out. Both paths produce identical results.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::animator::{Animator, Frame};
use crate::core::types::{CharacterId, Context};

/// Minimum character count before using parallel processing
///
/// A single pipeline step is a few microseconds, so small casts are
/// cheaper to run on one thread.
pub const PARALLEL_THRESHOLD: usize = 64;

/// Registry of per-character animators
pub struct AnimatorPool {
    animators: AHashMap<CharacterId, Animator>,
    parallel_threshold: usize,
}

impl AnimatorPool {
    pub fn new() -> Self {
        Self {
            animators: AHashMap::new(),
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }

    /// Override the parallel threshold (mainly for tests and benches)
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn insert(&mut self, animator: Animator) {
        self.animators.insert(animator.id(), animator);
    }

    pub fn remove(&mut self, id: CharacterId) -> Option<Animator> {
        self.animators.remove(&id)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Animator> {
        self.animators.get(&id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Animator> {
        self.animators.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.animators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }

    /// Advance every character by `dt` with its own context
    ///
    /// Characters missing from `contexts` get the neutral default (the
    /// same degrade-to-idle rule as every other missing input). Results
    /// are ordered by character id so callers see a deterministic
    /// sequence regardless of which path ran.
    pub fn advance_all(
        &mut self,
        dt: f32,
        contexts: &AHashMap<CharacterId, Context>,
    ) -> Vec<(CharacterId, Frame)> {
        let default_ctx = Context::default();

        let mut frames: Vec<(CharacterId, Frame)> = if self.animators.len() >= self.parallel_threshold
        {
            self.animators
                .par_iter_mut()
                .map(|(&id, animator)| {
                    let ctx = contexts.get(&id).unwrap_or(&default_ctx);
                    (id, animator.advance(dt, ctx))
                })
                .collect()
        } else {
            self.animators
                .iter_mut()
                .map(|(&id, animator)| {
                    let ctx = contexts.get(&id).unwrap_or(&default_ctx);
                    (id, animator.advance(dt, ctx))
                })
                .collect()
        };

        frames.sort_by_key(|(id, _)| *id);
        frames
    }
}

impl Default for AnimatorPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn pool_with(count: usize, threshold: usize) -> (AnimatorPool, Vec<CharacterId>) {
        let mut pool = AnimatorPool::new().with_parallel_threshold(threshold);
        let mut ids = Vec::new();
        for _ in 0..count {
            let id = CharacterId::new();
            pool.insert(Animator::with_defaults(id).unwrap());
            ids.push(id);
        }
        (pool, ids)
    }

    #[test]
    fn test_insert_remove() {
        let (mut pool, ids) = pool_with(3, 64);
        assert_eq!(pool.len(), 3);
        assert!(pool.remove(ids[0]).is_some());
        assert_eq!(pool.len(), 2);
        assert!(pool.get(ids[0]).is_none());
        assert!(pool.get(ids[1]).is_some());
    }

    #[test]
    fn test_missing_context_defaults_to_idle() {
        let (mut pool, ids) = pool_with(2, 64);
        let contexts = AHashMap::new();
        let frames = pool.advance_all(DT, &contexts);
        assert_eq!(frames.len(), 2);
        for (id, frame) in &frames {
            assert!(ids.contains(id));
            assert!(!frame.metrics.moving);
        }
    }

    #[test]
    fn test_parallel_and_sequential_paths_agree() {
        let count = 8;
        let (mut sequential, ids) = pool_with(count, usize::MAX);
        let mut parallel = AnimatorPool::new().with_parallel_threshold(1);
        for &id in &ids {
            parallel.insert(Animator::with_defaults(id).unwrap());
        }

        let mut contexts = AHashMap::new();
        for (i, &id) in ids.iter().enumerate() {
            contexts.insert(
                id,
                Context {
                    velocity: Vec2::new(30.0 * i as f32, 0.0),
                    ..Default::default()
                },
            );
        }

        for _ in 0..60 {
            let a = sequential.advance_all(DT, &contexts);
            let b = parallel.advance_all(DT, &contexts);
            assert_eq!(a.len(), b.len());
            for ((id_a, frame_a), (id_b, frame_b)) in a.iter().zip(b.iter()) {
                assert_eq!(id_a, id_b);
                assert_eq!(frame_a.pose, frame_b.pose);
                assert_eq!(frame_a.metrics, frame_b.metrics);
            }
        }
    }

    #[test]
    fn test_results_sorted_by_id() {
        let (mut pool, _) = pool_with(5, 64);
        let frames = pool.advance_all(DT, &AHashMap::new());
        for pair in frames.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
