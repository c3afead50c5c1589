use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use log::{debug, info};

use super::{Compiler, CompilerResult, GroundingError};
use crate::{capability::CompilationKind, model::Problem};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    compiler: String,
    problem_id: u64,
    fingerprint: String,
}

/// Memoizes grounding results per `(compiler, problem instance, problem structure)`.
///
/// A clone of a problem has its own instance id and therefore its own entry; a problem mutated
/// after being grounded has a different fingerprint and misses as well.
#[derive(Default)]
pub struct GroundingCache {
    results: Mutex<HashMap<CacheKey, Arc<CompilerResult>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl GroundingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the grounding of `problem` by `compiler`, compiling it on the first request.
    pub fn result(
        &self,
        compiler: &dyn Compiler,
        problem: &Problem,
    ) -> Result<Arc<CompilerResult>, GroundingError> {
        let key = CacheKey {
            compiler: compiler.name().to_string(),
            problem_id: problem.id(),
            fingerprint: problem.fingerprint()?,
        };
        if let Some(hit) = self.lock().get(&key) {
            info!("grounding cache hit for {} by {}", problem.name(), key.compiler);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.clone());
        }
        debug!(
            "grounding cache miss for {} ({}) by {}",
            problem.name(),
            &key.fingerprint[..16],
            key.compiler
        );
        self.misses.fetch_add(1, Ordering::Relaxed);
        // compile without holding the lock
        let result = Arc::new(compiler.compile(problem, CompilationKind::Grounding)?);
        self.lock().insert(key, result.clone());
        Ok(result)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<CompilerResult>>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
