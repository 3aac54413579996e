use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use grantor_types::CorrelationId;
use tracing::debug;

use crate::error::GrantorError;

/// Draws after which allocation stops sampling and takes the lowest free id.
const MAX_DRAWS: usize = 1024;

/// Source of uniformly distributed bytes for id allocation.
pub trait EntropySource: Send + Sync {
    fn next_byte(&self) -> Result<u8, GrantorError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_byte(&self) -> Result<u8, GrantorError> {
        let mut buf = [0u8; 1];
        getrandom::getrandom(&mut buf).map_err(|err| GrantorError::Entropy(err.to_string()))?;
        Ok(buf[0])
    }
}

/// Tracks which automatically allocated correlation ids are in flight.
pub struct CorrelationIds {
    entropy: Arc<dyn EntropySource>,
    in_flight: Mutex<HashSet<CorrelationId>>,
}

impl CorrelationIds {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            entropy,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn allocate(&self) -> Result<CorrelationId, GrantorError> {
        let mut in_flight = self.lock();
        if in_flight.len() >= usize::from(CorrelationId::AUTO_SPACE) {
            return Err(GrantorError::CorrelationExhausted);
        }
        for _ in 0..MAX_DRAWS {
            let id = CorrelationId::from(self.entropy.next_byte()?);
            if in_flight.insert(id) {
                return Ok(id);
            }
        }
        debug!(in_flight = in_flight.len(), "sampling kept colliding, scanning for a free id");
        let id = (0..CorrelationId::AUTO_SPACE)
            .map(CorrelationId::new)
            .find(|id| !in_flight.contains(id))
            .ok_or(GrantorError::CorrelationExhausted)?;
        in_flight.insert(id);
        Ok(id)
    }

    /// Returns whether `id` was in flight. Releasing twice is harmless.
    pub fn release(&self, id: CorrelationId) -> bool {
        if !id.is_auto() {
            return false;
        }
        self.lock().remove(&id)
    }

    pub fn is_in_flight(&self, id: CorrelationId) -> bool {
        self.lock().contains(&id)
    }

    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<CorrelationId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted(Mutex<VecDeque<u8>>);

    impl Scripted {
        fn new(bytes: &[u8]) -> Arc<Self> {
            Arc::new(Self(Mutex::new(bytes.iter().copied().collect())))
        }
    }

    impl EntropySource for Scripted {
        fn next_byte(&self) -> Result<u8, GrantorError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GrantorError::Entropy("script exhausted".into()))
        }
    }

    struct Stuck;

    impl EntropySource for Stuck {
        fn next_byte(&self) -> Result<u8, GrantorError> {
            Ok(9)
        }
    }

    #[test]
    fn resamples_on_collision() {
        let ids = CorrelationIds::new(Scripted::new(&[7, 7, 7, 3]));
        assert_eq!(ids.allocate().unwrap(), CorrelationId::new(7));
        assert_eq!(ids.allocate().unwrap(), CorrelationId::new(3));
        assert_eq!(ids.in_flight(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let ids = CorrelationIds::new(Scripted::new(&[5, 5, 6, 5]));
        let first = ids.allocate().unwrap();
        let second = ids.allocate().unwrap();
        assert_ne!(first, second);

        assert!(ids.release(first));
        assert!(!ids.release(first));
        assert!(ids.is_in_flight(second));
        assert_eq!(ids.in_flight(), 1);

        // The released id may come back, the active one may not.
        assert_eq!(ids.allocate().unwrap(), first);
        assert!(!ids.release(CorrelationId::MANUAL_NAVIGATION));
    }

    #[test]
    fn os_entropy_ids_are_distinct() {
        let ids = CorrelationIds::default();
        let allocated: HashSet<_> = (0..200).map(|_| ids.allocate().unwrap()).collect();
        assert_eq!(allocated.len(), 200);
        assert!(allocated.iter().all(|id| id.is_auto()));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let ids = CorrelationIds::new(Arc::new(Stuck));
        for _ in 0..CorrelationId::AUTO_SPACE {
            ids.allocate().unwrap();
        }
        assert!(matches!(
            ids.allocate(),
            Err(GrantorError::CorrelationExhausted)
        ));
    }
}
