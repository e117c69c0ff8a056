use parking_lot::Mutex;

/// A lock-guarded cursor handing out the slots `0..limit`, each exactly once.
#[derive(Debug)]
pub struct WorkCursor {
    next: Mutex<usize>,
    limit: usize,
}

impl WorkCursor {
    pub fn new(limit: usize) -> Self {
        Self { next: Mutex::new(0), limit }
    }

    /// Claims the next slot, or `None` once every slot has been handed out.
    pub fn claim_next(&self) -> Option<usize> {
        let mut next = self.next.lock();
        if *next >= self.limit {
            return None;
        }
        let slot = *next;
        *next += 1;
        Some(slot)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Hands out the items of a fixed slice to competing workers.
#[derive(Debug)]
pub struct Distributor<'a, T> {
    items: &'a [T],
    cursor: WorkCursor,
}

impl<'a, T> Distributor<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self { items, cursor: WorkCursor::new(items.len()) }
    }

    pub fn claim_next(&self) -> Option<&'a T> {
        self.cursor.claim_next().map(|slot| &self.items[slot])
    }

    pub fn len(&self) -> usize {
        self.cursor.limit()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn cursor_stops_at_limit() {
        let cursor = WorkCursor::new(3);
        assert_eq!(cursor.claim_next(), Some(0));
        assert_eq!(cursor.claim_next(), Some(1));
        assert_eq!(cursor.claim_next(), Some(2));
        assert_eq!(cursor.claim_next(), None);
        assert_eq!(cursor.claim_next(), None);
    }

    #[test]
    fn empty_cursor_is_exhausted() {
        assert_eq!(WorkCursor::new(0).claim_next(), None);
        let items: [u8; 0] = [];
        assert!(Distributor::new(&items).claim_next().is_none());
    }

    #[test]
    fn concurrent_claims_are_exactly_once() {
        let items: Vec<usize> = (0..1000).collect();
        let distributor = Distributor::new(&items);
        let claimed: Vec<Vec<usize>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let mut mine = Vec::new();
                        while let Some(item) = distributor.claim_next() {
                            mine.push(*item);
                        }
                        mine
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let all: Vec<usize> = claimed.into_iter().flatten().collect();
        assert_eq!(all.len(), items.len());
        let unique: HashSet<usize> = all.into_iter().collect();
        assert_eq!(unique.len(), items.len());
    }
}
