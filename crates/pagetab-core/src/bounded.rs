use std::collections::VecDeque;

/// A sequence holding at most `capacity` elements, oldest first.
///
/// Pushing past the bound evicts from the oldest end. Backs both the per-tab
/// navigation history (indexed access with a cursor) and the closed-tab stack
/// (LIFO over the newest end).
#[derive(Debug, Clone)]
pub struct BoundedSeq<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedSeq<T> {
    /// Create an empty sequence. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append as the newest element, returning whatever was evicted to stay
    /// within capacity (oldest first).
    pub fn push(&mut self, item: T) -> Vec<T> {
        self.items.push_back(item);
        let mut evicted = Vec::new();
        while self.items.len() > self.capacity {
            if let Some(oldest) = self.items.pop_front() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Remove and return the newest element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Element at `index`, counted from the oldest.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Drop everything after the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest() {
        let mut seq = BoundedSeq::new(2);
        assert!(seq.push(1).is_empty());
        assert!(seq.push(2).is_empty());
        assert_eq!(seq.push(3), vec![1]);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(seq.oldest(), Some(&2));
        assert_eq!(seq.newest(), Some(&3));
    }

    #[test]
    fn test_lifo_pop() {
        let mut seq = BoundedSeq::new(3);
        seq.push("a");
        seq.push("b");
        assert_eq!(seq.pop(), Some("b"));
        assert_eq!(seq.pop(), Some("a"));
        assert_eq!(seq.pop(), None);
        assert!(seq.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut seq = BoundedSeq::new(0);
        assert_eq!(seq.capacity(), 1);
        seq.push('x');
        assert_eq!(seq.push('y'), vec!['x']);
        assert_eq!(seq.len(), 1);
    }
}
