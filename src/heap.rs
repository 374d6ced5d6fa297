//! Array-backed binary min-heap shared by the scheduler and the pathfinder.

/// The minimal "has an orderable numeric key" capability a heap element needs.
///
/// Two unrelated element types implement this: scheduler queue entries (key is
/// the target frame) and A* open-set entries (key is the f-score). Keeping
/// them distinct types over one queue implementation prevents accidental
/// cross-use of the two kinds of keys.
pub trait Priority {
    /// The key this element is heap-ordered by. Smaller keys pop first.
    fn priority(&self) -> u64;
}

/// A binary min-heap over elements exposing a [`Priority`] key.
///
/// Besides the usual push/pop it supports arbitrary removal and re-scoring of
/// an element whose key changed, which the scheduler needs for eager eviction
/// and the pathfinder needs when a cheaper route to an open tile is found.
///
/// No ordering is guaranteed between equal-key elements.
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    items: Vec<T>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        PriorityQueue { items: Vec::new() }
    }
}

impl<T: Priority> PriorityQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue with space reserved for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        PriorityQueue {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of elements currently in the queue.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops all elements.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the element with the smallest key without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Adds an element, restoring the heap property from the tail upward.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes and returns the element with the smallest key.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }

        let item = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }

        Some(item)
    }

    /// Removes the last element (scanning from the tail) matching `matches`.
    ///
    /// The tail scan mirrors the common access pattern: recently scheduled,
    /// high-index elements are evicted far more often than imminent ones.
    /// Returns `None` if nothing matched.
    pub fn remove_where(&mut self, matches: impl Fn(&T) -> bool) -> Option<T> {
        let index = self.items.iter().rposition(|item| matches(item))?;
        let removed_key = self.items[index].priority();

        // The vacated slot is filled with the tail element, which then has to
        // move toward the root or away from it depending on its key.
        let item = self.items.swap_remove(index);
        if index < self.items.len() {
            if self.items[index].priority() < removed_key {
                self.sift_up(index);
            } else {
                self.sift_down(index);
            }
        }

        Some(item)
    }

    /// Mutates the key of the last element matching `matches` through
    /// `rescore`, then restores heap order from its slot.
    ///
    /// Order is re-validated in both directions: a decreased key moves the
    /// element toward the root, an increased key away from it. Returns false
    /// if nothing matched.
    pub fn rescore_where(
        &mut self,
        matches: impl Fn(&T) -> bool,
        rescore: impl FnOnce(&mut T),
    ) -> bool {
        let Some(index) = self.items.iter().rposition(|item| matches(item)) else {
            return false;
        };

        rescore(&mut self.items[index]);

        let settled = self.sift_up(index);
        if settled == index {
            self.sift_down(index);
        }

        true
    }

    /// Moves the element at `index` toward the root while it is smaller than
    /// its parent. Returns the index it settles at.
    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.items[index].priority() >= self.items[parent].priority() {
                break;
            }

            self.items.swap(index, parent);
            index = parent;
        }

        index
    }

    /// Moves the element at `index` away from the root toward whichever child
    /// has the smaller key, stopping once no child is smaller. Returns the
    /// index it settles at.
    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.items.len();

        loop {
            let left = 2 * index + 1;
            let right = left + 1;

            let mut smallest = index;
            if left < len && self.items[left].priority() < self.items[smallest].priority() {
                smallest = left;
            }
            if right < len && self.items[right].priority() < self.items[smallest].priority() {
                smallest = right;
            }

            if smallest == index {
                break;
            }

            self.items.swap(index, smallest);
            index = smallest;
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Key(u64);

    impl Priority for Key {
        fn priority(&self) -> u64 {
            self.0
        }
    }

    fn assert_heap_property(queue: &PriorityQueue<Key>) {
        for index in 1..queue.items.len() {
            let parent = (index - 1) / 2;
            assert!(
                queue.items[parent].priority() <= queue.items[index].priority(),
                "heap property violated at index {index}: parent {} > child {}",
                queue.items[parent].0,
                queue.items[index].0,
            );
        }
    }

    #[test]
    fn pop_yields_non_decreasing_keys() {
        let mut rng = rand::rng();
        let mut queue = PriorityQueue::new();

        for _ in 0..256 {
            queue.push(Key(rng.random_range(0..1000)));
        }
        assert_heap_property(&queue);

        let mut previous = 0;
        while let Some(Key(key)) = queue.pop() {
            assert!(key >= previous, "popped {key} after {previous}");
            previous = key;
        }
    }

    #[test]
    fn heap_property_survives_mixed_operations() {
        let mut rng = rand::rng();
        let mut queue = PriorityQueue::new();

        for round in 0..512u64 {
            match rng.random_range(0..4) {
                0 | 1 => queue.push(Key(rng.random_range(0..1000))),
                2 => {
                    queue.pop();
                }
                _ => {
                    let target = round % 1000;
                    queue.remove_where(|key| key.0 == target);
                }
            }
            assert_heap_property(&queue);
        }
    }

    #[test]
    fn remove_where_scans_from_the_tail() {
        let mut queue = PriorityQueue::new();
        for key in [5, 3, 8, 1, 9] {
            queue.push(Key(key));
        }

        assert_eq!(queue.remove_where(|key| key.0 == 8), Some(Key(8)));
        assert_eq!(queue.len(), 4);
        assert_heap_property(&queue);

        assert_eq!(queue.remove_where(|key| key.0 == 42), None);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn rescore_after_key_decrease() {
        let mut queue = PriorityQueue::new();
        for key in [10, 20, 30, 40, 50] {
            queue.push(Key(key));
        }

        // 50 becomes the new minimum and must surface at the root.
        assert!(queue.rescore_where(|key| key.0 == 50, |key| key.0 = 1));
        assert_heap_property(&queue);
        assert_eq!(queue.pop(), Some(Key(1)));
    }

    #[test]
    fn rescore_after_key_increase() {
        let mut queue = PriorityQueue::new();
        for key in [10, 20, 30, 40, 50] {
            queue.push(Key(key));
        }

        // The root's key grows past every other element; it must sink away
        // from the root, not stay put.
        assert!(queue.rescore_where(|key| key.0 == 10, |key| key.0 = 99));
        assert_heap_property(&queue);

        let mut keys = Vec::new();
        while let Some(Key(key)) = queue.pop() {
            keys.push(key);
        }
        assert_eq!(keys, vec![20, 30, 40, 50, 99]);
    }

    #[test]
    fn rescore_on_absent_element_is_a_noop() {
        let mut queue = PriorityQueue::new();
        queue.push(Key(1));
        assert!(!queue.rescore_where(|key| key.0 == 7, |key| key.0 = 0));
        assert_eq!(queue.len(), 1);
    }
}
