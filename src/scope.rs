/// One simulation tick as seen by the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub voltage: f64,
    pub current: f64,
    pub state: f64,
    pub resistance: f64,
    pub power: f64,
    pub overheated: bool,
}

/// Fixed-capacity ring buffer for oscilloscope traces. Once full, each push
/// overwrites the oldest entry.
#[derive(Clone, Debug)]
pub struct ScrollingBuffer<T> {
    data: Vec<T>,
    capacity: usize,
    // index of the oldest entry once the buffer has wrapped
    offset: usize,
}

impl<T> ScrollingBuffer<T> {
    pub const DEFAULT_CAPACITY: usize = 2000;

    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { data: Vec::with_capacity(capacity), capacity, offset: 0 }
    }

    pub fn push(&mut self, value: T) {
        if self.data.len() < self.capacity {
            self.data.push(value);
        } else {
            self.data[self.offset] = value;
            self.offset = (self.offset + 1) % self.capacity;
        }
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (head, tail) = self.data.split_at(self.offset);
        tail.iter().chain(head.iter())
    }

    pub fn latest(&self) -> Option<&T> {
        if self.data.is_empty() {
            None
        } else if self.data.len() < self.capacity || self.offset == 0 {
            self.data.last()
        } else {
            self.data.get(self.offset - 1)
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.offset = 0;
    }
}

impl<T> Default for ScrollingBuffer<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(buf: &ScrollingBuffer<u32>) -> Vec<u32> {
        buf.iter().copied().collect()
    }

    #[test]
    fn test_fills_in_order() {
        let mut buf = ScrollingBuffer::new(4);
        assert!(buf.is_empty());
        assert_eq!(buf.latest(), None);
        buf.push(1);
        buf.push(2);
        assert_eq!(contents(&buf), vec![1, 2]);
        assert_eq!(buf.latest(), Some(&2));
    }

    #[test]
    fn test_wraps_and_keeps_chronology() {
        let mut buf = ScrollingBuffer::new(3);
        for v in 1..=7 {
            buf.push(v);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.capacity(), 3);
        assert_eq!(contents(&buf), vec![5, 6, 7]);
        assert_eq!(buf.latest(), Some(&7));

        buf.push(8);
        assert_eq!(contents(&buf), vec![6, 7, 8]);
        assert_eq!(buf.latest(), Some(&8));
    }

    #[test]
    fn test_exactly_full_latest() {
        let mut buf = ScrollingBuffer::new(3);
        for v in 1..=3 {
            buf.push(v);
        }
        assert_eq!(buf.latest(), Some(&3));
        buf.push(4);
        buf.push(5);
        buf.push(6);
        // offset wrapped back to 0
        assert_eq!(buf.latest(), Some(&6));
        assert_eq!(contents(&buf), vec![4, 5, 6]);
    }

    #[test]
    fn test_clear_and_zero_capacity() {
        let mut buf = ScrollingBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.push(1);
        buf.push(2);
        assert_eq!(contents(&buf), vec![2]);
        buf.clear();
        assert!(buf.is_empty());
        buf.push(3);
        assert_eq!(contents(&buf), vec![3]);
    }
}
