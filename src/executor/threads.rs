use crate::automata::program::InstPtr;

/// Branches alive at one input position, highest priority first.
///
/// The list holds at most one branch per instruction, so its capacity is the
/// program length and a push past it means a marking bug, not a big input.
pub(crate) struct Threads<T> {
    list: Vec<T>,
    cap: usize,
}

impl<T> Threads<T> {
    pub(crate) fn new(cap: usize) -> Threads<T> {
        Threads {
            list: Vec::with_capacity(cap),
            cap,
        }
    }

    pub(crate) fn push(&mut self, t: T) {
        assert!(
            self.list.len() < self.cap,
            "thread list overflow: more than {} branches",
            self.cap
        );
        self.list.push(t);
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Takes the branches out in priority order, leaving the list empty.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.list.drain(..)
    }

    pub(crate) fn clear(&mut self) {
        self.list.clear();
    }
}

/// Per-call visited set over instructions.
///
/// Each instruction remembers the generation in which it was last added to a
/// list; bumping the generation empties the set without touching the marks.
pub(crate) struct Marks {
    seen: Vec<u64>,
    gen: u64,
}

impl Marks {
    pub(crate) fn new(len: usize) -> Marks {
        Marks {
            seen: vec![0; len],
            gen: 0,
        }
    }

    pub(crate) fn next_generation(&mut self) {
        self.gen += 1;
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.gen
    }

    /// Marks `ip` as seen in the current generation. Returns false if it
    /// already was.
    pub(crate) fn insert(&mut self, ip: InstPtr) -> bool {
        if self.seen[ip] == self.gen {
            return false;
        }
        self.seen[ip] = self.gen;
        true
    }
}

#[cfg(test)]
mod test {
    use super::{Marks, Threads};
    use pretty_assertions::assert_eq;

    #[test]
    fn marks_reset_per_generation() {
        let mut marks = Marks::new(3);
        marks.next_generation();
        assert!(marks.insert(1));
        assert!(!marks.insert(1));
        assert!(marks.insert(2));
        marks.next_generation();
        assert!(marks.insert(1));
        assert_eq!(marks.generation(), 2);
    }

    #[test]
    fn drain_keeps_priority_order() {
        let mut threads = Threads::new(3);
        threads.push('a');
        threads.push('b');
        threads.push('c');
        assert_eq!(threads.drain().collect::<String>(), "abc");
        assert!(threads.is_empty());
    }

    #[test]
    #[should_panic(expected = "thread list overflow")]
    fn push_past_capacity_panics() {
        let mut threads = Threads::new(1);
        threads.push(0);
        threads.push(1);
    }
}
