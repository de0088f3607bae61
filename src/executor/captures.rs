use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Per-call accounting for capture frames.
///
/// Every backing array a [`Frame`] points at is counted here while it is
/// alive, so an engine can check on its way out that every frame it created
/// has been released.
#[derive(Debug)]
pub(crate) struct Frames {
    nslots: usize,
    live: Rc<Cell<usize>>,
    allocated: Cell<usize>,
}

impl Frames {
    pub(crate) fn new(nslots: usize) -> Frames {
        Frames {
            nslots,
            live: Rc::new(Cell::new(0)),
            allocated: Cell::new(0),
        }
    }

    /// An all-unset frame with a single owner.
    pub(crate) fn fresh(&self) -> Frame {
        self.allocated.set(self.allocated.get() + 1);
        Frame(Rc::new(Slots::new(
            vec![None; self.nslots].into_boxed_slice(),
            &self.live,
        )))
    }

    /// Backing arrays currently referenced by at least one frame.
    pub(crate) fn live(&self) -> usize {
        self.live.get()
    }

    /// Fresh frames handed out by this pool. Copy-on-write clones are not
    /// included.
    pub(crate) fn allocated(&self) -> usize {
        self.allocated.get()
    }
}

#[derive(Debug)]
struct Slots {
    pos: Box<[Option<usize>]>,
    live: Rc<Cell<usize>>,
}

impl Slots {
    fn new(pos: Box<[Option<usize>]>, live: &Rc<Cell<usize>>) -> Slots {
        live.set(live.get() + 1);
        Slots {
            pos,
            live: Rc::clone(live),
        }
    }
}

impl Clone for Slots {
    fn clone(&self) -> Slots {
        Slots::new(self.pos.clone(), &self.live)
    }
}

impl Drop for Slots {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// A shared, copy-on-write array of capture positions.
///
/// Cloning a frame takes another reference to the same array and dropping it
/// gives one back; the array is freed when the last reference goes. Branches
/// that have not diverged on captures share one array.
#[derive(Debug, Clone)]
pub(crate) struct Frame(Rc<Slots>);

impl Frame {
    /// Sets `slot` to `pos`. A uniquely owned frame is written in place; a
    /// shared one is copied first and this reference to the original is
    /// released. Slots past the end of the frame are ignored.
    pub(crate) fn update(mut self, slot: usize, pos: usize) -> Frame {
        if slot < self.0.pos.len() {
            Rc::make_mut(&mut self.0).pos[slot] = Some(pos);
        }
        self
    }

    pub(crate) fn refs(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    #[cfg(test)]
    fn get(&self, slot: usize) -> Option<usize> {
        self.0.pos.get(slot).copied().flatten()
    }

    pub(crate) fn to_captures(&self) -> Captures {
        Captures {
            slots: self.0.pos.to_vec(),
        }
    }

    #[cfg(test)]
    fn ptr_eq(&self, other: &Frame) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Capture offsets reported by a successful match.
///
/// Slot `2k` holds the start and slot `2k + 1` the end of group `k`; group 0
/// is the whole match. Offsets are byte offsets into the input.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Captures {
    slots: Vec<Option<usize>>,
}

impl Captures {
    pub(crate) fn new(nslots: usize) -> Captures {
        Captures {
            slots: vec![None; nslots],
        }
    }

    pub(crate) fn set(&mut self, slot: usize, pos: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(pos);
        }
    }

    pub fn get(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    /// The `(start, end)` pair of group `i`, if both ends were recorded.
    pub fn group(&self, i: usize) -> Option<(usize, usize)> {
        Some((self.get(2 * i)?, self.get(2 * i + 1)?))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.slots
    }
}

/// Renders as `[0,3) [2,3)`, with `?` for an unset end. Trailing groups that
/// were never set are left out.
impl fmt::Display for Captures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self
            .slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1);
        let pos = |slot: usize| match self.get(slot) {
            Some(p) => p.to_string(),
            None => "?".to_string(),
        };
        let mut sep = "";
        for slot in (0..used).step_by(2) {
            write!(f, "{}[{},{})", sep, pos(slot), pos(slot + 1))?;
            sep = " ";
        }
        Ok(())
    }
}
