//! Pooled primitive storage.
//!
//! Every primitive kind gets a [`Slab`]: a fixed number of reusable slots
//! plus an overflow list of heap entries. Allocation takes the first free
//! slot; once all slots are taken it falls back to a boxed heap entry.
//! Releasing drops the reference count and, at zero, either resets the
//! slot payload through [`Recycle::free`] or deletes the heap entry.
//!
//! Callers only ever hold [`Handle`]s. A handle carries the generation
//! of the entry it was issued for, so a handle kept past its release
//! resolves to nothing instead of to whatever reuses the slot.

use log::debug;

use crate::primitive::{ArcPrimitive, ContourBatch, PixmapBlit, RectPrimitive, Recycle, TextRun};

// ============================================================================
// Slab
// ============================================================================

/// Reference to a slab entry, valid until the entry is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
    heap: bool,
}

impl Handle {
    /// Slot number, or heap position for heap entries.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// `true` when the entry lives outside the fixed slots.
    pub fn is_heap(&self) -> bool {
        self.heap
    }
}

#[derive(Debug, Default)]
struct Entry<T> {
    value: T,
    refs: u32,
    generation: u32,
}

/// Reference counted storage for one payload type. `name` only shows up
/// in log output.
#[derive(Debug)]
pub struct Slab<T: Recycle> {
    name: &'static str,
    slots: Vec<Entry<T>>,
    heap: Vec<Option<Box<Entry<T>>>>,
    heap_generations: Vec<u32>,
    free_heap: Vec<u32>,
}

impl<T: Recycle> Slab<T> {
    /// A slab with `capacity` preallocated slots, all free.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Entry::default);
        Self {
            name,
            slots,
            heap: Vec::new(),
            heap_generations: Vec::new(),
            free_heap: Vec::new(),
        }
    }

    /// Number of fixed slots. Heap entries do not count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Take a free entry with a reference count of one. The payload is
    /// in its reset state.
    pub fn allocate(&mut self) -> (Handle, &mut T) {
        if let Some(index) = self.slots.iter().position(|e| e.refs == 0) {
            let entry = &mut self.slots[index];
            entry.refs = 1;
            let handle = Handle {
                index: index as u32,
                generation: entry.generation,
                heap: false,
            };
            return (handle, &mut entry.value);
        }

        debug!(
            "{} pool exhausted ({} slots), allocating on the heap",
            self.name,
            self.slots.len()
        );
        let index = match self.free_heap.pop() {
            Some(i) => i,
            None => {
                self.heap.push(None);
                self.heap_generations.push(0);
                (self.heap.len() - 1) as u32
            }
        };
        let entry = Box::new(Entry {
            value: T::default(),
            refs: 1,
            generation: self.heap_generations[index as usize],
        });
        let slot = &mut self.heap[index as usize];
        let entry = slot.insert(entry);
        let handle = Handle {
            index,
            generation: entry.generation,
            heap: true,
        };
        (handle, &mut entry.value)
    }

    fn entry(&self, h: Handle) -> Option<&Entry<T>> {
        let e = if h.heap {
            self.heap.get(h.index as usize)?.as_deref()?
        } else {
            self.slots.get(h.index as usize)?
        };
        (e.refs > 0 && e.generation == h.generation).then_some(e)
    }

    fn entry_mut(&mut self, h: Handle) -> Option<&mut Entry<T>> {
        let e = if h.heap {
            self.heap.get_mut(h.index as usize)?.as_deref_mut()?
        } else {
            self.slots.get_mut(h.index as usize)?
        };
        (e.refs > 0 && e.generation == h.generation).then_some(e)
    }

    /// The payload behind `h`, `None` once it has been released.
    pub fn get(&self, h: Handle) -> Option<&T> {
        self.entry(h).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, h: Handle) -> Option<&mut T> {
        self.entry_mut(h).map(|e| &mut e.value)
    }

    /// Current reference count, zero for a stale handle.
    pub fn refs(&self, h: Handle) -> u32 {
        self.entry(h).map_or(0, |e| e.refs)
    }

    /// Add a reference. Returns `false` for a stale handle.
    pub fn retain(&mut self, h: Handle) -> bool {
        match self.entry_mut(h) {
            Some(e) => {
                e.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop a reference. Returns `true` when this released the entry.
    pub fn release(&mut self, h: Handle) -> bool {
        let e = match self.entry_mut(h) {
            Some(e) => e,
            None => return false,
        };
        e.refs -= 1;
        if e.refs > 0 {
            return false;
        }
        if h.heap {
            let i = h.index as usize;
            self.heap[i] = None;
            self.heap_generations[i] = self.heap_generations[i].wrapping_add(1);
            self.free_heap.push(h.index);
        } else {
            e.value.free();
            e.generation = e.generation.wrapping_add(1);
        }
        true
    }

    /// Entries currently referenced, slots and heap together.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|e| e.refs > 0).count() + self.heap_live()
    }

    /// Live entries that did not fit in the fixed slots.
    pub fn heap_live(&self) -> usize {
        self.heap.iter().filter(|e| e.is_some()).count()
    }
}

// ============================================================================
// PrimitivePool
// ============================================================================

/// Which slab a [`PrimitiveId`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Contours,
    Arc,
    Rectangle,
    Text,
    Pixmap,
}

/// Handle to one pending primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId {
    pub kind: PrimitiveKind,
    pub handle: Handle,
}

/// Borrowed view of a pooled primitive.
#[derive(Debug, Clone, Copy)]
pub enum PrimitiveRef<'a> {
    Contours(&'a ContourBatch),
    Arc(&'a ArcPrimitive),
    Rectangle(&'a RectPrimitive),
    Text(&'a TextRun),
    Pixmap(&'a PixmapBlit),
}

/// One slab per primitive kind.
#[derive(Debug)]
pub struct PrimitivePool {
    contours: Slab<ContourBatch>,
    arcs: Slab<ArcPrimitive>,
    rects: Slab<RectPrimitive>,
    texts: Slab<TextRun>,
    blits: Slab<PixmapBlit>,
}

impl PrimitivePool {
    /// Every slab gets `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            contours: Slab::new("contour", capacity),
            arcs: Slab::new("arc", capacity),
            rects: Slab::new("rectangle", capacity),
            texts: Slab::new("text", capacity),
            blits: Slab::new("pixmap", capacity),
        }
    }

    // Allocation hands out a reset payload with one reference; the caller
    // fills it in place.

    pub fn alloc_contours(&mut self) -> (PrimitiveId, &mut ContourBatch) {
        let (handle, v) = self.contours.allocate();
        (PrimitiveId { kind: PrimitiveKind::Contours, handle }, v)
    }

    pub fn alloc_arc(&mut self) -> (PrimitiveId, &mut ArcPrimitive) {
        let (handle, v) = self.arcs.allocate();
        (PrimitiveId { kind: PrimitiveKind::Arc, handle }, v)
    }

    pub fn alloc_rect(&mut self) -> (PrimitiveId, &mut RectPrimitive) {
        let (handle, v) = self.rects.allocate();
        (PrimitiveId { kind: PrimitiveKind::Rectangle, handle }, v)
    }

    pub fn alloc_text(&mut self) -> (PrimitiveId, &mut TextRun) {
        let (handle, v) = self.texts.allocate();
        (PrimitiveId { kind: PrimitiveKind::Text, handle }, v)
    }

    pub fn alloc_pixmap(&mut self) -> (PrimitiveId, &mut PixmapBlit) {
        let (handle, v) = self.blits.allocate();
        (PrimitiveId { kind: PrimitiveKind::Pixmap, handle }, v)
    }

    /// Borrow the primitive behind `id`, whatever its kind.
    pub fn get(&self, id: PrimitiveId) -> Option<PrimitiveRef<'_>> {
        let h = id.handle;
        Some(match id.kind {
            PrimitiveKind::Contours => PrimitiveRef::Contours(self.contours.get(h)?),
            PrimitiveKind::Arc => PrimitiveRef::Arc(self.arcs.get(h)?),
            PrimitiveKind::Rectangle => PrimitiveRef::Rectangle(self.rects.get(h)?),
            PrimitiveKind::Text => PrimitiveRef::Text(self.texts.get(h)?),
            PrimitiveKind::Pixmap => PrimitiveRef::Pixmap(self.blits.get(h)?),
        })
    }

    /// Mutable access to a contour batch. `None` for other kinds.
    pub fn contours_mut(&mut self, id: PrimitiveId) -> Option<&mut ContourBatch> {
        match id.kind {
            PrimitiveKind::Contours => self.contours.get_mut(id.handle),
            _ => None,
        }
    }

    /// See [`Slab::retain`].
    pub fn retain(&mut self, id: PrimitiveId) -> bool {
        let h = id.handle;
        match id.kind {
            PrimitiveKind::Contours => self.contours.retain(h),
            PrimitiveKind::Arc => self.arcs.retain(h),
            PrimitiveKind::Rectangle => self.rects.retain(h),
            PrimitiveKind::Text => self.texts.retain(h),
            PrimitiveKind::Pixmap => self.blits.retain(h),
        }
    }

    /// See [`Slab::release`].
    pub fn release(&mut self, id: PrimitiveId) -> bool {
        let h = id.handle;
        match id.kind {
            PrimitiveKind::Contours => self.contours.release(h),
            PrimitiveKind::Arc => self.arcs.release(h),
            PrimitiveKind::Rectangle => self.rects.release(h),
            PrimitiveKind::Text => self.texts.release(h),
            PrimitiveKind::Pixmap => self.blits.release(h),
        }
    }

    /// Live primitives over all kinds.
    pub fn live(&self) -> usize {
        self.contours.live()
            + self.arcs.live()
            + self.rects.live()
            + self.texts.live()
            + self.blits.live()
    }

    pub fn heap_live(&self) -> usize {
        self.contours.heap_live()
            + self.arcs.heap_live()
            + self.rects.heap_live()
            + self.texts.heap_live()
            + self.blits.heap_live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Buf {
        data: Vec<u8>,
        freed: u32,
    }

    impl Recycle for Buf {
        fn free(&mut self) {
            self.data.clear();
            self.freed += 1;
        }
    }

    #[test]
    fn test_slot_reuse_resets_payload() {
        let mut slab: Slab<Buf> = Slab::new("buf", 2);
        let (h, v) = slab.allocate();
        v.data.extend_from_slice(b"abc");
        assert!(!h.is_heap());
        assert!(slab.release(h));

        let (h2, v) = slab.allocate();
        assert_eq!(h2.index(), h.index());
        assert!(v.data.is_empty());
        assert_eq!(v.freed, 1);
        // The old handle no longer resolves
        assert!(slab.get(h).is_none());
        assert!(slab.get(h2).is_some());
    }

    #[test]
    fn test_heap_fallback_and_reclaim() {
        let mut slab: Slab<Buf> = Slab::new("buf", 1);
        let (a, _) = slab.allocate();
        let (b, _) = slab.allocate();
        let (c, _) = slab.allocate();
        assert!(!a.is_heap());
        assert!(b.is_heap() && c.is_heap());
        assert_eq!(slab.live(), 3);
        assert_eq!(slab.heap_live(), 2);

        assert!(slab.release(b));
        assert_eq!(slab.heap_live(), 1);
        assert!(slab.get(b).is_none());

        // Freed heap index is reused
        let (d, _) = slab.allocate();
        assert!(d.is_heap());
        assert_eq!(d.index(), b.index());
        assert!(slab.get(b).is_none());
        assert!(slab.get(d).is_some());
        assert_eq!(slab.live(), 3);
    }

    #[test]
    fn test_ref_counting() {
        let mut slab: Slab<Buf> = Slab::new("buf", 1);
        let (h, _) = slab.allocate();
        assert!(slab.retain(h));
        assert_eq!(slab.refs(h), 2);
        assert!(!slab.release(h));
        assert_eq!(slab.live(), 1);
        assert!(slab.release(h));
        assert_eq!(slab.live(), 0);
        // Releasing a stale handle is harmless
        assert!(!slab.release(h));
        assert!(!slab.retain(h));
    }

    #[test]
    fn test_zero_capacity_goes_to_heap() {
        let mut slab: Slab<Buf> = Slab::new("buf", 0);
        let (h, _) = slab.allocate();
        assert!(h.is_heap());
        assert!(slab.release(h));
        assert_eq!(slab.live(), 0);
    }

    #[test]
    fn test_primitive_pool_kinds() {
        let mut pool = PrimitivePool::new(2);
        let (c, batch) = pool.alloc_contours();
        batch.contours.push(Default::default());
        let (t, run) = pool.alloc_text();
        run.text.push_str("hi");
        assert_eq!(pool.live(), 2);

        assert!(matches!(pool.get(c), Some(PrimitiveRef::Contours(b)) if b.contours.len() == 1));
        assert!(matches!(pool.get(t), Some(PrimitiveRef::Text(r)) if r.text == "hi"));
        assert!(pool.contours_mut(t).is_none());

        assert!(pool.release(c));
        assert!(pool.release(t));
        assert_eq!(pool.live(), 0);
        assert!(pool.get(c).is_none());
    }

    #[test]
    fn test_primitive_pool_overflow() {
        let mut pool = PrimitivePool::new(1);
        let ids: Vec<_> = (0..4).map(|_| pool.alloc_rect().0).collect();
        assert_eq!(pool.heap_live(), 3);
        for id in ids {
            pool.release(id);
        }
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.heap_live(), 0);
    }
}
