use std::ptr::NonNull;

use crate::{
    list::{List, Node},
    region::{Region, MIN_PAYLOAD},
};

/// Number of size classes. Class `k` holds free regions whose maximum
/// payload is at least `2^k`, so one class per bit of `usize` covers every
/// representable size.
pub(crate) const CLASS_COUNT: usize = usize::BITS as usize;

/// The smallest class ever populated: payloads below [`MIN_PAYLOAD`] do
/// not exist.
pub(crate) const MIN_CLASS: usize = MIN_PAYLOAD.ilog2() as usize;

/// The home class of a free region with maximum payload `size`: the
/// largest power of two at or below it.
///
/// Note this is a *lower* bound. A region in class `k` is guaranteed to
/// hold `2^k` bytes but may be smaller than an arbitrary request that also
/// maps to class `k`; the allocation policy accounts for that (see
/// [`search_class_of`] and the speculative probe in
/// [`crate::brkalloc::BrkAlloc`]).
pub(crate) fn class_of(size: usize) -> usize {
    size.max(MIN_PAYLOAD).ilog2() as usize
}

/// The class where a *search* for `size` bytes must start: the smallest
/// `k` with `2^k >= size`. Every region found at this class or above is
/// big enough by construction.
///
/// For sizes that are an exact power of two this coincides with
/// [`class_of`]; otherwise it is one class higher, and the class below may
/// still contain perfectly fitting regions.
pub(crate) fn search_class_of(size: usize) -> usize {
    let size = size.max(MIN_PAYLOAD);
    usize::BITS as usize - (size - 1).leading_zeros() as usize
}

/// The table of per-class free lists.
///
/// Free regions keep their link [`Node`] inside their own payload area, so
/// the table itself is just `CLASS_COUNT` list heads:
///
/// ```text
///  classes[4] --> | free 16..31 | --> | free 16..31 |
///  classes[5] --> | free 32..63 |
///  classes[6]     (empty)
///  classes[7] --> | free 128..255 | --> ...
///      ...
/// ```
///
/// Insertion and removal are O(1). The class of a region is always derived
/// from its *current* maximum payload, which is why every caller that
/// resizes a region must take it out of the table first.
pub(crate) struct FreeLists {
    classes: [List; CLASS_COUNT],
}

impl FreeLists {
    pub const fn new() -> Self {
        Self { classes: [List::EMPTY; CLASS_COUNT] }
    }

    #[inline]
    pub fn class(&self, class: usize) -> &List {
        &self.classes[class]
    }

    /// First node of `class`, the most recently freed region there.
    #[inline]
    pub fn first_in(&self, class: usize) -> Option<NonNull<Node>> {
        self.classes[class].first()
    }

    /// Links a free region into its home class, writing the link node into
    /// the region's payload area.
    ///
    /// **SAFETY**: `region` must point to a live header of a free region
    /// that is in no free list.
    pub unsafe fn insert(&mut self, region: NonNull<Region>) {
        unsafe {
            debug_assert!(region.as_ref().is_free());

            let class = class_of(region.as_ref().max_payload());
            self.classes[class].push_front(Region::free_link(region).cast());
        }
    }

    /// Unlinks a free region from its home class.
    ///
    /// **SAFETY**: `region` must point to a live header of a free region
    /// currently linked in the table, with the same `total_size` it had
    /// when inserted.
    pub unsafe fn remove(&mut self, region: NonNull<Region>) {
        unsafe {
            debug_assert!(region.as_ref().is_free());

            let class = class_of(region.as_ref().max_payload());
            self.classes[class].remove(Region::free_link(region));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{ALIGNMENT, REGION_HEADER_SIZE};

    #[test]
    fn home_class_is_floor_log2() {
        assert_eq!(class_of(1), MIN_CLASS);
        assert_eq!(class_of(16), 4);
        assert_eq!(class_of(17), 4);
        assert_eq!(class_of(100), 6);
        assert_eq!(class_of(120), 6);
        assert_eq!(class_of(128), 7);
        assert_eq!(class_of(2000), 10);
    }

    #[test]
    fn search_class_is_ceiling_log2() {
        assert_eq!(search_class_of(1), 4);
        assert_eq!(search_class_of(16), 4);
        assert_eq!(search_class_of(17), 5);
        assert_eq!(search_class_of(100), 7);
        assert_eq!(search_class_of(128), 7);
        assert_eq!(search_class_of(129), 8);
    }

    #[test]
    fn search_class_never_undershoots() {
        for size in 1..=4096_usize {
            let class = search_class_of(size);
            assert!(1_usize << class >= size.max(MIN_PAYLOAD));
            assert!(class >= class_of(size));
            assert!(class <= class_of(size) + 1);
        }
    }

    #[repr(align(16))]
    struct AlignedArena([u8; 1024]);

    unsafe fn fake_region(base: NonNull<u8>, offset: usize, total_size: usize) -> NonNull<Region> {
        let region = unsafe { NonNull::new_unchecked(base.as_ptr().add(offset)).cast::<Region>() };
        unsafe { Region::init(region, total_size, 0) };
        region
    }

    #[test]
    fn insert_links_at_home_class_head() {
        let mut arena = AlignedArena([0; 1024]);
        let base = NonNull::from(&mut arena).cast::<u8>();
        let mut table = FreeLists::new();

        unsafe {
            // payloads of 16 and 48 bytes: classes 4 and 5
            let small = fake_region(base, 0, REGION_HEADER_SIZE + ALIGNMENT);
            let large = fake_region(base, 256, REGION_HEADER_SIZE + 3 * ALIGNMENT);

            table.insert(small);
            table.insert(large);

            assert_eq!(table.class(4).len(), 1);
            assert_eq!(table.class(5).len(), 1);
            assert_eq!(table.first_in(4), Some(Region::free_link(small)));
            assert_eq!(table.first_in(5), Some(Region::free_link(large)));

            // LIFO: a second class-4 region becomes the new head
            let newer = fake_region(base, 512, REGION_HEADER_SIZE + ALIGNMENT);
            table.insert(newer);
            assert_eq!(table.class(4).len(), 2);
            assert_eq!(table.first_in(4), Some(Region::free_link(newer)));

            table.remove(newer);
            assert_eq!(table.first_in(4), Some(Region::free_link(small)));
            table.remove(small);
            table.remove(large);
            assert!(table.class(4).is_empty());
            assert!(table.class(5).is_empty());
        }
    }
}
