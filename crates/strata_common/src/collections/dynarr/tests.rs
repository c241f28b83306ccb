use std::{
    cell::Cell,
    collections::hash_map::DefaultHasher,
    io,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use parking_lot::Mutex;
use proptest::prelude::*;
use strata_logging::get_logger;

use super::*;
use crate::mem::thread_alloc_stats;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static CLONES_LEFT: Cell<usize> = const { Cell::new(usize::MAX) };
}

/// Counts its live instances, and panics on clone once the clone budget of the current thread runs out.
#[derive(Debug, PartialEq)]
struct Tracked(u32);

impl Tracked {
    fn new(id: u32) -> Self {
        LIVE.with(|live| live.set(live.get() + 1));
        Self(id)
    }

    fn live() -> isize {
        LIVE.with(Cell::get)
    }

    fn allow_clones(count: usize) {
        CLONES_LEFT.with(|left| left.set(count));
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let left = CLONES_LEFT.with(Cell::get);
        if left == 0 {
            panic!("clone budget exhausted");
        }
        CLONES_LEFT.with(|cell| cell.set(left - 1));
        Self::new(self.0)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

fn ids(arr: &DynArr<Tracked>) -> DynArr<u32> {
    arr.iter().map(|t| t.0).collect()
}

/// Announces `claimed` items, but only yields `actual` of them.
struct ShortIter {
    claimed: usize,
    actual:  usize,
    next:    i32,
}

impl Iterator for ShortIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.actual == 0 {
            return None;
        }
        self.actual -= 1;
        self.claimed = self.claimed.saturating_sub(1);
        self.next += 1;
        Some(self.next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.claimed, Some(self.claimed))
    }
}

impl ExactSizeIterator for ShortIter {}

/// Log writer keeping everything written to it, attached to the global logger while alive.
///
/// Other tests log concurrently, so only check for complete messages.
struct LogCapture {
    buf:   Arc<Mutex<Vec<u8>>>,
    index: usize,
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    fn attach() -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let index = match get_logger().add_writer(Box::new(CaptureWriter(buf.clone()))) {
            Ok(index) => index,
            Err(_) => panic!("no free writer slot on the global logger"),
        };
        Self { buf, index }
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

impl Drop for LogCapture {
    fn drop(&mut self) {
        _ = get_logger().remove_writer(self.index);
    }
}

//--------------------------------------------------------------

#[test]
fn dynarr_new() {
    let arr = DynArr::<i32>::new();
    assert_eq!(arr.capacity(), 0);
    assert_eq!(arr.len(), 0);
    assert!(arr.is_empty());
    assert!(arr.data().is_null());

    let arr = DynArr::<i32>::with_capacity(21);
    assert_eq!(arr.capacity(), 21);
    assert_eq!(arr.len(), 0);

    let arr: DynArr<i32> = dynarr![];
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn dynarr_with_default() {
    let arr = DynArr::<String>::with_default(5);
    assert_eq!(arr.len(), 5);
    assert_eq!(arr.capacity(), 5);
    assert!(arr.iter().all(String::is_empty));
}

#[test]
fn dynarr_from_elem() {
    let arr = DynArr::from_elem("hello", 3);
    assert_eq!(arr, ["hello", "hello", "hello"]);
    assert_eq!(arr.capacity(), 3);

    let arr = dynarr![String::from("x"); 0];
    assert!(arr.is_empty());
}

#[test]
fn dynarr_from_list_and_iter() {
    let arr = dynarr!["first", "second", "third", "fourth", "fifth"];
    assert_eq!(arr.len(), 5);
    assert_eq!(arr[0], "first");
    assert_eq!(arr[4], "fifth");

    let source = ["alpha", "beta", "gamma"];
    let arr = DynArr::from_iter_exact(source.iter().copied());
    assert_eq!(arr, source);
    assert_eq!(arr.capacity(), 3);

    let arr: DynArr<_> = source.iter().map(|s| s.len()).collect();
    assert_eq!(arr, [5, 4, 5]);
}

#[test]
fn dynarr_clone() {
    let mut original = dynarr!["apple", "banana", "cherry", "date", "elderberry"];
    let copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.capacity(), copy.len());

    original[0] = "modified";
    assert_eq!(copy[0], "apple");
    assert_eq!(original[0], "modified");

    let mut assigned = dynarr!["x"];
    assigned.clone_from(&copy);
    assert_eq!(assigned, copy);
}

#[test]
fn dynarr_move() {
    let mut source = dynarr!["cat", "dog", "bird", "fish", "hamster"];
    let moved = mem::take(&mut source);
    assert_eq!(moved.len(), 5);
    assert_eq!(moved[0], "cat");
    assert!(source.is_empty());
    assert_eq!(source.capacity(), 0);

    let mut target = dynarr!["old"];
    assert_eq!(target.len(), 1);
    target = dynarr!["red", "green", "blue"];
    assert_eq!(target, ["red", "green", "blue"]);
}

#[test]
fn dynarr_access() {
    let mut arr = dynarr![10, 20, 30, 40, 50];
    assert_eq!(arr[0], 10);
    assert_eq!(arr[4], 50);
    assert_eq!(arr.at(2), Ok(&30));
    assert_eq!(arr.at(5), Err(DynArrError::OutOfRange { index: 5, len: 5 }));
    assert!(arr.at_mut(7).is_err());

    assert_eq!(arr.front(), Some(&10));
    assert_eq!(arr.back(), Some(&50));
    *arr.front_mut().unwrap() = 100;
    *arr.back_mut().unwrap() = 500;
    *arr.at_mut(1).unwrap() = 200;
    assert_eq!(arr, [100, 200, 30, 40, 500]);

    assert!(!arr.data().is_null());
    assert_eq!(unsafe { *arr.data() }, 100);

    let empty = DynArr::<i32>::new();
    assert_eq!(empty.front(), None);
    assert_eq!(empty.back(), None);
}

#[test]
#[should_panic]
fn dynarr_index_out_of_bounds() {
    let arr = dynarr![1, 2, 3];
    let _value = arr[3];
}

#[test]
fn dynarr_at_reports_out_of_range() {
    let mut arr = DynArr::new();
    assert_eq!(arr.at(0), Err(DynArrError::OutOfRange { index: 0, len: 0 }));
    arr.push(1);
    assert_eq!(arr.at(0), Ok(&1));
    assert!(arr.at(1).is_err());
}

#[test]
fn dynarr_iteration() {
    let mut arr = dynarr![1, 2, 3, 4, 5];

    let mut sum = 0;
    for x in &arr {
        sum += x;
    }
    assert_eq!(sum, 15);

    let reversed: DynArr<_> = arr.iter().rev().copied().collect();
    assert_eq!(reversed, [5, 4, 3, 2, 1]);

    for x in &mut arr {
        *x *= 2;
    }
    assert_eq!(arr, [2, 4, 6, 8, 10]);
}

#[test]
fn dynarr_reserve() {
    let mut arr = DynArr::<i32>::new();
    arr.reserve(10);
    assert_eq!(arr.capacity(), 10);
    assert!(arr.is_empty());

    arr.reserve(4);
    assert_eq!(arr.capacity(), 10);

    let mut arr = DynArr::<i32>::new();
    assert_eq!(arr.try_reserve(21), Ok(()));
    assert_eq!(arr.capacity(), 21);
}

#[test]
fn dynarr_reserve_beyond_max_size() {
    let mut arr = dynarr![1u64, 2, 3];
    assert_eq!(arr.max_size(), isize::MAX as usize / 8);
    assert_eq!(arr.try_reserve(arr.max_size() + 1), Err(TryReserveError::CapacityOverflow));
    assert_eq!(arr, [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);

    assert!(DynArr::<u64>::try_with_capacity(usize::MAX).is_err());
}

#[test]
#[should_panic(expected = "capacity overflow")]
fn dynarr_reserve_beyond_max_size_panics() {
    let mut arr = DynArr::<u32>::new();
    arr.reserve(usize::MAX);
}

#[test]
fn dynarr_shrink() {
    let mut arr = DynArr::with_capacity(10);
    arr.push(1);
    arr.push(2);
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 2);
    assert_eq!(arr, [1, 2]);

    arr.clear();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 2);

    let before = thread_alloc_stats();
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 0);
    assert!(arr.data().is_null());
    if cfg!(feature = "memory_tracking") {
        let after = thread_alloc_stats();
        assert_eq!(after.live_allocs, before.live_allocs - 1);
        assert_eq!(after.live_bytes, before.live_bytes - 2 * mem::size_of::<i32>());
    }
}

#[test]
fn dynarr_push_growth() {
    let mut arr = DynArr::new();
    let mut caps = DynArr::new();
    for i in 0..9 {
        arr.push(i);
        if caps.back() != Some(&arr.capacity()) {
            caps.push(arr.capacity());
        }
    }
    assert_eq!(caps, [1, 2, 4, 8, 16]);
    assert_eq!(arr, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn dynarr_push_emplace_pop() {
    let mut arr = DynArr::new();
    arr.push(String::from("a"));
    let elem = arr.emplace_back(|| String::from("test"));
    elem.push('!');
    assert_eq!(arr, ["a", "test!"]);

    assert_eq!(arr.pop().as_deref(), Some("test!"));
    assert_eq!(arr.pop().as_deref(), Some("a"));
    assert_eq!(arr.pop(), None);
}

#[test]
fn dynarr_insert_erase() {
    let mut arr = dynarr![1, 2, 3, 4, 5];

    assert_eq!(arr.insert(2, 99), 2);
    assert_eq!(arr.len(), 6);
    assert_eq!(arr[2], 99);

    assert_eq!(arr.insert_n(0, 3, 77), 0);
    assert_eq!(arr.len(), 9);
    assert_eq!(arr[..3], [77, 77, 77]);

    let end = arr.len();
    assert_eq!(arr.insert_from_slice(end, &[88, 89]), 9);
    assert_eq!(arr[9], 88);
    assert_eq!(arr[10], 89);

    assert_eq!(arr.erase(0), 0);
    assert_eq!(arr[0], 77);
    assert_eq!(arr.len(), 10);

    assert_eq!(arr.erase_range(0..2), 0);
    assert_eq!(arr.len(), 8);
    assert_eq!(arr, [1, 2, 99, 3, 4, 5, 88, 89]);
}

#[test]
fn dynarr_insert_variants() {
    let mut arr = DynArr::with_capacity(8);
    arr.extend([1, 2, 3]);

    assert_eq!(arr.emplace(1, || 10), 1);
    assert_eq!(arr.insert_iter(4, [20, 21]), 4);
    assert_eq!(arr, [1, 10, 2, 3, 20, 21]);
    assert_eq!(arr.capacity(), 8);

    assert_eq!(arr.insert_n(3, 0, 5), 3);
    assert_eq!(arr.insert_from_slice(0, &[]), 0);
    assert_eq!(arr.len(), 6);
}

#[test]
fn dynarr_insert_grows_geometrically() {
    let mut arr = dynarr![1, 2, 3, 4];
    arr.insert(4, 5);
    assert_eq!(arr.capacity(), 8);

    let mut arr = dynarr![1, 2];
    arr.insert_n(1, 10, 0);
    assert_eq!(arr.capacity(), 12);
    assert_eq!(arr.len(), 12);
    assert_eq!(arr[0], 1);
    assert_eq!(arr[11], 2);
}

#[test]
#[should_panic(expected = "insertion index (is 4) should be <= len (is 3)")]
fn dynarr_insert_past_end() {
    let mut arr = dynarr![1, 2, 3];
    arr.insert(4, 0);
}

#[test]
fn dynarr_erase_variants() {
    let mut arr = dynarr![1, 2, 3, 4, 5, 6];
    assert_eq!(arr.erase_range(2..2), 2);
    assert_eq!(arr.len(), 6);

    assert_eq!(arr.erase_range(4..), 4);
    assert_eq!(arr, [1, 2, 3, 4]);

    assert_eq!(arr.erase_range(..=1), 0);
    assert_eq!(arr, [3, 4]);

    assert_eq!(arr.remove(0), 3);
    assert_eq!(arr.erase(0), 0);
    assert!(arr.is_empty());
}

#[test]
#[should_panic(expected = "erase index (is 2) should be < len (is 2)")]
fn dynarr_erase_past_end() {
    let mut arr = dynarr![1, 2];
    arr.erase(2);
}

#[test]
#[should_panic(expected = "range end (is 5) should be <= len (is 3)")]
fn dynarr_erase_range_past_end() {
    let mut arr = dynarr![1, 2, 3];
    arr.erase_range(1..5);
}

#[test]
fn dynarr_resize() {
    let mut arr: DynArr<String> = ["one", "two", "three"].iter().map(|s| s.to_string()).collect();

    arr.resize_default(5);
    assert_eq!(arr.len(), 5);
    assert_eq!(arr[3], "");
    assert_eq!(arr[4], "");

    arr.resize(7, String::from("new"));
    assert_eq!(arr.len(), 7);
    assert_eq!(arr[5], "new");
    assert_eq!(arr[6], "new");

    arr.resize_default(3);
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[2], "three");
    assert_eq!(arr.capacity(), 7);
}

#[test]
fn dynarr_truncate() {
    let mut arr = dynarr![1, 2, 3, 4];
    arr.truncate(6);
    assert_eq!(arr.len(), 4);
    arr.truncate(1);
    assert_eq!(arr, [1]);
    assert_eq!(arr.capacity(), 4);
}

#[test]
fn dynarr_swap() {
    let mut a = dynarr![1, 2, 3];
    let mut b = dynarr![4, 5, 6, 7, 8];
    let (ptr_a, ptr_b) = (a.as_ptr(), b.as_ptr());

    a.swap(&mut b);
    assert_eq!(a, [4, 5, 6, 7, 8]);
    assert_eq!(b, [1, 2, 3]);
    assert_eq!(a.as_ptr(), ptr_b);
    assert_eq!(b.as_ptr(), ptr_a);
}

#[test]
fn dynarr_reassign_itself() {
    let mut arr = dynarr![1, 2, 3];
    arr = mem::take(&mut arr);
    assert_eq!(arr, [1, 2, 3]);

    let snapshot = arr.clone();
    arr.clone_from(&snapshot);
    assert_eq!(arr, [1, 2, 3]);

    let mut first = dynarr![1, 2, 3, 4, 5];
    first.erase_range(0..1);
    assert_eq!(first, [2, 3, 4, 5]);
}

#[test]
fn dynarr_comparison() {
    let a = dynarr![1, 2, 3];
    let b = dynarr![1, 2, 3];
    let c = dynarr![1, 2, 4];
    let d = dynarr![1, 2];

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);

    assert_eq!(a.cmp(&b), Ordering::Equal);
    assert_eq!(a.cmp(&c), Ordering::Less);
    assert_eq!(a.cmp(&d), Ordering::Greater);
    assert!(d < a);

    assert_eq!(a, [1, 2, 3]);
    assert_eq!([1, 2, 3], a);
    assert_eq!(&[1, 2, 3][..], a);
}

#[test]
fn dynarr_hash_matches_slice() {
    let arr = dynarr![4, 8, 15, 16, 23, 42];

    let mut hasher = DefaultHasher::new();
    arr.hash(&mut hasher);
    let arr_hash = hasher.finish();

    let mut hasher = DefaultHasher::new();
    arr.as_slice().hash(&mut hasher);
    assert_eq!(arr_hash, hasher.finish());
}

#[test]
fn dynarr_assign() {
    let mut arr = dynarr!["x"];
    arr.assign(["morning", "afternoon", "evening"]);
    assert_eq!(arr, ["morning", "afternoon", "evening"]);

    arr.assign_from_slice(&["winter", "spring"]);
    assert_eq!(arr, ["winter", "spring"]);
}

#[test]
fn dynarr_extend() {
    let mut arr = dynarr![1, 2];
    arr.extend(3..6);
    arr.extend(&[6, 7]);
    assert_eq!(arr, [1, 2, 3, 4, 5, 6, 7]);

    let mut arr = DynArr::new();
    arr.extend((0..5).filter(|x| x % 2 == 0));
    assert_eq!(arr, [0, 2, 4]);
}

#[test]
fn dynarr_into_iter() {
    let arr = dynarr![String::from("a"), String::from("b"), String::from("c")];
    let mut iter = arr.into_iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next().as_deref(), Some("a"));
    assert_eq!(iter.next_back().as_deref(), Some("c"));

    let copy = iter.clone();
    assert_eq!(iter.as_slice(), ["b"]);
    assert_eq!(copy.collect::<DynArr<_>>(), ["b"]);
    assert_eq!(format!("{iter:?}"), r#"IntoIter(["b"])"#);
}

#[test]
fn dynarr_into_iter_drops_remaining() {
    Tracked::allow_clones(usize::MAX);
    let before = thread_alloc_stats();
    {
        let arr = dynarr![Tracked::new(1), Tracked::new(2), Tracked::new(3)];
        let mut iter = arr.into_iter();
        assert_eq!(iter.next().map(|t| t.0), Some(1));
        assert_eq!(Tracked::live(), 2);
    }
    assert_eq!(Tracked::live(), 0);
    assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
}

#[test]
fn dynarr_debug_and_show() {
    let arr = dynarr![1, 2, 3];
    assert_eq!(format!("{arr:?}"), "[1, 2, 3]");

    let capture = LogCapture::attach();
    arr.show();
    get_logger().flush();

    let out = capture.contents();
    assert!(out.contains("[DEBUG  ] [collections(dynarr)]"), "{out}");
    assert!(out.contains("[1, 2, 3] (size: 3, capacity: 3)"), "{out}");
}

#[test]
fn dynarr_capacity_overflow_is_logged() {
    let capture = LogCapture::attach();
    let res = catch_unwind(|| DynArr::<u64>::new().reserve(usize::MAX));
    assert!(res.is_err());

    // Errors reach the writers without an explicit flush.
    let out = capture.contents();
    assert!(out.contains("[ERROR  ] [collections(array)]"), "{out}");
    assert!(out.contains("Requested capacity exceeds the maximum size"), "{out}");
}

#[test]
fn dynarr_zero_sized() {
    let before = thread_alloc_stats();

    let mut arr = DynArr::new();
    for _ in 0..10 {
        arr.push(());
    }
    assert_eq!(arr.len(), 10);
    assert!(arr.capacity() >= 10);
    assert_eq!(arr.max_size(), isize::MAX as usize);

    arr.reserve(100);
    assert_eq!(arr.capacity(), 100);
    arr.insert_n(5, 3, ());
    assert_eq!(arr.len(), 13);
    assert_eq!(arr.erase_range(0..4), 0);
    assert_eq!(arr.pop(), Some(()));
    assert_eq!(arr.len(), 8);
    assert_eq!(arr.into_iter().count(), 8);

    assert_eq!(thread_alloc_stats().total_allocs, before.total_allocs);
}

#[test]
fn dynarr_move_only_elements() {
    let mut arr = DynArr::new();
    for i in 0..20 {
        arr.push(Box::new(i));
    }
    arr.insert(0, Box::new(-1));
    arr.shrink_to_fit();
    let sum: i32 = arr.into_iter().map(|b| *b).sum();
    assert_eq!(sum, 189);
}

#[test]
fn dynarr_releases_memory() {
    let before = thread_alloc_stats();
    {
        let mut arr = DynArr::new();
        for i in 0..100 {
            arr.push(i.to_string());
        }
        arr.insert_n(50, 20, String::from("x"));
        arr.erase_range(10..90);
        arr.resize(200, String::new());
        arr.shrink_to_fit();
    }
    assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
    assert_eq!(thread_alloc_stats().live_bytes, before.live_bytes);
}

//--------------------------------------------------------------

#[test]
fn dynarr_from_elem_panic_leaks_nothing() {
    let before = thread_alloc_stats();
    Tracked::allow_clones(2);
    let res = catch_unwind(|| DynArr::from_elem(Tracked::new(7), 5));
    Tracked::allow_clones(usize::MAX);

    assert!(res.is_err());
    assert_eq!(Tracked::live(), 0);
    assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
}

#[test]
fn dynarr_insert_n_panic_on_realloc_keeps_array() {
    let mut arr = dynarr![Tracked::new(1), Tracked::new(2), Tracked::new(3)];
    let before = thread_alloc_stats();

    Tracked::allow_clones(1);
    let res = catch_unwind(AssertUnwindSafe(|| {
        arr.insert_n(1, 3, Tracked::new(9));
    }));
    Tracked::allow_clones(usize::MAX);

    assert!(res.is_err());
    assert_eq!(ids(&arr), [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);
    assert_eq!(Tracked::live(), 3);
    assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
}

#[test]
fn dynarr_insert_n_panic_in_place_closes_gap() {
    let mut arr = DynArr::with_capacity(10);
    for i in 1..=4 {
        arr.push(Tracked::new(i));
    }

    Tracked::allow_clones(1);
    let res = catch_unwind(AssertUnwindSafe(|| {
        arr.insert_n(1, 3, Tracked::new(9));
    }));
    Tracked::allow_clones(usize::MAX);

    assert!(res.is_err());
    assert_eq!(ids(&arr), [1, 9, 2, 3, 4]);
    assert_eq!(arr.capacity(), 10);
    assert_eq!(Tracked::live(), 5);
    drop(arr);
    assert_eq!(Tracked::live(), 0);
}

#[test]
fn dynarr_resize_panic_keeps_constructed() {
    let mut arr = dynarr![Tracked::new(1), Tracked::new(2)];

    Tracked::allow_clones(1);
    let res = catch_unwind(AssertUnwindSafe(|| {
        arr.resize(5, Tracked::new(0));
    }));
    Tracked::allow_clones(usize::MAX);

    assert!(res.is_err());
    assert_eq!(ids(&arr), [1, 2, 0]);
    assert_eq!(Tracked::live(), 3);
}

#[test]
fn dynarr_clone_panic_leaves_source() {
    let arr = dynarr![Tracked::new(1), Tracked::new(2), Tracked::new(3)];
    let mut target = dynarr![Tracked::new(4)];
    let before = thread_alloc_stats();

    Tracked::allow_clones(1);
    let res = catch_unwind(AssertUnwindSafe(|| target.clone_from(&arr)));
    Tracked::allow_clones(usize::MAX);

    assert!(res.is_err());
    assert_eq!(ids(&arr), [1, 2, 3]);
    assert_eq!(ids(&target), [4]);
    assert_eq!(Tracked::live(), 4);
    assert_eq!(thread_alloc_stats().live_allocs, before.live_allocs);
}

#[test]
fn dynarr_emplace_back_panic_leaves_array() {
    let mut arr = dynarr![1, 2];
    let res = catch_unwind(AssertUnwindSafe(|| {
        arr.emplace_back(|| panic!("construction failed"));
    }));
    assert!(res.is_err());
    assert_eq!(arr, [1, 2]);
    assert_eq!(arr.capacity(), 2);
}

#[test]
fn dynarr_insert_iter_short_iterator() {
    let mut arr = DynArr::with_capacity(10);
    arr.extend([1, 2, 3]);
    arr.insert_iter(1, ShortIter { claimed: 3, actual: 1, next: 10 });
    assert_eq!(arr, [1, 11, 2, 3]);

    let mut arr = dynarr![1, 2, 3];
    arr.insert_iter(1, ShortIter { claimed: 3, actual: 1, next: 10 });
    assert_eq!(arr, [1, 11, 2, 3]);
    assert_eq!(arr.capacity(), 6);
}

//--------------------------------------------------------------

proptest! {
    #[test]
    fn push_keeps_every_element(values in prop::collection::vec(any::<i32>(), 0..200)) {
        let mut arr = DynArr::new();
        for &value in &values {
            arr.push(value);
            prop_assert!(arr.len() <= arr.capacity());
        }
        prop_assert_eq!(arr.as_slice(), values.as_slice());
    }

    #[test]
    fn insert_n_matches_splice(
        initial in prop::collection::vec(any::<u8>(), 0..50),
        at in any::<prop::sample::Index>(),
        count in 0usize..20,
        value in any::<u8>(),
    ) {
        let index = at.index(initial.len() + 1);
        let mut expected = initial.clone();
        expected.splice(index..index, core::iter::repeat(value).take(count));

        let mut arr = DynArr::from(initial.as_slice());
        prop_assert_eq!(arr.insert_n(index, count, value), index);
        prop_assert_eq!(arr.as_slice(), expected.as_slice());
    }

    #[test]
    fn erase_range_matches_drain(
        initial in prop::collection::vec(any::<u16>(), 0..50),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let (a, b) = (a.index(initial.len() + 1), b.index(initial.len() + 1));
        let (start, end) = (a.min(b), a.max(b));
        let mut expected = initial.clone();
        expected.drain(start..end);

        let mut arr = DynArr::from(initial.as_slice());
        let cap = arr.capacity();
        prop_assert_eq!(arr.erase_range(start..end), start);
        prop_assert_eq!(arr.as_slice(), expected.as_slice());
        prop_assert_eq!(arr.capacity(), cap);
    }

    #[test]
    fn reserve_and_shrink_keep_contents(
        values in prop::collection::vec(any::<i64>(), 0..50),
        new_cap in 0usize..300,
    ) {
        let mut arr = DynArr::from(values.as_slice());
        arr.reserve(new_cap);
        prop_assert_eq!(arr.capacity(), new_cap.max(values.len()));
        prop_assert_eq!(arr.as_slice(), values.as_slice());

        arr.shrink_to_fit();
        prop_assert_eq!(arr.capacity(), values.len());
        prop_assert_eq!(arr.as_slice(), values.as_slice());
    }

    #[test]
    fn equality_follows_contents(
        a in prop::collection::vec(0u8..4, 0..8),
        b in prop::collection::vec(0u8..4, 0..8),
    ) {
        let (x, y) = (DynArr::from(a.as_slice()), DynArr::from(b.as_slice()));
        prop_assert_eq!(x == y, a == b);
        prop_assert_eq!(x.cmp(&y), a.cmp(&b));
    }
}
