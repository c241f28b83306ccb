//! A doubly-linked list with owned nodes.
//!
//! Every node owns the next node through a [`UniquePtr`], the back links are plain pointers.
//! The list itself owns the first node and keeps a pointer to the last one.

use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::{self, FusedIterator},
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

use crate::mem::UniquePtr;

struct Node<T> {
    next: UniquePtr<Node<T>>,
    prev: Option<NonNull<Node<T>>>,
    elem: T,
}

/// A doubly-linked list.
///
/// Pushing and popping at either end takes *O*(1) time.
///
/// # Examples
///
/// ```
/// use strata_common::collections::LinkedList;
///
/// let mut list = LinkedList::new();
/// list.push_back(2);
/// list.push_back(3);
/// list.push_front(1);
///
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.front(), Some(&1));
/// assert_eq!(list.back(), Some(&3));
/// assert!(list.iter().copied().eq([1, 2, 3]));
/// ```
pub struct LinkedList<T> {
    head: UniquePtr<Node<T>>,
    tail: Option<NonNull<Node<T>>>,
    len:  usize,
}

/// An iterator over the elements of a [`LinkedList`].
pub struct Iter<'a, T> {
    head:   Option<NonNull<Node<T>>>,
    tail:   Option<NonNull<Node<T>>>,
    len:    usize,
    marker: PhantomData<&'a Node<T>>,
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.len).finish()
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

/// A mutable iterator over the elements of a [`LinkedList`].
pub struct IterMut<'a, T> {
    head:   Option<NonNull<Node<T>>>,
    tail:   Option<NonNull<Node<T>>>,
    len:    usize,
    marker: PhantomData<&'a mut Node<T>>,
}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.len).finish()
    }
}

/// An owning iterator over the elements of a [`LinkedList`].
pub struct IntoIter<T> {
    list: LinkedList<T>,
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

impl<T: Clone> Clone for IntoIter<T> {
    fn clone(&self) -> Self {
        IntoIter { list: self.list.clone() }
    }
}

// private methods
impl<T> LinkedList<T> {
    fn push_front_node(&mut self, mut node: UniquePtr<Node<T>>) {
        let old_head = mem::replace(&mut self.head, UniquePtr::null());
        match old_head.get() {
            // SAFETY: `old` is owned by this list, and no references to it are alive while `&mut self` is held.
            Some(mut old) => unsafe { old.as_mut().prev = node.get() },
            None => self.tail = node.get(),
        }
        node.next = old_head;
        self.head = node;
        self.len += 1;
    }

    fn push_back_node(&mut self, mut node: UniquePtr<Node<T>>) {
        node.prev = self.tail;
        let new_tail = node.get();
        match self.tail {
            // SAFETY: `tail` is owned by this list, and no references to it are alive while `&mut self` is held.
            Some(mut tail) => unsafe { tail.as_mut().next = node },
            None => self.head = node,
        }
        self.tail = new_tail;
        self.len += 1;
    }

    /// Detach the first node, its `next` link is cleared, so dropping it only drops a single element.
    fn pop_front_node(&mut self) -> Option<UniquePtr<Node<T>>> {
        if self.head.is_null() {
            return None;
        }

        let mut node = mem::replace(&mut self.head, UniquePtr::null());
        let next = mem::replace(&mut node.next, UniquePtr::null());
        match next.get() {
            // SAFETY: `next` is owned by this list.
            Some(mut next) => unsafe { next.as_mut().prev = None },
            None => self.tail = None,
        }
        self.head = next;
        self.len -= 1;
        Some(node)
    }

    fn pop_back_node(&mut self) -> Option<UniquePtr<Node<T>>> {
        let tail = self.tail?;
        // SAFETY: `tail` and its predecessor are owned by this list, and no references to them are alive while `&mut self` is held.
        unsafe {
            let prev = tail.as_ref().prev;
            let node = match prev {
                Some(mut prev) => mem::replace(&mut prev.as_mut().next, UniquePtr::null()),
                None => mem::replace(&mut self.head, UniquePtr::null()),
            };
            self.tail = prev;
            self.len -= 1;
            Some(node)
        }
    }

    fn into_elem(node: UniquePtr<Node<T>>) -> Option<T> {
        UniquePtr::into_inner(node).map(|node| node.elem)
    }
}

impl<T> LinkedList<T> {
    /// Creates an empty `LinkedList`.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { head: UniquePtr::null(), tail: None, len: 0 }
    }

    /// Creates a list holding `count` clones of `elem`.
    pub fn from_elem(elem: T, count: usize) -> Self where
        T: Clone
    {
        iter::repeat(elem).take(count).collect()
    }

    /// Creates a list holding `count` default values.
    pub fn with_default(count: usize) -> Self where
        T: Default
    {
        iter::repeat_with(T::default).take(count).collect()
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest number of elements the list could ever hold, based on the size of a node and the addressable range.
    pub const fn max_size(&self) -> usize {
        isize::MAX as usize / mem::size_of::<Node<T>>()
    }

    /// Returns a reference to the first element, or `None` if the list is empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.elem)
    }

    /// Returns a mutable reference to the first element, or `None` if the list is empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.head.as_mut().map(|node| &mut node.elem)
    }

    /// Returns a reference to the last element, or `None` if the list is empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        // SAFETY: `tail` is owned by this list, which is borrowed for the lifetime of the reference.
        self.tail.map(|node| unsafe { &(*node.as_ptr()).elem })
    }

    /// Returns a mutable reference to the last element, or `None` if the list is empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        // SAFETY: `tail` is owned by this list, which is mutably borrowed for the lifetime of the reference.
        self.tail.map(|node| unsafe { &mut (*node.as_ptr()).elem })
    }

    /// Returns `true` if the list contains an element equal to `x`.
    pub fn contains(&self, x: &T) -> bool where
        T: PartialEq
    {
        self.iter().any(|e| e == x)
    }

    /// Adds an element first in the list.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    pub fn push_front(&mut self, elem: T) {
        self.push_front_node(UniquePtr::new(Node { next: UniquePtr::null(), prev: None, elem }));
    }

    /// Appends an element to the back of the list.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    pub fn push_back(&mut self, elem: T) {
        self.push_back_node(UniquePtr::new(Node { next: UniquePtr::null(), prev: None, elem }));
    }

    /// Removes the first element and returns it, or `None` if the list is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        self.pop_front_node().and_then(Self::into_elem)
    }

    /// Removes the last element and returns it, or `None` if the list is empty.
    pub fn pop_back(&mut self) -> Option<T> {
        self.pop_back_node().and_then(Self::into_elem)
    }

    /// Moves all elements from `other` to the end of the list, leaving `other` empty.
    ///
    /// This reuses all the nodes from `other`, so no allocation happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_common::collections::LinkedList;
    ///
    /// let mut a = LinkedList::from([1, 2]);
    /// let mut b = LinkedList::from([3, 4]);
    /// a.append(&mut b);
    /// assert_eq!(a, LinkedList::from([1, 2, 3, 4]));
    /// assert!(b.is_empty());
    /// ```
    pub fn append(&mut self, other: &mut Self) {
        let Some(mut tail) = self.tail else {
            mem::swap(self, other);
            return;
        };

        let other_head = mem::replace(&mut other.head, UniquePtr::null());
        if let Some(mut head) = other_head.get() {
            // SAFETY: Both nodes are owned by the lists, which are both mutably borrowed.
            unsafe {
                head.as_mut().prev = Some(tail);
                tail.as_mut().next = other_head;
            }
            self.tail = other.tail.take();
            self.len += mem::replace(&mut other.len, 0);
        }
    }

    /// Removes all elements from the list.
    pub fn clear(&mut self) {
        // Dropped one by one, so a long list doesn't recurse through its links.
        drop(mem::take(self));
    }

    /// Provides a forward iterator.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { head: self.head.get(), tail: self.tail, len: self.len, marker: PhantomData }
    }

    /// Provides a forward iterator with mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut { head: self.head.get(), tail: self.tail, len: self.len, marker: PhantomData }
    }
}

impl<T> Drop for LinkedList<T> {
    fn drop(&mut self) {
        struct DropGuard<'a, T>(&'a mut LinkedList<T>);

        impl<T> Drop for DropGuard<'_, T> {
            fn drop(&mut self) {
                // Continue the same loop we do below. This only runs when a destructor has panicked.
                // If another one panics this will abort.
                while self.0.pop_front_node().is_some() {}
            }
        }

        while let Some(node) = self.pop_front_node() {
            let guard = DropGuard(self);
            drop(node);
            mem::forget(guard);
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.head.map(|node| {
            // SAFETY: The node is alive for `'a`, as the list is borrowed for that long.
            let node = unsafe { &*node.as_ptr() };
            self.len -= 1;
            self.head = node.next.get();
            &node.elem
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.tail.map(|node| {
            // SAFETY: The node is alive for `'a`, as the list is borrowed for that long.
            let node = unsafe { &*node.as_ptr() };
            self.len -= 1;
            self.tail = node.prev;
            &node.elem
        })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.head.map(|node| {
            // SAFETY: Each node is handed out once, and the list is mutably borrowed for `'a`.
            let node = unsafe { &mut *node.as_ptr() };
            self.len -= 1;
            self.head = node.next.get();
            &mut node.elem
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.tail.map(|node| {
            // SAFETY: Each node is handed out once, and the list is mutably borrowed for `'a`.
            let node = unsafe { &mut *node.as_ptr() };
            self.len -= 1;
            self.tail = node.prev;
            &mut node.elem
        })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Default for LinkedList<T> {
    /// Creates an empty `LinkedList<T>`.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> IntoIterator for LinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consumes the list into an iterator yielding elements by value.
    #[inline]
    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut LinkedList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T> Extend<T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(move |elem| self.push_back(elem));
    }
}

impl<'a, T: 'a + Copy> Extend<&'a T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> From<[T; N]> for LinkedList<T> {
    /// Converts a `[T; N]` into a `LinkedList<T>`.
    fn from(arr: [T; N]) -> Self {
        Self::from_iter(arr)
    }
}

impl<T: Clone> Clone for LinkedList<T> {
    /// Deep copy of the list, if a clone panics, the nodes built so far are released.
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for LinkedList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other)
    }
}

impl<T: Eq> Eq for LinkedList<T> {}

impl<T: PartialOrd> PartialOrd for LinkedList<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord> Ord for LinkedList<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T: Hash> Hash for LinkedList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for elem in self {
            elem.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

// SAFETY: The list owns all of its nodes
unsafe impl<T: Send> Send for LinkedList<T> {}
unsafe impl<T: Sync> Sync for LinkedList<T> {}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}
