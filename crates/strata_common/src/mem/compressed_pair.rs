use static_assertions::const_assert_eq;

/// Pair of 2 values, where a zero-sized member takes up no space.
///
/// This is mainly used to store a stateless policy object next to the data it applies to (e.g. a deleter next to a pointer),
/// without paying for the policy in the size of the containing type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct CompressedPair<A, B> {
    first:  A,
    second: B,
}

impl<A, B> CompressedPair<A, B> {
    /// Create a new pair
    #[inline]
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Get a reference to the first value
    #[inline]
    pub const fn first(&self) -> &A {
        &self.first
    }

    /// Get a mutable reference to the first value
    #[inline]
    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    /// Get a reference to the second value
    #[inline]
    pub const fn second(&self) -> &B {
        &self.second
    }

    /// Get a mutable reference to the second value
    #[inline]
    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }

    /// Get mutable references to both values at the same time
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut A, &mut B) {
        (&mut self.first, &mut self.second)
    }

    /// Decompose the pair into its values
    #[inline]
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> From<(A, B)> for CompressedPair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self::new(first, second)
    }
}

struct Empty;
const_assert_eq!(core::mem::size_of::<CompressedPair<Empty, usize>>(), core::mem::size_of::<usize>());
const_assert_eq!(core::mem::size_of::<CompressedPair<u32, Empty>>(), core::mem::size_of::<u32>());
