#![forbid(unsafe_code)]

//! Capacity-bounded dynamic array.
//!
//! [`VarArray<T>`] is a growable sequence whose length is bounded to
//! `u16::MAX` elements. Indexed access and growth beyond the bound are
//! treated as programmer errors and fail fast with a panic; they are not
//! data-driven rejections.
//!
//! # Invariants
//!
//! 1. `len() <= MAX_LEN` at all times.
//! 2. `remove` keeps the sequence contiguous (trailing elements shift left).
//! 3. Equality is element-wise (`PartialEq` on `T`).

use std::fmt;
use std::ops::{Index, IndexMut};

/// Maximum number of elements a [`VarArray`] can hold.
pub const MAX_LEN: usize = u16::MAX as usize;

/// A growable sequence bounded to [`MAX_LEN`] elements.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct VarArray<T> {
    items: Vec<T>,
}

impl<T: fmt::Debug> fmt::Debug for VarArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> VarArray<T> {
    /// Create an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an element.
    ///
    /// # Panics
    ///
    /// Panics if the array already holds [`MAX_LEN`] elements.
    pub fn push(&mut self, item: T) {
        assert!(
            self.items.len() < MAX_LEN,
            "VarArray capacity exceeded ({MAX_LEN} elements)"
        );
        self.items.push(item);
    }

    /// Remove the element at `idx`, shifting later elements left.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn remove(&mut self, idx: usize) -> T {
        assert!(
            idx < self.items.len(),
            "VarArray index {idx} out of range (len {})",
            self.items.len()
        );
        self.items.remove(idx)
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Borrow the element at `idx`, if in range.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    /// Iterate over the elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// View the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> VarArray<T> {
    /// Create an array of `n` elements, each a clone of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`MAX_LEN`].
    #[must_use]
    pub fn filled(n: usize, value: T) -> Self {
        assert!(n <= MAX_LEN, "VarArray capacity exceeded ({MAX_LEN} elements)");
        Self {
            items: vec![value; n],
        }
    }

    /// Resize to `n` elements. Spare elements are removed; missing
    /// elements are filled with clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`MAX_LEN`].
    pub fn resize(&mut self, n: usize, value: T) {
        assert!(n <= MAX_LEN, "VarArray capacity exceeded ({MAX_LEN} elements)");
        self.items.resize(n, value);
    }

    /// Overwrite every element with a clone of `value`.
    pub fn fill(&mut self, value: T) {
        for slot in &mut self.items {
            *slot = value.clone();
        }
    }
}

impl<T: PartialEq> VarArray<T> {
    /// Index of the first occurrence of `value`, if present.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|item| item == value)
    }

    /// True if `value` occurs in the array.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.index_of(value).is_some()
    }
}

impl<T> Index<usize> for VarArray<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        assert!(
            idx < self.items.len(),
            "VarArray index {idx} out of range (len {})",
            self.items.len()
        );
        &self.items[idx]
    }
}

impl<T> IndexMut<usize> for VarArray<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        assert!(
            idx < self.items.len(),
            "VarArray index {idx} out of range (len {})",
            self.items.len()
        );
        &mut self.items[idx]
    }
}

impl<T> From<Vec<T>> for VarArray<T> {
    /// # Panics
    ///
    /// Panics if the vector exceeds [`MAX_LEN`] elements.
    fn from(items: Vec<T>) -> Self {
        assert!(
            items.len() <= MAX_LEN,
            "VarArray capacity exceeded ({MAX_LEN} elements)"
        );
        Self { items }
    }
}

impl<T, const N: usize> From<[T; N]> for VarArray<T> {
    fn from(items: [T; N]) -> Self {
        Self::from(Vec::from(items))
    }
}

impl<T> FromIterator<T> for VarArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        for item in iter {
            array.push(item);
        }
        array
    }
}

impl<T> IntoIterator for VarArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a VarArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_index() {
        let mut a = VarArray::new();
        a.push(1);
        a.push(2);
        a.push(3);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], 1);
        assert_eq!(a[2], 3);
    }

    #[test]
    fn filled_constructor() {
        let a = VarArray::filled(4, 7u32);
        assert_eq!(a.as_slice(), &[7, 7, 7, 7]);
    }

    #[test]
    fn remove_shifts_left() {
        let mut a = VarArray::from(vec![1, 2, 3, 4]);
        let removed = a.remove(1);
        assert_eq!(removed, 2);
        assert_eq!(a.as_slice(), &[1, 3, 4]);
    }

    #[test]
    fn index_of_first_occurrence() {
        let a = VarArray::from(vec![5, 6, 5]);
        assert_eq!(a.index_of(&5), Some(0));
        assert_eq!(a.index_of(&6), Some(1));
        assert_eq!(a.index_of(&9), None);
    }

    #[test]
    fn equality_is_elementwise() {
        let a = VarArray::from(vec![1, 2, 3]);
        let b = VarArray::from(vec![1, 2, 3]);
        let c = VarArray::from(vec![1, 2]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resize_and_fill() {
        let mut a = VarArray::from(vec![1, 1]);
        a.resize(4, 9);
        assert_eq!(a.as_slice(), &[1, 1, 9, 9]);
        a.fill(0);
        assert_eq!(a.as_slice(), &[0, 0, 0, 0]);
        a.resize(1, 0);
        assert_eq!(a.as_slice(), &[0]);
    }

    #[test]
    fn index_mut_writes_through() {
        let mut a = VarArray::from(vec![1, 2, 3]);
        a[1] = 20;
        assert_eq!(a.as_slice(), &[1, 20, 3]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_out_of_range_panics() {
        let a = VarArray::from(vec![1]);
        let _ = a[3];
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn remove_out_of_range_panics() {
        let mut a: VarArray<i32> = VarArray::new();
        a.remove(0);
    }

    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn filled_beyond_capacity_panics() {
        let _ = VarArray::filled(MAX_LEN + 1, 0u8);
    }

    #[test]
    fn from_iterator_collects() {
        let a: VarArray<i32> = (0..5).collect();
        assert_eq!(a.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn iteration_by_reference() {
        let a = VarArray::from(vec![1, 2, 3]);
        let sum: i32 = (&a).into_iter().sum();
        assert_eq!(sum, 6);
    }

    #[test]
    fn clear_empties() {
        let mut a = VarArray::from(vec![1, 2]);
        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.index_of(&1), None);
    }
}
