//! This module contains utility functionality needed for this crate. Most
//! prominently, it contains the definition of the [DigitSet] used for storing
//! candidate digits for cells.

/// A set of Sudoku digits (1 to 9) that is implemented as a bit mask. Each
/// digit is represented by one bit in a `u16`. This generally has better
/// performance than a `HashSet` and is cheap to copy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DigitSet {
    content: u16
}

const ALL_DIGITS: u16 = 0b11_1111_1110;

impl DigitSet {

    /// Creates a new, empty digit set.
    pub fn empty() -> DigitSet {
        DigitSet {
            content: 0
        }
    }

    /// Creates a new digit set that contains all digits from 1 to 9.
    pub fn all() -> DigitSet {
        DigitSet {
            content: ALL_DIGITS
        }
    }

    fn mask(digit: u8) -> u16 {
        debug_assert!(digit >= 1 && digit <= 9);
        1u16 << digit
    }

    /// Indicates whether this set contains the given digit. Digits outside
    /// the range `[1, 9]` are never contained.
    pub fn contains(&self, digit: u8) -> bool {
        if digit < 1 || digit > 9 {
            false
        }
        else {
            self.content & DigitSet::mask(digit) != 0
        }
    }

    /// Inserts the given digit into this set, such that [DigitSet::contains]
    /// returns `true` for it afterwards. The digit must be in the range
    /// `[1, 9]`.
    pub fn insert(&mut self, digit: u8) {
        self.content |= DigitSet::mask(digit);
    }

    /// Removes the given digit from this set, such that [DigitSet::contains]
    /// returns `false` for it afterwards. The digit must be in the range
    /// `[1, 9]`.
    pub fn remove(&mut self, digit: u8) {
        self.content &= !DigitSet::mask(digit);
    }

    /// Gets the number of digits contained in this set.
    pub fn len(&self) -> usize {
        self.content.count_ones() as usize
    }

    /// Indicates whether this set contains no digits.
    pub fn is_empty(&self) -> bool {
        self.content == 0
    }

    /// Returns an iterator over the digits contained in this set, in
    /// ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> {
        let content = self.content;
        (1u8..=9u8).filter(move |&d| content & (1u16 << d) != 0)
    }
}
