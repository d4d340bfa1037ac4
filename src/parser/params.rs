//! Parameter list for control sequences.
//!
//! Parameters are unsigned decimal numbers separated by semicolons. The list
//! has a fixed capacity; a `;` past the last slot is ignored and so are the
//! digits that follow it, so long sequences never spill.

use std::fmt;

pub const MAX_PARAMS: usize = 10;

#[derive(Clone, Copy)]
pub struct Params {
    values: [u32; MAX_PARAMS],
    len: usize,
    /// Set once a parameter past capacity was started
    overflowed: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl Params {
    pub fn new() -> Self {
        Params {
            values: [0; MAX_PARAMS],
            len: 0,
            overflowed: false,
        }
    }

    /// Build a list from values, truncating at capacity
    pub fn from_slice(values: &[u32]) -> Self {
        let mut params = Self::new();
        for &v in values {
            params.push(v);
        }
        params
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.overflowed = false;
    }

    /// Start a new parameter with an initial value
    pub fn push(&mut self, value: u32) {
        if self.len < MAX_PARAMS {
            self.values[self.len] = value;
            self.len += 1;
        } else {
            self.overflowed = true;
        }
    }

    /// Append a decimal digit to the parameter being read
    pub fn push_digit(&mut self, digit: u8) {
        if self.overflowed || self.len == 0 {
            return;
        }
        let slot = &mut self.values[self.len - 1];
        *slot = slot.saturating_mul(10).saturating_add(u32::from(digit));
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether parameters were dropped for exceeding capacity
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        if index < self.len {
            Some(self.values[index])
        } else {
            None
        }
    }

    pub fn get_or(&self, index: usize, default: u32) -> u32 {
        self.get(index).unwrap_or(default)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.as_slice().iter().copied()
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice() && self.overflowed == other.overflowed
    }
}

impl Eq for Params {}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_basic() {
        let mut params = Params::new();
        assert!(params.is_empty());

        params.push(1);
        params.push_digit(2);
        params.push(0);
        params.push_digit(7);

        assert_eq!(params.as_slice(), &[12, 7]);
        assert_eq!(params.get_or(5, 1), 1);
    }

    #[test]
    fn test_params_capacity() {
        let mut params = Params::new();
        for i in 0..MAX_PARAMS as u32 {
            params.push(i);
        }
        params.push(99);
        params.push_digit(4);

        assert_eq!(params.len(), MAX_PARAMS);
        assert!(params.overflowed());
        assert_eq!(params.get(MAX_PARAMS - 1), Some(9));
    }

    #[test]
    fn test_params_saturate() {
        let mut params = Params::new();
        params.push(9);
        for _ in 0..20 {
            params.push_digit(9);
        }
        assert_eq!(params.get(0), Some(u32::MAX));
    }

    #[test]
    fn test_params_clear() {
        let mut params = Params::from_slice(&[1, 2, 3]);
        params.clear();
        assert!(params.is_empty());
        assert!(!params.overflowed());
    }
}
