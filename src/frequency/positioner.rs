//! Double-hashed row positions
//!
//! Instead of running `depth` independent hash functions, a single 64-bit
//! `xxh3` digest is split into two 32-bit halves `h1` (upper) and `h2`
//! (lower), and row `i` uses column `(h1 + i * h2) mod width`. The rows stay
//! close to independent while hashing each key only once.

use xxhash_rust::xxh3::xxh3_64;

use crate::error::{ensure_positive, ConstructionResult};

/// Split the key's 64-bit digest into `(upper, lower)` halves
#[inline]
pub fn base_hashes(key: &[u8]) -> (u32, u32) {
    let digest = xxh3_64(key);
    ((digest >> 32) as u32, digest as u32)
}

/// Maps keys to one column per row of a `depth x width` matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPositioner {
    pub(crate) width: usize,
    pub(crate) depth: usize,
}

impl HashPositioner {
    /// # Errors
    ///
    /// Returns an error if `width` or `depth` is zero
    pub fn new(width: usize, depth: usize) -> ConstructionResult<Self> {
        Ok(Self {
            width: ensure_positive("width", width)?,
            depth: ensure_positive("depth", depth)?,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Column for every row, in row order
    pub fn positions(&self, key: &[u8]) -> Positions {
        let (h1, h2) = base_hashes(key);
        Positions {
            h1: u64::from(h1),
            h2: u64::from(h2),
            width: self.width as u64,
            row: 0,
            depth: self.depth,
        }
    }

    /// Column for a single row
    pub fn position(&self, key: &[u8], row: usize) -> usize {
        let (h1, h2) = base_hashes(key);
        combine(u64::from(h1), u64::from(h2), row as u64, self.width as u64)
    }
}

#[inline]
fn combine(h1: u64, h2: u64, row: u64, width: u64) -> usize {
    (h1.wrapping_add(row.wrapping_mul(h2)) % width) as usize
}

/// Iterator over the columns of one key, see [`HashPositioner::positions`]
#[derive(Debug, Clone)]
pub struct Positions {
    h1: u64,
    h2: u64,
    width: u64,
    row: usize,
    depth: usize,
}

impl Iterator for Positions {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.row >= self.depth {
            return None;
        }
        let col = combine(self.h1, self.h2, self.row as u64, self.width);
        self.row += 1;
        Some(col)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.depth - self.row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero() {
        assert!(HashPositioner::new(0, 4).is_err());
        assert!(HashPositioner::new(16, 0).is_err());
    }

    #[test]
    fn test_positions_in_range() {
        let p = HashPositioner::new(37, 9).unwrap();
        for i in 0..500 {
            let key = format!("key_{}", i);
            let cols: Vec<usize> = p.positions(key.as_bytes()).collect();
            assert_eq!(cols.len(), 9);
            assert!(cols.iter().all(|&c| c < 37));
        }
    }

    #[test]
    fn test_formula() {
        let p = HashPositioner::new(1000, 5).unwrap();
        let (h1, h2) = base_hashes(b"apple");
        let expected: Vec<usize> = (0..5u64)
            .map(|i| ((u64::from(h1) + i * u64::from(h2)) % 1000) as usize)
            .collect();
        let got: Vec<usize> = p.positions(b"apple").collect();
        assert_eq!(got, expected);

        for (row, &col) in expected.iter().enumerate() {
            assert_eq!(p.position(b"apple", row), col);
        }
    }

    #[test]
    fn test_digest_split() {
        let digest = xxh3_64(b"banana");
        let (h1, h2) = base_hashes(b"banana");
        assert_eq!((u64::from(h1) << 32) | u64::from(h2), digest);
    }

    #[test]
    fn test_first_row_is_upper_half() {
        let p = HashPositioner::new(1 << 20, 3).unwrap();
        let (h1, _) = base_hashes(b"cherry");
        assert_eq!(p.position(b"cherry", 0), h1 as usize % (1 << 20));
    }

    #[test]
    fn test_exact_size() {
        let p = HashPositioner::new(8, 6).unwrap();
        let mut it = p.positions(b"x");
        assert_eq!(it.len(), 6);
        it.next();
        assert_eq!(it.len(), 5);
    }

    #[test]
    fn test_deterministic() {
        let p = HashPositioner::new(512, 7).unwrap();
        let a: Vec<_> = p.positions(b"same").collect();
        let b: Vec<_> = p.positions(b"same").collect();
        assert_eq!(a, b);
    }
}
