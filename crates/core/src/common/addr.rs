//! Load-address decomposition.
//!
//! A load address is split into a page tag and a cache-block index within the
//! page. Given a page size and a cache line size (both powers of two):
//!
//! ```text
//! offset_bits = log2(line_size)
//! page_bits   = log2(page_size)
//! block_bits  = page_bits - offset_bits
//!
//! tag   = address >> page_bits
//! block = (address >> offset_bits) & ((1 << block_bits) - 1)
//! ```
//!
//! Two accesses share a tag exactly when they fall in the same page; the
//! block index is the cache-line position inside that page.

use crate::common::error::QfetchError;

/// Returns the exact base-2 logarithm of `v`, or `None` when `v` is zero or
/// not a power of two.
#[inline]
pub fn checked_log2(v: u64) -> Option<u32> {
    if v != 0 && v.is_power_of_two() {
        Some(v.trailing_zeros())
    } else {
        None
    }
}

/// Precomputed bit widths for splitting load addresses into (tag, block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMap {
    /// Bits addressing a byte within a cache line.
    offset_bits: u32,
    /// Bits addressing a byte within a page.
    page_bits: u32,
    /// Bits addressing a cache block within a page.
    block_bits: u32,
}

impl AddressMap {
    /// Builds an address map from the page and cache line sizes.
    ///
    /// # Arguments
    ///
    /// * `page_size_bytes` - Page size; must be a power of two.
    /// * `cache_line_size_bytes` - Cache line size; must be a power of two
    ///   and no larger than the page size.
    ///
    /// # Errors
    ///
    /// Returns [`QfetchError::Config`] when either size is not a power of
    /// two or the line does not fit in the page.
    pub fn new(page_size_bytes: u64, cache_line_size_bytes: u64) -> Result<Self, QfetchError> {
        let page_bits = checked_log2(page_size_bytes).ok_or_else(|| {
            QfetchError::Config(format!(
                "page size must be a power of 2, got {page_size_bytes}"
            ))
        })?;
        let offset_bits = checked_log2(cache_line_size_bytes).ok_or_else(|| {
            QfetchError::Config(format!(
                "cache line size must be a power of 2, got {cache_line_size_bytes}"
            ))
        })?;
        if offset_bits >= page_bits {
            return Err(QfetchError::Config(format!(
                "cache line ({cache_line_size_bytes} B) must be smaller than the page ({page_size_bytes} B)"
            )));
        }
        Ok(Self {
            offset_bits,
            page_bits,
            block_bits: page_bits - offset_bits,
        })
    }

    /// Splits a raw load address into its page tag and in-page block index.
    #[inline]
    pub fn decode(&self, address: u64) -> (u64, u64) {
        let tag = address >> self.page_bits;
        let block = (address >> self.offset_bits) & ((1u64 << self.block_bits) - 1);
        (tag, block)
    }

    /// Number of cache blocks per page (`2^block_bits`).
    #[inline]
    pub fn blocks_per_page(&self) -> u64 {
        1u64 << self.block_bits
    }
}
