//! Rolling access-signature hashing.
//!
//! A signature is a bounded integer summarizing the recent history of
//! cache-block deltas. Each new delta is folded in by shifting the current
//! signature left and XOR-ing the delta's sign-magnitude encoding, then
//! masking back to the configured width:
//!
//! ```text
//! next = ((signature << shift) ^ sign_magnitude(delta)) & (2^bits - 1)
//! ```
//!
//! The sign-magnitude field is fixed-width: enough bits to hold the largest
//! legal delta magnitude, with the sign bit immediately above them, so that
//! +d and -d hash differently while small magnitudes stay well spread.

/// Folds cache-block deltas into a bounded rolling signature.
///
/// Stateless: `next` is a pure function of its two inputs, so a single
/// hasher can be shared by the Q-table update rule and the trace driver.
#[derive(Debug, Clone, Copy)]
pub struct SignatureHasher {
    /// Width of the produced signature in bits.
    signature_bits: u32,
    /// Left shift applied to the previous signature before the XOR.
    shift: u32,
    /// Bits reserved for the delta magnitude; the sign lands one bit above.
    magnitude_bits: u32,
}

impl SignatureHasher {
    /// Creates a hasher.
    ///
    /// # Arguments
    ///
    /// * `signature_bits` - Width of the signature; outputs lie in
    ///   `[0, 2^signature_bits)`.
    /// * `shift` - Number of bits the signature is shifted per step.
    /// * `max_delta_magnitude` - Largest delta magnitude the encoding must
    ///   represent; sizes the magnitude field.
    pub fn new(signature_bits: u32, shift: u32, max_delta_magnitude: u64) -> Self {
        // bit_length of the largest magnitude; 0 would need no bits but we
        // keep at least one so the sign bit has somewhere to sit above.
        let magnitude_bits = (64 - max_delta_magnitude.leading_zeros()).max(1);
        Self {
            signature_bits,
            shift,
            magnitude_bits,
        }
    }

    /// Encodes a delta in sign-magnitude form: the magnitude in the low
    /// bits, the sign (1 = negative) at bit `magnitude_bits`.
    #[inline]
    fn sign_magnitude(&self, delta: i64) -> u64 {
        let magnitude = delta.unsigned_abs();
        if delta < 0 {
            magnitude | (1u64 << self.magnitude_bits)
        } else {
            magnitude
        }
    }

    /// Advances the signature with one more delta.
    ///
    /// Deterministic and total: every `(signature, delta)` pair yields a
    /// value in `[0, 2^signature_bits)`.
    #[inline]
    pub fn next(&self, signature: u64, delta: i64) -> u64 {
        let folded = (signature << self.shift) ^ self.sign_magnitude(delta);
        folded & ((1u64 << self.signature_bits) - 1)
    }

    /// Width of the produced signature in bits.
    #[inline]
    pub fn signature_bits(&self) -> u32 {
        self.signature_bits
    }
}
