//! Zigzag mapping between signed and unsigned integers of the same width. Small magnitudes map to
//! small unsigned values regardless of their sign (0 → 0, -1 → 1, 1 → 2, -2 → 3, ...), which
//! keeps negative numbers short once they are written as varints. Each width has its own pair of
//! functions so that a 32 bit value can never be folded with the 64 bit sign bit.

#[inline]
pub const fn encode32(n: i32) -> u32 {
    (n.wrapping_shl(1) ^ (n >> 31)) as u32
}

#[inline]
pub const fn decode32(u: u32) -> i32 {
    ((u >> 1) as i32) ^ -((u & 1) as i32)
}

#[inline]
pub const fn encode64(n: i64) -> u64 {
    (n.wrapping_shl(1) ^ (n >> 63)) as u64
}

#[inline]
pub const fn decode64(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}
