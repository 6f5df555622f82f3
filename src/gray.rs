//! Gray code flip sequence over the signs of a literal tuple.

/// Returns the positions to flip, one per step, so that starting from the
/// all-positive tuple every one of the `2^t` sign assignments is visited
/// exactly once.
///
/// The sequence has length `2^t - 1`. Step `i` (1-based) flips the bit that
/// changes between the reflected binary Gray codes of `i - 1` and `i`, i.e.
/// bit `trailing_zeros(i)`; bit `b` maps to tuple position `t - 1 - b`, so the
/// last literal changes most often.
///
/// # Panics
///
/// Panics if `t >= usize::BITS`.
pub fn gray_code(t: usize) -> Vec<usize> {
    assert!(t < usize::BITS as usize, "t = {} is too large for a Gray code", t);
    let steps = (1usize << t) - 1;
    (1..=steps).map(|i| t - 1 - i.trailing_zeros() as usize).collect()
}
