//! Binomial coefficients.

use num_bigint::BigUint;

/// Binomial coefficient `C(n, k)`, or `None` on `u128` overflow.
///
/// Uses the multiplicative formula with the smaller of `k` and `n - k`;
/// each intermediate value is itself a binomial coefficient, so the division
/// is always exact.
pub fn binomial(n: u64, k: u64) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    Some(acc)
}

/// Exact binomial coefficient `C(n, k)`.
pub fn binomial_big(n: u64, k: u64) -> BigUint {
    if k > n {
        return BigUint::ZERO;
    }
    let k = k.min(n - k);
    let mut acc = BigUint::from(1u32);
    for i in 0..k {
        acc *= n - i;
        acc /= i + 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_small() {
        // n\k  0  1  2  3  4
        // ------------------
        // 0    1  0  0  0  0
        // 1    1  1  0  0  0
        // 2    1  2  1  0  0
        // 3    1  3  3  1  0
        // 4    1  4  6  4  1
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(0, 1), Some(0));
        assert_eq!(binomial(2, 1), Some(2));
        assert_eq!(binomial(3, 2), Some(3));
        assert_eq!(binomial(4, 2), Some(6));
        assert_eq!(binomial(4, 4), Some(1));
        assert_eq!(binomial(4, 5), Some(0));
    }

    #[test]
    fn test_binomial_large() {
        assert_eq!(binomial(52, 5), Some(2_598_960));
        assert_eq!(binomial(10_000, 3), Some(166_616_670_000));
        assert_eq!(binomial(1000, 500), None);
    }

    #[test]
    fn test_binomial_big_matches() {
        for n in 0..40 {
            for k in 0..=n {
                let small = binomial(n, k).unwrap();
                assert_eq!(binomial_big(n, k), BigUint::from(small));
            }
        }
    }

    #[test]
    fn test_binomial_big_huge() {
        let c = binomial_big(1000, 500);
        assert_eq!(c.bits(), 995);
    }
}
