//! Numeric helpers shared by the weighting model

/// Greatest common divisor of two weights (Euclid).
///
/// `gcd(a, 0) == a`.
pub fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Greatest common divisor of a list of weights.
///
/// The fold starts from the first value; a missing or zero start value is
/// replaced with 1, so an empty list yields 1.
///
/// # Examples
/// ```
/// use strip_common::numeric::gcd_all;
///
/// assert_eq!(gcd_all(&[4, 6, 8]), 2);
/// assert_eq!(gcd_all(&[7]), 7);
/// assert_eq!(gcd_all(&[]), 1);
/// ```
pub fn gcd_all(values: &[u32]) -> u32 {
    let start = values.first().copied().filter(|v| *v != 0).unwrap_or(1);
    values.iter().skip(1).fold(start, |acc, v| gcd(acc, *v))
}
