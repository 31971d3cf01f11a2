#![allow(dead_code)]
use gaussian_sieve::{GaussianInt, Gint};

/// Trial-division primality of a rational integer.
pub fn is_rational_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Primality of `a + bi` from its norm, independent of any sieve.
pub fn is_gaussian_prime(z: GaussianInt) -> bool {
    let (a, b) = (z.re.unsigned_abs(), z.im.unsigned_abs());
    match (a, b) {
        (0, 0) => false,
        (0, p) | (p, 0) => p % 4 == 3 && is_rational_prime(p),
        _ => is_rational_prime(a * a + b * b),
    }
}

/// Canonical primes `a ≥ 1, b ≥ 0` of norm at most `x` by trial division,
/// sorted like the sieve output.
pub fn brute_force(x: u64) -> Vec<Gint> {
    let mut out = Vec::new();
    let mut a = 1u64;
    while a * a <= x {
        let mut b = 0u64;
        while a * a + b * b <= x {
            let g = Gint::new(a as u32, b as u32);
            if is_gaussian_prime(g.to_signed()) {
                out.push(g);
            }
            b += 1;
        }
        a += 1;
    }
    out.sort_unstable();
    out
}
