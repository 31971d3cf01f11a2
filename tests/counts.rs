mod util;
use util::*;

use gaussian_sieve::{Gint, SieveError, count, sieve};

#[test]
fn tiny_bounds() {
    let want = [0, 0, 4, 4, 4, 12, 12, 12, 12, 16, 16];
    for (x, &n) in want.iter().enumerate() {
        assert_eq!(count(x as u64).unwrap(), n, "count({x})");
    }
    assert!(sieve(0).unwrap().is_empty());
    assert!(sieve(1).unwrap().is_empty());
}

#[test]
fn first_primes_in_order() {
    assert_eq!(
        sieve(10).unwrap(),
        vec![Gint::new(1, 1), Gint::new(2, 1), Gint::new(1, 2), Gint::new(3, 0)]
    );
}

#[test]
fn reference_counts() {
    for (x, n) in [(100u64, 100u64), (1_000, 668), (10_000, 4_928), (100_000, 38_404), (1_000_000, 313_752)] {
        assert_eq!(count(x).unwrap(), n, "count({x})");
    }
}

#[test]
fn ten_million() {
    assert_eq!(count(10_000_000u64).unwrap(), 2_658_344);
}

#[test]
#[ignore]
fn hundred_million() {
    assert_eq!(count(100_000_000u64).unwrap(), 23_046_512);
}

#[test]
#[ignore]
fn one_billion() {
    assert_eq!(count(1_000_000_000u64).unwrap(), 203_394_764);
}

#[test]
fn count_is_four_times_listing() {
    for x in [2u64, 50, 997, 12_345] {
        assert_eq!(count(x).unwrap(), 4 * sieve(x).unwrap().len() as u64);
    }
}

#[test]
fn matches_trial_division() {
    assert_eq!(sieve(5_000).unwrap(), brute_force(5_000));
}

#[test]
fn listing_is_idempotent() {
    assert_eq!(sieve(3_000).unwrap(), sieve(3_000).unwrap());
}

#[test]
fn every_prime_lies_over_a_rational_prime() {
    let primes = sieve(20_000).unwrap();
    for g in &primes {
        let p = g.rational_prime();
        assert!(is_rational_prime(p), "{g} over {p}");
        match p % 4 {
            3 => assert_eq!((g.a as u64, g.b), (p, 0)),
            _ => assert_eq!(g.norm(), p),
        }
    }
    // p = 2 gives one canonical prime, p ≡ 1 mod 4 gives two
    let over = |p: u64| primes.iter().filter(|g| g.rational_prime() == p).count();
    assert_eq!(over(2), 1);
    assert_eq!(over(5), 2);
    assert_eq!(over(13), 2);
    assert_eq!(over(7), 1);
}

#[test]
fn out_of_range_bounds() {
    assert!(matches!(count(-1), Err(SieveError::InvalidBound { value: -1, .. })));
    assert!(matches!(sieve(1i128 << 65), Err(SieveError::InvalidBound { .. })));
}
