use rand::Rng;

/// Uniform draw in `[0, 1)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Integer in `[a, b)`. An empty range yields `a`.
pub fn rand_int<R: Rng + ?Sized>(rng: &mut R, a: usize, b: usize) -> usize {
    if b <= a {
        return a;
    }
    rng.random_range(a..b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn degenerate_range_returns_lower_bound() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        assert_eq!(rand_int(&mut rng, 5, 5), 5);
    }

    #[test]
    fn draws_stay_in_half_open_range() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        for _ in 0..1000 {
            assert!((2..8).contains(&rand_int(&mut rng, 2, 8)));
            assert!((0.0..1.0).contains(&uniform(&mut rng)));
        }
    }

    #[test]
    fn every_slot_is_reachable() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let mut seen = [false; 8];
        for _ in 0..500 {
            seen[rand_int(&mut rng, 0, 8)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
