//! Least-busy ordering.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::endpoint::Endpoint;

/// Orders endpoints by ascending busy count.
///
/// Entries with equal counts are placed in a uniformly random order so that
/// concurrent callers picking the head of the list spread across equally
/// idle endpoints. The sort itself is strict on `busy`; randomness is only
/// applied to each run of equal counts afterwards.
pub fn order_least_busy<R: Rng + ?Sized>(endpoints: &mut [Endpoint], rng: &mut R) {
    endpoints.sort_by_key(Endpoint::busy);

    let mut start = 0;
    while start < endpoints.len() {
        let busy = endpoints[start].busy();
        let end = endpoints[start..]
            .iter()
            .position(|e| e.busy() != busy)
            .map_or(endpoints.len(), |len| start + len);

        endpoints[start..end].shuffle(rng);
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn endpoint(address: &str, busy: i64) -> Endpoint {
        let mut e = Endpoint::new(address, 1);
        e.add_busy(busy);
        e
    }

    fn addresses(endpoints: &[Endpoint]) -> Vec<&str> {
        endpoints.iter().map(|e| e.address()).collect()
    }

    #[test]
    fn test_distinct_counts_are_fully_ordered() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut endpoints = vec![endpoint("a", 2), endpoint("b", 0), endpoint("c", 1)];
            order_least_busy(&mut endpoints, &mut rng);
            assert_eq!(addresses(&endpoints), vec!["b", "c", "a"]);
        }
    }

    #[test]
    fn test_equal_counts_rotate_head() {
        let mut heads = HashSet::new();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut endpoints = vec![endpoint("a", 0), endpoint("b", 0), endpoint("c", 0)];
            order_least_busy(&mut endpoints, &mut rng);
            heads.insert(endpoints[0].address().to_string());
        }
        assert_eq!(heads.len(), 3);
    }

    #[test]
    fn test_shuffle_stays_within_group() {
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut endpoints = vec![
                endpoint("a", 1),
                endpoint("b", 0),
                endpoint("c", 1),
                endpoint("d", 0),
                endpoint("e", 3),
            ];
            order_least_busy(&mut endpoints, &mut rng);

            let idle: HashSet<&str> = addresses(&endpoints[..2]).into_iter().collect();
            let one: HashSet<&str> = addresses(&endpoints[2..4]).into_iter().collect();
            assert_eq!(idle, HashSet::from(["b", "d"]));
            assert_eq!(one, HashSet::from(["a", "c"]));
            assert_eq!(endpoints[4].address(), "e");
        }
    }

    #[test]
    fn test_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: Vec<Endpoint> = Vec::new();
        order_least_busy(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![endpoint("a", 4)];
        order_least_busy(&mut single, &mut rng);
        assert_eq!(addresses(&single), vec!["a"]);
    }

    proptest! {
        #[test]
        fn ordering_is_nondecreasing_permutation(
            counts in proptest::collection::vec(-2i64..5, 0..24),
            seed in any::<u64>(),
        ) {
            let mut endpoints: Vec<Endpoint> = counts
                .iter()
                .enumerate()
                .map(|(i, busy)| endpoint(&format!("10.0.0.{}", i), *busy))
                .collect();
            let before: HashSet<String> = endpoints.iter().map(|e| e.address().to_string()).collect();

            order_least_busy(&mut endpoints, &mut StdRng::seed_from_u64(seed));

            prop_assert!(endpoints.windows(2).all(|w| w[0].busy() <= w[1].busy()));
            let after: HashSet<String> = endpoints.iter().map(|e| e.address().to_string()).collect();
            prop_assert_eq!(before, after);
        }
    }
}
