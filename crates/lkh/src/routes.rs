//! Splits LKH's single merged tour into vehicle routes.
//!
//! For routing problems LKH-3 returns one closed walk. Every extra depot visit
//! is encoded either as a depot id or as a dummy id above the problem's
//! `DIMENSION`, so a route is the run of genuine task nodes between two such
//! separators.
//!
//! Empty runs between consecutive separators are dropped, but the run after
//! the last separator is always kept, even when it is empty. That asymmetry is
//! long-standing observable behavior and is kept as-is; callers that want no
//! empty routes should filter the output.

use std::collections::HashSet;

/// Genuine task-node ids (1-based, as in the tour) visited by one vehicle.
pub type Route = Vec<usize>;

/// Reusable decoder for one problem's depots and dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TourDecoder {
    depots: HashSet<usize>,
    dimension: usize,
}

impl TourDecoder {
    pub fn new(depots: impl IntoIterator<Item = usize>, dimension: usize) -> Self {
        Self {
            depots: depots.into_iter().collect(),
            dimension,
        }
    }

    /// `true` when `node` closes the current route: a depot or a dummy id.
    pub fn is_separator(&self, node: usize) -> bool {
        node > self.dimension || self.depots.contains(&node)
    }

    pub fn decode(&self, tour: &[usize]) -> Vec<Route> {
        let mut routes = Vec::new();
        let mut route = Route::new();

        for &node in tour {
            if self.is_separator(node) {
                if !route.is_empty() {
                    routes.push(std::mem::take(&mut route));
                }
            } else {
                route.push(node);
            }
        }
        routes.push(route);

        routes
    }
}

/// Decodes `tour` into routes, treating every id in `depots` and every id
/// above `dimension` as a route separator.
pub fn decode_routes(tour: &[usize], depots: &[usize], dimension: usize) -> Vec<Route> {
    TourDecoder::new(depots.iter().copied(), dimension).decode(tour)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{TourDecoder, decode_routes};

    #[test]
    fn depot_visits_split_routes() {
        assert_eq!(
            decode_routes(&[1, 5, 2, 3, 5, 4], &[5], 4),
            vec![vec![1], vec![2, 3], vec![4]]
        );
    }

    #[test]
    fn tour_without_separators_is_one_route() {
        assert_eq!(decode_routes(&[1, 2, 3], &[], 3), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn consecutive_separators_do_not_emit_empty_routes() {
        assert_eq!(
            decode_routes(&[1, 5, 5, 2], &[5], 4),
            vec![vec![1], vec![2]]
        );
    }

    #[test]
    fn trailing_separator_leaves_an_empty_final_route() {
        assert_eq!(decode_routes(&[1, 5], &[5], 4), vec![vec![1], vec![]]);
    }

    #[test]
    fn dummy_ids_above_dimension_split_routes() {
        assert_eq!(
            decode_routes(&[1, 2, 7, 3], &[], 5),
            vec![vec![1, 2], vec![3]]
        );
    }

    #[test]
    fn leading_separator_is_dropped() {
        assert_eq!(
            decode_routes(&[1, 2, 3, 6, 4], &[1], 5),
            vec![vec![2, 3], vec![4]]
        );
    }

    #[test]
    fn any_depot_of_a_multi_depot_problem_separates() {
        assert_eq!(
            decode_routes(&[1, 3, 2, 4, 5], &[1, 2], 5),
            vec![vec![3], vec![4, 5]]
        );
    }

    #[test]
    fn lkh3_cvrp_tour_with_dummy_depots() {
        // DIMENSION 5 with depot 1; LKH adds copies 6 and 7 for three vehicles.
        let decoder = TourDecoder::new([1], 5);
        assert_eq!(
            decoder.decode(&[1, 3, 6, 2, 7, 4, 5]),
            vec![vec![3], vec![2], vec![4, 5]]
        );
    }

    #[test]
    fn only_separators_leave_a_single_empty_route() {
        assert_eq!(decode_routes(&[5, 6, 5], &[5], 4), vec![Vec::<usize>::new()]);
    }

    fn tour_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<usize>, usize)> {
        (1_usize..20).prop_flat_map(|dimension| {
            (
                prop::collection::vec(1..=dimension + 5, 1..60),
                prop::collection::vec(1..=dimension, 0..3),
                Just(dimension),
            )
        })
    }

    proptest! {
        #[test]
        fn routes_keep_every_task_node_in_order((tour, depots, dimension) in tour_strategy()) {
            let decoder = TourDecoder::new(depots.iter().copied(), dimension);
            let routes = decoder.decode(&tour);

            let flattened: Vec<usize> = routes.iter().flatten().copied().collect();
            let expected: Vec<usize> = tour
                .iter()
                .copied()
                .filter(|&node| !decoder.is_separator(node))
                .collect();
            prop_assert_eq!(flattened, expected);
        }

        #[test]
        fn routes_never_contain_separators((tour, depots, dimension) in tour_strategy()) {
            let routes = decode_routes(&tour, &depots, dimension);
            for node in routes.iter().flatten() {
                prop_assert!(*node <= dimension);
                prop_assert!(!depots.contains(node));
            }
        }

        #[test]
        fn only_the_last_route_may_be_empty((tour, depots, dimension) in tour_strategy()) {
            let routes = decode_routes(&tour, &depots, dimension);
            prop_assert!(!routes.is_empty());
            for route in &routes[..routes.len() - 1] {
                prop_assert!(!route.is_empty());
            }
        }

        #[test]
        fn separator_free_tour_is_returned_whole(tour in prop::collection::vec(1_usize..=30, 1..40)) {
            let routes = decode_routes(&tour, &[], 30);
            prop_assert_eq!(routes, vec![tour]);
        }

        #[test]
        fn decoding_is_repeatable((tour, depots, dimension) in tour_strategy()) {
            let first = decode_routes(&tour, &depots, dimension);
            let second = decode_routes(&tour, &depots, dimension);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn all_separator_tour_is_one_empty_route(
            dimension in 1_usize..10,
            extra in prop::collection::vec(1_usize..5, 1..10),
        ) {
            let tour: Vec<usize> = extra.iter().map(|offset| dimension + offset).collect();
            let routes = decode_routes(&tour, &[], dimension);
            prop_assert_eq!(routes, vec![Vec::<usize>::new()]);
        }
    }
}
