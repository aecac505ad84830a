// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! End-to-end searches on the reference configuration.

mod common;

use std::sync::{Arc, Mutex};
use wafom_search::merit::{
    FigureOfMerit, MeritEvaluator, Norm, ProductWeights, WeightedWafomFigure,
};
use wafom_search::net::{DigitalNetLike, GeneratingMatrixLike};
use wafom_search::search::{
    make_rng, CandidateGenerator, ColumnByColumnSearch, KorobovGenerator, LmsSearch,
    RandomNetGenerator, RandomSearch, ThresholdFilter,
};
use wafom_search::{GeneratingMatrix, SearchOutcome, SearchStrategy, SegmentLookupTable};

const DIMENSION: usize = 3;
const COLUMNS: usize = 7;

fn net_generator() -> RandomNetGenerator {
    RandomNetGenerator::new(DIMENSION, common::PRECISION, COLUMNS).unwrap()
}

#[test]
fn test_random_search_keeps_smallest_of_ten() {
    common::init_logging();
    let seed = 2024;
    let mut search =
        RandomSearch::new(net_generator(), common::fast_figure(), 10, Some(seed), false).unwrap();
    let SearchOutcome::Found { merit } = search.execute().unwrap() else {
        panic!("search failed");
    };

    // replay the same ten candidates
    let generator = net_generator();
    let evaluator = common::fast_figure().create_evaluator();
    let mut rng = make_rng(Some(seed));
    let merits: Vec<f64> = (0..10)
        .map(|_| evaluator.merit(&generator.generate(&mut rng).unwrap()).unwrap())
        .collect();
    let worst = merits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let best = merits.iter().copied().fold(f64::INFINITY, f64::min);
    assert!(merit <= worst);
    assert_eq!(merit, best);
    assert_eq!(search.best_merit_value(), Some(merit));
    assert_eq!(search.observer().total_count(), 10);
}

#[test]
fn test_single_try_is_deterministic() {
    let run = || {
        let mut search =
        RandomSearch::new(net_generator(), common::fast_figure(), 1, Some(42), false).unwrap();
        search.execute().unwrap();
        let merit = search.best_merit_value().unwrap();
        (search.take_best().unwrap().0, merit)
    };
    assert_eq!(run(), run());
}

#[test]
fn test_early_abortion_keeps_best_merit() {
    for seed in [1, 2, 3] {
        let mut full =
        RandomSearch::new(net_generator(), common::fast_figure(), 25, Some(seed), false).unwrap();
        let mut truncated =
        RandomSearch::new(net_generator(), common::fast_figure(), 25, Some(seed), true).unwrap();
        assert_eq!(full.execute().unwrap(), truncated.execute().unwrap());
        assert_eq!(full.best_candidate(), truncated.best_candidate());
    }
}

#[test]
fn test_korobov_search_with_reference_figure() {
    let generator = KorobovGenerator::new(1 << COLUMNS, DIMENSION, common::PRECISION).unwrap();
    let mut fast =
        RandomSearch::new(generator.clone(), common::fast_figure(), 8, Some(5), true).unwrap();
    let mut reference =
        RandomSearch::new(generator, common::reference_figure(), 8, Some(5), true).unwrap();
    fast.execute().unwrap();
    reference.execute().unwrap();
    let a = fast.best_merit_value().unwrap();
    let b = reference.best_merit_value().unwrap();
    assert!(common::close(a, b), "{a} != {b}");
}

/// Weighted figure under which lattice projections can have negative WAFOM.
fn weighted_lattice_figure() -> Arc<dyn FigureOfMerit> {
    let table = SegmentLookupTable::for_precision(common::PRECISION, 3, 0, 2).unwrap();
    Arc::new(WeightedWafomFigure::new(
        Arc::new(table),
        Arc::new(ProductWeights::uniform(1.0)),
        2,
        Norm::Sum,
    ))
}

#[test]
fn test_early_abortion_keeps_best_weighted_lattice() {
    common::init_logging();
    for seed in 0..10 {
        let search = |early_abortion| {
            let generator = KorobovGenerator::new(32, 2, common::PRECISION).unwrap();
            let mut search = RandomSearch::new(
                generator,
                weighted_lattice_figure(),
                200,
                Some(seed),
                early_abortion,
            )
            .unwrap();
            let outcome = search.execute().unwrap();
            let generator = search.best_candidate().map(|lattice| lattice.generator());
            (outcome, generator)
        };
        assert_eq!(search(false), search(true), "seed {seed}");
    }
}

#[test]
fn test_failed_search_notifies_listener() {
    let failures = Arc::new(Mutex::new(0));
    let mut search =
        RandomSearch::new(net_generator(), common::fast_figure(), 4, Some(8), false).unwrap();
    search.add_filter(Box::new(ThresholdFilter { max: -1.0 }));
    let counter = Arc::clone(&failures);
    search.on_failed_search(Box::new(move |_| *counter.lock().unwrap() += 1));
    assert_eq!(search.execute().unwrap(), SearchOutcome::Failed);
    assert!(search.best_candidate().is_none());
    assert_eq!(*failures.lock().unwrap(), 1);
    assert_eq!(search.observer().rejected_count(), 4);
}

#[test]
fn test_cbc_leading_blocks_invertible() {
    common::init_logging();
    for early_abortion in [false, true] {
        let mut search = ColumnByColumnSearch::<GeneratingMatrix>::new(
            DIMENSION,
            common::PRECISION,
            10,
            common::fast_figure(),
            6,
            Some(77),
            early_abortion,
        )
        .unwrap();
        assert!(search.execute().unwrap().is_found());
        let net = search.best_candidate().unwrap();
        assert_eq!(net.num_columns(), 10);
        for m in net.matrices() {
            for k in 1..=10 {
                assert!(m.is_leading_invertible(k));
            }
        }
        let merit = common::fast_figure().create_evaluator().merit(net).unwrap();
        assert_eq!(search.best_merit_value(), Some(merit));
    }
}

#[test]
fn test_cbc_early_abortion_same_result() {
    let build = |early_abortion| {
        let mut search = ColumnByColumnSearch::<GeneratingMatrix>::new(
            2,
            common::PRECISION,
            8,
            common::fast_figure(),
            5,
            Some(3),
            early_abortion,
        )
        .unwrap();
        search.execute().unwrap();
        search.take_best().unwrap()
    };
    assert_eq!(build(false), build(true));
}

#[test]
fn test_cbc_extends_base_net() {
    let mut first = ColumnByColumnSearch::<GeneratingMatrix>::new(
        DIMENSION,
        common::PRECISION,
        4,
        common::fast_figure(),
        3,
        Some(10),
        false,
    )
    .unwrap();
    first.execute().unwrap();
    let (base, _) = first.take_best().unwrap();

    let mut extension = ColumnByColumnSearch::<GeneratingMatrix>::new(
        DIMENSION,
        common::PRECISION,
        9,
        common::fast_figure(),
        3,
        Some(11),
        false,
    )
    .unwrap()
    .with_base_net(base.clone())
    .unwrap();
    assert!(extension.execute().unwrap().is_found());
    let extended = extension.best_candidate().unwrap();
    assert_eq!(extended.num_columns(), 9);
    for (dim, m) in extended.matrices().iter().enumerate() {
        for col in 0..4 {
            assert_eq!(m.column_bits(col), base.generating_matrix(dim).column_bits(col));
        }
    }

    // nothing left to add: the base net is offered unchanged
    let mut unchanged = ColumnByColumnSearch::<GeneratingMatrix>::new(
        DIMENSION,
        common::PRECISION,
        4,
        common::fast_figure(),
        3,
        None,
        false,
    )
    .unwrap()
    .with_base_net(base.clone())
    .unwrap();
    assert!(unchanged.execute().unwrap().is_found());
    assert_eq!(unchanged.best_candidate(), Some(&base));
}

#[test]
fn test_lms_scrambles_cbc_net() {
    let mut cbc = ColumnByColumnSearch::<GeneratingMatrix>::new(
        2,
        common::PRECISION,
        8,
        common::fast_figure(),
        4,
        Some(12),
        false,
    )
    .unwrap();
    cbc.execute().unwrap();
    let (base, _) = cbc.take_best().unwrap();

    let mut lms = LmsSearch::new(&base, common::fast_figure(), 12, Some(13), true).unwrap();
    assert!(lms.execute().unwrap().is_found());
    let best = lms.best_candidate().unwrap();
    for m in best.matrices() {
        assert!((1..=8).all(|k| m.is_leading_invertible(k)));
    }
    assert_eq!(lms.observer().total_count(), 12);
}
