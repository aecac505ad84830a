// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Configuration documents drive complete searches.

mod common;

use wafom_search::config::{FigureKind, Method};
use wafom_search::{Error, SearchConfig};

const DOCUMENT: &str = r#"{
    "precision": 15,
    "columns": 6,
    "segments": 3,
    "h": 1,
    "factor": 2,
    "dimension": 3,
    "nb_tries": 5,
    "seed": 99,
    "early_abortion": true,
    "method": "column-by-column",
    "figure": {
        "kind": "weighted-fast-wafom",
        "max_order": 2,
        "norm": "sum",
        "weights": { "type": "product", "default": 0.8, "coordinates": [1.0, 0.9] }
    }
}"#;

#[test]
fn test_weighted_cbc_document() {
    common::init_logging();
    let config = SearchConfig::from_json_str(DOCUMENT).unwrap();
    assert_eq!(config.method, Method::ColumnByColumn);
    assert_eq!(config.figure.kind, FigureKind::WeightedFastWafom);
    let report = config.run().unwrap();
    assert!(report.outcome.is_found());
    assert!(report.description.starts_with("Column-by-column search"));
    assert!(report.best.unwrap().starts_with("s=3 w=15 k=6"));
}

#[test]
fn test_same_seed_same_report() {
    let config = SearchConfig::from_json_str(DOCUMENT).unwrap();
    assert_eq!(config.run().unwrap(), config.run().unwrap());
}

#[test]
fn test_reference_kind_skips_table_checks() {
    let mut config = SearchConfig::from_json_str(DOCUMENT).unwrap();
    config.figure.kind = FigureKind::Wafom;
    config.segments = 0;
    assert!(config.validate().is_ok());
    config.figure.kind = FigureKind::FastWafom;
    assert!(matches!(config.validate(), Err(Error::InvalidConfiguration(_))));
}
