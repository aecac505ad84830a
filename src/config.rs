// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search configuration.
//!
//! A [`SearchConfig`] is a plain serde document. Every check is done in
//! [`SearchConfig::validate`], so a configuration that validates builds its
//! table, figure and search without further errors.
//!
//! ```
//! use wafom_search::config::{Method, SearchConfig};
//!
//! let config = SearchConfig::from_json_str(
//!     r#"{ "precision": 15, "columns": 6, "segments": 3, "h": 1, "factor": 2,
//!          "dimension": 2, "nb_tries": 4, "seed": 1, "method": "column-by-column" }"#,
//! )?;
//! assert_eq!(config.method, Method::ColumnByColumn);
//! let report = config.run()?;
//! assert!(report.outcome.is_found());
//! # Ok::<(), wafom_search::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::merit::{
    FastWafomFigure, FigureOfMerit, Norm, OrderDependentWeights, ProductWeights, WafomFigure,
    WeightedWafomFigure, Weights,
};
use crate::net::digital_net::MAX_COLUMNS;
use crate::net::GeneratingMatrix;
use crate::observer::BestCandidateObserver;
use crate::search::{
    ColumnByColumnSearch, KorobovGenerator, RandomNetGenerator, RandomSearch, SearchOutcome,
    SearchStrategy,
};
use crate::table::SegmentLookupTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Method {
    /// Random digital nets.
    Random,
    /// Random Korobov lattices with `2^columns` points.
    Korobov,
    /// Column-by-column construction of digital nets.
    ColumnByColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FigureKind {
    /// Bit-by-bit WAFOM.
    Wafom,
    /// Lookup-table WAFOM.
    #[default]
    FastWafom,
    /// Weighted projection-dependent lookup-table WAFOM.
    WeightedFastWafom,
}

/// Projection weights of the weighted figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WeightsConfig {
    Product(ProductWeights),
    OrderDependent(OrderDependentWeights),
}

impl WeightsConfig {
    fn build(&self) -> Arc<dyn Weights> {
        match self {
            WeightsConfig::Product(w) => Arc::new(w.clone()),
            WeightsConfig::OrderDependent(w) => Arc::new(w.clone()),
        }
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig::Product(ProductWeights::uniform(1.0))
    }
}

fn default_max_order() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default)]
    pub kind: FigureKind,
    /// Largest projection order of the weighted figure.
    #[serde(default = "default_max_order")]
    pub max_order: usize,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub norm: Norm,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            kind: FigureKind::default(),
            max_order: default_max_order(),
            weights: WeightsConfig::default(),
            norm: Norm::default(),
        }
    }
}

fn default_segments() -> usize {
    3
}

fn default_factor() -> u32 {
    1
}

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Bits per coordinate `w`, also the number of rows of generating matrices.
    pub precision: usize,
    /// Columns of the generating matrices; the point count is `2^columns`.
    pub columns: usize,
    /// Number of table segments `q`.
    #[serde(default = "default_segments")]
    pub segments: usize,
    #[serde(default)]
    pub h: u32,
    #[serde(default = "default_factor")]
    pub factor: u32,
    pub dimension: usize,
    pub nb_tries: usize,
    /// Random seed; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub early_abortion: bool,
    #[serde(default)]
    pub max_accepted: Option<u64>,
    #[serde(default)]
    pub max_total: Option<u64>,
    pub method: Method,
    #[serde(default)]
    pub figure: FigureConfig,
}

/// Result of [`SearchConfig::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Description of the search and its figure of merit.
    pub description: String,
    /// One-line rendering of the best candidate.
    pub best: Option<String>,
    pub visited: u64,
}

impl SearchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn uses_table(&self) -> bool {
        self.figure.kind != FigureKind::Wafom
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` naming the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.nb_tries == 0 {
            return Err(Error::invalid("the number of tries must be positive"));
        }
        if self.dimension == 0 {
            return Err(Error::invalid("dimension must be positive"));
        }
        if self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(Error::invalid(format!(
                "columns must be between 1 and {MAX_COLUMNS}, got {}",
                self.columns
            )));
        }
        if self.method == Method::ColumnByColumn && self.columns > self.precision {
            return Err(Error::invalid(format!(
                "column-by-column search needs columns <= precision, got {} > {}",
                self.columns, self.precision
            )));
        }
        if self.figure.kind == FigureKind::WeightedFastWafom && self.figure.max_order == 0 {
            return Err(Error::invalid("max_order must be positive"));
        }
        if self.uses_table() {
            SegmentLookupTable::for_precision(self.precision, self.segments, self.h, self.factor)?;
        } else {
            WafomFigure::new(self.precision, self.h, self.factor)?;
        }
        Ok(())
    }

    pub fn build_table(&self) -> Result<Arc<SegmentLookupTable>> {
        Ok(Arc::new(SegmentLookupTable::for_precision(
            self.precision,
            self.segments,
            self.h,
            self.factor,
        )?))
    }

    pub fn build_figure(&self) -> Result<Arc<dyn FigureOfMerit>> {
        let figure: Arc<dyn FigureOfMerit> = match self.figure.kind {
            FigureKind::Wafom => Arc::new(WafomFigure::new(self.precision, self.h, self.factor)?),
            FigureKind::FastWafom => Arc::new(FastWafomFigure::new(self.build_table()?)),
            FigureKind::WeightedFastWafom => Arc::new(WeightedWafomFigure::new(
                self.build_table()?,
                self.figure.weights.build(),
                self.figure.max_order,
                self.figure.norm,
            )),
        };
        Ok(figure)
    }

    fn observer<C>(&self) -> BestCandidateObserver<C> {
        BestCandidateObserver::with_limits(
            self.max_accepted.unwrap_or(u64::MAX),
            self.max_total.unwrap_or(u64::MAX),
        )
    }

    /// Build and run the configured search.
    pub fn run(&self) -> Result<SearchReport> {
        self.validate()?;
        let figure = self.build_figure()?;
        match self.method {
            Method::Random => {
                let generator = RandomNetGenerator::<GeneratingMatrix>::new(
                    self.dimension,
                    self.precision,
                    self.columns,
                )?;
                let observer = self.observer();
                run_strategy(RandomSearch::with_observer(
                    generator,
                    figure,
                    self.nb_tries,
                    self.seed,
                    self.early_abortion,
                    observer,
                )?)
            }
            Method::Korobov => {
                let generator =
                    KorobovGenerator::new(1u64 << self.columns, self.dimension, self.precision)?;
                let observer = self.observer();
                run_strategy(RandomSearch::with_observer(
                    generator,
                    figure,
                    self.nb_tries,
                    self.seed,
                    self.early_abortion,
                    observer,
                )?)
            }
            Method::ColumnByColumn => run_strategy(ColumnByColumnSearch::<GeneratingMatrix>::new(
                self.dimension,
                self.precision,
                self.columns,
                figure,
                self.nb_tries,
                self.seed,
                self.early_abortion,
            )?),
        }
    }
}

fn run_strategy<S>(mut search: S) -> Result<SearchReport>
where
    S: SearchStrategy + Visits,
    S::Candidate: fmt::Display,
{
    let outcome = search.execute()?;
    Ok(SearchReport {
        outcome,
        description: search.format(),
        best: search.best_candidate().map(|c| c.to_string()),
        visited: search.visited(),
    })
}

/// Number of candidates a finished search visited.
trait Visits {
    fn visited(&self) -> u64;
}

impl<G: crate::search::CandidateGenerator> Visits for RandomSearch<G> {
    fn visited(&self) -> u64 {
        self.observer().total_count()
    }
}

impl Visits for ColumnByColumnSearch<GeneratingMatrix> {
    fn visited(&self) -> u64 {
        self.observer().total_count()
    }
}
