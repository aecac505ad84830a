// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Column-by-column construction of digital nets.
//!
//! The generating matrices grow one column at a time. For each column index
//! every try appends one random column to each matrix, repairs the leading
//! square block so that it stays invertible, and evaluates the partial net;
//! the best partial net is kept and extended. Only the final net is offered to
//! the observer.
//!
//! Invariant: after column `k` is fixed, the leading `k x k` block of every
//! generating matrix is invertible.

use super::{
    make_rng, require_tries, FailedSearchListener, MeritFilter, SearchCore, SearchOutcome,
    SearchStrategy,
};
use crate::error::{Error, Result};
use crate::merit::{Evaluation, FigureOfMerit, MeritEvaluator, MeritValue};
use crate::net::digital_net::MAX_COLUMNS;
use crate::net::{
    DigitalNet, DigitalNetLike, GeneratingMatrix, GeneratingMatrixLike, PointSet, MAX_ROWS,
};
use crate::observer::{BestCandidateObserver, LowPass};
use log::{debug, info};
use rand_xoshiro::Xoshiro256Plus;
use std::sync::Arc;

/// Make the leading `col x col` block of `matrix` invertible, assuming the
/// leading `(col - 1) x (col - 1)` block already is.
///
/// The determinant is affine in entry `(col - 1, col - 1)` with coefficient
/// the leading minor, so one flip always suffices.
pub fn repair_leading_block<M: GeneratingMatrixLike>(matrix: &mut M, col: usize) {
    if col == 1 {
        if !matrix.get(0, 0) {
            matrix.flip(0, 0);
        }
    } else if !matrix.is_leading_invertible(col) {
        matrix.flip(col - 1, col - 1);
    }
}

/// Builds `dimension` generating matrices of `rows` rows, column by column.
pub struct ColumnByColumnSearch<M: GeneratingMatrixLike + Sync = GeneratingMatrix> {
    dimension: usize,
    rows: usize,
    columns: usize,
    nb_tries: usize,
    figure: Arc<dyn FigureOfMerit>,
    seed: Option<u64>,
    rng: Xoshiro256Plus,
    base: Option<DigitalNet<M>>,
    core: SearchCore<DigitalNet<M>>,
}

impl<M: GeneratingMatrixLike + Sync> ColumnByColumnSearch<M> {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `nb_tries` or `dimension` is zero, `rows`
    /// exceeds 64, or `columns` is zero or exceeds `rows`.
    pub fn new(
        dimension: usize,
        rows: usize,
        columns: usize,
        figure: Arc<dyn FigureOfMerit>,
        nb_tries: usize,
        seed: Option<u64>,
        early_abortion: bool,
    ) -> Result<Self> {
        require_tries(nb_tries)?;
        if dimension == 0 {
            return Err(Error::invalid("dimension must be positive"));
        }
        if rows == 0 || rows > MAX_ROWS {
            return Err(Error::invalid(format!(
                "generating matrices need between 1 and {MAX_ROWS} rows, got {rows}"
            )));
        }
        if columns == 0 || columns > rows || columns > MAX_COLUMNS {
            return Err(Error::invalid(format!(
                "target columns must be between 1 and {}, got {columns}",
                rows.min(MAX_COLUMNS)
            )));
        }
        Ok(Self {
            dimension,
            rows,
            columns,
            nb_tries,
            figure,
            seed,
            rng: make_rng(seed),
            base: None,
            core: SearchCore::new(BestCandidateObserver::new(), early_abortion),
        })
    }

    /// Extend `base` instead of starting from scratch.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the base net's shape does not match, it has
    /// more columns than the target, or one of its leading blocks is singular.
    pub fn with_base_net(mut self, base: DigitalNet<M>) -> Result<Self> {
        if base.dimension() != self.dimension || base.num_rows() != self.rows {
            return Err(Error::invalid(format!(
                "base net has dimension {} and {} rows, expected {} and {}",
                base.dimension(),
                base.num_rows(),
                self.dimension,
                self.rows
            )));
        }
        if base.num_columns() > self.columns {
            return Err(Error::invalid(format!(
                "base net has {} columns, more than the target {}",
                base.num_columns(),
                self.columns
            )));
        }
        let singular = base.matrices().iter().any(|m| {
            (1..=base.num_columns()).any(|k| !m.is_leading_invertible(k))
        });
        if singular {
            return Err(Error::invalid("base net has a singular leading block"));
        }
        self.base = Some(base);
        Ok(self)
    }

    pub fn add_filter(&mut self, filter: Box<dyn MeritFilter>) {
        self.core.add_filter(filter);
    }

    pub fn observer(&self) -> &BestCandidateObserver<DigitalNet<M>> {
        self.core.observer()
    }

    pub fn take_best(&mut self) -> Option<(DigitalNet<M>, MeritValue)> {
        self.core.take_best()
    }

    /// Append one random column to every matrix of `prefix` and repair.
    fn propose(&mut self, prefix: Option<&[M]>, col: usize) -> Result<DigitalNet<M>> {
        let mut matrices = Vec::with_capacity(self.dimension);
        for dim in 0..self.dimension {
            let column = M::random_column(self.rows, &mut self.rng);
            let mut matrix = match prefix {
                Some(prefix) => {
                    let mut matrix = prefix[dim].clone();
                    matrix.stack_right(column);
                    matrix
                }
                None => column,
            };
            repair_leading_block(&mut matrix, col);
            matrices.push(matrix);
        }
        DigitalNet::from_matrices(matrices)
    }

    /// Best of `nb_tries` extensions of `prefix` to `col` columns.
    fn best_extension(
        &mut self,
        evaluator: &dyn MeritEvaluator,
        prefix: Option<&[M]>,
        col: usize,
    ) -> Result<Option<(DigitalNet<M>, MeritValue)>> {
        let mut low_pass = LowPass::default();
        let mut best: Option<(DigitalNet<M>, MeritValue)> = None;
        for attempt in 0..self.nb_tries {
            let net = self.propose(prefix, col)?;
            let evaluation = if self.core.early_abortion() {
                let progress = |partial: MeritValue| low_pass.passes(partial);
                evaluator.evaluate(&net, Some(&progress))?
            } else {
                evaluator.evaluate(&net, None)?
            };
            let Evaluation::Complete(merit) = evaluation else {
                debug!("column {col}, try {attempt}: aborted");
                continue;
            };
            debug!("column {col}, try {attempt}: merit {merit}");
            if best.as_ref().map_or(true, |(_, b)| merit < *b) {
                low_pass.set_threshold(merit);
                best = Some((net, merit));
            }
        }
        Ok(best)
    }
}

impl<M: GeneratingMatrixLike + Sync> SearchStrategy for ColumnByColumnSearch<M> {
    type Candidate = DigitalNet<M>;

    fn execute(&mut self) -> Result<SearchOutcome> {
        let description = self.format();
        self.core.start(&description);
        let evaluator = self.figure.create_evaluator();

        let mut retained = self.base.clone().map(|base| {
            let columns = base.num_columns();
            (base, columns)
        });
        if let Some((base, columns)) = &retained {
            if *columns == self.columns {
                let evaluation = self.core.evaluate(evaluator.as_ref(), base)?;
                self.core.offer(base.clone(), evaluation);
                return Ok(self.core.finish(&description));
            }
        }

        let mut final_merit = None;
        let start = retained.as_ref().map_or(1, |(_, columns)| columns + 1);
        for col in start..=self.columns {
            let prefix = retained.take().map(|(net, _)| net.into_matrices());
            match self.best_extension(evaluator.as_ref(), prefix.as_deref(), col)? {
                Some((net, merit)) => {
                    info!("column {col}: best merit {merit}");
                    retained = Some((net, col));
                    final_merit = Some(merit);
                }
                None => {
                    final_merit = None;
                    break;
                }
            }
        }

        if let (Some((net, _)), Some(merit)) = (retained, final_merit) {
            self.core.offer(net, Evaluation::Complete(merit));
        }
        Ok(self.core.finish(&description))
    }

    fn best_candidate(&self) -> Option<&DigitalNet<M>> {
        self.core.best_candidate()
    }

    fn best_merit_value(&self) -> Option<MeritValue> {
        self.core.best_merit()
    }

    fn format(&self) -> String {
        let base = match &self.base {
            Some(base) => format!(", extending a net with {} columns", base.num_columns()),
            None => String::new(),
        };
        format!(
            "Column-by-column search (s={}, {}x{} matrices, {} tries per column{base})\n{}",
            self.dimension,
            self.rows,
            self.columns,
            self.nb_tries,
            self.figure.format()
        )
    }

    fn reset(&mut self) {
        self.core.reset();
        self.rng = make_rng(self.seed);
    }

    fn on_failed_search(&mut self, listener: FailedSearchListener) {
        self.core.add_listener(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merit::FastWafomFigure;
    use crate::table::SegmentLookupTable;

    fn figure(precision: usize) -> Arc<dyn FigureOfMerit> {
        let table = SegmentLookupTable::for_precision(precision, 3, 1, 2).unwrap();
        Arc::new(FastWafomFigure::new(Arc::new(table)))
    }

    #[test]
    fn test_repair_first_column() {
        let mut m = GeneratingMatrix::zeros(4, 1);
        repair_leading_block(&mut m, 1);
        assert!(m.get(0, 0));
        repair_leading_block(&mut m, 1);
        assert!(m.get(0, 0));
    }

    #[test]
    fn test_repair_singular_block() {
        // columns (1,1,..) and (1,1,..): singular until (1,1) is flipped
        let mut m = GeneratingMatrix::from_columns(3, vec![0b110, 0b110]);
        assert!(!m.is_leading_invertible(2));
        repair_leading_block(&mut m, 2);
        assert!(m.is_leading_invertible(2));
        assert_eq!(m.column_bits(1), 0b100);
    }

    #[test]
    fn test_invalid_configurations() {
        let build = |dimension, rows, columns, nb_tries| {
            ColumnByColumnSearch::<GeneratingMatrix>::new(
                dimension,
                rows,
                columns,
                figure(9),
                nb_tries,
                None,
                false,
            )
        };
        assert!(build(2, 8, 4, 0).is_err());
        assert!(build(2, 8, 9, 1).is_err());
        assert!(build(2, 65, 4, 1).is_err());
        assert!(build(0, 8, 4, 1).is_err());
    }

    #[test]
    fn test_leading_blocks_invertible() {
        let mut search =
            ColumnByColumnSearch::<GeneratingMatrix>::new(3, 9, 6, figure(9), 4, Some(17), false)
                .unwrap();
        assert!(search.execute().unwrap().is_found());
        let net = search.best_candidate().unwrap();
        assert_eq!(net.num_columns(), 6);
        for m in net.matrices() {
            for k in 1..=6 {
                assert!(m.is_leading_invertible(k), "block {k} of\n{m}");
            }
        }
    }

    #[test]
    fn test_base_net_too_wide() {
        let base = DigitalNet::new(vec![GeneratingMatrix::identity(9); 2]).unwrap();
        let search =
            ColumnByColumnSearch::<GeneratingMatrix>::new(2, 9, 4, figure(9), 1, None, false)
                .unwrap();
        assert!(search.with_base_net(base).is_err());
    }
}
