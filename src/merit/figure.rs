// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The figure-of-merit contract the searches are written against.

use super::kernel::{BitwiseKernel, TableKernel};
use super::projection::Weights;
use super::wafom::WafomEvaluator;
use super::weighted::{Norm, WeightedWafomEvaluator};
use super::{MeritEvaluator, MeritValue};
use crate::error::Result;
use crate::table::SegmentLookupTable;
use std::fmt;
use std::sync::Arc;

/// A figure of merit: a factory for evaluators plus a description.
pub trait FigureOfMerit: Send + Sync + fmt::Debug {
    /// Fresh evaluator. Evaluators hold no per-search state beyond shared
    /// read-only data, so this is cheap.
    fn create_evaluator(&self) -> Box<dyn MeritEvaluator>;

    /// Human-readable description.
    fn format(&self) -> String;

    /// Combine the merits of sub-projections.
    fn combine(&self, merits: &[MeritValue]) -> MeritValue {
        merits.iter().sum()
    }
}

/// WAFOM computed bit by bit.
#[derive(Debug, Clone)]
pub struct WafomFigure {
    kernel: BitwiseKernel,
}

impl WafomFigure {
    /// # Errors
    ///
    /// `InvalidConfiguration` for an unsupported precision, `h` or `factor`.
    pub fn new(precision: usize, h: u32, factor: u32) -> Result<Self> {
        Ok(Self {
            kernel: BitwiseKernel::new(precision, h, factor)?,
        })
    }
}

impl FigureOfMerit for WafomFigure {
    fn create_evaluator(&self) -> Box<dyn MeritEvaluator> {
        Box::new(WafomEvaluator::new(self.kernel.clone()))
    }

    fn format(&self) -> String {
        format!(
            "Wafom based figure of merit (h={}, factor={})\nEmbedding type: Unilevel",
            self.kernel.h(),
            self.kernel.factor()
        )
    }
}

/// WAFOM computed from a shared segment table.
#[derive(Debug, Clone)]
pub struct FastWafomFigure {
    table: Arc<SegmentLookupTable>,
}

impl FastWafomFigure {
    pub fn new(table: Arc<SegmentLookupTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<SegmentLookupTable> {
        &self.table
    }
}

impl FigureOfMerit for FastWafomFigure {
    fn create_evaluator(&self) -> Box<dyn MeritEvaluator> {
        Box::new(WafomEvaluator::new(TableKernel::new(Arc::clone(&self.table))))
    }

    fn format(&self) -> String {
        format!(
            "Fast Wafom based figure of merit (w={}, q={}, h={}, factor={})\n\
             Embedding type: Unilevel",
            self.table.total_bits(),
            self.table.segments(),
            self.table.h(),
            self.table.factor()
        )
    }
}

/// Weighted projection-dependent WAFOM over a shared segment table.
#[derive(Debug, Clone)]
pub struct WeightedWafomFigure {
    table: Arc<SegmentLookupTable>,
    weights: Arc<dyn Weights>,
    max_order: usize,
    norm: Norm,
}

impl WeightedWafomFigure {
    pub fn new(
        table: Arc<SegmentLookupTable>,
        weights: Arc<dyn Weights>,
        max_order: usize,
        norm: Norm,
    ) -> Self {
        Self {
            table,
            weights,
            max_order,
            norm,
        }
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }
}

impl FigureOfMerit for WeightedWafomFigure {
    fn create_evaluator(&self) -> Box<dyn MeritEvaluator> {
        Box::new(WeightedWafomEvaluator::new(
            TableKernel::new(Arc::clone(&self.table)),
            Arc::clone(&self.weights),
            self.max_order,
            self.norm,
        ))
    }

    fn format(&self) -> String {
        format!(
            "Projection-dependent fast Wafom based figure of merit \
             (max order {}, {} norm, weights {:?})\nEmbedding type: Unilevel",
            self.max_order, self.norm, self.weights
        )
    }

    fn combine(&self, merits: &[MeritValue]) -> MeritValue {
        self.norm.combine(merits)
    }
}
