//! Builder utilities for configuring [`Segmenter`] instances.
//!
//! Every setter is infallible; [`SegmenterBuilder::build`] validates the full
//! configuration at once.

use std::{collections::BTreeSet, num::NonZeroUsize};

use crate::{
    Result,
    error::SegmentationError,
    mesh::GroupId,
    params::{CostFactors, SegmentationParams},
    segmenter::Segmenter,
};

/// Configures and constructs [`Segmenter`] instances.
///
/// # Examples
/// ```
/// use segmesh_core::SegmenterBuilder;
///
/// let segmenter = SegmenterBuilder::new()
///     .with_cost_threshold(0.5)
///     .with_material_change_factor(2.0)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(segmenter.params().cost_threshold(), 0.5);
/// assert_eq!(segmenter.params().factors().material_change(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct SegmenterBuilder {
    cost_threshold: f64,
    maximum_area_threshold: f64,
    minimum_area_threshold: f64,
    contact_length_factor: f64,
    perimeter_cost_factor: f64,
    factors: CostFactors,
    ignore_vertex_groups: BTreeSet<GroupId>,
    max_merges: Option<usize>,
}

impl Default for SegmenterBuilder {
    fn default() -> Self {
        let params = SegmentationParams::default();
        Self {
            cost_threshold: params.cost_threshold,
            maximum_area_threshold: params.maximum_area_threshold,
            minimum_area_threshold: params.minimum_area_threshold,
            contact_length_factor: params.contact_length_factor,
            perimeter_cost_factor: params.perimeter_cost_factor,
            factors: params.factors,
            ignore_vertex_groups: params.ignore_vertex_groups,
            max_merges: None,
        }
    }
}

macro_rules! factor_shortcuts {
    ($($setter:ident => $factor:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Shortcut for [`CostFactors::", stringify!($factor), "`].")]
            #[must_use]
            pub fn $setter(mut self, factor: f64) -> Self {
                self.factors = self.factors.$factor(factor);
                self
            }
        )+
    };
}

impl SegmenterBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::SegmenterBuilder;
    ///
    /// let builder = SegmenterBuilder::new();
    /// assert_eq!(builder.cost_threshold(), 1.0);
    /// assert!(builder.maximum_area_threshold().is_infinite());
    /// assert_eq!(builder.contact_length_factor(), 1.0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the highest normalized cost that may still be merged.
    #[must_use]
    pub fn with_cost_threshold(mut self, threshold: f64) -> Self {
        self.cost_threshold = threshold;
        self
    }

    /// Returns the configured cost threshold.
    #[must_use]
    pub fn cost_threshold(&self) -> f64 {
        self.cost_threshold
    }

    /// Caps the combined area of merges whose source segment is larger than
    /// the minimum area threshold.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::SegmenterBuilder;
    ///
    /// let builder = SegmenterBuilder::new().with_maximum_area_threshold(0.0);
    /// assert_eq!(builder.maximum_area_threshold(), 0.0);
    /// ```
    #[must_use]
    pub fn with_maximum_area_threshold(mut self, area: f64) -> Self {
        self.maximum_area_threshold = area;
        self
    }

    /// Returns the configured maximum area threshold.
    #[must_use]
    pub fn maximum_area_threshold(&self) -> f64 {
        self.maximum_area_threshold
    }

    /// Source segments at or below this area bypass the maximum area check.
    #[must_use]
    pub fn with_minimum_area_threshold(mut self, area: f64) -> Self {
        self.minimum_area_threshold = area;
        self
    }

    /// Returns the configured minimum area threshold.
    #[must_use]
    pub fn minimum_area_threshold(&self) -> f64 {
        self.minimum_area_threshold
    }

    /// Overrides the length normalisation scale; `0` leaves costs unscaled.
    #[must_use]
    pub fn with_contact_length_factor(mut self, factor: f64) -> Self {
        self.contact_length_factor = factor;
        self
    }

    /// Returns the configured contact length factor.
    #[must_use]
    pub fn contact_length_factor(&self) -> f64 {
        self.contact_length_factor
    }

    /// Enables the elongation penalty with the given weight.
    #[must_use]
    pub fn with_perimeter_cost_factor(mut self, factor: f64) -> Self {
        self.perimeter_cost_factor = factor;
        self
    }

    /// Returns the configured perimeter cost factor.
    #[must_use]
    pub fn perimeter_cost_factor(&self) -> f64 {
        self.perimeter_cost_factor
    }

    /// Replaces all six per-edge cost factors.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::{CostFactors, SegmenterBuilder};
    ///
    /// let builder = SegmenterBuilder::new()
    ///     .with_cost_factors(CostFactors::zero().with_edge_seam(1.0));
    /// assert_eq!(builder.cost_factors().face_angle(), 0.0);
    /// assert_eq!(builder.cost_factors().edge_seam(), 1.0);
    /// ```
    #[must_use]
    pub fn with_cost_factors(mut self, factors: CostFactors) -> Self {
        self.factors = factors;
        self
    }

    /// Returns the configured per-edge cost factors.
    #[must_use]
    pub fn cost_factors(&self) -> CostFactors {
        self.factors
    }

    factor_shortcuts! {
        with_vertex_group_weight_factor => with_vertex_group_weight,
        with_vertex_group_change_factor => with_vertex_group_change,
        with_face_angle_factor => with_face_angle,
        with_material_change_factor => with_material_change,
        with_edge_sharp_factor => with_edge_sharp,
        with_edge_seam_factor => with_edge_seam,
    }

    /// Excludes a vertex group from the weight and heaviest-group terms.
    #[must_use]
    pub fn with_ignored_vertex_group(mut self, group: GroupId) -> Self {
        self.ignore_vertex_groups.insert(group);
        self
    }

    /// Excludes several vertex groups at once.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::{GroupId, SegmenterBuilder};
    ///
    /// let builder = SegmenterBuilder::new()
    ///     .with_ignored_vertex_groups([GroupId::new(3), GroupId::new(1), GroupId::new(3)]);
    /// let ignored: Vec<_> = builder.ignored_vertex_groups().iter().map(|g| g.get()).collect();
    /// assert_eq!(ignored, vec![1, 3]);
    /// ```
    #[must_use]
    pub fn with_ignored_vertex_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.ignore_vertex_groups.extend(groups);
        self
    }

    /// Returns the ignored vertex groups in ascending order.
    #[must_use]
    pub fn ignored_vertex_groups(&self) -> &BTreeSet<GroupId> {
        &self.ignore_vertex_groups
    }

    /// Stops the run after `merges` accepted merges.
    #[must_use]
    pub fn with_max_merges(mut self, merges: usize) -> Self {
        self.max_merges = Some(merges);
        self
    }

    /// Returns the configured merge budget, if any.
    #[must_use]
    pub fn max_merges(&self) -> Option<usize> {
        self.max_merges
    }

    /// Validates the configuration and constructs a [`Segmenter`].
    ///
    /// # Errors
    /// Returns [`SegmentationError::InvalidParameter`] when a threshold is
    /// NaN or negative or a factor is negative or non-finite, and
    /// [`SegmentationError::InvalidMaxMerges`] for a zero merge budget.
    ///
    /// # Examples
    /// ```
    /// use segmesh_core::{SegmentationError, SegmenterBuilder};
    ///
    /// let err = SegmenterBuilder::new()
    ///     .with_contact_length_factor(-1.0)
    ///     .build()
    ///     .expect_err("negative factors are rejected");
    /// assert_eq!(err.code().as_str(), "SEGMESH_INVALID_PARAMETER");
    /// ```
    pub fn build(self) -> Result<Segmenter> {
        let max_merges = match self.max_merges {
            None => None,
            Some(got) => {
                Some(NonZeroUsize::new(got).ok_or(SegmentationError::InvalidMaxMerges { got })?)
            }
        };
        let params = SegmentationParams {
            cost_threshold: self.cost_threshold,
            maximum_area_threshold: self.maximum_area_threshold,
            minimum_area_threshold: self.minimum_area_threshold,
            contact_length_factor: self.contact_length_factor,
            perimeter_cost_factor: self.perimeter_cost_factor,
            factors: self.factors,
            ignore_vertex_groups: self.ignore_vertex_groups,
            max_merges,
        };
        params.validate()?;
        Ok(Segmenter::new(params))
    }
}
