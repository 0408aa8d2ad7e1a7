//! Parameter handling for segmentation runs.

use std::{collections::BTreeSet, num::NonZeroUsize};

use crate::{error::SegmentationError, mesh::GroupId};

/// Weights applied to the six per-edge cost terms.
///
/// A zero factor disables its term entirely; the cost model skips the
/// corresponding lookups.
///
/// # Examples
/// ```
/// use segmesh_core::CostFactors;
///
/// let factors = CostFactors::zero().with_material_change(1.0);
/// assert_eq!(factors.material_change(), 1.0);
/// assert_eq!(factors.face_angle(), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostFactors {
    vertex_group_weight: f64,
    vertex_group_change: f64,
    face_angle: f64,
    material_change: f64,
    edge_sharp: f64,
    edge_seam: f64,
}

impl Default for CostFactors {
    fn default() -> Self {
        Self {
            vertex_group_weight: 0.0,
            vertex_group_change: 0.0,
            face_angle: 1.0,
            material_change: 1.0,
            edge_sharp: 0.0,
            edge_seam: 0.0,
        }
    }
}

macro_rules! factor_accessors {
    ($($field:ident, $setter:ident, $label:literal);+ $(;)?) => {
        $(
            #[doc = concat!("Returns the ", $label, " factor.")]
            #[rustfmt::skip]
            #[must_use]
            pub const fn $field(&self) -> f64 { self.$field }

            #[doc = concat!("Overrides the ", $label, " factor.")]
            #[must_use]
            pub const fn $setter(mut self, factor: f64) -> Self {
                self.$field = factor;
                self
            }
        )+
    };
}

impl CostFactors {
    /// All factors disabled.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            vertex_group_weight: 0.0,
            vertex_group_change: 0.0,
            face_angle: 0.0,
            material_change: 0.0,
            edge_sharp: 0.0,
            edge_seam: 0.0,
        }
    }

    factor_accessors! {
        vertex_group_weight, with_vertex_group_weight, "vertex-group weight";
        vertex_group_change, with_vertex_group_change, "vertex-group change";
        face_angle, with_face_angle, "face angle";
        material_change, with_material_change, "material change";
        edge_sharp, with_edge_sharp, "sharp edge";
        edge_seam, with_edge_seam, "seam edge";
    }

    pub(crate) fn validate(&self) -> Result<(), SegmentationError> {
        for (name, value) in [
            ("vertex_group_weight_cost_factor", self.vertex_group_weight),
            ("vertex_group_change_cost_factor", self.vertex_group_change),
            ("face_angle_cost_factor", self.face_angle),
            ("material_change_cost_factor", self.material_change),
            ("edge_sharp_cost_factor", self.edge_sharp),
            ("edge_seam_cost_factor", self.edge_seam),
        ] {
            require_non_negative(name, value)?;
        }
        Ok(())
    }
}

/// Validated configuration for a segmentation run.
///
/// Constructed by [`crate::SegmenterBuilder::build`]; read access is exposed
/// through [`crate::Segmenter::params`].
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationParams {
    pub(crate) cost_threshold: f64,
    pub(crate) maximum_area_threshold: f64,
    pub(crate) minimum_area_threshold: f64,
    pub(crate) contact_length_factor: f64,
    pub(crate) perimeter_cost_factor: f64,
    pub(crate) factors: CostFactors,
    pub(crate) ignore_vertex_groups: BTreeSet<GroupId>,
    pub(crate) max_merges: Option<NonZeroUsize>,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            cost_threshold: 1.0,
            maximum_area_threshold: f64::INFINITY,
            minimum_area_threshold: 0.0,
            contact_length_factor: 1.0,
            perimeter_cost_factor: 0.0,
            factors: CostFactors::default(),
            ignore_vertex_groups: BTreeSet::new(),
            max_merges: None,
        }
    }
}

impl SegmentationParams {
    /// Highest normalized cost a contact may carry and still be merged.
    #[rustfmt::skip]
    #[must_use]
    pub const fn cost_threshold(&self) -> f64 { self.cost_threshold }

    /// Upper bound on the combined area of a merge whose source is large.
    #[rustfmt::skip]
    #[must_use]
    pub const fn maximum_area_threshold(&self) -> f64 { self.maximum_area_threshold }

    /// Source segments at or below this area may always be absorbed.
    #[rustfmt::skip]
    #[must_use]
    pub const fn minimum_area_threshold(&self) -> f64 { self.minimum_area_threshold }

    /// Divisor scale for length normalisation; `0` disables normalisation.
    #[rustfmt::skip]
    #[must_use]
    pub const fn contact_length_factor(&self) -> f64 { self.contact_length_factor }

    /// Weight of the perimeter (elongation) penalty; `0` disables it.
    #[rustfmt::skip]
    #[must_use]
    pub const fn perimeter_cost_factor(&self) -> f64 { self.perimeter_cost_factor }

    /// Per-edge cost factors.
    #[rustfmt::skip]
    #[must_use]
    pub const fn factors(&self) -> &CostFactors { &self.factors }

    /// Vertex groups excluded from the weight cost and heaviest-group lookup.
    #[must_use]
    pub const fn ignore_vertex_groups(&self) -> &BTreeSet<GroupId> {
        &self.ignore_vertex_groups
    }

    /// Optional cap on accepted merges.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max_merges(&self) -> Option<NonZeroUsize> { self.max_merges }

    pub(crate) fn perimeter_cost_enabled(&self) -> bool {
        self.perimeter_cost_factor != 0.0
    }

    pub(crate) fn validate(&self) -> Result<(), SegmentationError> {
        if self.cost_threshold.is_nan() {
            return Err(SegmentationError::InvalidParameter {
                name: "cost_threshold",
                expected: "a number",
                got: self.cost_threshold,
            });
        }
        require_non_negative_or_infinite("maximum_area_threshold", self.maximum_area_threshold)?;
        require_non_negative_or_infinite("minimum_area_threshold", self.minimum_area_threshold)?;
        require_non_negative("contact_length_factor", self.contact_length_factor)?;
        require_non_negative("perimeter_cost_factor", self.perimeter_cost_factor)?;
        self.factors.validate()
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), SegmentationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SegmentationError::InvalidParameter {
            name,
            expected: "finite and non-negative",
            got: value,
        })
    }
}

fn require_non_negative_or_infinite(
    name: &'static str,
    value: f64,
) -> Result<(), SegmentationError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SegmentationError::InvalidParameter {
            name,
            expected: "non-negative",
            got: value,
        })
    }
}
