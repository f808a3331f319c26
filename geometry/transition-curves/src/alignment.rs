//! Alignments: ordered element sequences with station lookup.
//!
//! An [`Alignment`] keeps a prefix-sum table of element end stations. A
//! station query clamps into `[0, total_length]`, finds the owning element
//! by binary search and replays pose deltas forward from the start pose.
//! Element deltas are computed when the element is built, so replaying
//! never integrates anything.

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::element::AlignmentElement;
use crate::element::fixed::FixedElement;
use crate::element::marker::KinkElement;
use crate::element::transition::TransitionElement;
use crate::error::TransitionError;
use crate::pose::Pose;
use crate::registry::FamilyRegistry;
use crate::traits::{Element, clamp_station, locate_station};
use crate::Result;

/// Upper bound on the interior stations produced by [`Alignment::sample`].
pub const MAX_SAMPLES: usize = 100_000;

/// Declarative description of one alignment element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum ElementSpec {
    /// Constant-curvature element.
    Fixed {
        /// Length in meters.
        #[cfg_attr(feature = "serde", serde(rename = "arcLength"))]
        arc_length: f64,
        /// Signed curvature.
        curvature: f64,
        /// Optional caller label.
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        label: Option<String>,
    },
    /// Transition from `ka` to `ke` along a compiled transition type.
    Transition {
        /// Length in meters.
        #[cfg_attr(feature = "serde", serde(rename = "arcLength"))]
        arc_length: f64,
        /// Transition type id, looked up ignoring case.
        #[cfg_attr(feature = "serde", serde(rename = "transitionTypeId"))]
        transition_type_id: String,
        /// Curvature at the start.
        #[cfg_attr(feature = "serde", serde(rename = "Ka"))]
        ka: f64,
        /// Curvature at the end.
        #[cfg_attr(feature = "serde", serde(rename = "Ke"))]
        ke: f64,
        /// Optional caller label.
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        label: Option<String>,
    },
    /// Heading jump.
    Kink {
        /// Heading change in radians.
        #[cfg_attr(feature = "serde", serde(rename = "deltaDir"))]
        delta_dir: f64,
        /// Optional caller label.
        #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
        label: Option<String>,
    },
}

impl ElementSpec {
    /// Fixed element spec.
    #[must_use]
    pub fn fixed(arc_length: f64, curvature: f64) -> Self {
        Self::Fixed {
            arc_length,
            curvature,
            label: None,
        }
    }

    /// Transition element spec.
    #[must_use]
    pub fn transition(
        arc_length: f64,
        transition_type_id: impl Into<String>,
        ka: f64,
        ke: f64,
    ) -> Self {
        Self::Transition {
            arc_length,
            transition_type_id: transition_type_id.into(),
            ka,
            ke,
            label: None,
        }
    }

    /// Kink spec.
    #[must_use]
    pub fn kink(delta_dir: f64) -> Self {
        Self::Kink {
            delta_dir,
            label: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, new_label: impl Into<String>) -> Self {
        match &mut self {
            Self::Fixed { label, .. }
            | Self::Transition { label, .. }
            | Self::Kink { label, .. } => {
                *label = Some(new_label.into());
            }
        }
        self
    }

    /// The label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Fixed { label, .. }
            | Self::Transition { label, .. }
            | Self::Kink { label, .. } => label.as_deref(),
        }
    }

    fn build(&self, index: usize, registry: &FamilyRegistry) -> Result<AlignmentElement> {
        let finite = |value: f64, what: &str| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(TransitionError::invalid_element(index, format!("{what} must be finite")))
            }
        };
        let length = |value: f64| -> Result<f64> {
            let value = finite(value, "arc length")?;
            if value < 0.0 {
                return Err(TransitionError::invalid_element(
                    index,
                    "arc length must not be negative",
                ));
            }
            Ok(value)
        };

        match self {
            Self::Fixed {
                arc_length, curvature, ..
            } => {
                let curvature = finite(*curvature, "curvature")?;
                Ok(FixedElement::new(length(*arc_length)?, curvature).into())
            }
            Self::Transition {
                arc_length,
                transition_type_id,
                ka,
                ke,
                ..
            } => {
                let arc_length = length(*arc_length)?;
                let (ka, ke) = (finite(*ka, "Ka")?, finite(*ke, "Ke")?);
                let package = registry.package(transition_type_id)?;
                Ok(TransitionElement::from_package(&package, arc_length, ka, ke).into())
            }
            Self::Kink { delta_dir, .. } => {
                Ok(KinkElement::new(finite(*delta_dir, "heading jump")?).into())
            }
        }
    }
}

/// Result of evaluating an alignment at one station.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationEval {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Heading (theta) in radians.
    pub heading: f64,
    /// Signed curvature.
    pub curvature: f64,
    /// Owning element, `None` for an empty alignment.
    pub element_index: Option<usize>,
    /// Station local to the owning element.
    pub s_local: f64,
    /// Clamped global station.
    pub s: f64,
    /// Total alignment length.
    pub total_length: f64,
}

impl StationEval {
    /// Pose part of the result.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.heading)
    }
}

/// One point of a sampled alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplePoint {
    /// Global station.
    pub s: f64,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Heading in radians.
    pub heading: f64,
    /// Signed curvature.
    pub curvature: f64,
}

/// A start pose plus an ordered sequence of elements.
///
/// # Example
///
/// ```
/// use transition_curves::{Alignment, ElementSpec, FamilyRegistry, Pose};
///
/// let registry = FamilyRegistry::standard().unwrap();
/// let alignment = Alignment::from_specs(
///     Pose::origin(),
///     &[
///         ElementSpec::fixed(80.0, 0.0),
///         ElementSpec::transition(60.0, "clothoid", 0.0, 1.0 / 300.0),
///         ElementSpec::fixed(120.0, 1.0 / 300.0),
///     ],
///     &registry,
/// )
/// .unwrap();
///
/// assert!((alignment.total_length() - 260.0).abs() < 1e-9);
/// let at = alignment.eval_at(200.0);
/// assert_eq!(at.element_index, Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Alignment {
    start: Pose,
    elements: Vec<AlignmentElement>,
    labels: Vec<Option<String>>,
    /// Cumulative end station of each element.
    ends: Vec<f64>,
}

impl Alignment {
    /// An empty alignment starting at `start`.
    #[must_use]
    pub fn new(start: Pose) -> Self {
        Self {
            start,
            elements: Vec::new(),
            labels: Vec::new(),
            ends: Vec::new(),
        }
    }

    /// Build from element specs, resolving transitions in `registry`.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::InvalidElement`] for a negative or non-finite
    ///   length, or a non-finite curvature or heading jump.
    /// - [`TransitionError::UnknownTransitionType`] if a transition type is
    ///   not compiled in `registry`.
    pub fn from_specs(
        start: Pose,
        specs: &[ElementSpec],
        registry: &FamilyRegistry,
    ) -> Result<Self> {
        let mut alignment = Self::new(start);
        for (index, spec) in specs.iter().enumerate() {
            let element = spec.build(index, registry)?;
            alignment.push_labeled(element, spec.label().map(str::to_string));
        }
        debug!(
            elements = alignment.element_count(),
            total_length = alignment.total_length(),
            "built alignment"
        );
        Ok(alignment)
    }

    /// Append an element.
    pub fn push(&mut self, element: impl Into<AlignmentElement>) {
        self.push_labeled(element, None);
    }

    /// Append an element with an optional label.
    pub fn push_labeled(&mut self, element: impl Into<AlignmentElement>, label: Option<String>) {
        let element = element.into();
        let end = self.total_length() + element.arc_length().max(0.0);
        self.ends.push(end);
        self.elements.push(element);
        self.labels.push(label);
    }

    /// Start pose.
    #[must_use]
    pub fn start_pose(&self) -> &Pose {
        &self.start
    }

    /// Elements in order; an element's id is its index.
    #[must_use]
    pub fn elements(&self) -> &[AlignmentElement] {
        &self.elements
    }

    /// Label of element `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).and_then(Option::as_deref)
    }

    /// Sum of element lengths.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// Number of elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Owning element and local station for global station `s`.
    ///
    /// `s` is clamped into `[0, total_length]`. On a boundary the later
    /// element wins, so zero-length elements are skipped except at the very
    /// end. `None` for an empty alignment.
    #[must_use]
    pub fn locate(&self, s: f64) -> Option<(usize, f64)> {
        locate_station(&self.ends, s)
    }

    /// Pose at the start of element `index`, propagated from the start pose.
    ///
    /// An index past the end gives the end pose.
    #[must_use]
    pub fn pose_at_element_start(&self, index: usize) -> Pose {
        self.elements
            .iter()
            .take(index)
            .fold(self.start, |pose, element| element.end_pose(&pose))
    }

    /// Evaluate position, heading and curvature at global station `s`.
    #[must_use]
    pub fn eval_at(&self, s: f64) -> StationEval {
        let total_length = self.total_length();
        let Some((index, s_local)) = self.locate(s) else {
            return StationEval {
                x: self.start.x(),
                y: self.start.y(),
                heading: self.start.heading,
                curvature: 0.0,
                element_index: None,
                s_local: 0.0,
                s: 0.0,
                total_length,
            };
        };
        let element = &self.elements[index];
        let pose = element.pose_at(s_local, &self.pose_at_element_start(index));
        StationEval {
            x: pose.x(),
            y: pose.y(),
            heading: pose.heading,
            curvature: element.curvature_at(s_local),
            element_index: Some(index),
            s_local,
            s: clamp_station(s, total_length),
            total_length,
        }
    }

    /// Pose at global station `s`.
    #[must_use]
    pub fn pose_at(&self, s: f64) -> Pose {
        self.eval_at(s).pose()
    }

    /// Pose after the last element.
    #[must_use]
    pub fn end_pose(&self) -> Pose {
        self.pose_at_element_start(self.elements.len())
    }

    /// Start station of every element followed by the total length.
    #[must_use]
    pub fn element_stations(&self) -> Vec<f64> {
        std::iter::once(0.0).chain(self.ends.iter().copied()).collect()
    }

    /// Sample every `ds` meters plus both ends and every element boundary.
    ///
    /// A non-positive or non-finite `ds` samples boundaries only. The
    /// interior steps are capped at [`MAX_SAMPLES`]; a smaller `ds` is
    /// widened to `total_length / MAX_SAMPLES`.
    #[must_use]
    pub fn sample(&self, ds: f64) -> Vec<SamplePoint> {
        let total = self.total_length();
        let mut stations = self.element_stations();
        if ds.is_finite() && ds > 0.0 {
            let ds = ds.max(total / MAX_SAMPLES as f64);
            let steps = ((total / ds).floor() as usize).min(MAX_SAMPLES);
            stations.extend((1..=steps).map(|i| i as f64 * ds).filter(|s| *s < total));
        }
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() <= 1e-9);

        stations
            .into_iter()
            .map(|s| {
                let at = self.eval_at(s);
                SamplePoint {
                    s: at.s,
                    x: at.x,
                    y: at.y,
                    heading: at.heading,
                    curvature: at.curvature,
                }
            })
            .collect()
    }

    /// The flat element sequence with transitions expanded into their parts.
    #[must_use]
    pub fn flatten(&self) -> Vec<AlignmentElement> {
        self.elements.iter().flat_map(AlignmentElement::flatten).collect()
    }
}
