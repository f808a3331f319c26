//! Declarative family tables.
//!
//! A table names the building blocks of every transition type:
//!
//! - `simpleFcn` - primitive shapes (`poly`, `sin`, `cos`)
//! - `protoFcn` - proto trees combining simple functions
//! - `halfWave` - a named ease shape backed by one proto
//! - `transition` - two half-waves plus a length partition
//!
//! Tables are plain data. They are checked by [`crate::validate_table`] and
//! compiled by [`crate::FamilyRegistry`].

use std::collections::BTreeMap;

use shape_expr::{ProtoNode, SimpleFcn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Proto every table must define; it drives the middle segment of each
/// transition.
pub const CLOTHO_CORE: &str = "clothoCore";

/// A half-wave entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HalfWaveDef {
    /// Proto function that defines the raw shape.
    pub proto: String,
}

/// How a transition splits its length between half-waves and core.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "camelCase"))]
pub enum PartitionMode {
    /// Externally fixed shares `[l1, lc, l2]`, renormalized to sum 1.
    Fixed {
        /// Length shares of half-wave-in, core and half-wave-out.
        lengths: [f64; 3],
    },
    /// Shares solved for C¹ continuity from the desired curvature split.
    ContinuityDriven {
        /// Share of the curvature change carried by each segment.
        #[cfg_attr(feature = "serde", serde(rename = "curvatureSplit"))]
        curvature_split: [f64; 3],
    },
}

impl PartitionMode {
    /// The raw triple, whichever mode.
    #[must_use]
    pub fn shares(&self) -> [f64; 3] {
        match self {
            Self::Fixed { lengths } => *lengths,
            Self::ContinuityDriven { curvature_split } => *curvature_split,
        }
    }
}

/// A transition-type entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TransitionDef {
    /// Half-wave easing into the core.
    pub half_wave_in: String,
    /// Half-wave easing out of the core; it is point-reflected on compile.
    pub half_wave_out: String,
    /// Length partition.
    pub partition: PartitionMode,
}

impl TransitionDef {
    /// Transition with fixed length shares.
    #[must_use]
    pub fn fixed(
        half_wave_in: impl Into<String>,
        half_wave_out: impl Into<String>,
        lengths: [f64; 3],
    ) -> Self {
        Self {
            half_wave_in: half_wave_in.into(),
            half_wave_out: half_wave_out.into(),
            partition: PartitionMode::Fixed { lengths },
        }
    }

    /// Transition whose shares are solved for slope continuity.
    #[must_use]
    pub fn continuity_driven(
        half_wave_in: impl Into<String>,
        half_wave_out: impl Into<String>,
        curvature_split: [f64; 3],
    ) -> Self {
        Self {
            half_wave_in: half_wave_in.into(),
            half_wave_out: half_wave_out.into(),
            partition: PartitionMode::ContinuityDriven { curvature_split },
        }
    }
}

/// The full declarative input of the family registry.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FamilyTable {
    /// Named primitive shapes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub simple_fcn: BTreeMap<String, SimpleFcn>,
    /// Named proto trees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub proto_fcn: BTreeMap<String, ProtoNode>,
    /// Named half-waves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub half_wave: BTreeMap<String, HalfWaveDef>,
    /// Named transition types.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transition: BTreeMap<String, TransitionDef>,
}

impl FamilyTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a simple function.
    #[must_use]
    pub fn with_simple_fcn(mut self, id: impl Into<String>, f: SimpleFcn) -> Self {
        self.simple_fcn.insert(id.into(), f);
        self
    }

    /// Add a proto function.
    #[must_use]
    pub fn with_proto(mut self, id: impl Into<String>, node: ProtoNode) -> Self {
        self.proto_fcn.insert(id.into(), node);
        self
    }

    /// Add a half-wave backed by `proto`.
    #[must_use]
    pub fn with_half_wave(mut self, id: impl Into<String>, proto: impl Into<String>) -> Self {
        self.half_wave.insert(id.into(), HalfWaveDef { proto: proto.into() });
        self
    }

    /// Add a transition type.
    #[must_use]
    pub fn with_transition(mut self, id: impl Into<String>, def: TransitionDef) -> Self {
        self.transition.insert(id.into(), def);
        self
    }

    /// The built-in table.
    ///
    /// Half-waves `linear`, `quadratic`, `cubic`, `cosine` and `none`, and the
    /// transition types:
    ///
    /// | id                 | in / out            | partition                |
    /// |--------------------|---------------------|--------------------------|
    /// | `clothoid`         | none / none         | `[0, 1, 0]`              |
    /// | `smooth-quadratic` | quadratic/quadratic | `[0.25, 0.5, 0.25]`      |
    /// | `cosine-ease`      | cosine / cosine     | `[0.5, 0, 0.5]`          |
    /// | `quadratic-cubic`  | quadratic / cubic   | `[0.3, 0.4, 0.3]`        |
    /// | `c1-cosine`        | cosine / cosine     | split `[0.25, 0.5, 0.25]`|
    #[must_use]
    pub fn standard() -> Self {
        let quarter_cosine = ProtoNode::op(
            "-",
            vec![ProtoNode::Number(1.0), ProtoNode::cropped("cos", 0.0, 0.25)],
        );

        Self::new()
            .with_simple_fcn("line", SimpleFcn::poly([0.0, 1.0]))
            .with_simple_fcn("square", SimpleFcn::poly([0.0, 0.0, 1.0]))
            .with_simple_fcn("cube", SimpleFcn::poly([0.0, 0.0, 0.0, 1.0]))
            .with_simple_fcn("sin", SimpleFcn::Sin)
            .with_simple_fcn("cos", SimpleFcn::Cos)
            .with_simple_fcn("zero", SimpleFcn::poly([0.0]))
            .with_proto(CLOTHO_CORE, ProtoNode::reference("line"))
            .with_proto("linearHw", ProtoNode::reference("line"))
            .with_proto("quadraticHw", ProtoNode::reference("square"))
            .with_proto("cubicHw", ProtoNode::reference("cube"))
            .with_proto("cosineHw", quarter_cosine)
            .with_proto("noneHw", ProtoNode::reference("zero"))
            .with_half_wave("linear", "linearHw")
            .with_half_wave("quadratic", "quadraticHw")
            .with_half_wave("cubic", "cubicHw")
            .with_half_wave("cosine", "cosineHw")
            .with_half_wave("none", "noneHw")
            .with_transition("clothoid", TransitionDef::fixed("none", "none", [0.0, 1.0, 0.0]))
            .with_transition(
                "smooth-quadratic",
                TransitionDef::fixed("quadratic", "quadratic", [0.25, 0.5, 0.25]),
            )
            .with_transition(
                "cosine-ease",
                TransitionDef::fixed("cosine", "cosine", [0.5, 0.0, 0.5]),
            )
            .with_transition(
                "quadratic-cubic",
                TransitionDef::fixed("quadratic", "cubic", [0.3, 0.4, 0.3]),
            )
            .with_transition(
                "c1-cosine",
                TransitionDef::continuity_driven("cosine", "cosine", [0.25, 0.5, 0.25]),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_contents() {
        let t = FamilyTable::standard();
        assert!(t.proto_fcn.contains_key(CLOTHO_CORE));
        for id in ["linear", "quadratic", "cubic", "cosine", "none"] {
            assert!(t.half_wave.contains_key(id), "missing half-wave {id}");
        }
        assert_eq!(t.transition.len(), 5);
        assert_eq!(
            t.transition["clothoid"].partition,
            PartitionMode::Fixed {
                lengths: [0.0, 1.0, 0.0]
            }
        );
    }

    #[test]
    fn test_every_standard_reference_resolves() {
        let t = FamilyTable::standard();
        for def in t.transition.values() {
            assert!(t.half_wave.contains_key(&def.half_wave_in));
            assert!(t.half_wave.contains_key(&def.half_wave_out));
        }
        for hw in t.half_wave.values() {
            let proto = &t.proto_fcn[&hw.proto];
            for name in proto.references() {
                assert!(t.simple_fcn.contains_key(name));
            }
        }
    }

    #[test]
    fn test_partition_shares() {
        let m = PartitionMode::ContinuityDriven {
            curvature_split: [0.2, 0.6, 0.2],
        };
        assert_eq!(m.shares(), [0.2, 0.6, 0.2]);
    }
}
