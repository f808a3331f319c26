//! Compilation and caching of transition packages.
//!
//! [`FamilyRegistry`] owns a validated [`FamilyTable`] and a cache of compiled
//! packages keyed by lowercase transition id. Compilation goes through
//! `&mut self` and lookups through `&self`, so a registry is filled once and
//! can then be shared read-only (for example behind an `Arc`) by any number
//! of alignments.

use std::sync::Arc;

use hashbrown::HashMap;
use shape_expr::build_proto_ast;
use tracing::{debug, info};

use crate::anchors::{JoinSlopes, Partition, compute_anchors_from_total, solve_partition_c1};
use crate::error::TransitionError;
use crate::family::CurvatureFamily;
use crate::package::TransitionPackage;
use crate::params::CompileParams;
use crate::table::{CLOTHO_CORE, FamilyTable, PartitionMode, TransitionDef};
use crate::validate::validate_table;
use crate::Result;

/// Compile the proto `proto_id` into a range-normalized family.
///
/// # Errors
///
/// [`TransitionError::UnknownProto`] if the id is missing, plus anything
/// [`CurvatureFamily::from_raw`] reports.
pub fn compile_proto(
    table: &FamilyTable,
    proto_id: &str,
    params: &CompileParams,
) -> Result<CurvatureFamily> {
    let node = table
        .proto_fcn
        .get(proto_id)
        .ok_or_else(|| TransitionError::UnknownProto { id: proto_id.to_string() })?;
    let raw = build_proto_ast(node, &table.simple_fcn)
        .map_err(|e| TransitionError::expression(proto_id, e))?;
    let family = CurvatureFamily::from_raw(proto_id, &raw, params)?;
    debug!(
        proto = proto_id,
        degenerate = family.is_degenerate(),
        "compiled curvature family"
    );
    Ok(family)
}

/// Compile a half-wave referenced by `transition`.
///
/// # Errors
///
/// [`TransitionError::UnknownHalfWave`] if the id is missing, plus anything
/// [`compile_proto`] reports.
pub fn compile_half_wave(
    table: &FamilyTable,
    half_wave: &str,
    transition: &str,
    params: &CompileParams,
) -> Result<CurvatureFamily> {
    let def = table.half_wave.get(half_wave).ok_or_else(|| TransitionError::UnknownHalfWave {
        id: half_wave.to_string(),
        transition: transition.to_string(),
    })?;
    compile_proto(table, &def.proto, params).map_err(|e| match e {
        TransitionError::DegenerateRange { k0, k1, .. } => TransitionError::DegenerateRange {
            half_wave: half_wave.to_string(),
            k0,
            k1,
        },
        other => other,
    })
}

/// Find a transition entry ignoring case.
fn find_transition<'a>(
    table: &'a FamilyTable,
    id: &str,
) -> Option<(&'a String, &'a TransitionDef)> {
    table.transition.get_key_value(id).or_else(|| {
        let wanted = id.to_lowercase();
        table.transition.iter().find(|(key, _)| key.to_lowercase() == wanted)
    })
}

/// Compile one transition type without caching it.
///
/// # Errors
///
/// [`TransitionError::UnknownTransitionType`] if `id` is not in the table,
/// plus anything the half-wave and core compilation reports.
pub fn compile_package(
    table: &FamilyTable,
    id: &str,
    params: &CompileParams,
) -> Result<TransitionPackage> {
    let (key, def) =
        find_transition(table, id).ok_or_else(|| TransitionError::unknown_transition(id))?;

    let hw_in = compile_half_wave(table, &def.half_wave_in, key, params)?;
    let hw_out = compile_half_wave(table, &def.half_wave_out, key, params)?.reversed();
    let core = compile_proto(table, CLOTHO_CORE, params)?;

    let slopes = JoinSlopes::of(&hw_in, &core, &hw_out);
    let partition = match def.partition {
        PartitionMode::Fixed { lengths } => Partition::new(lengths),
        PartitionMode::ContinuityDriven { curvature_split } => {
            solve_partition_c1(curvature_split, &slopes, params)
        }
    };
    let anchors = compute_anchors_from_total(&partition, &slopes, params);

    let id = key.to_lowercase();
    debug!(
        id = %id,
        partition = ?partition.lengths(),
        anchors = ?anchors.values(),
        "compiled transition package"
    );
    Ok(TransitionPackage::new(id, partition, anchors, hw_in, core, hw_out))
}

/// Validated family table plus its compiled-package cache.
#[derive(Debug, Clone)]
pub struct FamilyRegistry {
    table: FamilyTable,
    params: CompileParams,
    cache: HashMap<String, Arc<TransitionPackage>>,
}

impl FamilyRegistry {
    /// Validate `table` and create an empty registry.
    ///
    /// # Errors
    ///
    /// [`TransitionError::MalformedTable`] if validation fails.
    pub fn new(table: FamilyTable) -> Result<Self> {
        Self::with_params(table, CompileParams::default())
    }

    /// Like [`FamilyRegistry::new`] with explicit compile parameters.
    ///
    /// # Errors
    ///
    /// [`TransitionError::MalformedTable`] if validation fails.
    pub fn with_params(table: FamilyTable, params: CompileParams) -> Result<Self> {
        validate_table(&table)?;
        Ok(Self {
            table,
            params,
            cache: HashMap::new(),
        })
    }

    /// The built-in table, fully compiled.
    ///
    /// # Errors
    ///
    /// Never fails for the shipped table; errors are propagated rather than
    /// hidden.
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new(FamilyTable::standard())?;
        registry.compile_all()?;
        Ok(registry)
    }

    /// Compile `id` if needed and return its package.
    ///
    /// # Errors
    ///
    /// Any compilation error; the cache is left unchanged on failure.
    pub fn compile(&mut self, id: &str) -> Result<Arc<TransitionPackage>> {
        let key = id.to_lowercase();
        if let Some(pkg) = self.cache.get(&key) {
            return Ok(Arc::clone(pkg));
        }
        let pkg = Arc::new(compile_package(&self.table, id, &self.params)?);
        self.cache.insert(key, Arc::clone(&pkg));
        Ok(pkg)
    }

    /// Compile every transition type in the table.
    ///
    /// Returns the number of cached packages. Nothing is cached unless every
    /// entry compiles.
    ///
    /// # Errors
    ///
    /// The first compilation error.
    pub fn compile_all(&mut self) -> Result<usize> {
        let compiled = self
            .table
            .transition
            .keys()
            .filter(|id| !self.cache.contains_key(&id.to_lowercase()))
            .map(|id| compile_package(&self.table, id, &self.params))
            .collect::<Result<Vec<_>>>()?;
        for pkg in compiled {
            self.cache.insert(pkg.id().to_string(), Arc::new(pkg));
        }
        info!(count = self.cache.len(), "compiled transition families");
        Ok(self.cache.len())
    }

    /// Look up a compiled package, ignoring case.
    ///
    /// # Errors
    ///
    /// [`TransitionError::UnknownTransitionType`] if `id` has not been
    /// compiled.
    pub fn package(&self, id: &str) -> Result<Arc<TransitionPackage>> {
        self.cache
            .get(&id.to_lowercase())
            .cloned()
            .ok_or_else(|| TransitionError::unknown_transition(id))
    }

    /// Whether `id` is compiled.
    #[must_use]
    pub fn is_compiled(&self, id: &str) -> bool {
        self.cache.contains_key(&id.to_lowercase())
    }

    /// Compiled ids, sorted.
    #[must_use]
    pub fn compiled_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// The validated table.
    #[must_use]
    pub fn table(&self) -> &FamilyTable {
        &self.table
    }

    /// Compile parameters.
    #[must_use]
    pub fn params(&self) -> &CompileParams {
        &self.params
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::family::CurvatureShape;
    use approx::assert_relative_eq;
    use shape_expr::ProtoNode;

    #[test]
    fn test_standard_registry() {
        let reg = FamilyRegistry::standard().unwrap();
        assert_eq!(
            reg.compiled_ids(),
            vec!["c1-cosine", "clothoid", "cosine-ease", "quadratic-cubic", "smooth-quadratic"]
        );
        for id in reg.compiled_ids() {
            let pkg = reg.package(id).unwrap();
            assert!(pkg.partition().is_valid(), "{id}");
            assert!(pkg.anchors().is_valid(), "{id}");
            assert_relative_eq!(pkg.kappa(0.0), 0.0, epsilon = 1e-9);
            assert_relative_eq!(pkg.kappa(1.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        let mut reg = FamilyRegistry::new(FamilyTable::standard()).unwrap();
        assert!(reg.package("clothoid").is_err());
        let a = reg.compile("Clothoid").unwrap();
        let b = reg.package("CLOTHOID").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id(), "clothoid");
    }

    #[test]
    fn test_unknown_transition() {
        let mut reg = FamilyRegistry::new(FamilyTable::standard()).unwrap();
        let err = reg.compile("bloss").unwrap_err();
        assert!(err.is_unknown_transition());
        assert!(reg.compiled_ids().is_empty());
    }

    #[test]
    fn test_malformed_table_is_rejected_up_front() {
        let mut table = FamilyTable::standard();
        table.half_wave.remove("cosine");
        let err = FamilyRegistry::new(table).unwrap_err();
        assert!(err.is_malformed_table());
    }

    #[test]
    fn test_unknown_ids_without_validation() {
        let table = FamilyTable::standard()
            .with_transition("odd", TransitionDef::fixed("linear", "sigmoid", [0.3, 0.4, 0.3]));
        let err = compile_package(&table, "odd", &CompileParams::default()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::UnknownHalfWave {
                id: "sigmoid".into(),
                transition: "odd".into()
            }
        );

        let table = FamilyTable::standard().with_half_wave("ghost", "ghostHw");
        let err = compile_half_wave(&table, "ghost", "t", &CompileParams::default()).unwrap_err();
        assert_eq!(err, TransitionError::UnknownProto { id: "ghostHw".into() });
    }

    #[test]
    fn test_degenerate_half_wave_is_fatal() {
        let table = FamilyTable::standard()
            .with_proto("loopHw", ProtoNode::reference("sin"))
            .with_half_wave("loop", "loopHw")
            .with_transition("loopy", TransitionDef::fixed("loop", "linear", [0.3, 0.4, 0.3]));
        let mut reg = FamilyRegistry::new(table).unwrap();
        let err = reg.compile("loopy").unwrap_err();
        match err {
            TransitionError::DegenerateRange { half_wave, .. } => assert_eq!(half_wave, "loop"),
            other => panic!("unexpected error {other:?}"),
        }
        // Nothing half-compiled is left behind.
        assert!(reg.compile_all().is_err());
        assert!(reg.compiled_ids().is_empty());
    }

    #[test]
    fn test_unsupported_proto_is_fatal() {
        let table = FamilyTable::standard()
            .with_proto(
                "wobbleHw",
                ProtoNode::op(
                    "*",
                    vec![ProtoNode::reference("line"), ProtoNode::cropped("cos", 0.0, 0.5)],
                ),
            )
            .with_half_wave("wobble", "wobbleHw")
            .with_transition("wobbly", TransitionDef::fixed("wobble", "linear", [0.3, 0.4, 0.3]));
        let mut reg = FamilyRegistry::new(table).unwrap();
        assert!(reg.compile("wobbly").unwrap_err().is_unsupported_expression());
    }

    #[test]
    fn test_continuity_driven_partition() {
        let reg = FamilyRegistry::standard().unwrap();
        let pkg = reg.package("c1-cosine").unwrap();
        let [a0, a1, a2, a3] = pkg.anchors().values();
        assert_relative_eq!(a1 - a0, 0.25, epsilon = 1e-12);
        assert_relative_eq!(a2 - a1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(a3 - a2, 0.25, epsilon = 1e-12);

        let [w1, w2] = {
            let s = pkg.partition().starts();
            [s[1], s[2]]
        };
        let h = 1e-8;
        for w in [w1, w2] {
            assert_relative_eq!(pkg.kappa_prime(w - h), pkg.kappa_prime(w + h), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_asymmetric_package() {
        let reg = FamilyRegistry::standard().unwrap();
        let pkg = reg.package("quadratic-cubic").unwrap();
        let [hw_in, _, hw_out] = pkg.families();
        assert_relative_eq!(hw_in.kappa_prime(1.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(hw_out.kappa_prime(0.0), 3.0, epsilon = 1e-12);
        let mut prev = pkg.kappa(0.0);
        for i in 1..=200 {
            let k = pkg.kappa(f64::from(i) / 200.0);
            assert!(k >= prev - 1e-12);
            prev = k;
        }
    }
}
