//! Structural validation of family tables.
//!
//! The validator walks the whole table before anything is compiled, so a
//! registry is never left holding a partial set of packages. It only checks
//! structure; shape-level problems such as a degenerate range are found by
//! the compiler.

use std::collections::BTreeMap;

use shape_expr::{ProtoNode, ProtoOp, SimpleFcn, symbol_value};

use crate::error::TransitionError;
use crate::table::{CLOTHO_CORE, FamilyTable, PartitionMode};
use crate::Result;

/// Check every entry of `table`.
///
/// Returns the first problem found, located by a slash-separated path such
/// as `protoFcn/cosineHw/args[1]`.
///
/// # Errors
///
/// [`TransitionError::MalformedTable`] describing the first malformed entry.
pub fn validate_table(table: &FamilyTable) -> Result<()> {
    for (id, f) in &table.simple_fcn {
        if let SimpleFcn::Poly { coeff } = f {
            if coeff.iter().any(|c| !c.is_finite()) {
                return Err(TransitionError::malformed(
                    format!("simpleFcn/{id}/coeff"),
                    "coefficients must be finite",
                ));
            }
        }
    }

    if !table.proto_fcn.contains_key(CLOTHO_CORE) {
        return Err(TransitionError::malformed(
            format!("protoFcn/{CLOTHO_CORE}"),
            "missing clothoid core proto",
        ));
    }
    for (id, node) in &table.proto_fcn {
        check_node(node, &table.simple_fcn, &format!("protoFcn/{id}"))?;
    }

    for (id, hw) in &table.half_wave {
        if !table.proto_fcn.contains_key(&hw.proto) {
            return Err(TransitionError::malformed(
                format!("halfWave/{id}/proto"),
                format!("unknown proto '{}'", hw.proto),
            ));
        }
    }

    let mut lowered: BTreeMap<String, &str> = BTreeMap::new();
    for (id, def) in &table.transition {
        if let Some(other) = lowered.insert(id.to_lowercase(), id.as_str()) {
            return Err(TransitionError::malformed(
                format!("transition/{id}"),
                format!("id collides with '{other}' ignoring case"),
            ));
        }
        for (field, hw) in [
            ("halfWaveIn", &def.half_wave_in),
            ("halfWaveOut", &def.half_wave_out),
        ] {
            if !table.half_wave.contains_key(hw) {
                return Err(TransitionError::malformed(
                    format!("transition/{id}/{field}"),
                    format!("unknown half-wave '{hw}'"),
                ));
            }
        }
        check_partition(&def.partition, &format!("transition/{id}"))?;
    }

    Ok(())
}

fn check_partition(partition: &PartitionMode, path: &str) -> Result<()> {
    let (field, shares) = match partition {
        PartitionMode::Fixed { lengths } => ("lengths", lengths),
        PartitionMode::ContinuityDriven { curvature_split } => ("curvatureSplit", curvature_split),
    };
    let path = format!("{path}/{field}");
    if shares.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(TransitionError::malformed(path, "shares must be finite and non-negative"));
    }
    if shares.iter().sum::<f64>() <= 0.0 {
        return Err(TransitionError::malformed(path, "shares must not all be zero"));
    }
    Ok(())
}

fn check_node(node: &ProtoNode, simple: &BTreeMap<String, SimpleFcn>, path: &str) -> Result<()> {
    match node {
        ProtoNode::Number(v) if !v.is_finite() => {
            Err(TransitionError::malformed(path, "numeric literal must be finite"))
        }
        ProtoNode::Number(_) => Ok(()),
        ProtoNode::Symbol(name) => match symbol_value(name) {
            Some(_) => Ok(()),
            None => Err(TransitionError::malformed(path, format!("unknown symbol '{name}'"))),
        },
        ProtoNode::Ref { name, crop } => {
            if !simple.contains_key(name) {
                return Err(TransitionError::malformed(
                    path,
                    format!("unresolved reference '{name}'"),
                ));
            }
            match crop {
                Some([a, b]) if !a.is_finite() || !b.is_finite() || a == b => {
                    Err(TransitionError::malformed(
                        format!("{path}/crop"),
                        "crop must be a finite, non-empty interval",
                    ))
                }
                _ => Ok(()),
            }
        }
        ProtoNode::Op { op, args } => {
            let Some(kind) = ProtoOp::parse(op) else {
                return Err(TransitionError::malformed(path, format!("unknown operator '{op}'")));
            };
            let arity_ok = match kind {
                ProtoOp::Add | ProtoOp::Mul => !args.is_empty(),
                ProtoOp::Sub => matches!(args.len(), 1 | 2),
                ProtoOp::Div => args.len() == 2,
            };
            if !arity_ok {
                return Err(TransitionError::malformed(
                    path,
                    format!("operator '{op}' cannot take {} operands", args.len()),
                ));
            }
            args.iter()
                .enumerate()
                .try_for_each(|(i, a)| check_node(a, simple, &format!("{path}/args[{i}]")))
        }
    }
}
