//! Overload resolution
//!
//! Picks the overload of a call among the function table entries sharing
//! its signature and arity. An exact match wins outright; otherwise every
//! candidate is scored by lattice distance and the cheapest one wins.
//! Generic candidates are specialised first by a one-shot structural
//! binding of their placeholders.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::frontend::ast::{FunctionDecl, FunctionKey};
use crate::frontend::symbols::SymbolTable;
use crate::types::{type_equals, Type, TypeKind, TypeLattice};
use crate::utils::{Error, Location, Result};

/// Score disqualifying a candidate at one position
pub const UNRELATED_SCORE: usize = 99;
/// Score of an argument reaching a declared `Any` outside the lattice
pub const ANY_FALLBACK_SCORE: usize = 50;
/// Score of passing nil to a nullable parameter, or a nullable to `Nil`
pub const NULLABLE_SCORE: usize = 1;

/// Placeholder name to bound type
pub type Bindings = BTreeMap<String, Type>;

/// Resolve a call to one overload.
///
/// `signature` is the display form used in diagnostics. The returned
/// declaration is the winning overload, specialised when it was generic;
/// a specialisation is also added to the function table.
pub fn resolve_overload(
    symbols: &mut SymbolTable,
    key: &FunctionKey,
    signature: &str,
    actuals: &[Type],
    location: Location,
) -> Result<FunctionDecl> {
    let candidates = symbols.functions.get(key);
    if candidates.is_empty() {
        return Err(Error::UsingUnknownFunction { signature: signature.to_string(), location });
    }

    if let Some(exact) = candidates.iter().find(|c| is_exact_match(c, actuals)) {
        trace!("{}: exact match", key);
        return Ok(exact.clone());
    }

    let mut best: Option<(usize, FunctionDecl, bool)> = None;
    let mut earliest_failure: Option<usize> = None;
    for candidate in candidates {
        let is_generic = candidate.is_generic();
        let specialised = if is_generic {
            match specialise(&symbols.lattice, candidate, actuals) {
                Ok(decl) => decl,
                Err(position) => {
                    earliest_failure = Some(earliest_failure.map_or(position, |p| p.min(position)));
                    continue;
                }
            }
        } else {
            candidate.clone()
        };
        match score(&symbols.lattice, &specialised, actuals) {
            Ok(total) => {
                trace!("{}: candidate ({}) scores {}", key, param_list(&specialised), total);
                if best.as_ref().map_or(true, |(lowest, _, _)| total < *lowest) {
                    best = Some((total, specialised, is_generic));
                }
            }
            Err(position) => {
                earliest_failure = Some(earliest_failure.map_or(position, |p| p.min(position)));
            }
        }
    }

    match best {
        Some((_, winner, is_generic)) => {
            if is_generic && symbols.functions.insert(winner.clone()) {
                debug!("{}: specialised as ({})", key, param_list(&winner));
            }
            Ok(winner)
        }
        None => {
            let position = earliest_failure
                .ok_or_else(|| Error::Internal(format!("no candidate of {} was scored", key)))?;
            Err(no_conforming_function(symbols.functions.get(key), signature, position, actuals, location))
        }
    }
}

fn is_exact_match(candidate: &FunctionDecl, actuals: &[Type]) -> bool {
    candidate.params.len() == actuals.len()
        && candidate.params.iter().zip(actuals).all(|(param, actual)| type_equals(&param.ty, actual))
}

/// Sum of per-position scores, or the first disqualifying position
fn score(lattice: &TypeLattice, candidate: &FunctionDecl, actuals: &[Type]) -> std::result::Result<usize, usize> {
    let mut total = 0;
    for (position, (param, actual)) in candidate.params.iter().zip(actuals).enumerate() {
        let points = position_score(lattice, actual, &param.ty);
        if points >= UNRELATED_SCORE {
            return Err(position);
        }
        total += points;
    }
    Ok(total)
}

/// Cost of passing `actual` where `declared` is expected
pub fn position_score(lattice: &TypeLattice, actual: &Type, declared: &Type) -> usize {
    if type_equals(actual, declared) {
        return 0;
    }
    if (actual.is_nil() && declared.nullable) || (declared.is_nil() && actual.nullable) {
        return NULLABLE_SCORE;
    }
    match lattice.distance(actual, declared) {
        Some(distance) => distance,
        None if declared.is_any() => ANY_FALLBACK_SCORE,
        None => UNRELATED_SCORE,
    }
}

/// Bind the placeholders of `candidate` and substitute them through its
/// parameters and return type. Fails with the position of the first
/// parameter mentioning a placeholder whose group constraint is violated.
fn specialise(lattice: &TypeLattice, candidate: &FunctionDecl, actuals: &[Type]) -> std::result::Result<FunctionDecl, usize> {
    let mut bindings = Bindings::new();
    // Earlier parameters overwrite later ones, so the first one wins
    for (param, actual) in candidate.params.iter().zip(actuals).rev() {
        extract_bindings(&param.ty, actual, &mut bindings);
    }

    for generic in &candidate.generics {
        let (Some(constraint), Some(bound)) = (&generic.constraint, bindings.get(&generic.name.name)) else {
            continue;
        };
        if lattice.distance(bound, constraint).is_none() {
            trace!("{} violates the constraint {} on {}", bound, constraint, generic.name.name);
            let position = candidate
                .params
                .iter()
                .position(|p| p.ty.generic_names().contains(&generic.name.name.as_str()))
                .unwrap_or(0);
            return Err(position);
        }
    }

    let mut specialised = candidate.clone();
    for param in &mut specialised.params {
        param.ty = substitute(&param.ty, &bindings);
    }
    specialised.return_type = substitute(&specialised.return_type, &bindings);
    specialised.generics.retain(|g| !bindings.contains_key(&g.name.name));
    Ok(specialised)
}

/// Walk `declared` and `actual` in parallel, binding every placeholder met
/// in `declared` to the type at the same place in `actual`
pub fn extract_bindings(declared: &Type, actual: &Type, bindings: &mut Bindings) {
    if let TypeKind::Generic { name, .. } = &declared.kind {
        bindings.insert(name.clone(), actual.clone().with_nullable(false));
        return;
    }
    for (declared_arg, actual_arg) in declared.args().iter().zip(actual.args()) {
        extract_bindings(declared_arg, actual_arg, bindings);
    }
}

/// Replace every bound placeholder in `ty`
pub fn substitute(ty: &Type, bindings: &Bindings) -> Type {
    let kind = match &ty.kind {
        TypeKind::Generic { name, .. } => match bindings.get(name) {
            Some(bound) => return bound.clone().with_nullable(bound.nullable || ty.nullable),
            None => ty.kind.clone(),
        },
        TypeKind::Builtin { kind, args } => TypeKind::Builtin {
            kind: *kind,
            args: args.iter().map(|a| substitute(a, bindings)).collect(),
        },
        TypeKind::Struct { name, args } => TypeKind::Struct {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, bindings)).collect(),
        },
        TypeKind::Unresolved { name, args, location } => TypeKind::Unresolved {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, bindings)).collect(),
            location: *location,
        },
        TypeKind::Void | TypeKind::Enum { .. } | TypeKind::Group { .. } => ty.kind.clone(),
    };
    Type { kind, nullable: ty.nullable }
}

fn no_conforming_function(
    candidates: &[FunctionDecl],
    signature: &str,
    position: usize,
    actuals: &[Type],
    location: Location,
) -> Error {
    let mut declared: Vec<Type> = Vec::new();
    for candidate in candidates {
        if let Some(param) = candidate.params.get(position) {
            if !declared.iter().any(|t| type_equals(t, &param.ty) && t.to_string() == param.ty.to_string()) {
                declared.push(param.ty.clone());
            }
        }
    }
    Error::NoConformingFunction {
        signature: signature.to_string(),
        position: position + 1,
        actual: actuals.get(position).cloned().unwrap_or_else(Type::void),
        candidates: declared,
        location,
    }
}

fn param_list(decl: &FunctionDecl) -> String {
    decl.params.iter().map(|p| p.ty.to_string()).collect::<Vec<_>>().join(", ")
}
