//! Deterministic collision resolution over one batch of rename candidates.

use indexmap::IndexMap;
use tracing::trace;

use crate::rename::scope::NameScope;

/// Provider-assigned opaque symbol identity. Survives structural edits;
/// the semantic provider maps it back to a declaration node on demand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SymbolId(pub u64);

/// Symbol kinds carry the suffix tag tried before numeric disambiguation,
/// so `Render` the type and `Render` the method become `RenderType` and
/// `RenderMethod` rather than `Render1` and `Render2`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Namespace,
    Type,
    Method,
    Property,
    Field,
    Parameter,
    Local,
}

impl SymbolKind {
    fn suffix_tag(self) -> &'static str {
        match self {
            SymbolKind::Namespace => "Ns",
            SymbolKind::Type => "Type",
            SymbolKind::Method => "Method",
            SymbolKind::Property => "Prop",
            SymbolKind::Field => "Field",
            SymbolKind::Parameter => "Param",
            SymbolKind::Local => "Var",
        }
    }
}

/// Declared visibility, widest first. Order is the keep-one priority.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

#[derive(Clone, Debug)]
pub struct RenameCandidate {
    pub symbol: SymbolId,
    pub base_name: String,
    /// Fixed candidates never move, whatever they collide with.
    pub fixed: bool,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    /// Parameter- or property-shaped, the keep-one tie-break after
    /// visibility. Inherited heuristic; do not re-derive.
    pub parameterish: bool,
    /// Normalized signature for method-shaped candidates. Methods sharing a
    /// name with distinct signatures are overloads, not collisions.
    pub signature: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolvedRename {
    pub symbol: SymbolId,
    pub name: String,
    pub changed: bool,
}

/// Resolves one batch of candidates against `scope`, strictly sequentially
/// and in the caller's candidate order.
///
/// Rules:
/// - a unit with no collision and a usable, unclaimed name is untouched;
/// - fixed candidates are never altered and always claim their name;
/// - `keep_one` leaves the single highest-priority non-fixed duplicate
///   (visibility, then parameter/property-ness) untouched and renames the
///   other N−1;
/// - renames try the kind suffix tag before numeric suffixes.
pub fn resolve_all(
    candidates: &[RenameCandidate],
    usable: &dyn Fn(&str) -> bool,
    keep_one: bool,
    scope: &mut NameScope,
) -> Vec<ResolvedRename> {
    let mut resolved: Vec<Option<ResolvedRename>> = vec![None; candidates.len()];

    // Collision units: non-methods sharing a folded name collide with each
    // other; method-shaped candidates subdivide further by signature.
    let mut units: IndexMap<(String, Option<String>), Vec<usize>> = IndexMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let folded = scope.case().fold(&candidate.base_name);
        let signature = match candidate.kind {
            SymbolKind::Method => Some(candidate.signature.clone().unwrap_or_default()),
            _ => None,
        };
        units.entry((folded, signature)).or_default().push(index);
    }

    for (_, members) in units {
        resolve_unit(candidates, &members, usable, keep_one, scope, &mut resolved);
    }

    resolved
        .into_iter()
        .map(|r| r.expect("every candidate resolved"))
        .collect()
}

fn resolve_unit(
    candidates: &[RenameCandidate],
    members: &[usize],
    usable: &dyn Fn(&str) -> bool,
    keep_one: bool,
    scope: &mut NameScope,
    resolved: &mut [Option<ResolvedRename>],
) {
    let name = &candidates[members[0]].base_name;
    let name_usable = usable(name);
    let name_free = !scope.contains(name);
    let colliding = members.len() > 1 || !name_usable || !name_free;

    if !colliding {
        scope.claim(name);
        let index = members[0];
        resolved[index] = Some(unchanged(&candidates[index]));
        return;
    }

    // Fixed members keep their name unconditionally.
    let mut keeper: Option<usize> = None;
    for &index in members {
        if candidates[index].fixed {
            scope.claim(&candidates[index].base_name);
            resolved[index] = Some(unchanged(&candidates[index]));
            keeper.get_or_insert(index);
        }
    }

    // Keep-one: with no fixed member and the shared name still usable,
    // the highest-priority duplicate stays.
    if keep_one && keeper.is_none() && name_usable && name_free {
        let best = members
            .iter()
            .copied()
            .min_by_key(|&i| priority(&candidates[i]))
            .expect("unit is non-empty");
        scope.claim(&candidates[best].base_name);
        resolved[best] = Some(unchanged(&candidates[best]));
    }

    for &index in members {
        if resolved[index].is_some() {
            continue;
        }
        let candidate = &candidates[index];
        let new_name = synthesize(candidate, usable, scope);
        trace!(
            symbol = candidate.symbol.0,
            from = %candidate.base_name,
            to = %new_name,
            "resolved name collision"
        );
        resolved[index] = Some(ResolvedRename {
            symbol: candidate.symbol,
            name: new_name,
            changed: true,
        });
    }
}

fn unchanged(candidate: &RenameCandidate) -> ResolvedRename {
    ResolvedRename {
        symbol: candidate.symbol,
        name: candidate.base_name.clone(),
        changed: false,
    }
}

/// Keep-one ordering: widest visibility first, parameter/property-shaped
/// before the rest. Lower is better.
fn priority(candidate: &RenameCandidate) -> (Visibility, bool) {
    (candidate.visibility, !candidate.parameterish)
}

fn synthesize(
    candidate: &RenameCandidate,
    usable: &dyn Fn(&str) -> bool,
    scope: &mut NameScope,
) -> String {
    let tagged = format!("{}{}", candidate.base_name, candidate.kind.suffix_tag());
    if usable(&tagged) && !scope.contains(&tagged) {
        scope.claim(&tagged);
        return tagged;
    }
    for suffix in 1u32.. {
        let numbered = format!("{}{}", candidate.base_name, suffix);
        if usable(&numbered) && !scope.contains(&numbered) {
            scope.claim(&numbered);
            return numbered;
        }
    }
    unreachable!("numeric suffixes are unbounded")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::rename::scope::CaseSensitivity;

    fn candidate(id: u64, name: &str, kind: SymbolKind) -> RenameCandidate {
        RenameCandidate {
            symbol: SymbolId(id),
            base_name: name.to_string(),
            fixed: false,
            kind,
            visibility: Visibility::Private,
            parameterish: false,
            signature: None,
        }
    }

    fn always_usable(_: &str) -> bool {
        true
    }

    #[test]
    fn idempotent_on_unique_usable_names() {
        let candidates = vec![
            candidate(1, "Alpha", SymbolKind::Type),
            candidate(2, "Beta", SymbolKind::Field),
            candidate(3, "Gamma", SymbolKind::Method),
        ];
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, false, &mut scope);
        assert!(resolved.iter().all(|r| !r.changed));
        assert_eq!(resolved[0].name, "Alpha");
        assert_eq!(resolved[2].name, "Gamma");
    }

    #[test]
    fn no_two_resolved_names_collide() {
        let candidates = vec![
            candidate(1, "value", SymbolKind::Field),
            candidate(2, "Value", SymbolKind::Property),
            candidate(3, "VALUE", SymbolKind::Local),
        ];
        let mut scope = NameScope::new(CaseSensitivity::Insensitive);
        let resolved = resolve_all(&candidates, &always_usable, false, &mut scope);
        let mut folded: Vec<String> = resolved.iter().map(|r| r.name.to_lowercase()).collect();
        folded.sort();
        folded.dedup();
        assert_eq!(folded.len(), 3);
    }

    #[test]
    fn fixed_candidates_never_move() {
        let mut candidates = vec![
            candidate(1, "Widget", SymbolKind::Type),
            candidate(2, "Widget", SymbolKind::Field),
        ];
        candidates[0].fixed = true;
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, false, &mut scope);
        assert_eq!(resolved[0].name, "Widget");
        assert!(!resolved[0].changed);
        assert_ne!(resolved[1].name, "Widget");
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn keep_one_renames_exactly_n_minus_one(#[case] n: usize) {
        let candidates: Vec<_> = (0..n as u64)
            .map(|i| candidate(i, "Handler", SymbolKind::Method))
            .collect();
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, true, &mut scope);
        let renamed = resolved.iter().filter(|r| r.changed).count();
        assert_eq!(renamed, n - 1);
    }

    #[test]
    fn keep_one_prefers_widest_visibility_then_parameterish() {
        let mut candidates = vec![
            candidate(1, "Count", SymbolKind::Field),
            candidate(2, "Count", SymbolKind::Property),
            candidate(3, "Count", SymbolKind::Field),
        ];
        candidates[1].visibility = Visibility::Public;
        candidates[1].parameterish = true;
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, true, &mut scope);
        assert!(!resolved[1].changed);
        assert!(resolved[0].changed);
        assert!(resolved[2].changed);
    }

    #[test]
    fn method_overloads_are_not_collisions() {
        let mut a = candidate(1, "Run", SymbolKind::Method);
        a.signature = Some("()".to_string());
        let mut b = candidate(2, "Run", SymbolKind::Method);
        b.signature = Some("(int)".to_string());
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&[a, b], &always_usable, false, &mut scope);
        assert!(resolved.iter().all(|r| !r.changed));
    }

    #[test]
    fn same_signature_methods_do_collide() {
        let mut a = candidate(1, "Run", SymbolKind::Method);
        a.signature = Some("()".to_string());
        let mut b = candidate(2, "Run", SymbolKind::Method);
        b.signature = Some("()".to_string());
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&[a, b], &always_usable, false, &mut scope);
        assert_eq!(resolved.iter().filter(|r| r.changed).count(), 2);
    }

    #[test]
    fn kind_suffix_is_tried_before_numbers() {
        let candidates = vec![
            candidate(1, "Render", SymbolKind::Type),
            candidate(2, "Render", SymbolKind::Field),
        ];
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, false, &mut scope);
        assert_eq!(resolved[0].name, "RenderType");
        assert_eq!(resolved[1].name, "RenderField");
    }

    #[test]
    fn unusable_names_are_renamed_even_without_duplicates() {
        let candidates = vec![candidate(1, "End", SymbolKind::Local)];
        let usable = |name: &str| name != "End"; // target-language keyword
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &usable, false, &mut scope);
        assert!(resolved[0].changed);
        assert_eq!(resolved[0].name, "EndVar");
    }

    #[test]
    fn numeric_suffixes_take_over_when_tag_is_taken() {
        let candidates = vec![
            candidate(1, "Item", SymbolKind::Field),
            candidate(2, "Item", SymbolKind::Field),
            candidate(3, "Item", SymbolKind::Field),
        ];
        let mut scope = NameScope::new(CaseSensitivity::Sensitive);
        let resolved = resolve_all(&candidates, &always_usable, false, &mut scope);
        let names: Vec<_> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ItemField", "Item1", "Item2"]);
    }
}
