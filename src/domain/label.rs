//! Display metadata for curves.
//!
//! Labels and visibility are presentation state, not computation state. They
//! are kept apart from [`crate::domain::Curve`] so the numeric operations can
//! hand curves around (and across threads) without dragging mutable UI state
//! along. The caller owns a `CurveLabel` per curve, keyed by
//! [`crate::domain::CurveId`].

use serde::{Deserialize, Serialize};

use crate::domain::CurveId;

/// Name parts and visibility for one curve.
///
/// A rendered name has three parts:
/// - an optional positional prefix such as `#03`, assigned by the caller and
///   not part of the curve's identity
/// - the base name
/// - an ordered list of annotation suffixes such as `mean, 5 curves`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveLabel {
    prefix: Option<String>,
    base: String,
    suffixes: Vec<String>,
    visible: bool,
}

impl CurveLabel {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            prefix: None,
            base: base.into(),
            suffixes: Vec::new(),
            visible: true,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = Some(prefix.into());
    }

    pub fn clear_prefix(&mut self) {
        self.prefix = None;
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = base.into();
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Append an annotation suffix. Order is preserved and meaningful.
    pub fn add_suffix(&mut self, suffix: impl Into<String>) {
        self.suffixes.push(suffix.into());
    }

    /// Remove every suffix equal to `suffix`.
    pub fn remove_suffix(&mut self, suffix: &str) {
        self.suffixes.retain(|s| s != suffix);
    }

    pub fn clear_suffixes(&mut self) {
        self.suffixes.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Base name plus suffixes, without the positional prefix.
    ///
    /// `"midrange sweep - smoothed 1/6, mean, 5 curves"`
    pub fn base_and_suffixes(&self) -> String {
        if self.suffixes.is_empty() {
            self.base.clone()
        } else {
            format!("{} - {}", self.base, self.suffixes.join(", "))
        }
    }

    /// The full rendered name, prefix included.
    pub fn full_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p} {}", self.base_and_suffixes()),
            None => self.base_and_suffixes(),
        }
    }
}

/// Owning registry for the single active reference curve.
///
/// At most one curve system-wide may be the comparison baseline. The slot
/// makes that invariant structural: setting a new reference displaces the old
/// one and tells the caller which id was displaced so its label can be
/// reverted. The scorer never reads this; it takes the reference curve as an
/// explicit argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSlot {
    current: Option<CurveId>,
}

impl ReferenceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Designate `id` as the reference, returning the displaced id if any.
    pub fn set(&mut self, id: CurveId) -> Option<CurveId> {
        let displaced = self.current.filter(|&prev| prev != id);
        self.current = Some(id);
        displaced
    }

    /// Clear the reference, returning the id that held it.
    pub fn clear(&mut self) -> Option<CurveId> {
        self.current.take()
    }

    pub fn current(&self) -> Option<CurveId> {
        self.current
    }

    pub fn is_reference(&self, id: CurveId) -> bool {
        self.current == Some(id)
    }

    /// Drop the reference if it points at a curve the caller just removed.
    pub fn forget(&mut self, id: CurveId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }
}

/// Pick a representative base name for a result derived from several curves.
///
/// Returns the longest common substring that occurs most often across all
/// name pairs, with stray separator characters trimmed. Falls back to the
/// first name when fewer than two names are given, and to an empty string
/// when none are.
pub fn representative_base_name<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => return String::new(),
        [only] => return only.as_ref().trim_matches([' ', '-']).to_string(),
        _ => {}
    }

    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let common = longest_common_substring(names[i].as_ref(), names[j].as_ref());
            if !common.is_empty() {
                *counts.entry(common).or_insert(0) += 1;
            }
        }
    }

    // Most frequent wins; break ties by length then lexicographically so the
    // result does not depend on map iteration order.
    let best = counts
        .into_iter()
        .max_by(|(sa, ca), (sb, cb)| {
            ca.cmp(cb)
                .then(sa.len().cmp(&sb.len()))
                .then(sb.cmp(sa))
        })
        .map(|(s, _)| s)
        .unwrap_or_default();

    best.trim_matches([' ', '-']).to_string()
}

fn longest_common_substring(a: &str, b: &str) -> String {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return String::new();
    }

    // Rolling single row of the match-length table.
    let mut row = vec![0usize; b_chars.len() + 1];
    let mut best_len = 0usize;
    let mut best_end = 0usize;

    for (i, &ca) in a_chars.iter().enumerate() {
        let mut prev_diag = 0usize;
        for (j, &cb) in b_chars.iter().enumerate() {
            let up_left = prev_diag;
            prev_diag = row[j + 1];
            if ca == cb {
                row[j + 1] = up_left + 1;
                if row[j + 1] > best_len {
                    best_len = row[j + 1];
                    best_end = i + 1;
                }
            } else {
                row[j + 1] = 0;
            }
        }
    }

    a_chars[best_end - best_len..best_end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_composition() {
        let mut label = CurveLabel::new("woofer left");
        assert_eq!(label.full_name(), "woofer left");

        label.set_prefix("#03");
        label.add_suffix("smoothed 1/6");
        label.add_suffix("mean, 5 curves");
        assert_eq!(
            label.full_name(),
            "#03 woofer left - smoothed 1/6, mean, 5 curves"
        );
        assert_eq!(
            label.base_and_suffixes(),
            "woofer left - smoothed 1/6, mean, 5 curves"
        );
    }

    #[test]
    fn remove_suffix_drops_all_matches() {
        let mut label = CurveLabel::new("x");
        label.add_suffix("reference");
        label.add_suffix("smoothed 1/3");
        label.add_suffix("reference");
        label.remove_suffix("reference");
        assert_eq!(label.suffixes(), ["smoothed 1/3".to_string()]);
    }

    #[test]
    fn reference_slot_holds_at_most_one() {
        let mut slot = ReferenceSlot::new();
        assert_eq!(slot.set(CurveId(1)), None);
        assert!(slot.is_reference(CurveId(1)));

        // A new reference displaces the old one.
        assert_eq!(slot.set(CurveId(4)), Some(CurveId(1)));
        assert!(!slot.is_reference(CurveId(1)));
        assert!(slot.is_reference(CurveId(4)));

        // Re-setting the current holder displaces nothing.
        assert_eq!(slot.set(CurveId(4)), None);
        assert_eq!(slot.clear(), Some(CurveId(4)));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn forget_only_clears_matching_id() {
        let mut slot = ReferenceSlot::new();
        slot.set(CurveId(2));
        slot.forget(CurveId(3));
        assert_eq!(slot.current(), Some(CurveId(2)));
        slot.forget(CurveId(2));
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn representative_name_finds_shared_core() {
        let names = [
            "unit 01 - on axis",
            "unit 02 - on axis",
            "unit 03 - on axis",
        ];
        let name = representative_base_name(&names);
        assert!(name.contains("on axis"), "got {name:?}");
        assert!(!name.starts_with('-'));
    }

    #[test]
    fn representative_name_degenerate_inputs() {
        assert_eq!(representative_base_name::<&str>(&[]), "");
        assert_eq!(representative_base_name(&[" - solo - "]), "solo");
    }
}
