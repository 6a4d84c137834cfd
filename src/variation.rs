//! Name variation generation.
//!
//! Contact exports annotate names freely: "Michael (Jackson's Dad) Ghirawoo",
//! "O'Kane Matt", "Coorey Dao (Cathy's Mum)". A variation is an alternate
//! rendering of the same name with that noise rearranged or removed, so that a
//! plain query can still line up with one of them.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::normalize::{collapse_whitespace, normalize};

static PARENTHETICAL: OnceLock<Regex> = OnceLock::new();

fn parenthetical() -> &'static Regex {
    PARENTHETICAL.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("parenthetical pattern is valid"))
}

fn push(set: &mut BTreeSet<String>, candidate: &str) {
    let collapsed = collapse_whitespace(candidate);
    if !collapsed.is_empty() {
        set.insert(collapsed);
    }
}

/// Expands an already-normalized string into its variations.
///
/// Callers holding normalized text use this to skip a second normalization pass.
#[must_use]
pub fn variations_of_normalized(normalized: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    push(&mut out, normalized);
    if out.is_empty() {
        return out;
    }

    let re = parenthetical();
    if re.is_match(normalized) {
        let remainder = collapse_whitespace(&re.replace_all(normalized, " "));
        for caps in re.captures_iter(normalized) {
            let inner = caps[1].trim();
            push(&mut out, inner);
            if !remainder.is_empty() && !inner.is_empty() {
                push(&mut out, &format!("{remainder} {inner}"));
                push(&mut out, &format!("{inner} {remainder}"));
            }
        }
        push(&mut out, &remainder);
    }

    let with_apostrophes: Vec<String> = out.iter().filter(|v| v.contains('\'')).cloned().collect();
    for v in with_apostrophes {
        push(&mut out, &v.replace('\'', ""));
        push(&mut out, &v.replace('\'', " "));
    }

    out
}

/// Generates the set of plausible renderings of a raw name.
///
/// The normalized form is always a member. Parenthetical segments contribute
/// their content alone, the name without them, and the two concatenations of
/// content and remainder. Apostrophes contribute a dropped and a spaced form.
/// Text that normalizes to nothing yields an empty set.
///
/// # Examples
///
/// ```
/// use contact_resolve::variations;
///
/// let v = variations("O'Kane");
/// assert!(v.contains("o'kane"));
/// assert!(v.contains("okane"));
/// assert!(v.contains("o kane"));
/// assert_eq!(v.len(), 3);
/// ```
#[must_use]
pub fn variations(text: &str) -> BTreeSet<String> {
    variations_of_normalized(&normalize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_has_single_variation() {
        let v = variations("Agnes Chan");
        assert_eq!(v.len(), 1);
        assert!(v.contains("agnes chan"));
    }

    #[test]
    fn empty_input_has_no_variations() {
        assert!(variations("").is_empty());
        assert!(variations(" ?! ").is_empty());
    }

    #[test]
    fn parenthetical_context_is_split_out() {
        let v = variations("Michael (Jackson's Dad VisionEd) Ghirawoo");
        assert!(v.contains("michael (jackson's dad visioned) ghirawoo"));
        assert!(v.contains("jackson's dad visioned"));
        assert!(v.contains("michael ghirawoo"));
        assert!(v.contains("michael ghirawoo jackson's dad visioned"));
        assert!(v.contains("jackson's dad visioned michael ghirawoo"));
        // Apostrophe forms of the parenthetical content.
        assert!(v.contains("jacksons dad visioned"));
        assert!(v.contains("jackson s dad visioned"));
    }

    #[test]
    fn trailing_parenthetical() {
        let v = variations("Coorey Dao (Cathy's Mum)");
        assert!(v.contains("coorey dao"));
        assert!(v.contains("cathy's mum"));
        assert!(v.contains("cathy's mum coorey dao"));
    }

    #[test]
    fn parenthetical_only_input() {
        let v = variations("(partner)");
        assert!(v.contains("(partner)"));
        assert!(v.contains("partner"));
        // No remainder, so no concatenations and no empty member.
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn unbalanced_parenthesis_is_left_alone() {
        let v = variations("Michael (Jackson");
        assert_eq!(v.len(), 1);
        assert!(v.contains("michael (jackson"));
    }

    #[test]
    fn always_contains_normalized_form() {
        for s in ["Carol O'Carol", "Moses (partner)", "Zoë   Liaw"] {
            assert!(variations(s).contains(&normalize(s)));
        }
    }

    #[test]
    fn members_are_whitespace_collapsed() {
        for v in variations("Sara ( Kiara's  Mum )  Ghirawoo") {
            assert_eq!(v, collapse_whitespace(&v));
            assert!(!v.is_empty());
        }
    }
}
