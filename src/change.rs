//! Merging pending changes into a new buffer.

use tracing::error;

use crate::error::SamError;
use crate::region::Change;

/// Apply `changes`, all expressed as offsets into `text`, producing the edited text.
///
/// Changes are ordered by position (insertions before a replacement starting
/// at the same offset, ties otherwise kept in discovery order) and spliced in
/// from last to first, so each splice happens entirely before every splice
/// already made and its offsets are still valid. Overlapping changes are an
/// invariant violation and fail with [`SamError::Internal`].
pub fn apply_changes(text: &str, changes: &[Change]) -> Result<String, SamError> {
    let mut ordered: Vec<&Change> = changes.iter().collect();
    ordered.sort_by_key(|change| (change.start, change.end));

    let mut buffer = text.to_string();
    // Everything at or after `limit` has already been rewritten.
    let mut limit = text.len();
    for change in ordered.into_iter().rev() {
        if change.start > change.end || change.end > limit {
            let msg = format!(
                "change #{},#{} overlaps another change or lies outside the buffer",
                change.start, change.end
            );
            error!("{msg}");
            return Err(SamError::Internal(msg));
        }
        if !text.is_char_boundary(change.start) || !text.is_char_boundary(change.end) {
            let msg = format!(
                "change #{},#{} splits a character",
                change.start, change.end
            );
            error!("{msg}");
            return Err(SamError::Internal(msg));
        }
        buffer.replace_range(change.start..change.end, &change.text);
        limit = change.start;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_changes() {
        assert_eq!(apply_changes("abc", &[]).unwrap(), "abc");
    }

    #[test]
    fn test_insertion_consumes_nothing() {
        let changes = [
            Change::replace(Region::new(0, 3), "X"),
            Change::insert(5, "Y"),
        ];
        assert_eq!(apply_changes("abcdefg", &changes).unwrap(), "XdeYfg");
    }

    #[test]
    fn test_growing_and_shrinking_changes() {
        let changes = [
            Change::replace(Region::new(0, 3), "bar"),
            Change::replace(Region::new(4, 7), "longer text"),
            Change::replace(Region::new(8, 11), ""),
        ];
        assert_eq!(
            apply_changes("foo foo foo", &changes).unwrap(),
            "bar longer text "
        );
    }

    #[test]
    fn test_insertions_at_same_point_keep_order() {
        let changes = [Change::insert(1, "A"), Change::insert(1, "B")];
        assert_eq!(apply_changes("xy", &changes).unwrap(), "xABy");
    }

    #[test]
    fn test_insert_before_replacement_at_same_start() {
        let changes = [
            Change::replace(Region::new(0, 2), "C"),
            Change::insert(0, "I"),
            Change::insert(2, "A"),
        ];
        assert_eq!(apply_changes("xyz", &changes).unwrap(), "ICAz");
    }

    #[test]
    fn test_out_of_order_list_is_sorted() {
        let changes = [Change::insert(3, "!"), Change::replace(Region::new(0, 1), "A")];
        assert_eq!(apply_changes("abc", &changes).unwrap(), "Abc!");
    }

    #[test]
    fn test_overlap_is_internal_error() {
        let changes = [
            Change::replace(Region::new(0, 5), ""),
            Change::replace(Region::new(3, 7), "x"),
        ];
        let err = apply_changes("abcdefgh", &changes).unwrap_err();
        assert!(err.is_internal(), "got {err:?}");
    }

    #[test]
    fn test_insertion_inside_deletion_is_internal_error() {
        let changes = [Change::replace(Region::new(0, 5), ""), Change::insert(3, "x")];
        assert!(apply_changes("abcdefgh", &changes).unwrap_err().is_internal());
    }

    #[test]
    fn test_out_of_bounds_is_internal_error() {
        let changes = [Change::replace(Region::new(2, 10), "")];
        assert!(apply_changes("abc", &changes).unwrap_err().is_internal());
    }

    #[test]
    fn test_multibyte_text() {
        let changes = [Change::replace(Region::new(1, 3), "e")];
        assert_eq!(apply_changes("héllo", &changes).unwrap(), "hello");
    }
}
