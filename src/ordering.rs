//! List splicing behind drag-and-drop moves.
//!
//! Every move is "remove, then insert": the destination index is read against the
//! list as it looks after the removal, which is how a drop target reports it.

/// Find `id` in `list`, trying `hint` first.
///
/// Callers report the index they saw on screen; if the list has drifted since, the
/// id wins over the index.
pub fn locate(list: &[String], id: &str, hint: usize) -> Option<usize> {
    if list.get(hint).is_some_and(|x| x == id) {
        return Some(hint);
    }
    list.iter().position(|x| x == id)
}

/// Move the element at `from` to `to` within one list. Returns false when nothing moved.
///
/// `to` past the end is clamped to the end.
pub fn move_within(list: &mut Vec<String>, from: usize, to: usize) -> bool {
    if from >= list.len() {
        return false;
    }
    let item = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, item);
    from != to
}

/// Move the element at `from` in `source` to `to` in `dest`.
pub fn move_across(source: &mut Vec<String>, from: usize, dest: &mut Vec<String>, to: usize) -> bool {
    if from >= source.len() {
        return false;
    }
    let item = source.remove(from);
    let to = to.min(dest.len());
    dest.insert(to, item);
    true
}

/// Insert at `index`, or append when absent or past the end.
pub fn insert_at(list: &mut Vec<String>, item: String, index: Option<usize>) {
    match index {
        Some(i) if i < list.len() => list.insert(i, item),
        _ => list.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_within_forward() {
        let mut list = ids(&["t1", "t2", "t3"]);
        assert!(move_within(&mut list, 0, 2));
        assert_eq!(list, ids(&["t2", "t3", "t1"]));
    }

    #[test]
    fn test_move_within_backward() {
        let mut list = ids(&["t1", "t2", "t3"]);
        assert!(move_within(&mut list, 2, 0));
        assert_eq!(list, ids(&["t3", "t1", "t2"]));
    }

    #[test]
    fn test_move_within_same_slot_is_noop() {
        let mut list = ids(&["t1", "t2"]);
        assert!(!move_within(&mut list, 1, 1));
        assert_eq!(list, ids(&["t1", "t2"]));
        assert!(!move_within(&mut list, 5, 0));
    }

    #[test]
    fn test_move_within_clamps_destination() {
        let mut list = ids(&["t1", "t2", "t3"]);
        assert!(move_within(&mut list, 0, 99));
        assert_eq!(list, ids(&["t2", "t3", "t1"]));
    }

    #[test]
    fn test_move_across() {
        let mut a = ids(&["t1", "t2"]);
        let mut b = ids(&["t3"]);
        assert!(move_across(&mut a, 0, &mut b, 1));
        assert_eq!(a, ids(&["t2"]));
        assert_eq!(b, ids(&["t3", "t1"]));
    }

    #[test]
    fn test_locate_prefers_hint_then_id() {
        let list = ids(&["a", "b", "a2"]);
        assert_eq!(locate(&list, "b", 1), Some(1));
        assert_eq!(locate(&list, "b", 0), Some(1));
        assert_eq!(locate(&list, "b", 10), Some(1));
        assert_eq!(locate(&list, "z", 0), None);
    }

    #[test]
    fn test_insert_at() {
        let mut list = ids(&["a", "b"]);
        insert_at(&mut list, "c".into(), Some(1));
        insert_at(&mut list, "d".into(), None);
        insert_at(&mut list, "e".into(), Some(42));
        assert_eq!(list, ids(&["a", "c", "b", "d", "e"]));
    }
}
