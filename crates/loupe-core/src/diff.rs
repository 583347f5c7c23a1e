//! Keyed list diffing for the array-shaped activity snapshots.
//!
//! Items are matched between the old and new list by a caller-supplied key
//! (a tag name, an owner name, ...). Matched items that differ in any other
//! field are reported as changed.

/// The outcome of comparing an old list to a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDiff<T> {
  /// In the new list only, in new-list order.
  pub added:     Vec<T>,
  /// In the old list only, in old-list order.
  pub removed:   Vec<T>,
  /// `(old, new)` pairs sharing a key but not equal.
  pub changed:   Vec<(T, T)>,
  pub unchanged: Vec<T>,
}

impl<T> Default for ListDiff<T> {
  fn default() -> Self {
    Self {
      added:     Vec::new(),
      removed:   Vec::new(),
      changed:   Vec::new(),
      unchanged: Vec::new(),
    }
  }
}

impl<T> ListDiff<T> {
  /// True when nothing was added, removed or changed.
  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
  }

  /// One-line count summary, e.g. `"2 added, 1 removed"`.
  pub fn summary(&self) -> String {
    let parts: Vec<String> = [
      (self.added.len(), "added"),
      (self.removed.len(), "removed"),
      (self.changed.len(), "changed"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, what)| format!("{n} {what}"))
    .collect();

    if parts.is_empty() {
      "no changes".to_string()
    } else {
      parts.join(", ")
    }
  }
}

/// Compare `old` against `new`, matching items by `key`.
///
/// Each old item is matched at most once, so duplicate keys pair up in
/// order.
pub fn diff_by_key<T, K, F>(old: &[T], new: &[T], key: F) -> ListDiff<T>
where
  T: Clone + PartialEq,
  K: PartialEq,
  F: Fn(&T) -> K,
{
  let mut diff = ListDiff::default();
  let mut matched = vec![false; old.len()];

  for incoming in new {
    let incoming_key = key(incoming);
    let found = old
      .iter()
      .enumerate()
      .find(|(i, existing)| !matched[*i] && key(existing) == incoming_key);

    match found {
      Some((i, existing)) => {
        matched[i] = true;
        if existing == incoming {
          diff.unchanged.push(incoming.clone());
        } else {
          diff.changed.push((existing.clone(), incoming.clone()));
        }
      }
      None => diff.added.push(incoming.clone()),
    }
  }

  diff.removed = old
    .iter()
    .zip(matched)
    .filter(|(_, was_matched)| !was_matched)
    .map(|(item, _)| item.clone())
    .collect();

  diff
}
