//! Sorted-sequence helpers
//!
//! Small set operations over string slices, used only to decide whether an
//! update added or reordered entries. Functions documented as taking sorted
//! input do not check it.

/// True if both slices hold the same values in the same order.
pub fn elements_equal<T: PartialEq>(lhs: &[T], rhs: &[T]) -> bool {
    lhs == rhs
}

/// True if the values never decrease.
pub fn is_sorted<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|pair| pair[0] <= pair[1])
}

/// A sorted copy of `values`.
pub fn sorted_copy(values: &[String]) -> Vec<String> {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted
}

/// Values of `lhs` not present in `rhs`. Both must be sorted.
pub fn set_difference(lhs: &[String], rhs: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(lhs.len());
    let (mut i, mut j) = (0, 0);
    while i < lhs.len() && j < rhs.len() {
        match lhs[i].cmp(&rhs[j]) {
            std::cmp::Ordering::Less => {
                result.push(lhs[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&lhs[i..]);
    result
}

/// Values of `lhs` also present in `rhs`, in the order they appear in `lhs`.
/// `rhs` must be sorted.
pub fn set_intersection_unordered(lhs: &[String], rhs: &[String]) -> Vec<String> {
    lhs.iter()
        .filter(|value| rhs.binary_search(*value).is_ok())
        .cloned()
        .collect()
}
