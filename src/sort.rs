//! Textbook in-place sorting routines.
//!
//! These are independent of the loading code. Each sorts a mutable slice into
//! non-decreasing order and returns nothing. Elements only need [`PartialOrd`]; the order of
//! incomparable values (e.g. `NaN`) is unspecified.

/// Merge sort: split at the midpoint, sort both halves, merge.
///
/// Stable: on ties the element from the left half goes first. Uses O(n) auxiliary space.
///
/// ```
/// let mut v = vec![5, 2, 4, 1];
/// tabload::sort::merge_sort(&mut v);
/// assert_eq!(v, [1, 2, 4, 5]);
/// ```
pub fn merge_sort<T: PartialOrd + Clone>(items: &mut [T]) {
    if items.len() <= 1 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort(&mut items[..mid]);
    merge_sort(&mut items[mid..]);

    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();
    merge(&left, &right, items);
}

fn merge<T: PartialOrd + Clone>(left: &[T], right: &[T], out: &mut [T]) {
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        let take_left = j >= right.len() || (i < left.len() && left[i] <= right[j]);
        if take_left {
            *slot = left[i].clone();
            i += 1;
        } else {
            *slot = right[j].clone();
            j += 1;
        }
    }
}

/// Bubble sort with early exit when a pass makes no swaps.
///
/// O(n²) worst case, O(n) on already sorted input.
pub fn bubble_sort<T: PartialOrd>(items: &mut [T]) {
    let n = items.len();
    for pass in 0..n {
        let mut swapped = false;
        for k in 0..n - pass - 1 {
            if items[k] > items[k + 1] {
                items.swap(k, k + 1);
                swapped = true;
            }
        }
        if !swapped {
            break;
        }
    }
}

/// Insertion sort: grow a sorted prefix, shifting larger elements right to make room for
/// each new element.
///
/// O(n²) worst case, O(n) on already sorted input.
///
/// ```
/// let mut v = vec![3, 1, 2];
/// tabload::sort::insertion_sort(&mut v);
/// assert_eq!(v, [1, 2, 3]);
/// ```
pub fn insertion_sort<T: PartialOrd>(items: &mut [T]) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && items[j] < items[j - 1] {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}
