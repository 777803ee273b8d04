//! Synchronized sorting.
//!
//! Sorting never gathers whole elements. The comparator is handed the
//! field-major view plus two absolute indices, so it can compare on whichever
//! columns it likes. Elements are only ever moved by [`SoaArray::swap`], which
//! exchanges a slot in every column at once, and no scratch storage is used:
//!
//! - the unstable sorts are a heapsort;
//! - the stable sorts run insertion sort over short runs, then merge runs in
//!   place with binary-searched rotations (SymMerge).
//!
//! Both need only a few words of stack whatever the capacity.

use core::cmp::Ordering;
use core::ops::Range;

use crate::array::SoaArray;
use crate::element::SoaElement;
use crate::log::soa_trace;
use crate::slice::SoaSlice;

/// Length of the runs the stable sort orders by insertion before merging.
const INSERTION_RUN: usize = 20;

impl<T: SoaElement, const N: usize> SoaArray<T, N> {
    /// Sorts all elements, keeping equal elements in their original order.
    ///
    /// `cmp` receives the whole view and two indices into it.
    ///
    /// # Examples
    ///
    /// ```
    /// use hadron_soa::{Soa, SoaArray};
    ///
    /// #[derive(Clone, Copy, Soa)]
    /// struct Entry {
    ///     key: u32,
    ///     label: char,
    /// }
    ///
    /// let mut soa = SoaArray::<Entry, 8>::new();
    /// for (key, label) in [(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd')] {
    ///     soa.append(Entry { key, label }).unwrap();
    /// }
    /// soa.sort_by(|view, a, b| view.key[a].cmp(&view.key[b]));
    ///
    /// assert_eq!(soa.items().key, &[1, 2, 3, 3]);
    /// assert_eq!(soa.items().label, &['b', 'd', 'a', 'c']);
    /// ```
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        let len = self.len();
        self.sort_span(0..len, cmp, true);
    }

    /// Sorts all elements. Equal elements may be reordered.
    pub fn sort_unstable_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        let len = self.len();
        self.sort_span(0..len, cmp, false);
    }

    /// Stably sorts only the elements in `span`; everything outside it is
    /// left untouched. Indices passed to `cmp` are absolute.
    ///
    /// # Panics
    ///
    /// Panics if `span` is not within `0..len`.
    pub fn sort_span_by<F>(&mut self, span: Range<usize>, cmp: F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        self.sort_span(span, cmp, true);
    }

    /// Sorts only the elements in `span`. Equal elements may be reordered.
    ///
    /// # Panics
    ///
    /// Panics if `span` is not within `0..len`.
    pub fn sort_span_unstable_by<F>(&mut self, span: Range<usize>, cmp: F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        self.sort_span(span, cmp, false);
    }

    fn sort_span<F>(&mut self, span: Range<usize>, mut cmp: F, stable: bool)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        assert!(
            span.start <= span.end && span.end <= self.len(),
            "sort span out of bounds"
        );
        let count = span.len();
        if count < 2 {
            return;
        }

        if stable {
            self.merge_sort(span.start, span.end, &mut cmp);
        } else {
            self.heap_sort(span.start, span.end, &mut cmp);
        }

        soa_trace!("sorted {count} elements in {}..{}", span.start, span.end);
    }

    fn less<F>(&self, cmp: &mut F, a: usize, b: usize) -> bool
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        cmp(&self.as_slice(), a, b) == Ordering::Less
    }

    // ── Unstable: heapsort ────────────────────────────────────────────

    fn heap_sort<F>(&mut self, lo: usize, hi: usize, cmp: &mut F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        let count = hi - lo;
        for node in (0..count / 2).rev() {
            self.sift_down(lo, node, count, cmp);
        }
        for end in (1..count).rev() {
            self.swap(lo, lo + end);
            self.sift_down(lo, 0, end, cmp);
        }
    }

    /// Restores the max-heap rooted at `node` over the first `end` elements
    /// after `base`.
    fn sift_down<F>(&mut self, base: usize, mut node: usize, end: usize, cmp: &mut F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        loop {
            let mut child = 2 * node + 1;
            if child >= end {
                return;
            }
            if child + 1 < end && self.less(cmp, base + child, base + child + 1) {
                child += 1;
            }
            if !self.less(cmp, base + node, base + child) {
                return;
            }
            self.swap(base + node, base + child);
            node = child;
        }
    }

    // ── Stable: insertion runs + in-place merge ───────────────────────

    fn merge_sort<F>(&mut self, lo: usize, hi: usize, cmp: &mut F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        let mut run = lo;
        while run < hi {
            let run_end = (run + INSERTION_RUN).min(hi);
            self.insertion_sort(run, run_end, cmp);
            run = run_end;
        }

        let mut width = INSERTION_RUN;
        while width < hi - lo {
            let mut a = lo;
            while a + width < hi {
                let m = a + width;
                let b = (m + width).min(hi);
                self.merge_in_place(a, m, b, cmp);
                a = b;
            }
            width *= 2;
        }
    }

    fn insertion_sort<F>(&mut self, lo: usize, hi: usize, cmp: &mut F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        for i in lo + 1..hi {
            let mut j = i;
            while j > lo && self.less(cmp, j, j - 1) {
                self.swap(j, j - 1);
                j -= 1;
            }
        }
    }

    /// Merges the sorted runs `a..m` and `m..b`, keeping equal elements of
    /// the left run first. Requires `a < m < b`.
    fn merge_in_place<F>(&mut self, a: usize, m: usize, b: usize, cmp: &mut F)
    where
        F: FnMut(&SoaSlice<'_, T>, usize, usize) -> Ordering,
    {
        if m - a == 1 {
            // Single left element: find its slot in the right run and bubble
            // it there.
            let (mut i, mut j) = (m, b);
            while i < j {
                let h = i + (j - i) / 2;
                if self.less(cmp, h, a) {
                    i = h + 1;
                } else {
                    j = h;
                }
            }
            for k in a..i - 1 {
                self.swap(k, k + 1);
            }
            return;
        }
        if b - m == 1 {
            let (mut i, mut j) = (a, m);
            while i < j {
                let h = i + (j - i) / 2;
                if self.less(cmp, m, h) {
                    j = h;
                } else {
                    i = h + 1;
                }
            }
            for k in (i + 1..=m).rev() {
                self.swap(k, k - 1);
            }
            return;
        }

        let mid = a + (b - a) / 2;
        let n = mid + m;
        let (mut start, mut r) = if m > mid { (n - b, mid) } else { (a, m) };
        let p = n - 1;
        while start < r {
            let c = start + (r - start) / 2;
            if self.less(cmp, p - c, c) {
                r = c;
            } else {
                start = c + 1;
            }
        }

        let end = n - start;
        if start < m && m < end {
            self.rotate(start, m, end);
        }
        if a < start && start < mid {
            self.merge_in_place(a, start, mid, cmp);
        }
        if mid < end && end < b {
            self.merge_in_place(mid, end, b, cmp);
        }
    }

    /// Exchanges the adjacent blocks `a..m` and `m..b`.
    fn rotate(&mut self, a: usize, m: usize, b: usize) {
        let (mut i, mut j) = (m - a, b - m);
        while i != j {
            if i > j {
                self.swap_blocks(m - i, m, j);
                i -= j;
            } else {
                self.swap_blocks(m - i, m + j - i, i);
                j -= i;
            }
        }
        self.swap_blocks(m - i, m, i);
    }

    fn swap_blocks(&mut self, a: usize, b: usize, count: usize) {
        for k in 0..count {
            self.swap(a + k, b + k);
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::Soa;

    #[derive(Clone, Copy, Debug, PartialEq, Soa)]
    struct Record {
        key: u8,
        seq: u16,
        payload: f64,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Soa)]
    enum Token {
        Number(i64),
        Symbol { id: u16 },
        End,
    }

    fn records(keys: &[u8]) -> SoaArray<Record, 16> {
        let mut soa = SoaArray::new();
        for (seq, &key) in keys.iter().enumerate() {
            soa.append(Record {
                key,
                seq: u16::try_from(seq).unwrap(),
                payload: f64::from(key) * 0.5,
            })
            .unwrap();
        }
        soa
    }

    fn by_key(view: &SoaSlice<'_, Record>, a: usize, b: usize) -> Ordering {
        view.key[a].cmp(&view.key[b])
    }

    #[test]
    fn stable_keeps_equal_order() {
        let mut soa = records(&[3, 1, 3, 2, 1, 3]);
        soa.sort_by(by_key);
        assert_eq!(soa.items().key, &[1, 1, 2, 3, 3, 3]);
        assert_eq!(soa.items().seq, &[1, 4, 3, 0, 2, 5]);
    }

    #[test]
    fn columns_move_together() {
        let mut soa = records(&[9, 4, 7, 1, 8, 2, 6]);
        soa.sort_unstable_by(by_key);
        assert_eq!(soa.items().key, &[1, 2, 4, 6, 7, 8, 9]);
        for record in &soa {
            assert!((record.payload - f64::from(record.key) * 0.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn descending_by_second_column() {
        let mut soa = records(&[5, 5, 5, 5]);
        soa.sort_by(|view, a, b| view.seq[b].cmp(&view.seq[a]));
        assert_eq!(soa.items().seq, &[3, 2, 1, 0]);
    }

    #[test]
    fn span_leaves_outside_untouched() {
        let mut soa = records(&[9, 8, 7, 6, 5, 4]);
        soa.sort_span_by(1..4, by_key);
        assert_eq!(soa.items().key, &[9, 6, 7, 8, 5, 4]);
        soa.sort_span_unstable_by(3..6, by_key);
        assert_eq!(soa.items().key, &[9, 6, 7, 4, 5, 8]);
    }

    #[test]
    fn span_comparator_sees_absolute_indices() {
        let mut soa = records(&[4, 3, 2, 1]);
        let mut seen = Vec::new();
        soa.sort_span_by(2..4, |view, a, b| {
            seen.push(a);
            seen.push(b);
            by_key(view, a, b)
        });
        assert!(seen.iter().all(|&i| (2..4).contains(&i)));
        assert_eq!(soa.items().key, &[4, 3, 1, 2]);
    }

    #[test]
    fn trivial_spans_are_no_ops() {
        let mut soa = records(&[2, 1]);
        soa.sort_span_by(0..0, by_key);
        soa.sort_span_by(1..2, by_key);
        assert_eq!(soa.items().key, &[2, 1]);

        let mut empty = SoaArray::<Record, 4>::new();
        empty.sort_by(by_key);
        assert!(empty.is_empty());
    }

    #[test]
    #[should_panic(expected = "sort span out of bounds")]
    fn span_past_len_panics() {
        let mut soa = records(&[1, 2, 3]);
        soa.sort_span_by(1..4, by_key);
    }

    #[test]
    fn sorts_enum_elements() {
        fn rank(token: Token) -> (u8, i64) {
            match token {
                Token::Number(n) => (0, n),
                Token::Symbol { id } => (1, i64::from(id)),
                Token::End => (2, 0),
            }
        }

        let tokens = [
            Token::End,
            Token::Symbol { id: 4 },
            Token::Number(-2),
            Token::Symbol { id: 1 },
            Token::Number(10),
        ];
        let mut soa = SoaArray::<Token, 8>::from_slice(&tokens).unwrap();
        soa.sort_by(|view, a, b| rank(view.get(a)).cmp(&rank(view.get(b))));

        let sorted: Vec<Token> = soa.iter().collect();
        assert_eq!(
            sorted,
            [
                Token::Number(-2),
                Token::Number(10),
                Token::Symbol { id: 1 },
                Token::Symbol { id: 4 },
                Token::End,
            ]
        );
        assert_eq!(soa.items().tag(4), TokenTag::End);
    }

    #[test]
    fn stable_sort_across_many_runs() {
        let mut soa = SoaArray::<Record, 200>::new();
        for seq in 0..200u16 {
            let key = u8::try_from((seq * 37) % 11).unwrap();
            soa.append(Record { key, seq, payload: 0.0 }).unwrap();
        }
        soa.sort_by(by_key);

        let mut model: Vec<(u8, u16)> = (0..200u16)
            .map(|seq| (u8::try_from((seq * 37) % 11).unwrap(), seq))
            .collect();
        model.sort_by_key(|&(key, _)| key);
        let sorted: Vec<(u8, u16)> = soa.iter().map(|r| (r.key, r.seq)).collect();
        assert_eq!(sorted, model);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Soa)]
    struct Byte {
        value: u8,
    }

    #[test]
    fn large_sort_fits_small_stack() {
        const CAP: usize = 1 << 16;

        // 64 KiB of columns on the heap; a `usize` per element would not fit
        // in the sorting thread's stack.
        let mut soa = std::boxed::Box::new(SoaArray::<Byte, CAP>::new());
        for i in 0..CAP {
            let value = u8::try_from((i * 37) % 251).unwrap();
            soa.append(Byte { value }).unwrap();
        }

        let sorted = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let ascending =
                    |soa: &SoaArray<Byte, CAP>| soa.items().value.windows(2).all(|w| w[0] <= w[1]);
                soa.sort_unstable_by(|view, a, b| view.value[a].cmp(&view.value[b]));
                let unstable = ascending(&soa);
                soa.reverse();
                soa.sort_by(|view, a, b| view.value[a].cmp(&view.value[b]));
                unstable && ascending(&soa) && soa.len() == CAP
            })
            .unwrap()
            .join()
            .unwrap();
        assert!(sorted);
    }

    #[test]
    fn sort_at_full_capacity() {
        let mut soa = SoaArray::<Record, 5>::new();
        for key in [4, 0, 3, 1, 2] {
            soa.append(Record { key, seq: 0, payload: 0.0 }).unwrap();
        }
        soa.sort_by(by_key);
        assert_eq!(soa.items().key, &[0, 1, 2, 3, 4]);
    }
}
