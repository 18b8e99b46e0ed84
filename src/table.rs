use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::trace;

use crate::domain::PAGE_SIZES;

/// Number of page buttons shown in the pagination footer.
pub const PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<K> {
    pub key: K,
    pub dir: SortDir,
}

/// A row type that can be searched, filtered by status and sorted by key.
pub trait TableRow {
    type SortKey: Copy + PartialEq + Sync;
    type Status: Copy + PartialEq + Sync;

    /// Case-insensitive substring match against the row's derived text
    /// fields. `query` is already trimmed and lowercased and never empty.
    fn matches(&self, query: &str) -> bool;

    fn status(&self) -> Self::Status;

    /// Compare two rows on the named field. Numeric fields compare
    /// numerically, everything else as case-sensitive strings.
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

/// One recomputed view over the record list: the row indices to render
/// plus the pagination metadata for the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWindow {
    /// Indices into the full record list, in display order.
    pub visible: Vec<usize>,
    /// Number of records passing the combined filter.
    pub total: usize,
    pub total_pages: usize,
    /// Requested page clamped into [1, total_pages].
    pub page: usize,
    /// Up to PAGE_WINDOW consecutive page numbers, centered on `page`.
    pub page_numbers: Vec<usize>,
}

/// Filter/sort/pagination state over a fixed, read-only record list.
///
/// Every view is a pure function of (query, status filter, sort spec,
/// page, page size); there is no history to track. The record list is
/// never reordered in place, rows are addressed through an index mapping.
pub struct TableState<R: TableRow> {
    rows: Vec<R>,
    query: String,
    status: Option<R::Status>,
    sort: Option<SortSpec<R::SortKey>>,
    page: usize,
    page_size: usize,
}

impl<R: TableRow + Sync> TableState<R> {
    pub fn new(rows: Vec<R>, page_size: usize) -> Self {
        Self {
            rows,
            query: String::new(),
            status: None,
            sort: None,
            page: 1,
            page_size: if PAGE_SIZES.contains(&page_size) {
                page_size
            } else {
                PAGE_SIZES[0]
            },
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> &R {
        &self.rows[idx]
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Changing the query always snaps back to the first page, otherwise
    /// a shrinking result set could leave the view on an out-of-range page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    pub fn status_filter(&self) -> Option<R::Status> {
        self.status
    }

    pub fn set_status_filter(&mut self, status: Option<R::Status>) {
        self.status = status;
        self.page = 1;
    }

    pub fn sort(&self) -> Option<SortSpec<R::SortKey>> {
        self.sort
    }

    /// Same key cycles ascending -> descending -> off, a new key starts
    /// ascending.
    pub fn toggle_sort(&mut self, key: R::SortKey) {
        self.sort = match self.sort {
            Some(SortSpec {
                key: prev,
                dir: SortDir::Ascending,
            }) if prev == key => Some(SortSpec {
                key,
                dir: SortDir::Descending,
            }),
            Some(SortSpec { key: prev, .. }) if prev == key => None,
            _ => Some(SortSpec {
                key,
                dir: SortDir::Ascending,
            }),
        };
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        if PAGE_SIZES.contains(&page_size) {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    pub fn cycle_page_size(&mut self) {
        let pos = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        self.set_page_size(PAGE_SIZES[(pos + 1) % PAGE_SIZES.len()]);
    }

    pub fn goto_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.goto_page(self.current_page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.goto_page(self.current_page().saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.goto_page(1);
    }

    pub fn last_page(&mut self) {
        self.goto_page(self.total_pages());
    }

    fn current_page(&self) -> usize {
        self.page.min(self.total_pages())
    }

    fn total_pages(&self) -> usize {
        Self::pages_for(self.filtered().len(), self.page_size)
    }

    fn pages_for(total: usize, page_size: usize) -> usize {
        std::cmp::max(1, total.div_ceil(page_size))
    }

    /// Index mask of rows passing the combined filter, in list order.
    /// Both predicates are AND combined; an empty query matches everything.
    fn filtered(&self) -> Vec<usize> {
        let query = self.query.trim().to_lowercase();
        self.rows
            .par_iter()
            .enumerate()
            .filter(|(_, row)| {
                let matches_query = query.is_empty() || row.matches(&query);
                let matches_status = match self.status {
                    None => true,
                    Some(status) => row.status() == status,
                };
                matches_query && matches_status
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Recompute the visible slice and pagination metadata from scratch.
    pub fn window(&self) -> TableWindow {
        let mut matched = self.filtered();

        if let Some(SortSpec { key, dir }) = self.sort {
            // Stable sort, ties keep the order from the filter step
            matched.sort_by(|&a, &b| {
                let ord = self.rows[a].compare(&self.rows[b], key);
                match dir {
                    SortDir::Ascending => ord,
                    SortDir::Descending => ord.reverse(),
                }
            });
        }

        let total = matched.len();
        let total_pages = Self::pages_for(total, self.page_size);
        let page = self.page.min(total_pages);

        let begin = (page - 1) * self.page_size;
        let end = std::cmp::min(begin + self.page_size, total);
        let visible = matched[begin..end].to_vec();

        trace!(
            "Table window: total {}, pages {}, page {}, slice {}..{}",
            total, total_pages, page, begin, end
        );

        TableWindow {
            visible,
            total,
            total_pages,
            page,
            page_numbers: page_window(page, total_pages),
        }
    }
}

/// Bounded list of page buttons: at most PAGE_WINDOW consecutive numbers
/// centered on the current page, clamped at either end of the range so
/// min(PAGE_WINDOW, total) buttons always render.
fn page_window(current: usize, total: usize) -> Vec<usize> {
    let half = PAGE_WINDOW / 2;
    let mut start = std::cmp::max(1, current.saturating_sub(half));
    let mut end = std::cmp::min(total, current + half);
    if end - start + 1 < PAGE_WINDOW {
        if start == 1 {
            end = std::cmp::min(total, start + PAGE_WINDOW - 1);
        } else if end == total {
            start = std::cmp::max(1, end.saturating_sub(PAGE_WINDOW - 1));
        }
    }
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Key {
        Label,
        Amount,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Flag {
        On,
        Off,
    }

    #[derive(Debug, Clone)]
    struct Row {
        label: String,
        amount: f64,
        flag: Flag,
    }

    impl TableRow for Row {
        type SortKey = Key;
        type Status = Flag;

        fn matches(&self, query: &str) -> bool {
            self.label.to_lowercase().contains(query)
                || self.amount.to_string().contains(query)
        }

        fn status(&self) -> Flag {
            self.flag
        }

        fn compare(&self, other: &Self, key: Key) -> Ordering {
            match key {
                Key::Label => self.label.cmp(&other.label),
                Key::Amount => self
                    .amount
                    .partial_cmp(&other.amount)
                    .unwrap_or(Ordering::Equal),
            }
        }
    }

    fn row(label: &str, amount: f64, flag: Flag) -> Row {
        Row {
            label: label.to_string(),
            amount,
            flag,
        }
    }

    fn numbered_rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                row(
                    &format!("row-{i:03}"),
                    i as f64,
                    if i % 2 == 0 { Flag::On } else { Flag::Off },
                )
            })
            .collect()
    }

    #[test]
    fn empty_query_matches_everything() {
        let table = TableState::new(numbered_rows(120), 10);
        let w = table.window();
        assert_eq!(w.total, 120);
        assert_eq!(w.total_pages, 12);
        assert_eq!(w.page, 1);
        assert_eq!(w.visible, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn every_filtered_row_contains_the_query() {
        let mut table = TableState::new(numbered_rows(50), 50);
        table.set_query("ROW-01");
        let w = table.window();
        assert!(!w.visible.is_empty());
        for &idx in &w.visible {
            assert!(table.row(idx).label.contains("row-01"));
        }
    }

    #[test]
    fn query_and_status_filter_are_and_combined() {
        let mut table = TableState::new(numbered_rows(20), 20);
        table.set_query("row-00");
        table.set_status_filter(Some(Flag::On));
        let w = table.window();
        for &idx in &w.visible {
            let r = table.row(idx);
            assert!(r.label.contains("row-00"));
            assert_eq!(r.flag, Flag::On);
        }
        // row-000..row-009 -> even indices only
        assert_eq!(w.total, 5);
    }

    #[test]
    fn filtering_preserves_list_order() {
        let mut table = TableState::new(numbered_rows(30), 50);
        table.set_status_filter(Some(Flag::Off));
        let w = table.window();
        let mut sorted = w.visible.clone();
        sorted.sort_unstable();
        assert_eq!(w.visible, sorted);
    }

    #[test]
    fn no_match_yields_an_empty_first_page() {
        let mut table = TableState::new(numbered_rows(120), 10);
        table.goto_page(5);
        table.set_query("no such row");
        let w = table.window();
        assert_eq!(w.visible, Vec::<usize>::new());
        assert_eq!(w.total, 0);
        assert_eq!(w.total_pages, 1);
        assert_eq!(w.page, 1);
        assert_eq!(w.page_numbers, vec![1]);
    }

    #[test]
    fn total_pages_formula_holds() {
        for (total, page_size, expected) in [
            (0usize, 10usize, 1usize),
            (1, 10, 1),
            (10, 10, 1),
            (11, 10, 2),
            (120, 10, 12),
            (120, 20, 6),
            (120, 50, 3),
        ] {
            let table = TableState::new(numbered_rows(total), page_size);
            assert_eq!(table.window().total_pages, expected, "{total}/{page_size}");
        }
    }

    #[test]
    fn changing_query_resets_the_page() {
        let mut table = TableState::new(numbered_rows(120), 10);
        table.goto_page(7);
        assert_eq!(table.window().page, 7);
        table.set_query("row");
        assert_eq!(table.window().page, 1);
    }

    #[test]
    fn changing_status_filter_resets_the_page() {
        let mut table = TableState::new(numbered_rows(120), 10);
        table.goto_page(4);
        table.set_status_filter(Some(Flag::On));
        assert_eq!(table.window().page, 1);
    }

    #[test]
    fn changing_page_size_resets_the_page() {
        let mut table = TableState::new(numbered_rows(120), 10);
        table.goto_page(12);
        table.cycle_page_size();
        assert_eq!(table.page_size(), 20);
        assert_eq!(table.window().page, 1);
    }

    #[test]
    fn page_size_cycles_through_the_fixed_set() {
        let mut table = TableState::new(numbered_rows(10), 10);
        table.cycle_page_size();
        assert_eq!(table.page_size(), 20);
        table.cycle_page_size();
        assert_eq!(table.page_size(), 50);
        table.cycle_page_size();
        assert_eq!(table.page_size(), 10);
    }

    #[test]
    fn out_of_range_page_clamps_down() {
        let mut table = TableState::new(numbered_rows(120), 10);
        table.goto_page(12);
        // Narrow the result set underneath the page, then jump around
        table.set_query("row-0");
        table.goto_page(100);
        let w = table.window();
        assert_eq!(w.page, w.total_pages);
        assert!(!w.visible.is_empty());
    }

    #[test]
    fn page_navigation_clamps_at_both_ends() {
        let mut table = TableState::new(numbered_rows(25), 10);
        table.prev_page();
        assert_eq!(table.window().page, 1);
        table.next_page();
        table.next_page();
        table.next_page();
        assert_eq!(table.window().page, 3);
        table.last_page();
        assert_eq!(table.window().page, 3);
        table.first_page();
        assert_eq!(table.window().page, 1);
    }

    #[test]
    fn sort_toggle_cycles_asc_desc_off() {
        let mut table = TableState::new(numbered_rows(5), 10);
        table.toggle_sort(Key::Label);
        assert_eq!(
            table.sort(),
            Some(SortSpec {
                key: Key::Label,
                dir: SortDir::Ascending
            })
        );
        table.toggle_sort(Key::Label);
        assert_eq!(
            table.sort(),
            Some(SortSpec {
                key: Key::Label,
                dir: SortDir::Descending
            })
        );
        table.toggle_sort(Key::Label);
        assert_eq!(table.sort(), None);
    }

    #[test]
    fn new_sort_key_starts_ascending() {
        let mut table = TableState::new(numbered_rows(5), 10);
        table.toggle_sort(Key::Label);
        table.toggle_sort(Key::Label);
        table.toggle_sort(Key::Amount);
        assert_eq!(
            table.sort(),
            Some(SortSpec {
                key: Key::Amount,
                dir: SortDir::Ascending
            })
        );
    }

    #[test]
    fn reversing_the_direction_reverses_the_order() {
        let rows = vec![
            row("b", 2.0, Flag::On),
            row("c", -1.5, Flag::On),
            row("a", 10.0, Flag::On),
        ];
        let mut table = TableState::new(rows, 10);

        table.toggle_sort(Key::Amount);
        let asc = table.window().visible;
        assert_eq!(asc, vec![1, 0, 2]);

        table.toggle_sort(Key::Amount);
        let desc = table.window().visible;
        assert_eq!(desc, vec![2, 0, 1]);
    }

    #[test]
    fn sorting_does_not_change_membership() {
        let mut table = TableState::new(numbered_rows(37), 50);
        table.set_query("row-0");
        let before: std::collections::HashSet<usize> =
            table.window().visible.into_iter().collect();
        table.toggle_sort(Key::Amount);
        let after: std::collections::HashSet<usize> =
            table.window().visible.into_iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let rows = vec![
            row("same", 1.0, Flag::On),
            row("same", 2.0, Flag::On),
            row("same", 3.0, Flag::On),
        ];
        let mut table = TableState::new(rows, 10);
        table.toggle_sort(Key::Label);
        assert_eq!(table.window().visible, vec![0, 1, 2]);
    }

    #[test]
    fn page_window_is_centered_and_clamped() {
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(3, 12), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(4, 12), vec![2, 3, 4, 5, 6]);
        assert_eq!(page_window(7, 12), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(11, 12), vec![8, 9, 10, 11, 12]);
        assert_eq!(page_window(12, 12), vec![8, 9, 10, 11, 12]);
    }

    #[test]
    fn page_window_length_is_min_of_five_and_total() {
        for total in 1..=20 {
            for current in 1..=total {
                let window = page_window(current, total);
                assert_eq!(window.len(), std::cmp::min(PAGE_WINDOW, total));
                assert!(window.contains(&current));
            }
        }
    }
}
