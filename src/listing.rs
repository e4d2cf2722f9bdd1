// SPDX-License-Identifier: MIT

//! In-memory list view-model shared by the users, assessments, and
//! activity-log pages.
//!
//! Each admin page fetches its working set once, loads it here, and then
//! drives search/filter/pagination without re-querying Firestore. The view
//! is data-source agnostic: callers only supply the filter predicate and,
//! optionally, a sort order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Users page shows 6 rows per page.
pub const USERS_PER_PAGE: usize = 6;
/// Assessments and activity-log pages show 10 rows per page.
pub const ASSESSMENTS_PER_PAGE: usize = 10;
pub const ACTIVITIES_PER_PAGE: usize = 10;

/// Records that carry a derived timestamp for the default sort order.
pub trait Chronological {
    fn occurred_at(&self) -> Option<DateTime<Utc>>;
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// 1-indexed inclusive display range for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

/// One entry in the rendered page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageItem {
    Number { number: usize, active: bool },
    Gap,
}

/// Previous/Next state plus the page-number strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageControls {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub items: Vec<PageItem>,
}

/// Paged, filterable view over a working set loaded wholesale.
pub struct ListView<T> {
    records: Vec<T>,
    /// Indices into `records`, after filter and sort.
    visible: Vec<usize>,
    filter: Option<Predicate<T>>,
    sort: Option<Comparator<T>>,
    page: usize,
    page_size: usize,
}

impl<T: Chronological> ListView<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            visible: Vec::new(),
            filter: None,
            sort: None,
            page: 1,
            page_size,
        }
    }

    /// Replace the full working set and reset to page 1.
    pub fn load(&mut self, records: Vec<T>) {
        self.records = records;
        self.page = 1;
        self.rebuild();
    }

    /// Apply a filter predicate ahead of pagination.
    ///
    /// Always resets to page 1: a search change must never leave the view
    /// on a page that no longer exists.
    pub fn set_filter<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self.page = 1;
        self.rebuild();
    }

    /// Remove the filter, keeping the current sort order.
    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.page = 1;
        self.rebuild();
    }

    /// Override the default newest-first order.
    pub fn set_sort<F>(&mut self, comparator: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Box::new(comparator));
        self.rebuild();
    }

    /// Navigate to a page. Out-of-range requests are a no-op and leave the
    /// previously displayed page in place.
    pub fn goto(&mut self, page: usize) -> bool {
        if page < 1 || page > self.page_count() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Records on the current page.
    pub fn page_items(&self) -> Vec<&T> {
        let start = (self.page - 1) * self.page_size;
        self.visible
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.records[i])
            .collect()
    }

    /// `ceil(filtered / page_size)`; 0 when the filtered set is empty.
    pub fn page_count(&self) -> usize {
        self.visible.len().div_ceil(self.page_size)
    }

    /// Count of records passing the filter.
    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// "Showing start-end of total" figures; all zero when empty.
    pub fn summary(&self) -> PageSummary {
        let total = self.visible.len();
        if total == 0 {
            return PageSummary {
                start: 0,
                end: 0,
                total: 0,
            };
        }
        let start = (self.page - 1) * self.page_size + 1;
        let end = (self.page * self.page_size).min(total);
        PageSummary { start, end, total }
    }

    /// Page-number strip: first and last page, current page ± 1, and a gap
    /// marker for each elided range. Hidden entirely at 0 or 1 pages.
    pub fn controls(&self) -> PageControls {
        let count = self.page_count();
        if count <= 1 {
            return PageControls {
                prev_enabled: false,
                next_enabled: false,
                items: Vec::new(),
            };
        }

        let mut items = Vec::new();
        for i in 1..=count {
            let near_current = i + 1 >= self.page && i <= self.page + 1;
            if i == 1 || i == count || near_current {
                items.push(PageItem::Number {
                    number: i,
                    active: i == self.page,
                });
            } else if i + 2 == self.page || i == self.page + 2 {
                items.push(PageItem::Gap);
            }
        }

        PageControls {
            prev_enabled: self.page > 1,
            next_enabled: self.page < count,
            items,
        }
    }

    /// Recompute the visible set; clamps the current page into range but
    /// never below 1.
    fn rebuild(&mut self) {
        self.visible = (0..self.records.len())
            .filter(|&i| match &self.filter {
                Some(pred) => pred(&self.records[i]),
                None => true,
            })
            .collect();

        // Stable sort keeps insertion order as the tie-break.
        let records = &self.records;
        match &self.sort {
            Some(cmp) => self.visible.sort_by(|&a, &b| cmp(&records[a], &records[b])),
            None => self.visible.sort_by(|&a, &b| {
                // Newest first; records with no timestamp sort last.
                match (records[b].occurred_at(), records[a].occurred_at()) {
                    (Some(tb), Some(ta)) => tb.cmp(&ta),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                }
            }),
        }

        self.page = self.page.min(self.page_count()).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        at: Option<DateTime<Utc>>,
    }

    impl Chronological for Row {
        fn occurred_at(&self) -> Option<DateTime<Utc>> {
            self.at
        }
    }

    fn rows(n: usize) -> Vec<Row> {
        // Oldest first so the default sort must reverse them.
        (1..=n)
            .map(|i| Row {
                name: format!("row-{}", i),
                at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::minutes(i as i64)),
            })
            .collect()
    }

    #[test]
    fn test_page_count_and_partition() {
        for (n, p) in [(0usize, 10usize), (1, 10), (23, 10), (30, 10), (7, 6)] {
            let mut view = ListView::new(p);
            view.load(rows(n));

            assert_eq!(view.page_count(), n.div_ceil(p));

            let mut seen = 0;
            for page in 1..=view.page_count() {
                assert!(view.goto(page));
                let len = view.page_items().len();
                if page < view.page_count() {
                    assert_eq!(len, p, "non-final page must be full");
                }
                seen += len;
            }
            assert_eq!(seen, n, "pages must partition the working set");
        }
    }

    #[test]
    fn test_out_of_range_page_is_noop() {
        let mut view = ListView::new(10);
        view.load(rows(23));

        assert!(view.goto(3));
        assert!(!view.goto(0));
        assert!(!view.goto(4));
        assert_eq!(view.current_page(), 3);
        assert_eq!(view.page_items().len(), 3);
    }

    #[test]
    fn test_23_records_scenario() {
        let mut view = ListView::new(10);
        view.load(rows(23));

        assert_eq!(view.page_count(), 3);
        assert_eq!(view.page_items().len(), 10);
        assert!(view.goto(3));
        assert_eq!(view.page_items().len(), 3);
        assert_eq!(
            view.summary(),
            PageSummary {
                start: 21,
                end: 23,
                total: 23
            }
        );
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let mut view: ListView<Row> = ListView::new(10);
        view.load(vec![]);

        assert_eq!(view.page_count(), 0);
        assert!(view.is_empty());
        assert_eq!(
            view.summary(),
            PageSummary {
                start: 0,
                end: 0,
                total: 0
            }
        );
    }

    #[test]
    fn test_default_sort_newest_first() {
        let mut view = ListView::new(10);
        view.load(rows(3));

        let names: Vec<&str> = view.page_items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["row-3", "row-2", "row-1"]);
    }

    #[test]
    fn test_missing_timestamps_sort_last_in_insertion_order() {
        let mut view = ListView::new(10);
        let mut data = rows(2);
        data.push(Row {
            name: "undated-a".into(),
            at: None,
        });
        data.push(Row {
            name: "undated-b".into(),
            at: None,
        });
        view.load(data);

        let names: Vec<&str> = view.page_items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["row-2", "row-1", "undated-a", "undated-b"]);
    }

    #[test]
    fn test_filter_resets_and_clamps_page() {
        let mut view = ListView::new(10);
        view.load(rows(35));

        assert!(view.goto(4));
        view.set_filter(|r: &Row| r.name.ends_with('1'));
        // 4 matches (1, 11, 21, 31) -> 1 page; view must be back on page 1.
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filtered_len(), 4);
        assert_eq!(view.page_count(), 1);

        view.clear_filter();
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filtered_len(), 35);
    }

    #[test]
    fn test_page_never_below_one_after_empty_filter() {
        let mut view = ListView::new(10);
        view.load(rows(15));
        view.set_filter(|_: &Row| false);

        assert_eq!(view.current_page(), 1);
        assert_eq!(view.page_count(), 0);
        assert!(view.page_items().is_empty());
    }

    #[test]
    fn test_custom_sort_overrides_default() {
        let mut view = ListView::new(10);
        view.load(rows(3));
        view.set_sort(|a: &Row, b: &Row| a.name.cmp(&b.name));

        let names: Vec<&str> = view.page_items().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["row-1", "row-2", "row-3"]);
    }

    #[test]
    fn test_controls_hidden_for_single_page() {
        let mut view = ListView::new(10);
        view.load(rows(5));

        let controls = view.controls();
        assert!(!controls.prev_enabled);
        assert!(!controls.next_enabled);
        assert!(controls.items.is_empty());
    }

    #[test]
    fn test_controls_window_with_gaps() {
        let mut view = ListView::new(10);
        view.load(rows(100)); // 10 pages
        assert!(view.goto(5));

        let controls = view.controls();
        assert!(controls.prev_enabled);
        assert!(controls.next_enabled);
        assert_eq!(
            controls.items,
            vec![
                PageItem::Number {
                    number: 1,
                    active: false
                },
                PageItem::Gap,
                PageItem::Number {
                    number: 4,
                    active: false
                },
                PageItem::Number {
                    number: 5,
                    active: true
                },
                PageItem::Number {
                    number: 6,
                    active: false
                },
                PageItem::Gap,
                PageItem::Number {
                    number: 10,
                    active: false
                },
            ]
        );
    }

    #[test]
    fn test_controls_boundaries() {
        let mut view = ListView::new(10);
        view.load(rows(30)); // 3 pages

        let first = view.controls();
        assert!(!first.prev_enabled);
        assert!(first.next_enabled);

        assert!(view.goto(3));
        let last = view.controls();
        assert!(last.prev_enabled);
        assert!(!last.next_enabled);
    }
}
