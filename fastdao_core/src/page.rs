/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total: usize) -> Self {
        Self { rows, total }
    }

    /// Number of pages of `per_page` rows needed to hold `total`.
    pub fn total_pages(&self, per_page: usize) -> usize {
        if per_page == 0 {
            0
        } else {
            self.total.div_ceil(per_page)
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
