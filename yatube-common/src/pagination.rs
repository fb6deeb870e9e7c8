use serde::Serialize;

/// A resolved page of a collection of `total` items split in chunks of `per_page`.
///
/// The page number is always valid: requests below the first page land on the first
/// one, requests past the end land on the last one. An empty collection still has a
/// single, empty, page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub number: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Page {
    pub fn first(per_page: i64, total: i64) -> Page {
        Page::resolve(1, per_page, total)
    }

    /// Clamps `requested` into the range of existing pages
    pub fn resolve(requested: i64, per_page: i64, total: i64) -> Page {
        let per_page = per_page.max(1);
        let total = total.max(0);
        let last = Page::count(per_page, total);
        Page {
            number: requested.clamp(1, last),
            per_page,
            total,
        }
    }

    /// The page number a raw `page` query parameter asks for, before clamping
    /// to the end of the collection.
    ///
    /// Missing or non numeric values give the first page, `last` gives the last one.
    pub fn requested(raw: Option<&str>) -> i64 {
        match raw.map(str::trim) {
            Some("last") => i64::MAX,
            Some(n) => n.parse::<i64>().unwrap_or(1).max(1),
            None => 1,
        }
    }

    /// Resolves a raw `page` query parameter
    pub fn from_query(raw: Option<&str>, per_page: i64, total: i64) -> Page {
        Page::resolve(Page::requested(raw), per_page, total)
    }

    /// Computes the number of pages needed to display `total` items
    fn count(per_page: i64, total: i64) -> i64 {
        if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        }
    }

    pub fn num_pages(&self) -> i64 {
        Page::count(self.per_page, self.total)
    }

    /// `(offset, limit)` of this page, ready to be given to a query
    pub fn limits(&self) -> (i64, i64) {
        ((self.number - 1) * self.per_page, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<i64> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    pub fn previous_page_number(&self) -> Option<i64> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }
}

/// A slice of a collection, with the page it was cut from.
#[derive(Debug)]
pub struct Paginated<'a, T> {
    pub items: &'a [T],
    pub page: Page,
}

impl<'a, T> Paginated<'a, T> {
    pub fn has_next(&self) -> bool {
        self.page.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.page.has_previous()
    }
}

/// Cuts page `page_number` (1-based, clamped) out of an already ordered sequence.
pub fn paginate<T>(items: &[T], page_size: i64, page_number: i64) -> Paginated<'_, T> {
    let page = Page::resolve(page_number, page_size, items.len() as i64);
    let (offset, limit) = page.limits();
    let start = (offset as usize).min(items.len());
    let end = (start + limit as usize).min(items.len());
    Paginated {
        items: &items[start..end],
        page,
    }
}
