use serde::Serialize;

pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: u32,
    page_count: u32,
}

/// One page of a listing, as sent to clients.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: u32,
    pub page_count: u32,
    pub total: usize,
}

impl<'a, T> Page<'a, T> {
    /// The whole listing as one page.
    pub fn all(items: &'a [T]) -> Self {
        Page {
            items,
            page: 1,
            page_count: if items.is_empty() { 0 } else { 1 },
            total: items.len(),
        }
    }
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: u32) -> Self {
        let page_size = page_size.max(1);
        if items.is_empty() {
            return Paginator {
                items,
                page_size,
                page_count: 0,
            };
        }
        let item_count = items.len() as u32;
        let upper_bound = item_count - 1;
        let page_count = (upper_bound / page_size) + 1;

        Paginator {
            items,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn get_page(&self, page: u32) -> Result<&'a [T], String> {
        match page {
            0 => return Err("Page has to be greater than 0".to_string()),
            x if x > self.page_count => return Err(format!("Page has to be less than page_count ({})", self.page_count)),
            _ => {}
        };

        let index = ((page - 1) * self.page_size) as usize;
        let end = (index + self.page_size as usize).min(self.items.len());
        Ok(&self.items[index..end])
    }

    /// Like [`Paginator::get_page`], but a page past the end is just empty.
    pub fn page(&self, page: u32) -> Page<'a, T> {
        Page {
            items: self.get_page(page).unwrap_or(&[]),
            page,
            page_count: self.page_count,
            total: self.items.len(),
        }
    }
}
