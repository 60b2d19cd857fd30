use crate::constants::{RUN_MAX_PAGES, RUN_PAGE_SIZE, RUN_TYPE_SUN_RUN};

use super::record::RawRecord;
use super::source::{Credentials, RunPageQuery, RunSource, SourceError};

/// Where a partition sweep stands after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Fetching { next_page: u32 },
    /// The last requested page came back empty.
    DoneEmpty,
    /// The last requested page was shorter than the page size.
    DoneShortPage,
    /// The page cap was reached while pages were still full.
    DoneCapped,
}

impl PageState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PageState::Fetching { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageState::Fetching { .. } => "fetching",
            PageState::DoneEmpty => "done_empty",
            PageState::DoneShortPage => "done_short_page",
            PageState::DoneCapped => "done_capped",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pager {
    page_size: u32,
    max_pages: u32,
    state: PageState,
}

impl Pager {
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        let state = if max_pages == 0 {
            PageState::DoneCapped
        } else {
            PageState::Fetching { next_page: 1 }
        };
        Self {
            page_size,
            max_pages,
            state,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn next_page(&self) -> Option<u32> {
        match self.state {
            PageState::Fetching { next_page } => Some(next_page),
            _ => None,
        }
    }

    /// Feeds the length of the page just received and returns the new state.
    pub fn advance(&mut self, received: usize) -> PageState {
        let PageState::Fetching { next_page: current } = self.state else {
            return self.state;
        };
        self.state = if received == 0 {
            PageState::DoneEmpty
        } else if received < self.page_size as usize {
            PageState::DoneShortPage
        } else if current >= self.max_pages {
            PageState::DoneCapped
        } else {
            PageState::Fetching {
                next_page: current + 1,
            }
        };
        self.state
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(RUN_PAGE_SIZE, RUN_MAX_PAGES)
    }
}

#[derive(Debug, Clone)]
pub struct PartitionFetch {
    pub records: Vec<RawRecord>,
    pub outcome: PageState,
    pub pages_requested: u32,
}

/// Walks one record stream page by page, strictly sequentially.
///
/// `month` scopes the stream when present. Any page failure aborts the sweep
/// and is returned to the caller as is.
pub async fn fetch_partition_records<S>(
    source: &S,
    credentials: &Credentials,
    month: Option<&str>,
) -> Result<PartitionFetch, SourceError>
where
    S: RunSource + ?Sized,
{
    fetch_with_pager(source, credentials, month, Pager::default()).await
}

pub(crate) async fn fetch_with_pager<S>(
    source: &S,
    credentials: &Credentials,
    month: Option<&str>,
    mut pager: Pager,
) -> Result<PartitionFetch, SourceError>
where
    S: RunSource + ?Sized,
{
    let mut records = Vec::new();
    let mut pages_requested = 0;

    while let Some(page_number) = pager.next_page() {
        let page = source
            .fetch_run_page(
                credentials,
                RunPageQuery {
                    month,
                    page_number,
                    page_size: pager.page_size(),
                    run_type: RUN_TYPE_SUN_RUN,
                },
            )
            .await?;
        pages_requested += 1;
        let received = page.run_list.len();
        records.extend(page.run_list);
        pager.advance(received);
    }

    Ok(PartitionFetch {
        records,
        outcome: pager.state(),
        pages_requested,
    })
}
