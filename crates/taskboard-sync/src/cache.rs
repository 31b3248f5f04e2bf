use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use taskboard_core::page::{ColumnQuery, ColumnTasksPage};
use taskboard_core::task::{ColumnId, Task};
use taskboard_service::{ServiceError, TaskStore};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Identity of one cached listing: a column under a search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub column: ColumnId,
    pub search: String,
}

impl CacheKey {
    pub fn new(column: ColumnId, search: &str) -> Self {
        Self {
            column,
            search: search.to_string(),
        }
    }

    pub fn unfiltered(column: ColumnId) -> Self {
        Self::new(column, "")
    }
}

/// What a load call did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was written into the cache.
    Applied,
    /// Nothing to do: a load was already in flight, or no further page exists.
    Skipped,
    /// The response arrived after the load was cancelled and was dropped.
    Suppressed,
}

/// Read model of one column listing, as rendered by a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub has_next_page: bool,
    pub is_loading: bool,
    pub is_stale: bool,
    pub error: Option<ServiceError>,
}

#[derive(Debug, Default)]
struct CacheEntry {
    pages: Vec<ColumnTasksPage>,
    stale: bool,
    fetched_at: Option<Instant>,
    /// Token of the load whose response may still be applied.
    in_flight: Option<u64>,
    error: Option<ServiceError>,
}

impl CacheEntry {
    fn needs_refetch(&self, stale_time: Duration) -> bool {
        self.stale
            || self
                .fetched_at
                .map_or(true, |at| at.elapsed() >= stale_time)
    }
}

/// Verbatim copy of every loaded entry's pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSnapshot {
    entries: HashMap<CacheKey, Vec<ColumnTasksPage>>,
}

impl CacheSnapshot {
    pub fn get(&self, key: &CacheKey) -> Option<&[ColumnTasksPage]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Paginated per-(column, search) cache of task listings.
///
/// All writes go through one mutex that is never held across an await,
/// so readers only ever see whole load results. At most one request per
/// key is in flight; a request made while another is pending is skipped.
pub struct ColumnQueryCache {
    store: Arc<dyn TaskStore>,
    page_size: u32,
    stale_time: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    next_token: AtomicU64,
}

impl ColumnQueryCache {
    pub fn new(store: Arc<dyn TaskStore>, page_size: u32, stale_time: Duration) -> Self {
        Self {
            store,
            page_size,
            stale_time,
            entries: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn query(&self, key: &CacheKey, page: u32) -> ColumnQuery {
        ColumnQuery::new(key.column, page, self.page_size, &key.search)
    }

    pub fn keys(&self) -> Vec<CacheKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Cached pages for `key` in fetch order; empty when nothing is loaded yet.
    pub fn get_pages(&self, key: &CacheKey) -> Vec<ColumnTasksPage> {
        self.lock()
            .get(key)
            .map(|e| e.pages.clone())
            .unwrap_or_default()
    }

    /// Flattened view of `key`: tasks of all pages in fetch order, the
    /// first page's total, and the last page's continuation flag.
    pub fn view(&self, key: &CacheKey) -> ColumnView {
        let entries = self.lock();
        let Some(entry) = entries.get(key) else {
            return ColumnView {
                tasks: Vec::new(),
                total: 0,
                has_next_page: false,
                is_loading: false,
                is_stale: false,
                error: None,
            };
        };
        ColumnView {
            tasks: entry
                .pages
                .iter()
                .flat_map(|p| p.tasks.iter().cloned())
                .collect(),
            total: entry.pages.first().map_or(0, |p| p.total),
            has_next_page: entry.pages.last().is_some_and(|p| p.has_next_page),
            is_loading: entry.in_flight.is_some(),
            is_stale: entry.stale,
            error: entry.error.clone(),
        }
    }

    /// Make sure `key` has data that is neither invalidated nor older than
    /// the stale time. A missing entry loads page 1; a stale one refetches.
    pub async fn observe(&self, key: &CacheKey) -> Result<LoadOutcome, ServiceError> {
        let due = self
            .lock()
            .get(key)
            .map_or(true, |e| e.needs_refetch(self.stale_time));
        if due {
            self.refetch(key).await
        } else {
            Ok(LoadOutcome::Skipped)
        }
    }

    /// Fetch and append the page after the last cached one.
    /// No-op when a load for `key` is in flight or the last page was final.
    pub async fn load_next_page(&self, key: &CacheKey) -> Result<LoadOutcome, ServiceError> {
        let (token, page) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();
            if entry.in_flight.is_some() {
                return Ok(LoadOutcome::Skipped);
            }
            let page = match entry.pages.last() {
                None => 1,
                Some(last) if last.has_next_page => last.page + 1,
                Some(_) => return Ok(LoadOutcome::Skipped),
            };
            let token = self.next_token.fetch_add(1, Ordering::Relaxed);
            entry.in_flight = Some(token);
            (token, page)
        };

        debug!("loading {:?} page {page}", key);
        let result = self.store.list(&self.query(key, page)).await;

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key).filter(|e| e.in_flight == Some(token)) else {
            debug!("dropping cancelled response for {:?} page {page}", key);
            return Ok(LoadOutcome::Suppressed);
        };
        entry.in_flight = None;
        match result {
            Ok(fetched) => {
                entry.pages.push(fetched);
                entry.error = None;
                entry.fetched_at.get_or_insert_with(Instant::now);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                warn!("loading {:?} page {page} failed: {e}", key);
                entry.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Reload pages 1..=N (N = pages currently cached, at least one),
    /// stopping at the first page without a successor, then swap them in.
    async fn refetch(&self, key: &CacheKey) -> Result<LoadOutcome, ServiceError> {
        let (token, count) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();
            if entry.in_flight.is_some() {
                return Ok(LoadOutcome::Skipped);
            }
            let token = self.next_token.fetch_add(1, Ordering::Relaxed);
            entry.in_flight = Some(token);
            (token, entry.pages.len().max(1) as u32)
        };

        debug!("refetching {:?} ({count} pages)", key);
        let mut pages = Vec::with_capacity(count as usize);
        let mut failure = None;
        for page in 1..=count {
            match self.store.list(&self.query(key, page)).await {
                Ok(fetched) => {
                    let more = fetched.has_next_page;
                    pages.push(fetched);
                    if !more {
                        break;
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key).filter(|e| e.in_flight == Some(token)) else {
            debug!("dropping cancelled refetch of {:?}", key);
            return Ok(LoadOutcome::Suppressed);
        };
        entry.in_flight = None;
        match failure {
            None => {
                entry.pages = pages;
                entry.stale = false;
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
                Ok(LoadOutcome::Applied)
            }
            Some(e) => {
                warn!("refetching {:?} failed: {e}", key);
                entry.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Mark matching entries stale; the next observation refetches them.
    /// A load already in flight for a matching entry may carry data from
    /// before the change, so its response is dropped as if cancelled.
    pub fn invalidate(&self, matches: impl Fn(&CacheKey) -> bool) -> usize {
        let mut entries = self.lock();
        cancel_matching(&mut entries, &matches);
        let mut count = 0;
        for (key, entry) in entries.iter_mut().filter(|(k, _)| matches(k)) {
            debug!("invalidating {:?}", key);
            entry.stale = true;
            count += 1;
        }
        count
    }

    /// Forget in-flight loads of matching entries. Their responses will be
    /// dropped on arrival; the requests themselves keep running.
    pub fn cancel(&self, matches: impl Fn(&CacheKey) -> bool) -> usize {
        cancel_matching(&mut self.lock(), matches)
    }

    /// Deep copy of every entry that has at least one page.
    pub fn snapshot(&self) -> CacheSnapshot {
        snapshot_of(&self.lock())
    }

    /// Put every snapshotted entry's pages back verbatim.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        let mut entries = self.lock();
        for (key, pages) in snapshot.entries {
            entries.entry(key).or_default().pages = pages;
        }
    }

    /// Drop the task from every cached page, decrementing the `total` of
    /// each page that held it. Returns the number of entries touched.
    pub fn remove_task(&self, id: &str) -> usize {
        remove_from(&mut self.lock(), id)
    }

    /// Cancel every in-flight load, snapshot all entries, then remove `id`
    /// from them, under one lock so no load result lands in between.
    /// Returns the pre-removal snapshot and the number of entries touched.
    pub fn detach_task(&self, id: &str) -> (CacheSnapshot, usize) {
        let mut entries = self.lock();
        cancel_matching(&mut entries, |_| true);
        let snapshot = snapshot_of(&entries);
        let touched = remove_from(&mut entries, id);
        (snapshot, touched)
    }
}

fn cancel_matching(
    entries: &mut HashMap<CacheKey, CacheEntry>,
    matches: impl Fn(&CacheKey) -> bool,
) -> usize {
    let mut count = 0;
    for (key, entry) in entries.iter_mut().filter(|(k, _)| matches(k)) {
        if entry.in_flight.take().is_some() {
            debug!("cancelled in-flight load of {:?}", key);
            count += 1;
        }
    }
    count
}

fn snapshot_of(entries: &HashMap<CacheKey, CacheEntry>) -> CacheSnapshot {
    CacheSnapshot {
        entries: entries
            .iter()
            .filter(|(_, e)| !e.pages.is_empty())
            .map(|(k, e)| (k.clone(), e.pages.clone()))
            .collect(),
    }
}

fn remove_from(entries: &mut HashMap<CacheKey, CacheEntry>, id: &str) -> usize {
    let mut touched = 0;
    for entry in entries.values_mut() {
        let mut removed = false;
        for page in entry.pages.iter_mut() {
            removed |= page.remove_task(id);
        }
        if removed {
            touched += 1;
        }
    }
    touched
}
