//! Windowed record cache with cursor pagination.
//!
//! [`WindowStore`] keeps an ordered buffer of records (always newest first,
//! by key) and presents it one page at a time, in either display direction.
//! It never talks to the network itself: range requests go out through the
//! fetch capability and their results come back through
//! [`WindowStore::on_fetch_success`] / [`WindowStore::on_fetch_failed`].
//!
//! Only one fetch may be outstanding. While it is, every operation that could
//! shift the window (`fetch_*`, `page_to*`, `toggle_desc`) returns `false`.
//!
//! Repopulating the visible page is deferred when a deferred-invoke hook is
//! installed: the store calls the hook and the host later calls
//! [`WindowStore::run_pending`] from the owning thread. Without a hook the
//! page is repopulated inline.

use std::collections::VecDeque;
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use coreds_base64::{dec_key, inc_key, Key};
use tracing::{debug, trace};

use crate::range_key::RangeKey;

mod events;
mod opts;
mod record;

pub use events::{EventType, FetchType};
pub use opts::{OptsError, StoreOpts, MAX_FETCH_LIMIT};
pub use record::{Record, RemoteRecord};

pub type FetchFn = Box<dyn FnMut(RangeKey) -> bool>;
pub type EventFn = Box<dyn FnMut(EventType, bool)>;
pub type RenderFn<T> = Box<dyn FnMut(usize, Option<&T>, i64)>;
pub type DeferFn = Box<dyn FnMut()>;
pub type KeyStepFn = fn(&Key) -> Key;
pub type ClockFn = fn() -> i64;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct WindowStore<T: Record> {
    list: VecDeque<T>,

    loading: bool,
    desc: bool,

    page: usize,
    page_count: usize,
    page_vcount: usize,
    selected_idx: Option<usize>,
    selected: Option<Key>,

    page_size: usize,
    multiplier: usize,
    parent_key: Option<Key>,

    fetch_type: FetchType,
    pending_populate: bool,
    errmsg: Option<String>,

    fetch_fn: FetchFn,
    event_fn: Option<EventFn>,
    render_fn: Option<RenderFn<T>>,
    defer_fn: Option<DeferFn>,
    key_inc: KeyStepFn,
    key_dec: KeyStepFn,
    clock: ClockFn,
}

impl<T: Record> WindowStore<T> {
    /// Creates an empty store. Zero sizes in `opts` are raised to 1.
    pub fn new<F>(opts: StoreOpts, fetch: F) -> Self
    where
        F: FnMut(RangeKey) -> bool + 'static,
    {
        Self {
            list: VecDeque::new(),
            loading: false,
            desc: true,
            page: 0,
            page_count: 0,
            page_vcount: 0,
            selected_idx: None,
            selected: None,
            page_size: opts.page_size.max(1),
            multiplier: opts.multiplier.max(1),
            parent_key: None,
            fetch_type: FetchType::None,
            pending_populate: false,
            errmsg: None,
            fetch_fn: Box::new(fetch),
            event_fn: None,
            render_fn: None,
            defer_fn: None,
            key_inc: inc_key,
            key_dec: dec_key,
            clock: now_millis,
        }
    }

    pub fn with_event_sink<F>(mut self, f: F) -> Self
    where
        F: FnMut(EventType, bool) + 'static,
    {
        self.event_fn = Some(Box::new(f));
        self
    }

    /// Receives `(slot, record, timestamp)` for every slot of the page on each
    /// populate pass; slots past the last record get `None`.
    pub fn with_render_sink<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, Option<&T>, i64) + 'static,
    {
        self.render_fn = Some(Box::new(f));
        self
    }

    pub fn with_deferred<F>(mut self, f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.defer_fn = Some(Box::new(f));
        self
    }

    pub fn with_key_step(mut self, inc: KeyStepFn, dec: KeyStepFn) -> Self {
        self.key_inc = inc;
        self.key_dec = dec;
        self
    }

    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = clock;
        self
    }

    /// Scopes every range request to the children of `parent`.
    pub fn with_parent_key(mut self, parent: Key) -> Self {
        self.parent_key = Some(parent);
        self
    }

    pub fn set_parent_key(&mut self, parent: Option<Key>) {
        self.parent_key = parent;
    }

    pub fn init(&mut self, opts: StoreOpts) {
        self.page_size = opts.page_size.max(1);
        self.multiplier = opts.multiplier.max(1);
    }

    // ---- Accessors ----

    pub fn front(&self) -> Option<&T> {
        self.list.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.list.back()
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.list.get(idx)
    }

    /// Buffer contents in storage order (newest first).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.list.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn size(&self) -> usize {
        self.list.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_desc(&self) -> bool {
        self.desc
    }

    pub fn fetch_type(&self) -> FetchType {
        self.fetch_type
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn visible_count(&self) -> usize {
        self.page_vcount
    }

    pub fn selected(&self) -> Option<&T> {
        let key = self.selected.as_ref()?;
        self.list.iter().find(|r| r.key() == key)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_idx
    }

    pub fn has_pending_populate(&self) -> bool {
        self.pending_populate
    }

    pub fn error_message(&self) -> Option<&str> {
        self.errmsg.as_deref()
    }

    /// Records the last transport failure text for display.
    pub fn set_error_message(&mut self, msg: Option<String>) {
        self.errmsg = msg;
    }

    /// Whether buffer index `idx` falls on the current page.
    pub fn is_visible(&self, idx: usize) -> bool {
        let page_start = self.page * self.page_size;
        idx >= page_start && idx < page_start.saturating_add(self.page_size)
    }

    pub fn is_page_to_first_disabled(&self) -> bool {
        self.loading || self.page == 0
    }

    pub fn is_page_to_last_disabled(&self) -> bool {
        self.loading || self.list.is_empty() || self.page_count == self.page
    }

    // ---- Presentation ----

    /// Recomputes the visible page and pushes every slot to the render sink.
    pub fn populate(&mut self) {
        self.pending_populate = false;

        let size = self.list.len();
        if size == 0 {
            self.page = 0;
            if !self.desc {
                self.desc = true;
                self.emit(EventType::Desc, true);
            }
        } else if self.page != 0 && self.page * self.page_size >= size {
            self.page = 0;
        }

        let populate_pages = self.page * self.page_size;
        let len = self.page_size.min(size - populate_pages);

        self.page_vcount = len;
        self.page_count = size.saturating_sub(1) / self.page_size;

        let now = (self.clock)();
        trace!(page = self.page, len, size, "store: populate");

        let mut selected_idx = None;
        for i in 0..len {
            let offset = if self.desc {
                populate_pages + i
            } else {
                size - populate_pages - i - 1
            };
            let item = &self.list[offset];

            if selected_idx.is_none() && self.selected.as_ref().is_some_and(|k| item.key() == k) {
                selected_idx = Some(i);
            }

            if let Some(render) = self.render_fn.as_mut() {
                render(i, Some(item), now);
            }
        }
        if let Some(render) = self.render_fn.as_mut() {
            for i in len..self.page_size {
                render(i, None, now);
            }
        }
        self.selected_idx = selected_idx;
    }

    /// Schedules a populate without changing any state.
    pub fn repaint(&mut self) {
        self.request_populate();
    }

    /// Runs a populate scheduled through the deferred hook. Returns `false`
    /// when none was pending.
    pub fn run_pending(&mut self) -> bool {
        if !self.pending_populate {
            return false;
        }
        self.populate();
        true
    }

    pub fn toggle_desc(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.desc = !self.desc;
        self.request_populate();
        self.emit(EventType::Desc, self.desc);
        true
    }

    /// Like [`toggle_desc`](Self::toggle_desc) but runs `before_populate` and
    /// then populates synchronously.
    pub fn toggle_desc_with<F: FnOnce()>(&mut self, before_populate: F) -> bool {
        if self.loading {
            return false;
        }
        self.desc = !self.desc;
        before_populate();
        self.populate();
        self.emit(EventType::Desc, self.desc);
        true
    }

    pub fn page_to(&mut self, idx: usize) -> bool {
        if !self.can_page_to(idx) {
            return false;
        }
        self.page = idx;
        self.request_populate();
        true
    }

    pub fn page_to_with<F: FnOnce()>(&mut self, idx: usize, before_populate: F) -> bool {
        if !self.can_page_to(idx) {
            return false;
        }
        self.paginate_now(idx, before_populate);
        true
    }

    pub fn page_to_first(&mut self) -> bool {
        if self.is_page_to_first_disabled() {
            return false;
        }
        self.page = 0;
        self.request_populate();
        true
    }

    pub fn page_to_first_with<F: FnOnce()>(&mut self, before_populate: F) -> bool {
        if self.is_page_to_first_disabled() {
            return false;
        }
        self.paginate_now(0, before_populate);
        true
    }

    pub fn page_to_last(&mut self) -> bool {
        if self.is_page_to_last_disabled() {
            return false;
        }
        self.page = self.page_count;
        self.request_populate();
        true
    }

    pub fn page_to_last_with<F: FnOnce()>(&mut self, before_populate: F) -> bool {
        if self.is_page_to_last_disabled() {
            return false;
        }
        self.paginate_now(self.page_count, before_populate);
        true
    }

    /// Selects the record at page slot `idx`; `None` clears the selection.
    pub fn select(&mut self, idx: Option<usize>) {
        self.selected_idx = None;
        self.selected = None;

        let Some(idx) = idx else {
            return;
        };
        if let Some(offset) = self.slot_offset(idx) {
            self.selected_idx = Some(idx);
            self.selected = Some(*self.list[offset].key());
        }
    }

    /// Appends a page-range summary such as `"21 - 25 of 25"`. Writes nothing
    /// and returns `false` when the buffer is empty.
    pub fn append_page_info_to(&self, buf: &mut String) -> bool {
        let size = self.list.len();
        if size == 0 {
            return false;
        }

        let start = self.page * self.page_size + 1;
        let end = start.saturating_add(self.page_size - 1);
        if size == start {
            let _ = write!(buf, "{size} of {size}");
        } else if size > end {
            let _ = write!(buf, "{start} - {end} of {size}");
        } else {
            let _ = write!(buf, "{start} - {size} of {size}");
        }
        true
    }

    pub fn page_info(&self) -> String {
        let mut buf = String::new();
        self.append_page_info_to(&mut buf);
        buf
    }

    // ---- Fetching ----

    pub fn fetch(&mut self, newer: bool) -> bool {
        if newer {
            self.fetch_newer()
        } else {
            self.fetch_older()
        }
    }

    /// Requests records newer than the front of the buffer, or the initial
    /// batch when the buffer is empty.
    pub fn fetch_newer(&mut self) -> bool {
        if self.loading {
            return false;
        }

        let prk = match self.list.front() {
            None => RangeKey::new(true, self.bulk_limit().saturating_add(1), None),
            Some(front) => {
                let limit = if self.desc {
                    self.page_size
                } else {
                    self.bulk_limit()
                };
                RangeKey::new(false, limit, Some(*front.key()))
            }
        };
        if !self.issue(prk, FetchType::Newer) {
            return false;
        }

        // an initial load always lands newest first
        if prk.start_key.is_none() && !self.desc {
            self.desc = true;
            self.emit(EventType::Desc, true);
        }
        true
    }

    /// Requests records older than the back of the buffer.
    pub fn fetch_older(&mut self) -> bool {
        if self.loading {
            return false;
        }
        let Some(back) = self.list.back() else {
            return false;
        };

        let limit = if self.desc {
            self.bulk_limit()
        } else {
            self.page_size
        };
        let prk = RangeKey::new(true, limit, Some(*back.key()));
        self.issue(prk, FetchType::Older)
    }

    /// Re-requests the visible page so edits and deletes can be reconciled.
    /// Falls back to [`fetch_newer`](Self::fetch_newer) on an empty buffer.
    pub fn fetch_update(&mut self) -> bool {
        if self.list.is_empty() {
            return self.fetch_newer();
        }
        if self.loading {
            return false;
        }

        let size = self.list.len();
        let idx = self.first_visible_offset();
        // the first item in the visible list
        let key = self.list[idx].key();
        let cursor = if self.desc {
            (self.key_inc)(key)
        } else {
            (self.key_dec)(key)
        };

        let prk = RangeKey::new(self.desc, self.page_size.min(size), Some(cursor));
        self.issue(prk, FetchType::Update)
    }

    /// Resolves the outstanding fetch as failed. Cached records are kept.
    pub fn on_fetch_failed(&mut self) -> bool {
        if self.fetch_type == FetchType::None {
            return false;
        }
        debug!(fetch = ?self.fetch_type, "store: fetch failed");
        self.fetch_type = FetchType::None;
        self.set_loading(false);
        true
    }

    /// Resolves the outstanding fetch with its records.
    pub fn on_fetch_success(&mut self, items: &[T::Remote]) -> bool {
        let fetch_type = self.fetch_type;
        match fetch_type {
            FetchType::None => return false,
            FetchType::Newer => {
                if !items.is_empty() {
                    if self.list.is_empty() {
                        self.push_back_all(items, false);
                    } else {
                        self.push_front_all(items, true);
                    }
                }
            }
            FetchType::Older => {
                if !items.is_empty() {
                    self.push_back_all(items, false);
                }
            }
            FetchType::Update => {
                self.reconcile_page(items);
            }
        }
        debug!(fetch = ?fetch_type, received = items.len(), size = self.list.len(), "store: fetch resolved");

        self.fetch_type = FetchType::None;
        self.set_loading(false);
        self.request_populate();
        true
    }

    // ---- Buffer mutation ----

    /// Pushes `items` onto the front, one at a time (last pushed ends up
    /// first). With `reversed`, iteration runs back to front so the items
    /// keep their given order at the head of the buffer.
    pub fn prepend_all(&mut self, items: &[T::Remote], reversed: bool) {
        self.push_front_all(items, reversed);
        self.request_populate();
    }

    /// Pushes `items` onto the back, in order or `reversed`.
    pub fn append_all(&mut self, items: &[T::Remote], reversed: bool) {
        self.push_back_all(items, reversed);
        self.request_populate();
    }

    /// Merges a freshly fetched copy of the visible page into the buffer.
    ///
    /// Returns `true` when any buffered record was removed, i.e. the size and
    /// page boundaries may have shifted.
    pub fn reconcile(&mut self, items: &[T::Remote]) -> bool {
        let removed = self.reconcile_page(items);
        self.request_populate();
        removed
    }

    // ---- UI actions ----

    pub fn refresh(&mut self) -> bool {
        self.fetch_update()
    }

    pub fn toggle_sort(&mut self) -> bool {
        self.toggle_desc()
    }

    pub fn goto_first(&mut self) -> bool {
        self.page_to(0)
    }

    pub fn goto_last(&mut self) -> bool {
        self.page_to(self.page_count)
    }

    /// Moves one page back, or loads more in the direction that precedes
    /// the first page.
    pub fn prev_or_load(&mut self) -> bool {
        if self.page != 0 {
            self.page_to(self.page - 1)
        } else if !self.desc {
            self.fetch_older()
        } else {
            self.fetch_newer()
        }
    }

    /// Moves one page forward, or loads more past the last page.
    pub fn next_or_load(&mut self) -> bool {
        if self.page_count != self.page {
            self.page_to(self.page + 1)
        } else if !self.desc {
            self.fetch_newer()
        } else {
            self.fetch_older()
        }
    }

    // ---- Internals ----

    fn emit(&mut self, ty: EventType, on: bool) {
        if let Some(f) = self.event_fn.as_mut() {
            f(ty, on);
        }
    }

    fn set_loading(&mut self, val: bool) {
        self.loading = val;
        self.emit(EventType::Loading, val);
    }

    fn request_populate(&mut self) {
        match self.defer_fn.as_mut() {
            Some(defer) => {
                self.pending_populate = true;
                defer();
            }
            None => self.populate(),
        }
    }

    fn issue(&mut self, mut prk: RangeKey, fetch_type: FetchType) -> bool {
        prk.parent_key = self.parent_key;
        if !(self.fetch_fn)(prk) {
            debug!(fetch = ?fetch_type, "store: fetch refused");
            return false;
        }
        debug!(fetch = ?fetch_type, desc = prk.desc, limit = prk.limit, "store: fetch issued");
        self.fetch_type = fetch_type;
        self.set_loading(true);
        true
    }

    fn bulk_limit(&self) -> usize {
        self.page_size.saturating_mul(self.multiplier)
    }

    fn can_page_to(&self, idx: usize) -> bool {
        !self.loading && idx != self.page && idx <= self.page_count
    }

    fn paginate_now<F: FnOnce()>(&mut self, idx: usize, before_populate: F) {
        self.page = idx;
        before_populate();
        self.populate();
    }

    /// Buffer offset of the first visible slot. A page left out of range by
    /// a not-yet-populated mutation is treated as page 0.
    fn first_visible_offset(&self) -> usize {
        let size = self.list.len();
        let mut start = self.page * self.page_size;
        if start >= size {
            start = 0;
        }
        if self.desc {
            start
        } else {
            size - start - 1
        }
    }

    /// Buffer offset of page slot `idx`, if that slot holds a record.
    fn slot_offset(&self, idx: usize) -> Option<usize> {
        let size = self.list.len();
        let start = self.page * self.page_size;
        if idx >= self.page_size || start.saturating_add(idx) >= size {
            return None;
        }
        Some(if self.desc {
            start + idx
        } else {
            size - start - idx - 1
        })
    }

    fn push_front_all(&mut self, items: &[T::Remote], reversed: bool) {
        if reversed {
            for item in items.iter().rev() {
                self.list.push_front(T::from_remote(item));
            }
        } else {
            for item in items {
                self.list.push_front(T::from_remote(item));
            }
        }
    }

    fn push_back_all(&mut self, items: &[T::Remote], reversed: bool) {
        if reversed {
            for item in items.iter().rev() {
                self.list.push_back(T::from_remote(item));
            }
        } else {
            for item in items {
                self.list.push_back(T::from_remote(item));
            }
        }
    }

    fn clear_buffer(&mut self) {
        self.list.clear();
        self.selected = None;
        self.selected_idx = None;
    }

    /// Drops the selection once its record has left the buffer.
    fn retain_selection(&mut self) {
        if let Some(key) = &self.selected {
            if !self.list.iter().any(|r| r.key() == key) {
                self.selected = None;
                self.selected_idx = None;
            }
        }
    }

    fn reconcile_page(&mut self, items: &[T::Remote]) -> bool {
        let mut size = self.list.len();
        let update_len = items.len();

        if update_len == 0 {
            if size <= self.page_size {
                self.clear_buffer();
                self.emit(EventType::Visible, false);
                debug!(size, "store: reconcile cleared buffer");
                return true;
            }

            let mut start = self.page * self.page_size;
            if start >= size {
                start = 0;
            }
            let len = self.page_size.min(size - start);
            if self.desc {
                self.list.drain(start..start + len);
            } else {
                let end = size - start;
                self.list.drain(end - len..end);
            }
            self.retain_selection();
            debug!(removed = len, "store: reconcile dropped visible page");
            return true;
        }

        let page_len = self.page_size;
        let desc = self.desc;
        let mut i = 0;
        let mut removed = 0usize;

        if size != 0 {
            let mut idx = self.first_visible_offset() as isize;
            loop {
                let incoming = &items[i];
                let existing = &mut self.list[idx as usize];
                if incoming.key() == existing.key() {
                    existing.merge(incoming);
                    i += 1;

                    if desc {
                        idx += 1;
                        if idx as usize == size {
                            break;
                        }
                    } else {
                        idx -= 1;
                        if idx == -1 {
                            break;
                        }
                    }

                    if i != update_len {
                        continue;
                    }
                    if update_len == page_len {
                        break;
                    }

                    // short page: the record after the last match is gone too
                    self.list.remove(idx as usize);
                    removed += 1;
                    break;
                }

                // stale
                self.list.remove(idx as usize);
                removed += 1;
                size -= 1;

                if desc {
                    if idx as usize == size {
                        break;
                    }
                } else {
                    idx -= 1;
                    if idx == -1 {
                        break;
                    }
                }
            }
        }

        for item in &items[i..] {
            if desc {
                self.list.push_back(T::from_remote(item));
            } else {
                self.list.push_front(T::from_remote(item));
            }
        }

        if removed != 0 {
            self.retain_selection();
        }
        debug!(removed, inserted = update_len - i, "store: reconciled");
        removed != 0
    }
}
