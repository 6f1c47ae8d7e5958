#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use coreds::store::{EventType, Record, RemoteRecord, StoreOpts, WindowStore};
use coreds::{Key, RangeKey};
use coreds_base64::key::{key_from_raw, key_to_raw};

pub const NOW: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub key: Key,
    pub title: String,
    pub revision: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoMsg {
    pub key: Key,
    pub title: String,
}

impl RemoteRecord for TodoMsg {
    fn key(&self) -> &Key {
        &self.key
    }
}

impl Record for Todo {
    type Remote = TodoMsg;

    fn key(&self) -> &Key {
        &self.key
    }

    fn from_remote(remote: &TodoMsg) -> Self {
        Self {
            key: remote.key,
            title: remote.title.clone(),
            revision: 0,
        }
    }

    fn merge(&mut self, remote: &TodoMsg) {
        self.title = remote.title.clone();
        self.revision += 1;
    }
}

/// Key whose raw value is `n`; keys sort like their numbers.
pub fn key(n: u64) -> Key {
    let mut raw = [0u8; 9];
    raw[1..].copy_from_slice(&n.to_be_bytes());
    key_from_raw(&raw)
}

pub fn key_num(key: &Key) -> u64 {
    let raw = key_to_raw(key).expect("test keys are valid");
    let mut n = [0u8; 8];
    n.copy_from_slice(&raw[1..]);
    u64::from_be_bytes(n)
}

pub fn msg(n: u64) -> TodoMsg {
    TodoMsg {
        key: key(n),
        title: format!("todo {n}"),
    }
}

pub fn msgs(nums: impl IntoIterator<Item = u64>) -> Vec<TodoMsg> {
    nums.into_iter().map(msg).collect()
}

pub type Slot = (usize, Option<u64>, i64);

pub struct Harness {
    pub store: WindowStore<Todo>,
    pub requests: Rc<RefCell<Vec<RangeKey>>>,
    pub events: Rc<RefCell<Vec<(EventType, bool)>>>,
    pub slots: Rc<RefCell<Vec<Slot>>>,
    pub accept: Rc<Cell<bool>>,
    pub deferred: Rc<Cell<usize>>,
}

impl Harness {
    pub fn new(page_size: usize, multiplier: usize) -> Self {
        Self::build(page_size, multiplier, false)
    }

    /// Repopulation goes through the deferred hook instead of running inline.
    pub fn deferred(page_size: usize, multiplier: usize) -> Self {
        Self::build(page_size, multiplier, true)
    }

    fn build(page_size: usize, multiplier: usize, defer: bool) -> Self {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let events = Rc::new(RefCell::new(Vec::new()));
        let slots = Rc::new(RefCell::new(Vec::new()));
        let accept = Rc::new(Cell::new(true));
        let deferred = Rc::new(Cell::new(0));

        let (req, acc) = (requests.clone(), accept.clone());
        let ev = events.clone();
        let sl = slots.clone();
        let mut store: WindowStore<Todo> = WindowStore::new(StoreOpts::new(page_size, multiplier), move |prk| {
            if acc.get() {
                req.borrow_mut().push(prk);
            }
            acc.get()
        })
        .with_event_sink(move |ty, on| ev.borrow_mut().push((ty, on)))
        .with_render_sink(move |idx, item: Option<&Todo>, ts| {
            sl.borrow_mut().push((idx, item.map(|t| key_num(&t.key)), ts))
        })
        .with_clock(|| NOW);

        if defer {
            let d = deferred.clone();
            store = store.with_deferred(move || d.set(d.get() + 1));
        }

        Self {
            store,
            requests,
            events,
            slots,
            accept,
            deferred,
        }
    }

    /// Fills an empty store through an initial `fetch_newer` round trip.
    /// `nums` is delivered as given (newest first).
    pub fn load(&mut self, nums: impl IntoIterator<Item = u64>) {
        assert!(self.store.fetch_newer(), "initial fetch must be accepted");
        assert!(self.store.on_fetch_success(&msgs(nums)));
        self.store.run_pending();
        self.clear_logs();
    }

    pub fn keys(&self) -> Vec<u64> {
        self.store.iter().map(|t| key_num(&t.key)).collect()
    }

    pub fn last_request(&self) -> RangeKey {
        *self.requests.borrow().last().expect("a request was issued")
    }

    pub fn take_slots(&self) -> Vec<Slot> {
        std::mem::take(&mut *self.slots.borrow_mut())
    }

    pub fn take_events(&self) -> Vec<(EventType, bool)> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Keys shown in the current page, slot by slot.
    pub fn visible(&mut self) -> Vec<u64> {
        self.slots.borrow_mut().clear();
        self.store.populate();
        self.take_slots().into_iter().filter_map(|(_, k, _)| k).collect()
    }

    pub fn clear_logs(&self) {
        self.requests.borrow_mut().clear();
        self.events.borrow_mut().clear();
        self.slots.borrow_mut().clear();
    }
}
