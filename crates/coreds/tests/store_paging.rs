mod common;

use common::{key_num, Harness, NOW};
use coreds::store::EventType;

#[test]
fn page_count_on_an_exact_multiple() {
    let mut h = Harness::new(10, 3);
    h.load((1..=30).rev());

    assert_eq!(h.store.page_count(), 2);
    assert!(h.store.page_to_last());
    assert_eq!(h.store.page(), 2);
    assert_eq!(h.store.visible_count(), 10);
}

#[test]
fn partial_last_page_renders_placeholders() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());
    assert!(h.store.page_to(2));

    let slots = h.take_slots();
    assert_eq!(slots.len(), 10);
    assert_eq!(h.store.visible_count(), 5);
    for (i, (idx, k, ts)) in slots.iter().enumerate() {
        assert_eq!(*idx, i);
        assert_eq!(*ts, NOW);
        if i < 5 {
            assert_eq!(*k, Some(5 - i as u64));
        } else {
            assert_eq!(*k, None);
        }
    }
}

#[test]
fn populate_is_idempotent() {
    let mut h = Harness::new(4, 3);
    h.load((1..=10).rev());
    assert!(h.store.page_to(1));
    h.clear_logs();

    h.store.populate();
    let first = h.take_slots();
    h.store.populate();
    let second = h.take_slots();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn page_to_rejections() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());

    assert!(!h.store.page_to(0), "already there");
    assert!(!h.store.page_to(3), "out of range");
    assert!(h.store.fetch_older());
    assert!(!h.store.page_to(1), "loading");
    assert!(!h.store.page_to_last());
    assert!(h.store.on_fetch_failed());
    assert!(h.store.page_to(1));
}

#[test]
fn first_and_last_gates() {
    let mut h = Harness::new(10, 3);
    assert!(h.store.is_page_to_first_disabled());
    assert!(h.store.is_page_to_last_disabled());
    assert!(!h.store.page_to_first());
    assert!(!h.store.page_to_last());

    h.load((1..=25).rev());
    assert!(h.store.is_page_to_first_disabled());
    assert!(!h.store.is_page_to_last_disabled());
    assert!(h.store.page_to_last());
    assert!(h.store.is_page_to_last_disabled());
    assert!(h.store.page_to_first());
    assert_eq!(h.store.page(), 0);
}

#[test]
fn goto_helpers() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());
    assert!(h.store.goto_last());
    assert_eq!(h.store.page(), 2);
    assert!(h.store.goto_first());
    assert_eq!(h.store.page(), 0);
}

#[test]
fn page_info_summaries() {
    let mut h = Harness::new(10, 3);
    let mut buf = String::new();
    assert!(!h.store.append_page_info_to(&mut buf));
    assert!(buf.is_empty());

    h.load((1..=25).rev());
    assert_eq!(h.store.page_info(), "1 - 10 of 25");
    assert!(h.store.page_to(2));
    assert_eq!(h.store.page_info(), "21 - 25 of 25");

    let mut h = Harness::new(10, 3);
    h.load((1..=21).rev());
    assert!(h.store.page_to(2));
    assert_eq!(h.store.page_info(), "21 of 21");

    let mut h = Harness::new(10, 3);
    h.load((1..=5).rev());
    assert_eq!(h.store.page_info(), "1 - 5 of 5");

    let mut h = Harness::new(10, 3);
    h.load([1]);
    assert_eq!(h.store.page_info(), "1 of 1");
}

#[test]
fn toggle_desc_represents_cached_records() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());

    assert!(h.store.toggle_desc());
    assert!(!h.store.is_desc());
    assert!(h.requests.borrow().is_empty());
    assert_eq!(h.take_events(), vec![(EventType::Desc, false)]);
    assert_eq!(h.visible(), (1..=10).collect::<Vec<_>>());

    assert!(h.store.page_to(2));
    assert_eq!(h.visible(), (21..=25).collect::<Vec<_>>());

    assert!(h.store.toggle_desc());
    assert_eq!(h.visible(), (1..=5).rev().collect::<Vec<_>>());
}

#[test]
fn toggle_desc_is_rejected_while_loading() {
    let mut h = Harness::new(10, 3);
    h.load((1..=5).rev());
    assert!(h.store.fetch_newer());
    assert!(!h.store.toggle_desc());
    assert!(h.store.is_desc());
}

#[test]
fn hooks_run_before_a_synchronous_populate() {
    let mut h = Harness::deferred(10, 3);
    h.load((1..=25).rev());
    let slots = h.slots.clone();

    let mut seen = None;
    assert!(h.store.page_to_with(1, || seen = Some(slots.borrow().len())));
    assert_eq!(seen, Some(0));
    assert_eq!(h.take_slots().len(), 10);
    assert!(!h.store.has_pending_populate());

    assert!(h.store.toggle_desc_with(|| {}));
    assert_eq!(h.take_slots()[0].1, Some(11));
    assert!(h.store.page_to_first_with(|| {}));
    assert!(h.store.page_to_last_with(|| {}));
    assert_eq!(h.store.page(), 2);
}

#[test]
fn deferred_populate_waits_for_the_host() {
    let mut h = Harness::deferred(10, 3);
    h.load((1..=25).rev());
    let before = h.deferred.get();

    assert!(h.store.page_to(1));
    assert_eq!(h.deferred.get(), before + 1);
    assert!(h.store.has_pending_populate());
    assert!(h.take_slots().is_empty());

    assert!(h.store.run_pending());
    assert_eq!(h.take_slots().len(), 10);
    assert!(!h.store.run_pending());

    h.store.repaint();
    assert!(h.store.run_pending());
}

#[test]
fn next_and_prev_load_at_the_edges() {
    let mut h = Harness::new(10, 3);
    h.load((1..=15).rev());

    assert!(h.store.next_or_load());
    assert_eq!(h.store.page(), 1);
    assert!(h.store.next_or_load());
    // past the last page in descending order means older records
    assert!(h.last_request().desc);
    assert!(h.store.on_fetch_failed());

    assert!(h.store.prev_or_load());
    assert_eq!(h.store.page(), 0);
    assert!(h.store.prev_or_load());
    assert!(!h.last_request().desc);
    assert!(h.store.on_fetch_failed());

    assert!(h.store.toggle_desc());
    assert!(h.store.prev_or_load());
    // before the first ascending page lie the older records
    assert!(h.last_request().desc);
    assert_eq!(h.last_request().limit, 10);
}

#[test]
fn selection_follows_identity_across_pages() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());

    h.store.select(Some(2));
    assert_eq!(h.store.selected_index(), Some(2));
    assert_eq!(key_num(&h.store.selected().unwrap().key), 23);

    assert!(h.store.page_to(1));
    assert_eq!(h.store.selected_index(), None);
    assert!(h.store.selected().is_some());

    assert!(h.store.page_to(0));
    assert_eq!(h.store.selected_index(), Some(2));

    h.store.select(None);
    assert_eq!(h.store.selected_index(), None);
    assert!(h.store.selected().is_none());
}

#[test]
fn selection_in_ascending_display() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());
    assert!(h.store.toggle_desc());

    h.store.select(Some(0));
    assert_eq!(key_num(&h.store.selected().unwrap().key), 1);

    // slot past the last record selects nothing
    assert!(h.store.page_to(2));
    h.store.select(Some(7));
    assert!(h.store.selected().is_none());
}

#[test]
fn visibility_of_buffer_indexes() {
    let mut h = Harness::new(10, 3);
    h.load((1..=25).rev());
    assert!(h.store.page_to(1));
    assert!(!h.store.is_visible(9));
    assert!(h.store.is_visible(10));
    assert!(h.store.is_visible(19));
    assert!(!h.store.is_visible(20));
}

#[test]
fn error_message_slot() {
    let mut h = Harness::new(10, 3);
    assert_eq!(h.store.error_message(), None);
    h.store.set_error_message(Some("Request failed.".to_string()));
    assert_eq!(h.store.error_message(), Some("Request failed."));
}
