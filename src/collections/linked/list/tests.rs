#![cfg(test)]

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::thread;

use super::node::fail;
use super::*;
use crate::util::alloc::CountedDrop;
use crate::util::error::{AllocError, IndexOutOfBounds};

fn trace_init() -> tracing::dispatcher::DefaultGuard {
    use tracing_subscriber::prelude::*;
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .with_target(false)
        .set_default()
}

fn list_of(values: &[i32]) -> LockedList<i32> {
    let list = LockedList::new();
    for value in values {
        assert!(list.push_back(*value).is_ok());
    }
    list
}

fn contents<T: Clone>(list: &LockedList<T>) -> Vec<T> {
    let mut values = Vec::new();
    list.foreach(|value, _| {
        values.push(value.clone());
        ControlFlow::Continue(())
    });
    values
}

fn detached(value: i32) -> NodeRef<i32> {
    match NodeRef::try_from_node(Node::detached(Entry::new(value, 0))) {
        Ok(node) => node,
        Err(_) => panic!("failed to allocate a test node"),
    }
}

fn values_of(state: &ListState<i32>) -> Vec<i32> {
    state.nodes().map(|node| *node.entry().value()).collect()
}

fn free_all(state: ListState<i32>) {
    let mut curr = state.head();
    while let Some(node) = curr {
        curr = *node.next();
        node.take_node();
    }
}

#[test]
fn test_stack_law() {
    let _trace = trace_init();
    let list = list_of(&[1, 2, 3]);

    assert_eq!(list.pop_back(), Some(3));
    assert_eq!(list.pop_back(), Some(2));
    assert_eq!(list.pop_back(), Some(1));
    assert_eq!(list.pop_back(), None, "Popping an empty list should fail.");
    assert!(list.is_empty());
    list.verify_links();
}

#[test]
fn test_queue_law() {
    let list = list_of(&[1, 2, 3]);

    assert_eq!(list.pop_front(), Some(1));
    assert_eq!(list.pop_front(), Some(2));
    assert_eq!(list.pop_front(), Some(3));
    assert_eq!(list.pop_front(), None, "Shifting an empty list should fail.");

    for i in 1..=3 {
        assert!(list.enqueue(i).is_ok());
    }
    assert_eq!(list.dequeue(), Some(1), "dequeue should take from the front.");
    assert_eq!(contents(&list), [2, 3]);
}

#[test]
fn test_push_front() {
    let list = LockedList::new();
    for i in 1..=3 {
        assert!(list.push_front_sized(i, i as usize * 10).is_ok());
    }
    assert_eq!(contents(&list), [3, 2, 1]);

    let entry = list.pop_back_entry().expect("list has three entries");
    assert_eq!(entry.into_parts(), (1, 10), "Byte length should be handed back with the payload.");
    let entry = list.pop_front_entry().expect("list has two entries");
    assert_eq!((*entry.value(), entry.byte_len()), (3, 30));
    assert_eq!(list.dequeue_entry().map(Entry::into_value), Some(2));
    list.verify_links();
}

#[test]
fn test_push_pop_restores_state() {
    let list = list_of(&[4, 5]);

    assert!(list.push_back(6).is_ok());
    assert_eq!(list.len(), 3);
    assert_eq!(list.pop_back(), Some(6));
    assert_eq!(list.len(), 2, "Count should return to its prior value.");
    assert_eq!(contents(&list), [4, 5]);
    assert_eq!(*list.back().expect("list isn't empty").value(), 5);
    list.verify_links();
}

#[test]
fn test_peek() {
    let list = LockedList::<i32>::new();
    assert!(list.front().is_none());
    assert!(list.back().is_none());

    let list = list_of(&[7, 8, 9]);
    assert_eq!(*list.front().expect("list isn't empty").value(), 7);
    assert_eq!(*list.back().expect("list isn't empty").value(), 9);
    assert_eq!(list.len(), 3, "Peeking shouldn't remove anything.");

    *list.front().expect("list isn't empty").value_mut() = 70;
    assert_eq!(contents(&list), [70, 8, 9], "Payloads should be mutable through a guard.");
}

#[test]
fn test_get() {
    let list = list_of(&[10, 11, 12, 13, 14]);

    // Each guard holds the lock, so only one may be alive at a time.
    let first = *list.get(0).expect("index 0 is in bounds").value();
    assert_eq!(first, *list.front().expect("list isn't empty").value());
    let last = *list.get(4).expect("index 4 is in bounds").value();
    assert_eq!(last, *list.back().expect("list isn't empty").value());
    for i in 0..5 {
        assert_eq!(*list.get(i).expect("index is in bounds").value(), 10 + i as i32);
    }

    assert_eq!(
        list.get(5).err(),
        Some(IndexOutOfBounds { index: 5, len: 5 }),
        "Getting at the length should fail."
    );
    assert_eq!(
        LockedList::<i32>::new().get(0).err(),
        Some(IndexOutOfBounds { index: 0, len: 0 }),
        "Getting from an empty list should fail."
    );
}

#[test]
fn test_relative_index() {
    let list = list_of(&[0, 1, 2, 3, 4]);
    let chain = list.chain.lock();
    let at = |index| chain.state.find_by_relative_index(index).map(|node| *node.entry().value());

    assert_eq!(at(-1), Some(4), "-1 should be the last element.");
    assert_eq!(at(-5), Some(0), "-len should be the first element.");
    assert_eq!(at(-6), None, "-(len + 1) should be out of range.");
    assert_eq!(at(isize::MIN), None);
    assert_eq!(at(2), Some(2), "Positive indices should count from the front.");
    assert_eq!(at(5), None);

    let empty = ListState::<i32>::Empty;
    assert!(empty.find_by_relative_index(-1).is_none());
    assert!(empty.find_by_relative_index(0).is_none());
}

#[test]
fn test_insert_at_ends() {
    let mut state = ListState::Empty;

    state.insert_at(detached(2), None, Side::After);
    state.verify_links();
    assert_eq!(values_of(&state), [2], "An empty chain should take the node as head and tail.");
    assert!(state.head() == state.tail());

    state.insert_at(detached(3), None, Side::After);
    state.verify_links();
    state.insert_at(detached(1), None, Side::Before);
    state.verify_links();

    assert_eq!(values_of(&state), [1, 2, 3]);
    assert_eq!(state.len(), 3);
    assert!(state.head().is_some_and(|head| head.prev().is_none()));
    assert!(state.tail().is_some_and(|tail| tail.next().is_none()));

    free_all(state);
}

#[test]
fn test_insert_at_anchor() {
    let mut state = ListState::Empty;
    state.insert_at(detached(1), None, Side::After);
    state.insert_at(detached(4), None, Side::After);

    let head = state.head();
    let tail = state.tail();
    state.insert_at(detached(2), head, Side::After);
    state.verify_links();
    state.insert_at(detached(3), tail, Side::Before);
    state.verify_links();
    assert_eq!(values_of(&state), [1, 2, 3, 4]);

    // Anchoring at the ends should move them.
    state.insert_at(detached(0), head, Side::Before);
    state.verify_links();
    state.insert_at(detached(5), tail, Side::After);
    state.verify_links();
    assert_eq!(values_of(&state), [0, 1, 2, 3, 4, 5]);
    assert_eq!(state.head().map(|node| *node.entry().value()), Some(0));
    assert_eq!(state.tail().map(|node| *node.entry().value()), Some(5));

    free_all(state);
}

#[test]
fn test_unlink() {
    let mut state = ListState::Empty;
    for i in 0..5 {
        state.insert_at(detached(i), None, Side::After);
    }

    let middle = state.find_by_index(2).expect("index 2 is in bounds");
    state.unlink(middle);
    state.verify_links();
    assert_eq!(values_of(&state), [0, 1, 3, 4]);
    assert!(middle.prev().is_none() && middle.next().is_none());
    assert_eq!(*middle.entry().value(), 2, "Unlinking shouldn't touch the payload.");
    middle.take_node();

    let head = state.head().expect("chain isn't empty");
    state.unlink(head);
    state.verify_links();
    head.take_node();

    let tail = state.tail().expect("chain isn't empty");
    state.unlink(tail);
    state.verify_links();
    tail.take_node();
    assert_eq!(values_of(&state), [1, 3]);

    for _ in 0..2 {
        let node = state.head().expect("chain isn't empty");
        state.unlink(node);
        node.take_node();
    }
    assert!(state.is_empty(), "Unlinking the last node should empty the chain.");
    assert!(state.head().is_none() && state.tail().is_none());
}

#[test]
fn test_try_insert() {
    let list = list_of(&[1, 3]);

    assert!(list.try_insert(1, 2, 0).is_ok());
    assert!(list.try_insert(0, 0, 0).is_ok());
    assert!(list.try_insert(4, 4, 0).is_ok(), "Inserting at the length should append.");
    assert_eq!(contents(&list), [0, 1, 2, 3, 4]);
    list.verify_links();

    let error = list.try_insert(6, 6, 0).expect_err("index 6 is out of bounds");
    assert!(error.kind.is_index_out_of_bounds());
    assert_eq!(error.into_value(), 6, "The payload should be handed back.");
    assert_eq!(list.len(), 5);

    let empty = LockedList::new();
    assert!(empty.try_insert(0, 'a', 1).is_ok());
    assert_eq!(empty.get(0).expect("index 0 is in bounds").byte_len(), 1);
}

#[test]
fn test_take_nth() {
    let list = list_of(&[1, 2, 3]);

    assert_eq!(list.take_nth(1).map(Entry::into_value), Ok(2));
    assert_eq!(list.take_nth(2), Err(IndexOutOfBounds { index: 2, len: 2 }));
    assert_eq!(contents(&list), [1, 3]);
    list.verify_links();
}

#[test]
fn test_byte_len() {
    let list = LockedList::new();
    assert!(list.push_back_str("abc").is_ok());
    assert!(list.push_front_str("hello").is_ok());
    assert!(list.push_back_with("a\0b", ByteLen::Text).is_ok());
    assert!(list.push_back_with("xyz", ByteLen::Exact(2)).is_ok());
    assert!(list.enqueue_str("").is_ok());

    let mut lens = Vec::new();
    list.foreach(|_, len| {
        lens.push(len);
        ControlFlow::Continue(())
    });
    assert_eq!(
        lens,
        [6, 4, 2, 2, 1],
        "Text lengths should include a terminator and stop at the first nul."
    );

    let list = LockedList::new();
    assert!(list.enqueue_sized(1, 8).is_ok());
    assert!(list.push_front(0).is_ok());
    assert_eq!(list.get(0).expect("index 0 is in bounds").byte_len(), 0);
    assert_eq!(list.get(1).expect("index 1 is in bounds").byte_len(), 8);
}

#[test]
fn test_destructor_precedence() {
    let defaults = Arc::new(Mutex::new(Vec::new()));
    let overrides = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&defaults);
    let list = LockedList::with_destructor(move |value: i32| {
        sink.lock().expect("not poisoned").push(value);
    });
    for i in 0..5 {
        assert!(list.push_back(i).is_ok());
    }

    assert!(list.remove_nth(0).is_ok());
    let sink = Arc::clone(&overrides);
    assert!(list.remove_nth_with(0, |value| sink.lock().expect("not poisoned").push(value)).is_ok());
    assert_eq!(list.remove_nth(3), Err(IndexOutOfBounds { index: 3, len: 3 }));

    assert_eq!(list.pop_back(), Some(4), "Popping should never invoke a destructor.");

    let sink = Arc::clone(&overrides);
    list.destroy_with(move |value| sink.lock().expect("not poisoned").push(value));

    assert_eq!(*defaults.lock().expect("not poisoned"), [0]);
    assert_eq!(*overrides.lock().expect("not poisoned"), [1, 2, 3]);
}

#[test]
fn test_destroy_uses_default() {
    let probe = CountedDrop::new();
    let list = LockedList::with_destructor(drop);
    for _ in 0..4 {
        assert!(list.push_back(probe.clone()).is_ok());
    }

    let popped = list.pop_front();
    assert_eq!(probe.drops(), 0, "Popping should transfer ownership, not destroy.");
    drop(popped);
    assert_eq!(probe.drops(), 1);

    list.destroy();
    assert_eq!(probe.drops(), 4, "Destroying the list should destroy every payload.");
}

#[test]
fn test_no_destructor_leaves_payloads() {
    let probe = CountedDrop::new();
    let list = LockedList::new();
    for _ in 0..3 {
        assert!(list.push_back(probe.clone()).is_ok());
    }

    assert!(list.remove_nth(1).is_ok());
    drop(list);
    assert_eq!(
        probe.drops(),
        0,
        "Without any destructor, the list should never destroy a payload."
    );
}

#[test]
fn test_foreach() {
    let list = list_of(&[1, 2, 3, 4, 5]);

    let mut sum = 0;
    assert_eq!(
        list.foreach(|value, _| {
            sum += value;
            ControlFlow::Continue(())
        }),
        5
    );
    assert_eq!(sum, 15);

    let mut seen = Vec::new();
    let visited = list.foreach(|value, _| {
        seen.push(*value);
        if *value == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    });
    assert_eq!(visited, 3, "The entry which stopped the walk should be counted.");
    assert_eq!(seen, [1, 2, 3]);

    assert_eq!(LockedList::<i32>::new().foreach(|_, _| ControlFlow::Continue(())), 0);
}

#[test]
fn test_foreach_remove() {
    let list = LockedList::with_destructor(drop);
    for i in 0..10 {
        assert!(list.push_back(i).is_ok());
    }

    assert_eq!(list.foreach_remove(|value, _| value % 2 == 0), 5);
    assert_eq!(contents(&list), [1, 3, 5, 7, 9]);
    list.verify_links();

    let destroyed = RefCell::new(Vec::new());
    // Head, tail and a middle entry in one pass.
    let removed = list.foreach_remove_with(
        |value, _| matches!(value, 1 | 5 | 9),
        |value| destroyed.borrow_mut().push(value),
    );
    assert_eq!(removed, 3);
    assert_eq!(
        destroyed.into_inner(),
        [1, 5, 9],
        "The override should receive the removed payloads."
    );
    assert_eq!(contents(&list), [3, 7]);
    list.verify_links();

    assert_eq!(list.foreach_remove(|_, _| true), 2);
    assert!(list.is_empty());
    {
        let chain = list.chain.lock();
        assert!(chain.state.head().is_none() && chain.state.tail().is_none());
    }
    assert_eq!(list.foreach_remove(|_, _| true), 0);
}

#[test]
fn test_map_is_independent() {
    let source = LockedList::with_destructor(drop);
    for word in ["a", "b", "c"] {
        assert!(source.push_back_str(word.to_string()).is_ok());
    }

    let mapped = source.map(|value, len| (value.clone(), len)).expect("allocation succeeds");
    assert_eq!(contents(&source), contents(&mapped));
    assert_eq!(mapped.get(2).expect("index 2 is in bounds").byte_len(), 2);

    source.destroy();
    assert_eq!(contents(&mapped), ["a", "b", "c"]);
    assert_eq!(mapped.join("").as_deref(), Ok("abc"));
    mapped.destroy_with(drop);

    let strings = list_of(&[1, 22, 333])
        .map(|value, _| (value.to_string(), 0))
        .expect("allocation succeeds");
    assert_eq!(contents(&strings), [String::from("1"), String::from("22"), String::from("333")]);
    strings.destroy_with(drop);
}

#[test]
fn test_join() {
    let list = LockedList::<&str>::new();
    assert_eq!(list.join(",").as_deref(), Ok(""));

    assert!(list.push_back_str("x").is_ok());
    assert_eq!(list.join(",").as_deref(), Ok("x"));

    let list = LockedList::new();
    for word in ["a", "b", "c"] {
        assert!(list.push_back_str(word).is_ok());
    }
    assert_eq!(list.join(",").as_deref(), Ok("a,b,c"));
    assert_eq!(list.join(", ").as_deref(), Ok("a, b, c"));

    let list = LockedList::new();
    for word in ["", "", "z"] {
        assert!(list.push_back_str(word).is_ok());
    }
    assert_eq!(list.join("-").as_deref(), Ok("--z"), "Empty elements should still be delimited.");
}

#[test]
fn test_cursor() {
    let list = list_of(&[1, 2, 3]);
    assert!(list.cursor_next().is_none(), "The cursor should start out exhausted.");

    list.cursor_reset();
    let mut seen = Vec::new();
    while let Some(entry) = list.cursor_next() {
        seen.push(*entry.value());
    }
    assert_eq!(seen, [1, 2, 3]);
    assert!(list.cursor_next().is_none());
    assert_eq!(list.len(), 3, "Exhausting the cursor shouldn't change the list.");

    assert_eq!(list.cursor_first().map(|entry| *entry.value()), Some(1));
    assert_eq!(list.cursor_next().map(|entry| *entry.value()), Some(2));

    let empty = LockedList::<i32>::new();
    assert!(empty.cursor_first().is_none());
}

#[test]
fn test_cursor_survives_removal() {
    let list = list_of(&[1, 2, 3, 4]);

    assert_eq!(list.cursor_first().map(|entry| *entry.value()), Some(1));
    // The cursor now points at 2.
    assert!(list.remove_nth(1).is_ok());
    assert_eq!(
        list.cursor_next().map(|entry| *entry.value()),
        Some(3),
        "Removing the cursor's entry should move it to the successor."
    );

    assert_eq!(list.pop_back(), Some(4));
    assert!(list.cursor_next().is_none());

    list.cursor_reset();
    assert_eq!(list.foreach_remove(|_, _| true), 2);
    assert!(list.cursor_next().is_none());
}

#[test]
fn test_alloc_failure() {
    let list = list_of(&[1, 2]);

    fail::fail_next(1);
    let error = list.push_back(3).expect_err("allocation was made to fail");
    assert!(error.kind.is_alloc_error());
    assert_eq!(error.value, 3, "The caller should get the payload back.");
    assert_eq!(contents(&list), [1, 2], "A failed push shouldn't change the list.");

    fail::fail_next(1);
    assert!(list.push_front(0).is_err());

    fail::fail_next(1);
    assert!(list.try_insert(1, 9, 0).is_err());
    assert_eq!(contents(&list), [1, 2]);
    list.verify_links();

    fail::fail_next(2);
    assert_eq!(list.map(|value, _| (*value, 0)).err(), Some(AllocError));
    fail::fail_next(0);

    assert!(list.push_back(3).is_ok(), "Allocation should work again.");
    assert_eq!(contents(&list), [1, 2, 3]);
}

#[test]
fn test_concurrent_push() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 100;

    let list = LockedList::new();
    thread::scope(|scope| {
        for t in 0..THREADS {
            let list = &list;
            scope.spawn(move || {
                for i in 0..PER_THREAD {
                    assert!(list.push_back(t * PER_THREAD + i).is_ok());
                }
            });
        }
    });

    assert_eq!(list.len(), THREADS * PER_THREAD);
    list.verify_links();

    let mut forward = contents(&list);
    let mut backward = Vec::new();
    while let Some(value) = list.pop_back() {
        backward.push(value);
    }
    backward.reverse();
    assert_eq!(forward, backward, "Both directions should see the same entries.");

    forward.sort_unstable();
    assert!(forward.into_iter().eq(0..THREADS * PER_THREAD), "No entry should be lost or doubled.");
}

#[test]
fn test_debug() {
    let list = LockedList::new();
    assert!(list.push_back_sized("a", 2).is_ok());
    assert_eq!(
        format!("{list:?}"),
        r#"LockedList { entries: [Entry { value: "a", byte_len: 2 }], len: 1, destructor: false }"#
    );
}
