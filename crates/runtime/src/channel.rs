//! Single-threaded message channel with sequence stamping.
//!
//! Every published message gets a fresh, strictly increasing sequence number,
//! so two messages with identical payloads are still two distinct deliveries.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub seq: u64,
    pub value: T,
}

#[derive(Debug)]
struct Shared<T> {
    next_seq: u64,
    queue: VecDeque<Stamped<T>>,
}

#[derive(Debug)]
pub struct Sender<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

#[derive(Debug)]
pub struct Receiver<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let shared = Rc::new(RefCell::new(Shared {
        next_seq: 1,
        queue: VecDeque::new(),
    }));
    (
        Sender {
            shared: Rc::clone(&shared),
        },
        Receiver { shared },
    )
}

impl<T> Sender<T> {
    /// Queues `value` and returns its sequence number.
    pub fn publish(&self, value: T) -> u64 {
        let mut shared = self.shared.borrow_mut();
        let seq = shared.next_seq;
        shared.next_seq += 1;
        shared.queue.push_back(Stamped { seq, value });
        seq
    }
}

impl<T> Receiver<T> {
    /// Takes every pending message in publish order.
    pub fn drain(&self) -> Vec<Stamped<T>> {
        self.shared.borrow_mut().queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.shared.borrow().queue.len()
    }

    /// Sequence number of the most recently published message (0 if none).
    pub fn last_seq(&self) -> u64 {
        self.shared.borrow().next_seq - 1
    }
}
