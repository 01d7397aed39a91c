use std::cell::RefCell;
use std::rc::Rc;

/// Blocking user-facing notification.
pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Prints notifications to stdout, prefixed so they stand out from the
/// regular shell output.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, message: &str) {
        println!("! {}", message);
    }
}

/// Records notifications. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    messages: Rc<RefCell<Vec<String>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn alert(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
