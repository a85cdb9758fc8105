//! Transport capability: where assembled statements go.

use std::sync::{Arc, Mutex, PoisonError};

use crate::statement::Statement;

/// Delivers statements to the record store.
///
/// Delivery is best-effort and fire-and-forget: implementations must not
/// block on the network and report nothing back to the session.
pub trait Transport: Send + Sync {
    fn send(&self, statement: &Statement);
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, statement: &Statement) {
        (**self).send(statement)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, statement: &Statement) {
        (**self).send(statement)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, statement: &Statement) {
        (**self).send(statement)
    }
}

/// Keeps every statement in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Statement>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in send order.
    pub fn statements(&self) -> Vec<Statement> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<Statement> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Transport for MemoryTransport {
    fn send(&self, statement: &Statement) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(statement.clone());
    }
}
