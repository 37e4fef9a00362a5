//! Event dispatch with per-binding filters.
//!
//! Both the connectivity manager and buttons publish events through a
//! [`Dispatcher`].  A binding pairs a filter condition with a sink: a
//! synchronous [`Handler`] called inline, or an `embassy_sync` channel
//! sender for consumers that run in their own task.

use embassy_sync::channel::DynamicSender;
use heapless::Vec;

/// Synchronous event consumer, invoked inline during dispatch.
pub trait Handler<E> {
    fn on_event(&mut self, event: &E);
}

impl<E, F: FnMut(&E)> Handler<E> for F {
    fn on_event(&mut self, event: &E) {
        self(event)
    }
}

/// Opaque handle identifying one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BindingId(u32);

/// Where a matching event goes.
pub enum Sink<'h, E: 'static> {
    /// Called inline from `dispatch`.
    Handler(&'h mut dyn Handler<E>),
    /// Queued for an async consumer; never blocks dispatch.
    Queue(DynamicSender<'h, E>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    /// The fixed-size binding table is full.
    TableFull,
}

struct Binding<'h, E: 'static> {
    id: BindingId,
    condition: fn(&E) -> bool,
    sink: Sink<'h, E>,
    active: bool,
}

/// Fixed-capacity event fan-out table.
pub struct Dispatcher<'h, E: 'static, const N: usize> {
    bindings: Vec<Binding<'h, E>, N>,
    next_id: u32,
    dropped: u32,
}

impl<'h, E: Clone + 'static, const N: usize> Dispatcher<'h, E, N> {
    pub const fn new() -> Self {
        Dispatcher {
            bindings: Vec::new(),
            next_id: 0,
            dropped: 0,
        }
    }

    /// Registers a sink for events matching `condition`. Bindings start
    /// active.
    pub fn subscribe(
        &mut self,
        condition: fn(&E) -> bool,
        sink: Sink<'h, E>,
    ) -> Result<BindingId, SubscribeError> {
        let id = BindingId(self.next_id);
        self.bindings
            .push(Binding {
                id,
                condition,
                sink,
                active: true,
            })
            .map_err(|_| SubscribeError::TableFull)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Removes a binding. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: BindingId) -> bool {
        if let Some(pos) = self.bindings.iter().position(|b| b.id == id) {
            self.bindings.remove(pos);
            true
        } else {
            false
        }
    }

    /// Pauses or resumes a binding without losing its slot. Idempotent;
    /// unknown ids are ignored.
    pub fn set_active(&mut self, id: BindingId, active: bool) {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.id == id) {
            binding.active = active;
        }
    }

    /// Delivers `event` to every active binding whose condition matches.
    ///
    /// Queue sinks use `try_send`; if a consumer's queue is full the
    /// notification is dropped and counted rather than stalling the
    /// publisher.
    pub fn dispatch(&mut self, event: &E) {
        for binding in self.bindings.iter_mut() {
            if !binding.active || !(binding.condition)(event) {
                continue;
            }
            match &mut binding.sink {
                Sink::Handler(handler) => handler.on_event(event),
                Sink::Queue(sender) => {
                    if sender.try_send(event.clone()).is_err() {
                        self.dropped = self.dropped.saturating_add(1);
                        log::warn!("event queue full, notification dropped");
                    }
                }
            }
        }
    }

    /// Notifications lost to full queues since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'h, E: Clone + 'static, const N: usize> Default for Dispatcher<'h, E, N> {
    fn default() -> Self {
        Self::new()
    }
}
