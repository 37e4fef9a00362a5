//! Async driver that connects a pin to the debounce machine.

use embassy_futures::select::{select, Either};

use crate::config;
use crate::event::{BindingId, Dispatcher, Sink, SubscribeError};
use crate::time::Clock;

use super::{ButtonConfig, ButtonEvent, ButtonState, Debouncer, Level};

/// Edge-capable input pin.
pub trait EdgeInput {
    /// Resolves on the next level transition.
    async fn wait_for_edge(&mut self);

    fn level(&self) -> Level;
}

/// A debounced button bound to a pin, a clock and its subscribers.
///
/// [`run`](Button::run) sleeps until the pin changes or the machine's
/// next deadline, whichever comes first, so no cycles are spent while
/// the button is idle.
pub struct Button<'h, I: EdgeInput, C: Clock, const N: usize = { config::MAX_BUTTON_BINDINGS }> {
    input: I,
    clock: C,
    machine: Debouncer,
    events: Dispatcher<'h, ButtonEvent, N>,
}

impl<'h, I: EdgeInput, C: Clock, const N: usize> Button<'h, I, C, N> {
    pub fn new(input: I, clock: C, cfg: ButtonConfig) -> Self {
        Button {
            input,
            clock,
            machine: Debouncer::new(cfg),
            events: Dispatcher::new(),
        }
    }

    pub fn state(&self) -> ButtonState {
        self.machine.state()
    }

    pub fn subscribe(
        &mut self,
        condition: fn(&ButtonEvent) -> bool,
        sink: Sink<'h, ButtonEvent>,
    ) -> Result<BindingId, SubscribeError> {
        self.events.subscribe(condition, sink)
    }

    pub fn unsubscribe(&mut self, id: BindingId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn set_binding_active(&mut self, id: BindingId, active: bool) {
        self.events.set_active(id, active);
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.service().await;
        }
    }

    /// Waits for the next edge or deadline and advances the machine.
    pub async fn service(&mut self) {
        match self.machine.next_deadline() {
            Some(deadline) => {
                match select(self.input.wait_for_edge(), self.clock.sleep_until(deadline)).await {
                    Either::First(()) => self.feed(),
                    Either::Second(()) => self.drain(),
                }
            }
            None => {
                self.input.wait_for_edge().await;
                self.feed();
            }
        }
    }

    fn feed(&mut self) {
        let now = self.clock.now();
        if let Some(event) = self.machine.sample(self.input.level(), now) {
            self.events.dispatch(&event);
        }
        self.drain();
    }

    fn drain(&mut self) {
        let now = self.clock.now();
        while let Some(event) = self.machine.poll(now) {
            self.events.dispatch(&event);
        }
    }
}
