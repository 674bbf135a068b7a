//! Component store and the cascade scheduler.

use std::marker::PhantomData;

use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist};
use crate::device::Clock;

/// Typed handle to a component added to a [`Sim`].
pub struct Handle<C> {
    index: usize,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Clone for Handle<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Handle<C> {}

/// Owns the netlist and every component; drains the propagation queue.
///
/// Single-threaded and run-to-completion: a [`Sim::tick`] must fully
/// quiesce before control returns to the caller.
pub struct Sim {
    net: Netlist,
    components: Vec<Box<dyn Component>>,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            net: Netlist::new(),
            components: Vec::new(),
        }
    }

    /// Add a component, constructing it with its assigned id so its
    /// signals are registered under `name`.
    pub fn add<C, F>(&mut self, name: &str, build: F) -> Handle<C>
    where
        C: Component + 'static,
        F: FnOnce(&mut Netlist, ComponentId) -> C,
    {
        let id = self.net.register_component(name);
        let component = build(&mut self.net, id);
        self.components.push(Box::new(component));
        Handle {
            index: id.0 as usize,
            _marker: PhantomData,
        }
    }

    /// The netlist, for wiring after all components are added.
    pub fn netlist(&mut self) -> &mut Netlist {
        &mut self.net
    }

    pub fn get<C: Component + 'static>(&self, handle: Handle<C>) -> &C {
        match self.components[handle.index].as_any().downcast_ref() {
            Some(c) => c,
            None => unreachable!("handle type mismatch"),
        }
    }

    pub fn get_mut<C: Component + 'static>(&mut self, handle: Handle<C>) -> &mut C {
        match self.components[handle.index].as_any_mut().downcast_mut() {
            Some(c) => c,
            None => unreachable!("handle type mismatch"),
        }
    }

    /// Borrow one component together with the netlist, e.g. to drive one
    /// of its signals from outside the cascade.
    pub fn with<C, R, F>(&mut self, handle: Handle<C>, f: F) -> R
    where
        C: Component + 'static,
        F: FnOnce(&mut C, &mut Netlist) -> R,
    {
        let Self { net, components } = self;
        match components[handle.index].as_any_mut().downcast_mut::<C>() {
            Some(c) => f(c, net),
            None => unreachable!("handle type mismatch"),
        }
    }

    /// Reset every component in insertion order, settling after each so
    /// initial drives propagate the way a power-on cascade would.
    pub fn reset(&mut self) {
        for i in 0..self.components.len() {
            let Self { net, components } = self;
            components[i].reset(net);
            self.settle();
        }
    }

    /// Advance the clock one phase and run the cascade to quiescence.
    pub fn tick(&mut self, clock: Handle<Clock>) {
        let Self { net, components } = self;
        match components[clock.index].as_any_mut().downcast_mut::<Clock>() {
            Some(clk) => clk.tick(net),
            None => unreachable!("handle type mismatch"),
        }
        self.settle();
    }

    /// Drain the notification queue depth-first: each update's batch of
    /// notifications becomes a frame, and a notified component's own
    /// batch is processed before the rest of its parent frame. This
    /// matches the callback order of recursive propagation without
    /// consuming call stack; termination is guaranteed for well-formed
    /// netlists because re-driving an unchanged value is a no-op.
    pub fn settle(&mut self) {
        let mut frames = vec![self.net.take_pending()];
        loop {
            let (component, signal) = loop {
                match frames.last_mut() {
                    None => return,
                    Some(frame) => match frame.pop_front() {
                        Some(event) => break event,
                        None => {
                            frames.pop();
                        }
                    },
                }
            };
            let Self { net, components } = self;
            components[component.0 as usize].update(net, signal);
            let batch = self.net.take_pending();
            if !batch.is_empty() {
                frames.push(batch);
            }
        }
    }

    /// Net resolutions performed so far.
    pub fn updates(&self) -> u64 {
        self.net.updates()
    }

    /// Unconnected-signal report for pre-run review.
    pub fn describe(&self) -> String {
        self.net.describe()
    }
}

impl Default for Sim {
    fn default() -> Self {
        Self::new()
    }
}
