use std::any::Any;

use crate::core::netlist::{Netlist, SignalId};

/// Object-safe downcast support so [`crate::core::sim::Sim`] can hand back
/// concrete component types from type-erased storage.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A circuit element owning signals in the shared netlist.
pub trait Component: AsAny {
    /// React to a change on one of this component's notify signals.
    /// Reads inputs and drives outputs through `net`; must be safe to call
    /// repeatedly (edge markers are consumed, level logic is idempotent).
    fn update(&mut self, net: &mut Netlist, signal: SignalId);

    /// Drive initial output levels after wiring is complete.
    fn reset(&mut self, _net: &mut Netlist) {}
}
