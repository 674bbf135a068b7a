use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Gated bidirectional bridge between two buses.
///
/// `a_to_b` high drives `b` from `a`; `b_to_a` high drives `a` from `b`;
/// with both low each side is released. Asserting both at once is a
/// wiring mistake left to the caller.
pub struct BusConnect {
    pub a: Signal,
    pub b: Signal,
    pub a_to_b: Signal,
    pub b_to_a: Signal,
}

impl BusConnect {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            a: Signal::notify(net, id, "a", width),
            b: Signal::notify(net, id, "b", width),
            a_to_b: Signal::notify(net, id, "a_to_b", 1),
            b_to_a: Signal::notify(net, id, "b_to_a", 1),
        }
    }
}

impl Component for BusConnect {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.a_to_b.value(net) == 1 {
            let v = self.a.value(net);
            self.b.drive(net, v);
        } else {
            self.b.release(net);
        }
        if self.b_to_a.value(net) == 1 {
            let v = self.b.value(net);
            self.a.drive(net, v);
        } else {
            self.a.release(net);
        }
    }
}
