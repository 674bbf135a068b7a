use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Two-way combinational multiplexer; `out` is always driven.
pub struct Multiplexer {
    pub a: Signal,
    pub b: Signal,
    pub sel: Signal,
    pub out: Signal,
}

impl Multiplexer {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            a: Signal::notify(net, id, "a", width),
            b: Signal::notify(net, id, "b", width),
            sel: Signal::notify(net, id, "sel", 1),
            out: Signal::new(net, id, "out", width),
        }
    }
}

impl Component for Multiplexer {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let v = if self.sel.value(net) == 0 {
            self.a.value(net)
        } else {
            self.b.value(net)
        };
        self.out.drive(net, v);
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.update(net, self.sel.id());
    }
}
