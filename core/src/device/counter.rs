use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use crate::core::signal::Signal;

/// Rising-edge counter modulo `2^width`.
pub struct Counter {
    v: u32,
    width: u32,
    pub clk: Signal,
    pub out: Signal,
}

impl Counter {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            v: 0,
            width,
            clk: Signal::notify(net, id, "clk", 1),
            out: Signal::new(net, id, "out", width),
        }
    }

    pub fn value(&self) -> u32 {
        self.v
    }
}

impl Component for Counter {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.clk.had_edge(net, Edge::Rising) {
            self.v = (self.v + 1) % (1 << self.width);
            self.out.drive(net, self.v);
        }
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.v = 0;
        self.out.drive(net, 0);
    }
}
