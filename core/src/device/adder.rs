use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Combinational adder: `out = (a + b) mod 2^width`, `c` on overflow.
pub struct Adder {
    width: u32,
    pub a: Signal,
    pub b: Signal,
    pub out: Signal,
    pub c: Signal,
}

impl Adder {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            width,
            a: Signal::notify(net, id, "a", width),
            b: Signal::notify(net, id, "b", width),
            out: Signal::new(net, id, "out", width),
            c: Signal::new(net, id, "c", 1),
        }
    }
}

impl Component for Adder {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let sum = u64::from(self.a.value(net)) + u64::from(self.b.value(net));
        let mask = (1u64 << self.width) - 1;
        self.out.drive(net, (sum & mask) as u32);
        self.c.drive(net, u32::from(sum > mask));
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.update(net, self.a.id());
    }
}
