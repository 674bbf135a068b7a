use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Free-running phase counter. `tick()` advances modulo `2^width` and
/// drives the phase onto `clk`; everything downstream reacts to that.
pub struct Clock {
    phase: u32,
    width: u32,
    pub clk: Signal,
}

impl Clock {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            phase: 0,
            width,
            clk: Signal::new(net, id, "clk", width),
        }
    }

    pub fn tick(&mut self, net: &mut Netlist) {
        self.phase = (self.phase + 1) % (1 << self.width);
        self.clk.drive(net, self.phase);
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }
}

impl Component for Clock {
    fn update(&mut self, _net: &mut Netlist, _signal: SignalId) {}

    fn reset(&mut self, net: &mut Netlist) {
        self.phase = 0;
        self.clk.drive(net, 0);
    }
}
