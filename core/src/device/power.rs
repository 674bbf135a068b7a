use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Fixed voltage references: `high` drives 1 and `low` drives 0 from
/// reset onward.
pub struct Power {
    pub high: Signal,
    pub low: Signal,
}

impl Power {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            high: Signal::new(net, id, "high", 1),
            low: Signal::new(net, id, "low", 1),
        }
    }
}

impl Component for Power {
    fn update(&mut self, _net: &mut Netlist, _signal: SignalId) {}

    fn reset(&mut self, net: &mut Netlist) {
        self.high.drive(net, 1);
        self.low.drive(net, 0);
    }
}
