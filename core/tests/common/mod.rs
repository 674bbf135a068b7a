use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Netlist, SignalId};
use filament_core::core::signal::Signal;

/// Passive stimulus component: a single signal the test drives by hand.
pub struct Probe {
    pub out: Signal,
}

impl Probe {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            out: Signal::new(net, id, "out", width),
        }
    }
}

impl Component for Probe {
    fn update(&mut self, _net: &mut Netlist, _signal: SignalId) {}
}

/// Listener that counts how many times the engine notified it.
pub struct Watcher {
    pub inp: Signal,
    pub updates: u32,
    pub seen: Vec<u32>,
}

impl Watcher {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            inp: Signal::notify(net, id, "inp", width),
            updates: 0,
            seen: Vec::new(),
        }
    }
}

impl Component for Watcher {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        self.updates += 1;
        let v = self.inp.value(net);
        self.seen.push(v);
    }
}
