//! Register variants: the shared-bus register with split write enables,
//! the two-port register, and the two-port register with an increment
//! input for program-counter chains.

use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use crate::core::signal::Signal;

/// Edge-triggered register on a shared tri-state bus.
///
/// `ie` carries one bit per `load_width`-sized slice; a rising edge on
/// bit *i* captures the *i*-th slice of `data`. While `oe` is high the
/// register drives `data` with its value, otherwise it listens. `state`
/// always carries the value for direct read-out (never hi-Z), so e.g. an
/// ALU can see an operand without bus turnaround.
pub struct Register {
    v: u32,
    width: u32,
    load_width: u32,
    pub data: Signal,
    pub ie: Signal,
    pub oe: Signal,
    pub state: Signal,
}

impl Register {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self::split(net, id, width, width)
    }

    /// Register whose value loads in independent `load_width`-bit slices.
    pub fn split(net: &mut Netlist, id: ComponentId, width: u32, load_width: u32) -> Self {
        assert!(width % load_width == 0, "load width must divide width");
        Self {
            v: 0,
            width,
            load_width,
            data: Signal::new(net, id, "data", width),
            ie: Signal::notify(net, id, "ie", width / load_width),
            oe: Signal::notify(net, id, "oe", 1),
            state: Signal::new(net, id, "state", width),
        }
    }

    pub fn value(&self) -> u32 {
        self.v
    }
}

impl Component for Register {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        for slice in 0..self.width / self.load_width {
            if self.ie.had_edge_bit(net, slice, Edge::Rising) {
                let mask = ((1u32 << self.load_width) - 1) << (slice * self.load_width);
                self.v = (self.v & !mask) | (self.data.value(net) & mask);
            }
        }
        if self.oe.value(net) == 1 {
            self.data.drive(net, self.v);
        } else {
            self.data.release(net);
        }
        self.state.drive(net, self.v);
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.state.drive(net, self.v);
    }
}

/// Register with distinct input and output ports, sidestepping the
/// tri-state hazard of a single shared bus pin set.
pub struct IORegister {
    v: u32,
    width: u32,
    pub inp: Signal,
    pub out: Signal,
    pub we: Signal,
    pub oe: Signal,
    pub state: Signal,
}

impl IORegister {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            v: 0,
            width,
            inp: Signal::new(net, id, "inp", width),
            out: Signal::new(net, id, "out", width),
            we: Signal::notify(net, id, "we", 1),
            oe: Signal::notify(net, id, "oe", 1),
            state: Signal::new(net, id, "state", width),
        }
    }

    pub fn value(&self) -> u32 {
        self.v
    }
}

impl Component for IORegister {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.we.had_edge(net, Edge::Rising) {
            self.v = self.inp.value(net);
        }
        if self.oe.value(net) == 1 {
            self.out.drive(net, self.v);
        } else {
            self.out.release(net);
        }
        self.state.drive(net, self.v);
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.state.drive(net, self.v);
    }
}

/// Two-port register that also counts: a rising edge on `inc` advances
/// the value modulo `2^width` and pulses `carry` on wrap-around so two
/// of these chain into a wider counter.
pub struct IncRegister {
    v: u32,
    width: u32,
    pub inp: Signal,
    pub out: Signal,
    pub we: Signal,
    pub oe: Signal,
    pub inc: Signal,
    pub carry: Signal,
    pub state: Signal,
}

impl IncRegister {
    pub fn new(net: &mut Netlist, id: ComponentId, width: u32) -> Self {
        Self {
            v: 0,
            width,
            inp: Signal::new(net, id, "inp", width),
            out: Signal::new(net, id, "out", width),
            we: Signal::notify(net, id, "we", 1),
            oe: Signal::notify(net, id, "oe", 1),
            inc: Signal::notify(net, id, "inc", 1),
            carry: Signal::new(net, id, "carry", 1),
            state: Signal::new(net, id, "state", width),
        }
    }

    pub fn value(&self) -> u32 {
        self.v
    }

    fn mask(&self) -> u32 {
        (1 << self.width) - 1
    }
}

impl Component for IncRegister {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.we.had_edge(net, Edge::Rising) {
            self.v = self.inp.value(net) & self.mask();
        }
        if self.inc.had_edge(net, Edge::Rising) {
            let wrapped = self.v == self.mask();
            self.v = (self.v + 1) & self.mask();
            self.carry.drive(net, u32::from(wrapped));
        }
        if self.oe.value(net) == 1 {
            self.out.drive(net, self.v);
        } else {
            self.out.release(net);
        }
        self.state.drive(net, self.v);
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.carry.drive(net, 0);
        self.state.drive(net, self.v);
    }
}
