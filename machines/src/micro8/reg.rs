//! Instruction register and split program counter.

use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use filament_core::core::signal::Signal;

/// Latches the fetched opcode and, for immediate instructions, drives
/// the operand nibble onto the register bus in both halves so the
/// split write enables pick the right one.
pub struct InstructionRegister {
    v: u8,
    pub data: Signal,
    pub instr: Signal,
    pub imm: Signal,
    pub ie: Signal,
    pub oe: Signal,
}

impl InstructionRegister {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            v: 0,
            data: Signal::new(net, id, "data", 8),
            instr: Signal::new(net, id, "instr", 8),
            imm: Signal::new(net, id, "imm", 8),
            ie: Signal::notify(net, id, "ie", 1),
            oe: Signal::notify(net, id, "oe", 1),
        }
    }

    pub fn value(&self) -> u8 {
        self.v
    }
}

impl Component for InstructionRegister {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.ie.had_edge(net, Edge::Rising) {
            self.v = self.data.value(net) as u8;
            self.instr.drive(net, u32::from(self.v));
        }
        if self.oe.value(net) == 1 {
            let nibble = u32::from(self.v & 0xf);
            self.imm.drive(net, nibble | nibble << 4);
        } else {
            self.imm.release(net);
        }
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.instr.drive(net, 0);
    }
}

/// One 8-bit half of the 16-bit program counter. While `ie` is high it
/// follows `data`; a rising edge on `inc` advances it, raising `co` on
/// wrap so two halves chain.
pub struct ProgramCounter {
    v: u8,
    pub addr: Signal,
    pub data: Signal,
    pub rst: Signal,
    pub inc: Signal,
    pub ie: Signal,
    pub co: Signal,
}

impl ProgramCounter {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            v: 0,
            addr: Signal::new(net, id, "addr", 8),
            data: Signal::notify(net, id, "data", 8),
            rst: Signal::notify(net, id, "rst", 1),
            inc: Signal::notify(net, id, "inc", 1),
            ie: Signal::notify(net, id, "ie", 1),
            co: Signal::new(net, id, "co", 1),
        }
    }

    pub fn value(&self) -> u8 {
        self.v
    }
}

impl Component for ProgramCounter {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let inc_edge = self.inc.had_edge(net, Edge::Rising);
        if self.rst.value(net) == 1 {
            self.v = 0;
        } else if self.ie.value(net) == 1 {
            self.v = self.data.value(net) as u8;
        } else if inc_edge {
            if self.v == 0xff {
                self.v = 0;
                self.co.drive(net, 1);
            } else {
                self.v += 1;
                self.co.drive(net, 0);
            }
        }
        self.addr.drive(net, u32::from(self.v));
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.addr.drive(net, u32::from(self.v));
        self.co.drive(net, 0);
    }
}
