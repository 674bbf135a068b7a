//! Chained memory-mapped peripherals.
//!
//! A [`MemoryDevice`] sits between the decoder's memory strobes and the
//! RAM behind it. When the current address falls inside its window it
//! claims the access — serving reads from its port, capturing writes,
//! and holding `oe_out`/`we_out` low so the downstream device stays
//! quiet. Outside the window it forwards the strobes unchanged, so
//! several devices and finally the RAM can be chained.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use crate::core::signal::Signal;

/// Register-file behavior behind a [`MemoryDevice`] window.
pub trait DevicePort {
    fn read(&mut self, offset: u32) -> u8;
    fn write(&mut self, offset: u32, data: u8);
}

pub struct MemoryDevice<P: DevicePort> {
    base: u32,
    size: u32,
    pub port: P,
    pub addr: Signal,
    pub data: Signal,
    pub oe: Signal,
    pub we: Signal,
    pub oe_out: Signal,
    pub we_out: Signal,
}

impl<P: DevicePort> MemoryDevice<P> {
    pub fn new(
        net: &mut Netlist,
        id: ComponentId,
        addr_width: u32,
        base: u32,
        size: u32,
        port: P,
    ) -> Self {
        Self {
            base,
            size,
            port,
            addr: Signal::notify(net, id, "addr", addr_width),
            data: Signal::new(net, id, "data", 8),
            oe: Signal::notify(net, id, "oe", 1),
            we: Signal::notify(net, id, "we", 1),
            oe_out: Signal::new(net, id, "oe_out", 1),
            we_out: Signal::new(net, id, "we_out", 1),
        }
    }
}

impl<P: DevicePort + 'static> Component for MemoryDevice<P> {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let addr = self.addr.value(net);
        let in_range = addr >= self.base && addr < self.base + self.size;
        if self.we.had_edge(net, Edge::Rising) && in_range {
            let data = self.data.value(net) as u8;
            self.port.write(addr - self.base, data);
        }
        if in_range {
            if self.oe.value(net) == 1 {
                let v = self.port.read(addr - self.base);
                self.data.drive(net, u32::from(v));
            } else {
                self.data.release(net);
            }
            self.oe_out.drive(net, 0);
            self.we_out.drive(net, 0);
        } else {
            self.data.release(net);
            self.oe_out.drive(net, self.oe.value(net));
            self.we_out.drive(net, self.we.value(net));
        }
    }

    fn reset(&mut self, net: &mut Netlist) {
        // Combinational forwarder: evaluate against whatever the inputs
        // already carry, in whichever order components come up.
        self.update(net, self.oe.id());
    }
}

/// Two-cell output port: cell 0 latches a byte, a *changed* write to
/// cell 1 prints the latched byte (decimal, one line). Printed lines are
/// also recorded so tests can assert on the stream.
pub struct DisplayPort {
    latch: u8,
    trigger: u8,
    printed: Vec<String>,
}

impl DisplayPort {
    pub fn new() -> Self {
        Self {
            latch: 0,
            trigger: 0,
            printed: Vec::new(),
        }
    }
}

impl Default for DisplayPort {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicePort for DisplayPort {
    fn read(&mut self, offset: u32) -> u8 {
        if offset == 0 { self.latch } else { self.trigger }
    }

    fn write(&mut self, offset: u32, data: u8) {
        if offset == 0 {
            self.latch = data;
        } else {
            if data != self.trigger {
                println!("{}", self.latch);
                self.printed.push(self.latch.to_string());
            }
            self.trigger = data;
        }
    }
}

pub type MemDisplay = MemoryDevice<DisplayPort>;

impl MemDisplay {
    /// Display with its data cell at `data_addr` and trigger immediately
    /// after it.
    pub fn display(net: &mut Netlist, id: ComponentId, addr_width: u32, data_addr: u32) -> Self {
        Self::new(net, id, addr_width, data_addr, 2, DisplayPort::new())
    }

    pub fn printed(&self) -> &[String] {
        &self.port.printed
    }
}

/// One-cell entropy source: every read returns a fresh uniform byte.
pub struct RandomPort {
    rng: StdRng,
}

impl DevicePort for RandomPort {
    fn read(&mut self, _offset: u32) -> u8 {
        self.rng.gen_range(0..=u8::MAX)
    }

    fn write(&mut self, _offset: u32, _data: u8) {}
}

pub type MemRandom = MemoryDevice<RandomPort>;

impl MemRandom {
    pub fn random(net: &mut Netlist, id: ComponentId, addr_width: u32, addr: u32) -> Self {
        let port = RandomPort {
            rng: StdRng::from_entropy(),
        };
        Self::new(net, id, addr_width, addr, 1, port)
    }

    /// Seeded variant for reproducible runs and tests.
    pub fn random_seeded(
        net: &mut Netlist,
        id: ComponentId,
        addr_width: u32,
        addr: u32,
        seed: u64,
    ) -> Self {
        let port = RandomPort {
            rng: StdRng::seed_from_u64(seed),
        };
        Self::new(net, id, addr_width, addr, 1, port)
    }
}
