//! The minimal NOR machine: 64 bytes of RAM, single-byte instructions
//! (2-bit opcode over a 6-bit address), and a decoder that is the whole
//! CPU — accumulator, address register, PC, and sequencing state live
//! behind one component driving the RAM bus.

use filament_asm::{assemble_nor, AsmError, NorConfig};
use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use filament_core::core::signal::Signal;
use filament_core::core::sim::{Handle, Sim};
use filament_core::core::NetlistError;
use filament_core::device::{Clock, MemDisplay, Ram};
use filament_core::wire;

use crate::machine::Machine;
use crate::registry::MachineEntry;

/// Sequencing states: fetch, then one execute state per opcode family.
/// The execute state is the complement of the 2-bit opcode, plus a
/// separate "branch not taken" state that clears the carry.
const ST_FETCH: u8 = 0b000;
const ST_STA: u8 = 0b001;
const ST_ADD: u8 = 0b010;
const ST_NOR: u8 = 0b011;
const ST_BRANCH_SKIP: u8 = 0b101;

pub struct Nor6Decoder {
    pub clk: Signal,
    pub addr: Signal,
    pub data: Signal,
    pub oe: Signal,
    pub we: Signal,
    /// 9-bit accumulator; bit 8 is the carry.
    acc: u16,
    adreg: u8,
    pc: u8,
    state: u8,
}

impl Nor6Decoder {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            clk: Signal::notify(net, id, "clk", 1),
            addr: Signal::new(net, id, "addr", 6),
            data: Signal::new(net, id, "data", 8),
            oe: Signal::new(net, id, "oe", 1),
            we: Signal::new(net, id, "we", 1),
            acc: 0,
            adreg: 0,
            pc: 0,
            state: ST_FETCH,
        }
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn acc(&self) -> u8 {
        (self.acc & 0xff) as u8
    }

    pub fn carry(&self) -> bool {
        self.acc & 0x100 != 0
    }
}

impl Component for Nor6Decoder {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.clk.had_edge(net, Edge::Rising) {
            let data = self.data.value(net) as u8;
            if self.state == ST_FETCH {
                self.pc = self.adreg.wrapping_add(1);
                self.adreg = data;
            } else {
                self.adreg = self.pc;
            }

            // ALU / data path.
            match self.state {
                ST_ADD => {
                    self.acc = ((self.acc & 0xff) + u16::from(data)) & 0x1ff;
                }
                ST_NOR => {
                    let carry = self.acc & 0x100;
                    let nor = !((self.acc as u8) | data);
                    self.acc = carry | u16::from(nor);
                }
                ST_BRANCH_SKIP => {
                    // Untaken jcc clears the carry.
                    self.acc &= 0xff;
                }
                _ => {}
            }

            // Next state.
            if self.state != ST_FETCH {
                self.state = ST_FETCH;
            } else if data & 0b1100_0000 == 0b1100_0000 && self.acc & 0x100 != 0 {
                self.state = ST_BRANCH_SKIP;
            } else {
                self.state = !(data >> 6) & 0b11;
            }
        }

        let clk = self.clk.value(net);
        self.addr.drive(net, u32::from(self.adreg & 0x3f));
        if self.state == ST_STA {
            self.data.drive(net, u32::from(self.acc & 0xff));
        } else {
            self.data.release(net);
        }
        let idle = self.state == ST_STA || self.state == ST_BRANCH_SKIP;
        self.oe
            .drive(net, u32::from(!(clk == 1 || idle)));
        self.we
            .drive(net, u32::from(clk == 0 && self.state == ST_STA));
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.addr.drive(net, 0);
        self.data.release(net);
        self.oe.drive(net, 1);
        self.we.drive(net, 0);
    }
}

pub struct Nor6System {
    sim: Sim,
    clk: Handle<Clock>,
    dec: Handle<Nor6Decoder>,
    ram: Handle<Ram>,
    display: Handle<MemDisplay>,
}

inventory::submit! {
    MachineEntry::new(
        "nor6",
        "Minimal NOR/ADD/STA/JCC machine with 64 bytes of RAM",
        || Ok(Box::new(Nor6System::new()?)),
    )
}

impl Nor6System {
    pub const DISPLAY_DATA: u32 = 59;

    pub fn new() -> Result<Self, NetlistError> {
        let mut sim = Sim::new();
        let dec = sim.add("decoder", Nor6Decoder::new);
        let ram = sim.add("ram", |n, id| Ram::new(n, id, 6, 8));
        let display = sim.add("display", |n, id| {
            MemDisplay::display(n, id, 6, Self::DISPLAY_DATA)
        });
        let clk = sim.add("clock", |n, id| Clock::new(n, id, 1));

        wire!(sim, sim.get(clk).clk.view(), sim.get(dec).clk.view())?;
        wire!(sim, sim.get(dec).addr.view(), sim.get(ram).addr.view())?;
        wire!(sim, sim.get(dec).addr.view(), sim.get(display).addr.view())?;
        wire!(sim, sim.get(dec).data.view(), sim.get(ram).data.view())?;
        wire!(sim, sim.get(dec).data.view(), sim.get(display).data.view())?;
        wire!(sim, sim.get(dec).oe.view(), sim.get(display).oe.view())?;
        wire!(sim, sim.get(dec).we.view(), sim.get(display).we.view())?;
        wire!(sim, sim.get(display).oe_out.view(), sim.get(ram).oe.view())?;
        wire!(sim, sim.get(display).we_out.view(), sim.get(ram).we.view())?;

        Ok(Self {
            sim,
            clk,
            dec,
            ram,
            display,
        })
    }

    pub fn acc(&self) -> u8 {
        self.sim.get(self.dec).acc()
    }

    pub fn ram_byte(&self, addr: u8) -> u8 {
        self.sim.get(self.ram).ram[addr as usize]
    }

    pub fn ram_contents(&self) -> &[u8] {
        &self.sim.get(self.ram).ram
    }

    pub fn load_image(&mut self, image: &[u8]) {
        self.sim.get_mut(self.ram).load(image);
    }
}

impl Machine for Nor6System {
    fn name(&self) -> &'static str {
        "nor6"
    }

    fn assemble(&mut self, path: &str, source: &str) -> Result<(), AsmError> {
        let image = assemble_nor(path, source, NorConfig::nor6(), true)?;
        self.load_image(&image);
        Ok(())
    }

    fn reset(&mut self) {
        self.sim.reset();
    }

    fn machine_cycle(&mut self) {
        // One full clock period advances the sequencer one state.
        self.sim.tick(self.clk);
        self.sim.tick(self.clk);
    }

    fn pc(&self) -> u16 {
        u16::from(self.sim.get(self.dec).pc())
    }

    fn halt_threshold(&self) -> u32 {
        4
    }

    fn trace(&self) -> String {
        let dec = self.sim.get(self.dec);
        format!(
            "PC: 0x{:02x} A: 0x{:02x} C: {}",
            dec.pc(),
            dec.acc(),
            u8::from(dec.carry())
        )
    }

    fn image_dump(&self) -> String {
        self.sim.get(self.ram).dump_nonzero()
    }

    fn ram_dump(&self) -> String {
        self.sim.get(self.ram).dump_nonzero()
    }

    fn printed(&self) -> Vec<String> {
        self.sim.get(self.display).printed().to_vec()
    }

    fn net_updates(&self) -> u64 {
        self.sim.updates()
    }
}
