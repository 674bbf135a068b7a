//! The paged NOR machine: 13-bit logical addresses split into two
//! 4 KiB pages, each mapped onto one of 256 physical banks by the
//! paged-RAM controller, A and X registers, 16-bit instructions with
//! eight opcodes, and memory-mapped display, RNG, and bank-select
//! cells at the top of page 0.

use filament_asm::{assemble_nor, AsmError, NorConfig};
use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use filament_core::core::signal::Signal;
use filament_core::core::sim::{Handle, Sim};
use filament_core::core::NetlistError;
use filament_core::device::{Clock, MemDisplay, MemRandom, PagedRamController, Ram};
use filament_core::wire;

use crate::machine::Machine;
use crate::registry::MachineEntry;

const MASK_OP: u8 = 0b011;
const MASK_REG: u8 = 0b100;
const OP_NOR: u8 = 0b000;
const OP_ADD: u8 = 0b001;
const OP_ST: u8 = 0b010;
const OP_J: u8 = 0b011;
const REG_A: u8 = 0b000;
const REG_X: u8 = 0b100;

/// Three-step sequencer: fetch the opcode word's high byte, fetch the
/// low byte (forming the 13-bit operand address), execute.
const ST_OPCODE: u8 = 0;
const ST_OPERAND: u8 = 1;
const ST_EXECUTE: u8 = 2;

pub struct Paged13Decoder {
    pub clk: Signal,
    pub addr: Signal,
    pub data: Signal,
    pub oe: Signal,
    pub we: Signal,
    /// 9-bit accumulators; bit 8 of `acc` is the carry.
    acc: u16,
    x: u16,
    adreg: u16,
    hi5: u8,
    pc: u16,
    state: u8,
    op: u8,
}

impl Paged13Decoder {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            clk: Signal::notify(net, id, "clk", 1),
            addr: Signal::new(net, id, "addr", 13),
            data: Signal::new(net, id, "data", 8),
            oe: Signal::new(net, id, "oe", 1),
            we: Signal::new(net, id, "we", 1),
            acc: 0,
            x: 0,
            adreg: 0,
            hi5: 0,
            pc: 0,
            state: ST_OPCODE,
            op: 0,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn acc(&self) -> u8 {
        (self.acc & 0xff) as u8
    }

    pub fn x(&self) -> u8 {
        (self.x & 0xff) as u8
    }
}

impl Component for Paged13Decoder {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.clk.had_edge(net, Edge::Rising) {
            let data = self.data.value(net) as u8;
            match self.state {
                ST_OPCODE => {
                    self.pc = self.adreg + 2;
                    self.adreg += 1;
                    self.op = (data >> 5) & 0b111;
                    self.hi5 = data & 0x1f;
                }
                ST_OPERAND => {
                    self.adreg = (u16::from(self.hi5) << 8) | u16::from(data);
                }
                _ => {
                    self.adreg = self.pc;

                    // ALU / data path.
                    if self.op == REG_A | OP_ADD {
                        self.acc = ((self.acc & 0xff) + u16::from(data)) & 0x1ff;
                    } else if self.op == REG_A | OP_NOR {
                        let carry = self.acc & 0x100;
                        let nor = !((self.acc as u8) | data);
                        self.acc = carry | u16::from(nor);
                    } else if self.op == REG_X | OP_ADD {
                        self.x = ((self.x & 0xff) + u16::from(data)) & 0x1ff;
                    } else if self.op == REG_X | OP_NOR {
                        let carry = self.x & 0x100;
                        let nor = !((self.x as u8) | data);
                        self.x = carry | u16::from(nor);
                    } else if self.op & MASK_OP == OP_J {
                        // Untaken jumps clear the carry.
                        self.acc &= 0xff;
                    }
                }
            }

            // State machine.
            if self.state == ST_OPCODE {
                self.state = ST_OPERAND;
            } else if self.state == ST_EXECUTE {
                self.state = ST_OPCODE;
            } else if self.op & MASK_OP == OP_J {
                let carry_set = self.acc & 0x100 != 0;
                let acc_zero = self.acc & 0xff == 0;
                if self.op & MASK_REG == REG_A && carry_set {
                    self.state = ST_EXECUTE; // jcc not taken
                } else if self.op & MASK_REG == REG_X && acc_zero {
                    self.state = ST_EXECUTE; // jnz not taken
                } else {
                    self.state = ST_OPCODE; // branch taken
                }
            } else {
                self.state = ST_EXECUTE;
                // A-register ops index their operand by X.
                if self.op & MASK_REG == 0 {
                    self.adreg += self.x & 0xff;
                }
            }
        }

        let clk = self.clk.value(net);
        self.addr.drive(net, u32::from(self.adreg & 0x1fff));

        let storing = self.state == ST_EXECUTE && self.op & MASK_OP == OP_ST;
        if storing && self.op & MASK_REG == REG_A {
            self.data.drive(net, u32::from(self.acc & 0xff));
        } else if storing && self.op & MASK_REG == REG_X {
            self.data.drive(net, u32::from(self.x & 0xff));
        } else {
            self.data.release(net);
        }

        self.oe.drive(net, u32::from(!(clk == 1 || storing)));
        self.we.drive(net, u32::from(clk == 0 && storing));
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.addr.drive(net, 0);
        self.data.release(net);
        self.oe.drive(net, 1);
        self.we.drive(net, 0);
    }
}

pub struct Paged13System {
    sim: Sim,
    clk: Handle<Clock>,
    dec: Handle<Paged13Decoder>,
    ram: Handle<Ram>,
    pager: Handle<PagedRamController>,
    display: Handle<MemDisplay>,
}

inventory::submit! {
    MachineEntry::new(
        "paged13",
        "Paged NOR machine: A/X registers, 2 pages over 256 banks, RNG cell",
        || Ok(Box::new(Paged13System::new()?)),
    )
}

impl Paged13System {
    /// Reserved-cell addresses at the top of page 0.
    pub const RANDOM: u32 = (1 << 12) - 8;
    pub const BANK0: u32 = (1 << 12) - 7;
    pub const DISPLAY_DATA: u32 = (1 << 12) - 5;

    pub fn new() -> Result<Self, NetlistError> {
        Self::with_rng_seed(None)
    }

    pub fn with_rng_seed(seed: Option<u64>) -> Result<Self, NetlistError> {
        let mut sim = Sim::new();
        let dec = sim.add("decoder", Paged13Decoder::new);
        // Physical memory: 256 banks of 4 KiB.
        let ram = sim.add("ram", |n, id| Ram::new(n, id, 20, 8));
        let pager = sim.add("pager", |n, id| {
            PagedRamController::new(n, id, 13, 2, Self::BANK0)
        });
        let display = sim.add("display", |n, id| {
            MemDisplay::display(n, id, 12, Self::DISPLAY_DATA)
        });
        let rng = sim.add("rng", move |n, id| match seed {
            Some(seed) => MemRandom::random_seeded(n, id, 12, Self::RANDOM, seed),
            None => MemRandom::random(n, id, 12, Self::RANDOM),
        });
        let clk = sim.add("clock", |n, id| Clock::new(n, id, 1));

        wire!(sim, sim.get(clk).clk.view(), sim.get(dec).clk.view())?;

        // Logical address: low 12 bits go to the devices and physical
        // RAM directly; the full 13 bits select the page table entry,
        // whose output becomes the physical bank number.
        wire!(sim, sim.get(pager).in_addr.slice(0..12), sim.get(dec).addr.slice(0..12))?;
        wire!(sim, sim.get(pager).in_addr.slice(0..12), sim.get(ram).addr.slice(0..12))?;
        wire!(sim, sim.get(pager).in_addr.slice(0..12), sim.get(display).addr.view())?;
        wire!(sim, sim.get(pager).in_addr.slice(0..12), sim.get(rng).addr.view())?;
        wire!(sim, sim.get(pager).in_addr.slice(12..13), sim.get(dec).addr.slice(12..13))?;
        wire!(sim, sim.get(ram).addr.slice(12..20), sim.get(pager).out_addr.view())?;

        // Shared data bus.
        wire!(sim, sim.get(ram).data.view(), sim.get(dec).data.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(display).data.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(rng).data.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(pager).data.view())?;

        // Strobes: the RNG and display windows claim their cells, the
        // pager snoops writes, everything else reaches RAM.
        wire!(sim, sim.get(dec).oe.view(), sim.get(rng).oe.view())?;
        wire!(sim, sim.get(dec).we.view(), sim.get(rng).we.view())?;
        wire!(sim, sim.get(dec).we.view(), sim.get(pager).we.view())?;
        wire!(sim, sim.get(rng).oe_out.view(), sim.get(display).oe.view())?;
        wire!(sim, sim.get(rng).we_out.view(), sim.get(display).we.view())?;
        wire!(sim, sim.get(display).oe_out.view(), sim.get(ram).oe.view())?;
        wire!(sim, sim.get(display).we_out.view(), sim.get(ram).we.view())?;

        Ok(Self {
            sim,
            clk,
            dec,
            ram,
            pager,
            display,
        })
    }

    pub fn acc(&self) -> u8 {
        self.sim.get(self.dec).acc()
    }

    pub fn x(&self) -> u8 {
        self.sim.get(self.dec).x()
    }

    pub fn ram_byte(&self, addr: u32) -> u8 {
        self.sim.get(self.ram).ram[addr as usize]
    }

    pub fn bank_map(&self) -> Vec<u8> {
        self.sim.get(self.pager).table().to_vec()
    }
}

impl Machine for Paged13System {
    fn name(&self) -> &'static str {
        "paged13"
    }

    fn assemble(&mut self, path: &str, source: &str) -> Result<(), AsmError> {
        let image = assemble_nor(path, source, NorConfig::paged13(), false)?;
        self.sim.get_mut(self.ram).load(&image);
        Ok(())
    }

    fn reset(&mut self) {
        self.sim.reset();
    }

    fn machine_cycle(&mut self) {
        // One clock period advances the sequencer one step.
        self.sim.tick(self.clk);
        self.sim.tick(self.clk);
    }

    fn pc(&self) -> u16 {
        self.sim.get(self.dec).pc()
    }

    fn halt_threshold(&self) -> u32 {
        10
    }

    fn trace(&self) -> String {
        let dec = self.sim.get(self.dec);
        format!(
            "PC: 0x{:04x} A: 0x{:02x} X: 0x{:02x}",
            dec.pc(),
            dec.acc(),
            dec.x()
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
