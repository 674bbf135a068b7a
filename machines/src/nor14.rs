//! The gate-level NOR machine: 16 KiB of RAM, 16-bit instructions
//! (2-bit opcode over a 14-bit address), and a discrete datapath —
//! two-port instruction/address registers, an incrementing PC pair, a
//! two-function ALU, and a 9-bit accumulator whose top bit is the
//! carry.

use filament_asm::{assemble_nor, AsmError, NorConfig};
use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use filament_core::core::signal::Signal;
use filament_core::core::sim::{Handle, Sim};
use filament_core::core::NetlistError;
use filament_core::device::{Clock, IORegister, IncRegister, MemDisplay, Ram};
use filament_core::wire;

use crate::machine::Machine;
use crate::registry::MachineEntry;

/// 9-bit accumulator register: bit 8 is the carry, `z` reports an
/// all-zero value, and a pulse on `cc` clears the carry (untaken jump).
pub struct Accumulator {
    v: u32,
    pub inp: Signal,
    pub out: Signal,
    pub we: Signal,
    pub oe: Signal,
    pub state: Signal,
    pub z: Signal,
    pub cc: Signal,
}

impl Accumulator {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            v: 0,
            inp: Signal::new(net, id, "inp", 9),
            out: Signal::new(net, id, "out", 9),
            we: Signal::notify(net, id, "we", 1),
            oe: Signal::notify(net, id, "oe", 1),
            state: Signal::new(net, id, "state", 9),
            z: Signal::new(net, id, "z", 1),
            cc: Signal::notify(net, id, "cc", 1),
        }
    }

    pub fn value(&self) -> u32 {
        self.v
    }
}

impl Component for Accumulator {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.we.had_edge(net, Edge::Rising) {
            self.v = self.inp.value(net);
        }
        if self.cc.had_edge(net, Edge::Rising) {
            self.v &= 0xff;
        }
        if self.oe.value(net) == 1 {
            self.out.drive(net, self.v);
        } else {
            self.out.release(net);
        }
        self.state.drive(net, self.v);
        self.z.drive(net, u32::from(self.v == 0));
    }

    fn reset(&mut self, net: &mut Netlist) {
        self.state.drive(net, self.v);
        self.z.drive(net, 1);
    }
}

/// Two-function ALU: NOR (carry preserved) and 9-bit ADD. A rising edge
/// on `we` captures the result; `oe` gates it onto the accumulator
/// input.
pub struct NorAlu {
    v: u32,
    pub a: Signal,
    pub b: Signal,
    pub func: Signal,
    pub out: Signal,
    pub oe: Signal,
    pub we: Signal,
}

impl NorAlu {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            v: 0,
            a: Signal::new(net, id, "a", 9),
            b: Signal::new(net, id, "b", 8),
            func: Signal::new(net, id, "func", 1),
            out: Signal::new(net, id, "out", 9),
            oe: Signal::notify(net, id, "oe", 1),
            we: Signal::notify(net, id, "we", 1),
        }
    }
}

impl Component for NorAlu {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.we.had_edge(net, Edge::Rising) {
            let a = self.a.value(net);
            let b = self.b.value(net);
            self.v = if self.func.value(net) == 0 {
                let carry = a & 0x100;
                carry | (!(a | b) & 0xff)
            } else {
                ((a & 0xff) + b) & 0x1ff
            };
        }
        if self.oe.value(net) == 1 {
            self.out.drive(net, self.v);
        } else {
            self.out.release(net);
        }
    }
}

/// Eight-state sequencer: four fetch states stream the instruction and
/// advance the PC, four execute states route the operand through the
/// ALU, store the accumulator, or load the PC on a taken jump.
pub struct Nor14Decoder {
    pub clk: Signal,
    pub instr: Signal,
    pub carry: Signal,
    pub z: Signal,

    pub ram_oe: Signal,
    pub ram_we: Signal,
    pub ar_oe: Signal,
    pub ar_we: Signal,
    pub ir_oe: Signal,
    pub ir_we: Signal,
    pub pc_we: Signal,
    pub pc_oe: Signal,
    pub pc_inc: Signal,
    pub a_oe: Signal,
    pub a_we: Signal,
    pub a_cc: Signal,
    pub alu_oe: Signal,
    pub alu_we: Signal,
    pub func: Signal,

    state: u8,
}

impl Nor14Decoder {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            clk: Signal::notify(net, id, "clk", 1),
            instr: Signal::notify(net, id, "instr", 2),
            carry: Signal::notify(net, id, "carry", 1),
            z: Signal::new(net, id, "z", 1),
            ram_oe: Signal::new(net, id, "ram_oe", 1),
            ram_we: Signal::new(net, id, "ram_we", 1),
            ar_oe: Signal::new(net, id, "ar_oe", 1),
            ar_we: Signal::new(net, id, "ar_we", 1),
            ir_oe: Signal::new(net, id, "ir_oe", 1),
            ir_we: Signal::new(net, id, "ir_we", 1),
            pc_we: Signal::new(net, id, "pc_we", 1),
            pc_oe: Signal::new(net, id, "pc_oe", 1),
            pc_inc: Signal::new(net, id, "pc_inc", 1),
            a_oe: Signal::new(net, id, "a_oe", 1),
            a_we: Signal::new(net, id, "a_we", 1),
            a_cc: Signal::new(net, id, "a_cc", 1),
            alu_oe: Signal::new(net, id, "alu_oe", 1),
            alu_we: Signal::new(net, id, "alu_we", 1),
            func: Signal::new(net, id, "func", 1),
            state: 0,
        }
    }
}

impl Component for Nor14Decoder {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.clk.had_edge(net, Edge::Rising) {
            self.state = (self.state + 1) % 8;
        }
        let state = self.state;
        let instr = self.instr.value(net) as u8;
        let carry = self.carry.value(net);
        // 0b00 nor, 0b01 add, 0b10 sta, 0b11 jcc.
        let is_alu = instr <= 1;

        self.ram_oe
            .drive(net, u32::from(state <= 3 || (is_alu && state <= 5)));
        self.ar_oe.drive(net, u32::from(state > 3));
        self.ir_oe.drive(net, u32::from(state > 3));
        self.pc_oe.drive(net, u32::from(state <= 3));
        self.ir_we.drive(net, u32::from(state == 1));
        self.pc_inc.drive(net, u32::from(state == 2 || state == 4));
        self.ar_we.drive(net, u32::from(state == 3));

        self.alu_we.drive(net, u32::from(is_alu && state == 5));
        self.alu_oe
            .drive(net, u32::from(is_alu && (state == 5 || state == 6)));
        self.a_we.drive(net, u32::from(is_alu && state == 6));
        self.func.drive(net, u32::from(instr & 1));

        self.a_oe
            .drive(net, u32::from(instr == 2 && (state == 5 || state == 6)));
        self.ram_we.drive(net, u32::from(instr == 2 && state == 6));

        self.pc_we
            .drive(net, u32::from(instr == 3 && carry == 0 && state == 5));
        self.a_cc
            .drive(net, u32::from(instr == 3 && carry != 0 && state == 5));
    }

    fn reset(&mut self, net: &mut Netlist) {
        // `z` and `carry` are inputs; everything else starts low.
        for line in [
            &self.ram_oe, &self.ram_we, &self.ar_oe, &self.ar_we, &self.ir_oe, &self.ir_we,
            &self.pc_we, &self.pc_oe, &self.pc_inc, &self.a_oe, &self.a_we, &self.a_cc,
            &self.alu_oe, &self.alu_we, &self.func,
        ] {
            line.drive(net, 0);
        }
    }
}

pub struct Nor14System {
    sim: Sim,
    clk: Handle<Clock>,
    acc: Handle<Accumulator>,
    pcl: Handle<IncRegister>,
    pch: Handle<IncRegister>,
    ram: Handle<Ram>,
    display: Handle<MemDisplay>,
}

inventory::submit! {
    MachineEntry::new(
        "nor14",
        "Gate-level NOR machine with 16 KiB RAM and a 9-bit accumulator",
        || Ok(Box::new(Nor14System::new()?)),
    )
}

impl Nor14System {
    pub fn new() -> Result<Self, NetlistError> {
        let mut sim = Sim::new();
        let dec = sim.add("decoder", Nor14Decoder::new);
        let ram = sim.add("ram", |n, id| Ram::new(n, id, 14, 8));
        let display = sim.add("display", |n, id| {
            MemDisplay::display(n, id, 14, (1 << 14) - 5)
        });
        let clk = sim.add("clock", |n, id| Clock::new(n, id, 1));
        let acc = sim.add("accumulator", Accumulator::new);
        let ir = sim.add("ir", |n, id| IORegister::new(n, id, 8));
        let ar = sim.add("ar", |n, id| IORegister::new(n, id, 8));
        let pcl = sim.add("pcl", |n, id| IncRegister::new(n, id, 8));
        let pch = sim.add("pch", |n, id| IncRegister::new(n, id, 6));
        let alu = sim.add("alu", NorAlu::new);

        wire!(sim, sim.get(clk).clk.view(), sim.get(dec).clk.view())?;

        // Address bus: fetch drives it from the PC pair, execute from
        // the address register (low) and instruction register (high).
        wire!(sim, sim.get(ram).addr.slice(0..8), sim.get(ar).out.view())?;
        wire!(sim, sim.get(ram).addr.slice(0..8), sim.get(pcl).out.view())?;
        wire!(sim, sim.get(ram).addr.slice(8..14), sim.get(ir).out.slice(0..6))?;
        wire!(sim, sim.get(ram).addr.slice(8..14), sim.get(pch).out.view())?;
        wire!(sim, sim.get(ram).addr.view(), sim.get(display).addr.view())?;
        wire!(sim, sim.get(dec).pc_oe.view(), sim.get(pcl).oe.view())?;
        wire!(sim, sim.get(dec).pc_oe.view(), sim.get(pch).oe.view())?;
        wire!(sim, sim.get(dec).ir_oe.view(), sim.get(ir).oe.view())?;
        wire!(sim, sim.get(dec).ar_oe.view(), sim.get(ar).oe.view())?;

        // Data bus.
        wire!(sim, sim.get(ram).data.view(), sim.get(display).data.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(ir).inp.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(ar).inp.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(alu).b.view())?;
        wire!(sim, sim.get(ram).data.view(), sim.get(acc).out.slice(0..8))?;
        wire!(sim, sim.get(acc).inp.view(), sim.get(alu).out.view())?;

        wire!(sim, sim.get(dec).ar_we.view(), sim.get(ar).we.view())?;
        wire!(sim, sim.get(dec).ir_we.view(), sim.get(ir).we.view())?;
        wire!(sim, sim.get(dec).pc_we.view(), sim.get(pcl).we.view())?;
        wire!(sim, sim.get(dec).pc_we.view(), sim.get(pch).we.view())?;
        wire!(sim, sim.get(dec).pc_inc.view(), sim.get(pcl).inc.view())?;
        wire!(sim, sim.get(pcl).carry.view(), sim.get(pch).inc.view())?;

        // Jump target: the address register feeds PCL, the instruction
        // register's low bits feed PCH.
        wire!(sim, sim.get(dec).instr.view(), sim.get(ir).state.slice(6..8))?;
        wire!(sim, sim.get(pcl).inp.view(), sim.get(ar).state.view())?;
        wire!(sim, sim.get(pch).inp.view(), sim.get(ir).state.slice(0..6))?;

        wire!(sim, sim.get(dec).a_cc.view(), sim.get(acc).cc.view())?;

        // Memory strobes run through the display window.
        wire!(sim, sim.get(dec).ram_oe.view(), sim.get(display).oe.view())?;
        wire!(sim, sim.get(dec).ram_we.view(), sim.get(display).we.view())?;
        wire!(sim, sim.get(display).oe_out.view(), sim.get(ram).oe.view())?;
        wire!(sim, sim.get(display).we_out.view(), sim.get(ram).we.view())?;

        wire!(sim, sim.get(dec).a_oe.view(), sim.get(acc).oe.view())?;
        wire!(sim, sim.get(dec).a_we.view(), sim.get(acc).we.view())?;
        wire!(sim, sim.get(dec).alu_oe.view(), sim.get(alu).oe.view())?;
        wire!(sim, sim.get(dec).alu_we.view(), sim.get(alu).we.view())?;

        wire!(sim, sim.get(dec).carry.view(), sim.get(acc).state.bit(8))?;
        wire!(sim, sim.get(dec).z.view(), sim.get(acc).z.view())?;

        wire!(sim, sim.get(alu).a.view(), sim.get(acc).state.view())?;
        wire!(sim, sim.get(alu).func.view(), sim.get(dec).func.view())?;

        sim.with(pcl, |r, net| r.state.no_connect(net));
        sim.with(pch, |r, net| {
            r.state.no_connect(net);
            r.carry.no_connect(net);
        });
        sim.with(ir, |r, net| {
            let high = r.out.slice(6..8);
            net.no_connect(&high);
        });
        sim.with(acc, |r, net| {
            let carry_out = r.out.bit(8);
            net.no_connect(&carry_out);
        });

        Ok(Self {
            sim,
            clk,
            acc,
            pcl,
            pch,
            ram,
            display,
        })
    }

    pub fn acc(&self) -> u8 {
        (self.sim.get(self.acc).value() & 0xff) as u8
    }

    pub fn ram_byte(&self, addr: u16) -> u8 {
        self.sim.get(self.ram).ram[addr as usize]
    }
}

impl Machine for Nor14System {
    fn name(&self) -> &'static str {
        "nor14"
    }

    fn assemble(&mut self, path: &str, source: &str) -> Result<(), AsmError> {
        let image = assemble_nor(path, source, NorConfig::nor14(), true)?;
        self.sim.get_mut(self.ram).load(&image);
        Ok(())
    }

    fn reset(&mut self) {
        self.sim.reset();
    }

    fn machine_cycle(&mut self) {
        // Eight sequencer states, two clock ticks each.
        for _ in 0..16 {
            self.sim.tick(self.clk);
        }
    }

    fn pc(&self) -> u16 {
        let l = self.sim.get(self.pcl).value() as u16;
        let h = self.sim.get(self.pch).value() as u16;
        (h << 8) | l
    }

    fn halt_threshold(&self) -> u32 {
        2
    }

    fn trace(&self) -> String {
        let acc = self.sim.get(self.acc).value();
        format!(
            "PC: 0x{:04x} A: 0x{:02x} C: {}",
            self.pc(),
            acc & 0xff,
            u8::from(acc & 0x100 != 0)
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
