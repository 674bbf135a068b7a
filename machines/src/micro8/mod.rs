//! The canonical 8-bit machine: eight registers A-H (A-D with split
//! nibble loads), a hidden temporary T, a 4-bit flags register, a
//! 16-function ALU, a 16-bit program counter split into two 8-bit
//! halves, separate ROM and RAM, and a two-cell display mapped over the
//! bottom of RAM.

pub mod alu;
pub mod decoder;
pub mod reg;

use filament_asm::{assemble_micro8, AsmError};
use filament_core::core::sim::{Handle, Sim};
use filament_core::core::NetlistError;
use filament_core::device::{BusConnect, Clock, MemDisplay, Power, Ram, Register, Rom};
use filament_core::wire;

use crate::machine::Machine;
use crate::micro8::alu::Alu;
use crate::micro8::decoder::Decoder;
use crate::micro8::reg::{InstructionRegister, ProgramCounter};
use crate::registry::MachineEntry;

pub struct Micro8System {
    sim: Sim,
    clk: Handle<Clock>,
    regs: [Handle<Register>; 8],
    reg_t: Handle<Register>,
    flags: Handle<Register>,
    rom: Handle<Rom>,
    ram: Handle<Ram>,
    display: Handle<MemDisplay>,
    pc_l: Handle<ProgramCounter>,
    pc_h: Handle<ProgramCounter>,
    started: bool,
}

inventory::submit! {
    MachineEntry::new(
        "micro8",
        "8-bit CPU with registers A-H, 16-function ALU, 64 KiB ROM+RAM",
        || Ok(Box::new(Micro8System::new()?)),
    )
}

impl Micro8System {
    pub fn new() -> Result<Self, NetlistError> {
        let mut sim = Sim::new();

        let power = sim.add("power", Power::new);
        let clk = sim.add("clock", |n, id| Clock::new(n, id, 2));
        let alu = sim.add("alu", Alu::new);
        let reg_a = sim.add("reg_a", |n, id| Register::split(n, id, 8, 4));
        let reg_b = sim.add("reg_b", |n, id| Register::split(n, id, 8, 4));
        let reg_c = sim.add("reg_c", |n, id| Register::split(n, id, 8, 4));
        let reg_d = sim.add("reg_d", |n, id| Register::split(n, id, 8, 4));
        let reg_e = sim.add("reg_e", |n, id| Register::new(n, id, 8));
        let reg_f = sim.add("reg_f", |n, id| Register::new(n, id, 8));
        let reg_g = sim.add("reg_g", |n, id| Register::new(n, id, 8));
        let reg_h = sim.add("reg_h", |n, id| Register::new(n, id, 8));
        let reg_t = sim.add("reg_t", |n, id| Register::new(n, id, 8));
        let flags = sim.add("reg_flags", |n, id| Register::new(n, id, 4));
        let dec = sim.add("decoder", Decoder::new);
        let ir = sim.add("ir", InstructionRegister::new);
        let pc_l = sim.add("pc_l", ProgramCounter::new);
        let pc_h = sim.add("pc_h", ProgramCounter::new);
        let sel_cd = sim.add("sel_cd", |n, id| BusConnect::new(n, id, 16));
        let sel_gh = sim.add("sel_gh", |n, id| BusConnect::new(n, id, 16));
        let rom = sim.add("rom", |n, id| Rom::new(n, id, 16, 8));
        let ram = sim.add("ram", |n, id| Ram::new(n, id, 16, 8));
        let display = sim.add("display", |n, id| MemDisplay::display(n, id, 16, 0));

        let regs = [reg_a, reg_b, reg_c, reg_d, reg_e, reg_f, reg_g, reg_h];

        // Register bus: every register's data port, the ALU result, the
        // IR immediate, and the RAM/display data port share one bus.
        for r in regs {
            wire!(sim, sim.get(reg_t).data.view(), sim.get(r).data.view())?;
        }
        wire!(sim, sim.get(reg_t).data.view(), sim.get(alu).out.view())?;
        wire!(sim, sim.get(reg_t).data.view(), sim.get(ir).imm.view())?;
        wire!(sim, sim.get(reg_t).data.view(), sim.get(ram).data.view())?;
        wire!(sim, sim.get(reg_t).data.view(), sim.get(display).data.view())?;

        // Program counter chain.
        wire!(sim, sim.get(dec).pc_inc.view(), sim.get(pc_l).inc.view())?;
        wire!(sim, sim.get(pc_l).co.view(), sim.get(pc_h).inc.view())?;
        wire!(sim, sim.get(dec).pc_ie.view(), sim.get(pc_l).ie.view())?;
        wire!(sim, sim.get(dec).pc_ie.view(), sim.get(pc_h).ie.view())?;
        wire!(sim, sim.get(power).low.view(), sim.get(pc_l).rst.view())?;
        wire!(sim, sim.get(power).low.view(), sim.get(pc_h).rst.view())?;

        // Instruction fetch.
        wire!(sim, sim.get(power).high.view(), sim.get(rom).oe.view())?;
        wire!(sim, sim.get(rom).addr.slice(0..8), sim.get(pc_l).addr.view())?;
        wire!(sim, sim.get(rom).addr.slice(8..16), sim.get(pc_h).addr.view())?;
        wire!(sim, sim.get(rom).data.view(), sim.get(ir).data.view())?;
        wire!(sim, sim.get(dec).ir_ie.view(), sim.get(ir).ie.view())?;
        wire!(sim, sim.get(dec).ir_oe.view(), sim.get(ir).oe.view())?;

        // Decoder inputs.
        wire!(sim, sim.get(ir).instr.view(), sim.get(dec).instr.view())?;
        wire!(sim, sim.get(clk).clk.view(), sim.get(dec).clk.view())?;
        wire!(sim, sim.get(flags).state.view(), sim.get(dec).flags.view())?;

        // Register write enables: A-D load in nibble halves.
        wire!(sim, sim.get(dec).al_ie.view(), sim.get(reg_a).ie.bit(0))?;
        wire!(sim, sim.get(dec).ah_ie.view(), sim.get(reg_a).ie.bit(1))?;
        wire!(sim, sim.get(dec).bl_ie.view(), sim.get(reg_b).ie.bit(0))?;
        wire!(sim, sim.get(dec).bh_ie.view(), sim.get(reg_b).ie.bit(1))?;
        wire!(sim, sim.get(dec).cl_ie.view(), sim.get(reg_c).ie.bit(0))?;
        wire!(sim, sim.get(dec).ch_ie.view(), sim.get(reg_c).ie.bit(1))?;
        wire!(sim, sim.get(dec).dl_ie.view(), sim.get(reg_d).ie.bit(0))?;
        wire!(sim, sim.get(dec).dh_ie.view(), sim.get(reg_d).ie.bit(1))?;
        wire!(sim, sim.get(dec).e_ie.view(), sim.get(reg_e).ie.view())?;
        wire!(sim, sim.get(dec).f_ie.view(), sim.get(reg_f).ie.view())?;
        wire!(sim, sim.get(dec).g_ie.view(), sim.get(reg_g).ie.view())?;
        wire!(sim, sim.get(dec).h_ie.view(), sim.get(reg_h).ie.view())?;
        wire!(sim, sim.get(dec).t_ie.view(), sim.get(reg_t).ie.view())?;
        wire!(sim, sim.get(dec).flags_ie.view(), sim.get(flags).ie.view())?;

        // Register output enables.
        wire!(sim, sim.get(dec).a_oe.view(), sim.get(reg_a).oe.view())?;
        wire!(sim, sim.get(dec).b_oe.view(), sim.get(reg_b).oe.view())?;
        wire!(sim, sim.get(dec).c_oe.view(), sim.get(reg_c).oe.view())?;
        wire!(sim, sim.get(dec).d_oe.view(), sim.get(reg_d).oe.view())?;
        wire!(sim, sim.get(dec).e_oe.view(), sim.get(reg_e).oe.view())?;
        wire!(sim, sim.get(dec).f_oe.view(), sim.get(reg_f).oe.view())?;
        wire!(sim, sim.get(dec).g_oe.view(), sim.get(reg_g).oe.view())?;
        wire!(sim, sim.get(dec).h_oe.view(), sim.get(reg_h).oe.view())?;
        wire!(sim, sim.get(dec).t_oe.view(), sim.get(reg_t).oe.view())?;

        // ALU operands come straight from the register states.
        wire!(sim, sim.get(dec).alu_fn.view(), sim.get(alu).func.view())?;
        wire!(sim, sim.get(dec).alu_oe.view(), sim.get(alu).oe.view())?;
        wire!(sim, sim.get(alu).a.view(), sim.get(reg_a).state.view())?;
        wire!(sim, sim.get(alu).b.view(), sim.get(reg_b).state.view())?;
        wire!(sim, sim.get(alu).flags_in.view(), sim.get(flags).state.view())?;
        wire!(sim, sim.get(alu).flags_out.view(), sim.get(flags).data.view())?;

        // Address-pair selectors bridge the register states onto the
        // shared RAM-address / PC-data bus.
        wire!(sim, sim.get(sel_cd).a.slice(0..8), sim.get(reg_d).state.view())?;
        wire!(sim, sim.get(sel_cd).a.slice(8..16), sim.get(reg_c).state.view())?;
        wire!(sim, sim.get(sel_gh).a.slice(0..8), sim.get(reg_h).state.view())?;
        wire!(sim, sim.get(sel_gh).a.slice(8..16), sim.get(reg_g).state.view())?;
        wire!(sim, sim.get(pc_l).data.view(), sim.get(sel_cd).b.slice(0..8))?;
        wire!(sim, sim.get(pc_h).data.view(), sim.get(sel_cd).b.slice(8..16))?;
        wire!(sim, sim.get(pc_l).data.view(), sim.get(sel_gh).b.slice(0..8))?;
        wire!(sim, sim.get(pc_h).data.view(), sim.get(sel_gh).b.slice(8..16))?;
        wire!(sim, sim.get(pc_l).data.view(), sim.get(ram).addr.slice(0..8))?;
        wire!(sim, sim.get(pc_h).data.view(), sim.get(ram).addr.slice(8..16))?;
        wire!(sim, sim.get(ram).addr.view(), sim.get(display).addr.view())?;
        wire!(sim, sim.get(dec).sel_cd.view(), sim.get(sel_cd).a_to_b.view())?;
        wire!(sim, sim.get(dec).sel_gh.view(), sim.get(sel_gh).a_to_b.view())?;
        wire!(sim, sim.get(power).low.view(), sim.get(sel_cd).b_to_a.view())?;
        wire!(sim, sim.get(power).low.view(), sim.get(sel_gh).b_to_a.view())?;

        // Memory strobes run through the display device, which claims
        // the two I/O cells and forwards everything else to RAM.
        wire!(sim, sim.get(dec).mem_oe.view(), sim.get(display).oe.view())?;
        wire!(sim, sim.get(dec).mem_we.view(), sim.get(display).we.view())?;
        wire!(sim, sim.get(display).oe_out.view(), sim.get(ram).oe.view())?;
        wire!(sim, sim.get(display).we_out.view(), sim.get(ram).we.view())?;

        // Intentionally unwired read-outs.
        sim.with(reg_e, |r, net| r.state.no_connect(net));
        sim.with(reg_f, |r, net| r.state.no_connect(net));
        sim.with(reg_t, |r, net| r.state.no_connect(net));
        sim.with(flags, |r, net| r.oe.no_connect(net));
        sim.with(pc_h, |p, net| p.co.no_connect(net));

        Ok(Self {
            sim,
            clk,
            regs,
            reg_t,
            flags,
            rom,
            ram,
            display,
            pc_l,
            pc_h,
            started: false,
        })
    }

    pub fn register(&self, index: usize) -> u8 {
        self.sim.get(self.regs[index]).value() as u8
    }

    pub fn temp(&self) -> u8 {
        self.sim.get(self.reg_t).value() as u8
    }

    pub fn flag_bits(&self) -> u8 {
        self.sim.get(self.flags).value() as u8
    }

    pub fn ram_byte(&self, addr: u16) -> u8 {
        self.sim.get(self.ram).ram[addr as usize]
    }

    pub fn ram_contents(&self) -> &[u8] {
        &self.sim.get(self.ram).ram
    }
}

impl Machine for Micro8System {
    fn name(&self) -> &'static str {
        "micro8"
    }

    fn assemble(&mut self, path: &str, source: &str) -> Result<(), AsmError> {
        let image = assemble_micro8(path, source, 1 << 16)?;
        self.sim.get_mut(self.rom).load(&image);
        Ok(())
    }

    fn reset(&mut self) {
        self.started = false;
        self.sim.reset();
    }

    fn machine_cycle(&mut self) {
        // The clock resets to phase 0, so the very first cycle reaches
        // phase 3 in three ticks.
        let ticks = if self.started { 4 } else { 3 };
        self.started = true;
        for _ in 0..ticks {
            self.sim.tick(self.clk);
        }
    }

    fn pc(&self) -> u16 {
        let l = self.sim.get(self.pc_l).value();
        let h = self.sim.get(self.pc_h).value();
        u16::from_le_bytes([l, h])
    }

    fn halt_threshold(&self) -> u32 {
        2
    }

    fn trace(&self) -> String {
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let regs: Vec<String> = names
            .iter()
            .zip(self.regs)
            .map(|(n, h)| format!("{n}: 0x{:02x}", self.sim.get(h).value()))
            .collect();
        format!(
            "PC: 0x{:04x} {} T: 0x{:02x} F: 0x{:x}",
            self.pc(),
            regs.join(" "),
            self.temp(),
            self.flag_bits()
        )
    }

    fn image_dump(&self) -> String {
        self.sim.get(self.rom).dump_nonzero()
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
