//! Clock-phase decoder for the canonical 8-bit machine.
//!
//! A 2-bit clock produces four micro-op windows per machine cycle:
//!
//! - m1 (phases 0-1): instruction register latches from ROM; for mov,
//!   ALU, and memory writes the source drives the register bus.
//! - m2 (phase 1): the temporary T latches the bus; ALU ops also latch
//!   the flags register.
//! - m3 (phases 2-3): T (or the IR immediate, or RAM) drives the bus;
//!   the address-pair selector routes C:D or G:H.
//! - m4 (phase 3): the destination latches; the PC increments unless a
//!   taken jump loads it instead.
//!
//! Memory reads bypass T: RAM drives the bus during m3 and the
//! destination latches straight off it at m4.

use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Netlist, SignalId};
use filament_core::core::signal::Signal;

use crate::micro8::alu::flag;

pub struct Decoder {
    pub instr: Signal,
    pub clk: Signal,
    pub flags: Signal,

    pub al_ie: Signal,
    pub ah_ie: Signal,
    pub bl_ie: Signal,
    pub bh_ie: Signal,
    pub cl_ie: Signal,
    pub ch_ie: Signal,
    pub dl_ie: Signal,
    pub dh_ie: Signal,
    pub e_ie: Signal,
    pub f_ie: Signal,
    pub g_ie: Signal,
    pub h_ie: Signal,
    pub t_ie: Signal,
    pub flags_ie: Signal,

    pub a_oe: Signal,
    pub b_oe: Signal,
    pub c_oe: Signal,
    pub d_oe: Signal,
    pub e_oe: Signal,
    pub f_oe: Signal,
    pub g_oe: Signal,
    pub h_oe: Signal,
    pub t_oe: Signal,

    pub pc_inc: Signal,
    pub pc_ie: Signal,

    pub ir_ie: Signal,
    pub ir_oe: Signal,

    pub alu_fn: Signal,
    pub alu_oe: Signal,

    pub sel_cd: Signal,
    pub sel_gh: Signal,

    pub mem_oe: Signal,
    pub mem_we: Signal,
}

impl Decoder {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            instr: Signal::notify(net, id, "instr", 8),
            clk: Signal::notify(net, id, "clk", 2),
            flags: Signal::notify(net, id, "flags", 4),
            al_ie: Signal::new(net, id, "al_ie", 1),
            ah_ie: Signal::new(net, id, "ah_ie", 1),
            bl_ie: Signal::new(net, id, "bl_ie", 1),
            bh_ie: Signal::new(net, id, "bh_ie", 1),
            cl_ie: Signal::new(net, id, "cl_ie", 1),
            ch_ie: Signal::new(net, id, "ch_ie", 1),
            dl_ie: Signal::new(net, id, "dl_ie", 1),
            dh_ie: Signal::new(net, id, "dh_ie", 1),
            e_ie: Signal::new(net, id, "e_ie", 1),
            f_ie: Signal::new(net, id, "f_ie", 1),
            g_ie: Signal::new(net, id, "g_ie", 1),
            h_ie: Signal::new(net, id, "h_ie", 1),
            t_ie: Signal::new(net, id, "t_ie", 1),
            flags_ie: Signal::new(net, id, "flags_ie", 1),
            a_oe: Signal::new(net, id, "a_oe", 1),
            b_oe: Signal::new(net, id, "b_oe", 1),
            c_oe: Signal::new(net, id, "c_oe", 1),
            d_oe: Signal::new(net, id, "d_oe", 1),
            e_oe: Signal::new(net, id, "e_oe", 1),
            f_oe: Signal::new(net, id, "f_oe", 1),
            g_oe: Signal::new(net, id, "g_oe", 1),
            h_oe: Signal::new(net, id, "h_oe", 1),
            t_oe: Signal::new(net, id, "t_oe", 1),
            pc_inc: Signal::new(net, id, "pc_inc", 1),
            pc_ie: Signal::new(net, id, "pc_ie", 1),
            ir_ie: Signal::new(net, id, "ir_ie", 1),
            ir_oe: Signal::new(net, id, "ir_oe", 1),
            alu_fn: Signal::new(net, id, "alu_fn", 4),
            alu_oe: Signal::new(net, id, "alu_oe", 1),
            sel_cd: Signal::new(net, id, "sel_cd", 1),
            sel_gh: Signal::new(net, id, "sel_gh", 1),
            mem_oe: Signal::new(net, id, "mem_oe", 1),
            mem_we: Signal::new(net, id, "mem_we", 1),
        }
    }

    fn condition(ttt: u8, flags: u8) -> bool {
        let z = flags & flag::Z != 0;
        let n = flags & flag::N != 0;
        let v = flags & flag::V != 0;
        let c = flags & flag::C != 0;
        match ttt & 0x7 {
            0 => true,
            1 => z,
            2 => n,
            3 => n ^ v,
            4 => c,
            5 => v,
            _ => false,
        }
    }
}

impl Component for Decoder {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let phase = self.clk.value(net);
        let m1 = phase <= 1;
        let m2 = phase == 1;
        let m3 = phase >= 2;
        let m4 = phase == 3;

        let instr = self.instr.value(net) as u8;
        let b7 = instr & 0x80 != 0;
        let b6 = instr & 0x40 != 0;
        let b5 = instr & 0x20 != 0;
        let b4 = instr & 0x10 != 0;

        let mut reg_ie = [false; 8];
        let mut reg_oe = [false; 8];
        let mut t_ie = false;
        let mut t_oe = false;
        let mut sel_cd = false;
        let mut sel_gh = false;

        // IMM
        let is_imm = !b7;
        let imm_high = b4;
        let imm_dest = usize::from((instr >> 5) & 3);
        let ir_oe = m3 && is_imm;

        // MOV
        let is_mov = b7 && !b6;
        let mov_src = usize::from((instr >> 3) & 7);
        let mov_dst = usize::from(instr & 7);
        if is_mov {
            reg_oe[mov_src] |= m1;
            reg_ie[mov_dst] |= m4;
            t_ie |= m2;
            t_oe |= m3;
        }

        // ALU
        let is_alu = b7 && b6 && !b5;
        let alu_fn = u32::from((instr >> 1) & 0xf);
        let alu_oe = m1 && is_alu;
        let flags_ie = m2 && is_alu;
        if is_alu {
            t_ie |= m2;
            t_oe |= m3;
            // Destination bit selects A or C.
            if instr & 1 == 0 {
                reg_ie[0] |= m4;
            } else {
                reg_ie[2] |= m4;
            }
        }

        // MEM
        let is_mem = b7 && b6 && b5 && !b4;
        let is_mem_write = is_mem && instr & 0x2 != 0;
        let is_mem_read = is_mem && instr & 0x2 == 0;
        // Bus registers A, B, E, F.
        let mem_reg = [0usize, 1, 4, 5][usize::from((instr >> 2) & 3)];
        if is_mem {
            sel_cd |= m3 && instr & 1 == 0;
            sel_gh |= m3 && instr & 1 != 0;
        }
        if is_mem_write {
            reg_oe[mem_reg] |= m1;
            t_ie |= m2;
            t_oe |= m3;
        }
        if is_mem_read {
            reg_ie[mem_reg] |= m4;
        }
        let mem_we = m4 && is_mem_write;
        let mem_oe = m3 && is_mem_read;

        // JMP
        let is_jmp = b7 && b6 && b5 && b4;
        let do_jmp = Self::condition(instr & 0x7, self.flags.value(net) as u8);
        if is_jmp {
            sel_cd |= m3 && instr & 0x8 == 0;
            sel_gh |= m3 && instr & 0x8 != 0;
        }
        let pc_ie = m4 && is_jmp && do_jmp;
        let pc_inc = m4 && !(is_jmp && do_jmp);

        // Bus and address providers strictly before latch strobes: a
        // strobe edge must find its data already driven within the same
        // settle pass.
        let lines: [(&Signal, bool); 31] = [
            (&self.ir_oe, ir_oe),
            (&self.a_oe, reg_oe[0]),
            (&self.b_oe, reg_oe[1]),
            (&self.c_oe, reg_oe[2]),
            (&self.d_oe, reg_oe[3]),
            (&self.e_oe, reg_oe[4]),
            (&self.f_oe, reg_oe[5]),
            (&self.g_oe, reg_oe[6]),
            (&self.h_oe, reg_oe[7]),
            (&self.t_oe, t_oe),
            (&self.alu_oe, alu_oe),
            (&self.sel_cd, sel_cd),
            (&self.sel_gh, sel_gh),
            (&self.mem_oe, mem_oe),
            (&self.ir_ie, m1),
            (&self.al_ie, reg_ie[0] || (m4 && is_imm && imm_dest == 0 && !imm_high)),
            (&self.ah_ie, reg_ie[0] || (m4 && is_imm && imm_dest == 0 && imm_high)),
            (&self.bl_ie, reg_ie[1] || (m4 && is_imm && imm_dest == 1 && !imm_high)),
            (&self.bh_ie, reg_ie[1] || (m4 && is_imm && imm_dest == 1 && imm_high)),
            (&self.cl_ie, reg_ie[2] || (m4 && is_imm && imm_dest == 2 && !imm_high)),
            (&self.ch_ie, reg_ie[2] || (m4 && is_imm && imm_dest == 2 && imm_high)),
            (&self.dl_ie, reg_ie[3] || (m4 && is_imm && imm_dest == 3 && !imm_high)),
            (&self.dh_ie, reg_ie[3] || (m4 && is_imm && imm_dest == 3 && imm_high)),
            (&self.e_ie, reg_ie[4]),
            (&self.f_ie, reg_ie[5]),
            (&self.g_ie, reg_ie[6]),
            (&self.h_ie, reg_ie[7]),
            (&self.t_ie, t_ie),
            (&self.flags_ie, flags_ie),
            (&self.mem_we, mem_we),
            (&self.pc_ie, pc_ie),
        ];
        // Drop lines first, then assert, so transient bus contention
        // between consecutive phases stays minimal.
        for (line, level) in lines {
            if !level {
                line.drive(net, 0);
            }
        }
        self.alu_fn.drive(net, alu_fn);
        for (line, level) in lines {
            if level {
                line.drive(net, 1);
            }
        }
        self.pc_inc.drive(net, u32::from(pc_inc));
    }

    fn reset(&mut self, net: &mut Netlist) {
        let low = [
            &self.al_ie, &self.ah_ie, &self.bl_ie, &self.bh_ie, &self.cl_ie, &self.ch_ie,
            &self.dl_ie, &self.dh_ie, &self.e_ie, &self.f_ie, &self.g_ie, &self.h_ie,
            &self.t_ie, &self.flags_ie, &self.a_oe, &self.b_oe, &self.c_oe, &self.d_oe,
            &self.e_oe, &self.f_oe, &self.g_oe, &self.h_oe, &self.t_oe, &self.pc_inc,
            &self.pc_ie, &self.ir_oe, &self.alu_oe, &self.sel_cd, &self.sel_gh,
            &self.mem_oe, &self.mem_we,
        ];
        for line in low {
            line.drive(net, 0);
        }
        self.alu_fn.drive(net, 0);
    }
}
