//! The 16-function ALU of the canonical 8-bit machine.
//!
//! Operands are always the A and B register states; the destination
//! enable chosen by the decoder routes the result. Flags use
//! two's-complement semantics: `n` is the sign bit of the result, `v`
//! is signed overflow. Arithmetic writes all four flags; bitwise and
//! shift functions write `z`/`n`, clear `v`, and leave `c` alone.

use filament_asm::micro8::alu_fn;
use filament_core::core::component::Component;
use filament_core::core::netlist::{ComponentId, Netlist, SignalId};
use filament_core::core::signal::Signal;

/// Flag bit assignments, shared with the decoder's condition logic.
pub mod flag {
    pub const C: u8 = 1 << 0;
    pub const V: u8 = 1 << 1;
    pub const N: u8 = 1 << 2;
    pub const Z: u8 = 1 << 3;
}

pub struct Alu {
    pub a: Signal,
    pub b: Signal,
    pub func: Signal,
    pub flags_in: Signal,
    pub oe: Signal,
    pub out: Signal,
    pub flags_out: Signal,
}

impl Alu {
    pub fn new(net: &mut Netlist, id: ComponentId) -> Self {
        Self {
            a: Signal::notify(net, id, "a", 8),
            b: Signal::notify(net, id, "b", 8),
            func: Signal::notify(net, id, "func", 4),
            flags_in: Signal::notify(net, id, "flags_in", 4),
            oe: Signal::notify(net, id, "oe", 1),
            out: Signal::new(net, id, "out", 8),
            flags_out: Signal::new(net, id, "flags_out", 4),
        }
    }
}

impl Component for Alu {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.oe.value(net) == 1 {
            let a = self.a.value(net) as u8;
            let b = self.b.value(net) as u8;
            let func = self.func.value(net) as u8;
            let flags = self.flags_in.value(net) as u8;
            let (out, flags) = evaluate(func, a, b, flags);
            self.out.drive(net, u32::from(out));
            self.flags_out.drive(net, u32::from(flags));
        } else {
            self.out.release(net);
            self.flags_out.release(net);
        }
    }
}

fn zn(r: u8) -> u8 {
    let mut f = 0;
    if r == 0 {
        f |= flag::Z;
    }
    if r & 0x80 != 0 {
        f |= flag::N;
    }
    f
}

/// Signed overflow for `a + b = r`.
fn add_overflow(a: u8, b: u8, r: u8) -> bool {
    (a ^ r) & (b ^ r) & 0x80 != 0
}

/// Signed overflow for `a - b = r`.
fn sub_overflow(a: u8, b: u8, r: u8) -> bool {
    (a ^ b) & (a ^ r) & 0x80 != 0
}

/// One ALU evaluation: `(result, new flags)`.
pub(crate) fn evaluate(func: u8, a: u8, b: u8, flags: u8) -> (u8, u8) {
    let carry_in = u8::from(flags & flag::C != 0);
    match func {
        alu_fn::NOT => logic(!a, flags),
        alu_fn::XOR => logic(a ^ b, flags),
        alu_fn::OR => logic(a | b, flags),
        alu_fn::AND => logic(a & b, flags),
        alu_fn::ADD => {
            let wide = u16::from(a) + u16::from(b) + u16::from(carry_in);
            let r = wide as u8;
            let mut f = zn(r);
            if wide > 0xff {
                f |= flag::C;
            }
            if add_overflow(a, b, r) {
                f |= flag::V;
            }
            (r, f)
        }
        alu_fn::SUB => {
            let r = a.wrapping_sub(b).wrapping_sub(carry_in);
            let mut f = zn(r);
            if u16::from(a) < u16::from(b) + u16::from(carry_in) {
                f |= flag::C;
            }
            if sub_overflow(a, b, r) {
                f |= flag::V;
            }
            (r, f)
        }
        alu_fn::CMP => {
            // Flags from a - b; the destination reloads the unchanged
            // operand.
            let r = a.wrapping_sub(b);
            let mut f = zn(r);
            if a < b {
                f |= flag::C;
            }
            if sub_overflow(a, b, r) {
                f |= flag::V;
            }
            (a, f)
        }
        alu_fn::SHL => logic(a << 1, flags),
        alu_fn::SHR => logic(a >> 1, flags),
        alu_fn::INC => {
            let r = a.wrapping_add(1);
            let mut f = zn(r);
            if a == 0xff {
                f |= flag::C;
            }
            if a == 0x7f {
                f |= flag::V;
            }
            (r, f)
        }
        alu_fn::DEC => {
            let r = a.wrapping_sub(1);
            let mut f = zn(r);
            if a == 0 {
                f |= flag::C;
            }
            if a == 0x80 {
                f |= flag::V;
            }
            (r, f)
        }
        alu_fn::NEG => {
            let r = a.wrapping_neg();
            let mut f = zn(r);
            if a != 0 {
                f |= flag::C;
            }
            if a == 0x80 {
                f |= flag::V;
            }
            (r, f)
        }
        alu_fn::CLF => (a, 0),
        alu_fn::INV => (a, !flags & 0xf),
        alu_fn::ROL => logic(a.rotate_left(1), flags),
        _ => logic(a.rotate_right(1), flags),
    }
}

/// Bitwise/shift flag rule: z and n from the result, v cleared, carry
/// untouched.
fn logic(r: u8, flags: u8) -> (u8, u8) {
    (r, zn(r) | (flags & flag::C))
}
