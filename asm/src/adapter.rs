//! Drives an encoder from parsed statements, one dialect per machine
//! family. Pseudo-instructions that decompose into primitives (`clr`,
//! `sub`, `jmp`, `out`, the inverted jump conditions) are expanded here.

use crate::ast::{Arg, Item, Statement};
use crate::error::{AsmError, AsmErrorKind, Span};
use crate::micro8::{alu_fn, jump_cond, Micro8Assembler};
use crate::nor::{NorAssembler, NorConfig};
use crate::parser;

fn err(path: &str, span: Span, kind: AsmErrorKind) -> AsmError {
    AsmError::new(path, Some(span), kind)
}

/// Assemble source for the canonical 8-bit machine into a ROM image.
pub fn assemble_micro8(path: &str, source: &str, size: usize) -> Result<Vec<u8>, AsmError> {
    let statements = parser::parse(path, source)?;
    let mut asm = Micro8Assembler::new(size);

    for stmt in &statements {
        let span = stmt.span;
        if let Some(name) = &stmt.label {
            let label = asm.label_ref(name, Some(span));
            asm.bind(label).map_err(|kind| err(path, span, kind))?;
        }
        let (mnemonic, args) = match &stmt.item {
            Some(Item::Op { mnemonic, args }) => (mnemonic.as_str(), args.as_slice()),
            Some(Item::Org(_)) | Some(Item::Page { .. }) => {
                return Err(err(
                    path,
                    span,
                    AsmErrorKind::Syntax("directive not supported on this machine".to_string()),
                ));
            }
            None => continue,
        };
        micro8_op(path, &mut asm, mnemonic, args, span)?;
    }

    asm.finish()
        .map_err(|(span, kind)| AsmError::new(path, span, kind))
}

fn micro8_op(
    path: &str,
    asm: &mut Micro8Assembler,
    mnemonic: &str,
    args: &[Arg],
    span: Span,
) -> Result<(), AsmError> {
    let wrap = |kind| err(path, span, kind);
    let wrong = |expected| {
        err(
            path,
            span,
            AsmErrorKind::WrongOperands {
                op: mnemonic.to_string(),
                expected,
            },
        )
    };

    match mnemonic {
        "load" => match args {
            // `load al, 3` writes one nibble; `load a, 0x12` both halves;
            // `load c:d, addr` a 16-bit immediate or label.
            [Arg::Ident(reg), Arg::Number(v)] if reg.len() == 2 => {
                asm.load(reg, *v as u8).map_err(wrap)
            }
            [Arg::Ident(reg), Arg::Number(v)] => asm.load8(reg, *v as u8).map_err(wrap),
            [Arg::Pair(pair), Arg::Number(v)] => asm.load16(pair, *v as u16).map_err(wrap),
            [Arg::Pair(pair), Arg::Ident(name)] => {
                let label = asm.label_ref(name, Some(span));
                asm.load_label(pair, label).map_err(wrap)
            }
            _ => Err(wrong("a register and a value")),
        },
        "load8" => match args {
            [Arg::Ident(reg), Arg::Number(v)] => asm.load8(reg, *v as u8).map_err(wrap),
            _ => Err(wrong("a register and a byte")),
        },
        "load16" => match args {
            [Arg::Pair(pair), Arg::Number(v)] => asm.load16(pair, *v as u16).map_err(wrap),
            [Arg::Pair(pair), Arg::Ident(name)] => {
                let label = asm.label_ref(name, Some(span));
                asm.load_label(pair, label).map_err(wrap)
            }
            _ => Err(wrong("a register pair and a word or label")),
        },
        "mov" => match args {
            [Arg::Ident(dst), Arg::Ident(src)] => asm.mov(dst, src).map_err(wrap),
            [Arg::Pair(dst), Arg::Pair(src)] => asm.mov16(dst, src).map_err(wrap),
            _ => Err(wrong("two registers or two pairs")),
        },
        "mov16" => match args {
            [Arg::Pair(dst), Arg::Pair(src)] => asm.mov16(dst, src).map_err(wrap),
            _ => Err(wrong("two register pairs")),
        },
        "not" | "xor" | "or" | "and" | "add" | "sub" | "shl" | "shr" | "inc" | "dec"
        | "neg" | "rol" | "ror" => {
            let func = match mnemonic {
                "not" => alu_fn::NOT,
                "xor" => alu_fn::XOR,
                "or" => alu_fn::OR,
                "and" => alu_fn::AND,
                "add" => alu_fn::ADD,
                "sub" => alu_fn::SUB,
                "shl" => alu_fn::SHL,
                "shr" => alu_fn::SHR,
                "inc" => alu_fn::INC,
                "dec" => alu_fn::DEC,
                "neg" => alu_fn::NEG,
                "rol" => alu_fn::ROL,
                _ => alu_fn::ROR,
            };
            match args {
                [Arg::Ident(dst)] => asm.alu(dst, func).map_err(wrap),
                [] => asm.alu("a", func).map_err(wrap),
                _ => Err(wrong("a destination register")),
            }
        }
        "cmp" => match args {
            [] => asm.alu("a", alu_fn::CMP).map_err(wrap),
            _ => Err(wrong("no operands")),
        },
        "clf" => match args {
            [] => asm.alu("a", alu_fn::CLF).map_err(wrap),
            _ => Err(wrong("no operands")),
        },
        "inv" => match args {
            [] => asm.alu("a", alu_fn::INV).map_err(wrap),
            _ => Err(wrong("no operands")),
        },
        "rmem" => match args {
            [Arg::Ident(dst), Arg::Pair(addr)] => asm.rmem(dst, addr).map_err(wrap),
            _ => Err(wrong("a register and an address pair")),
        },
        "wmem" => match args {
            [Arg::Pair(addr), Arg::Ident(src)] => asm.wmem(addr, src).map_err(wrap),
            _ => Err(wrong("an address pair and a register")),
        },
        "jmp" | "jz" | "je" | "jn" | "jls" | "jc" | "jlu" | "jo" => {
            let cond = match mnemonic {
                "jmp" => jump_cond::ALWAYS,
                "jz" | "je" => jump_cond::ZERO,
                "jn" => jump_cond::NEGATIVE,
                "jls" => jump_cond::LESS_SIGNED,
                "jc" | "jlu" => jump_cond::CARRY,
                _ => jump_cond::OVERFLOW,
            };
            match args {
                [Arg::Pair(addr)] => asm.jmp(addr, cond).map_err(wrap),
                _ => Err(wrong("an address pair")),
            }
        }
        "jnz" | "jne" | "jp" | "jges" | "jnc" | "jgeu" | "jno" => {
            let cond = match mnemonic {
                "jnz" | "jne" => jump_cond::ZERO,
                "jp" => jump_cond::NEGATIVE,
                "jges" => jump_cond::LESS_SIGNED,
                "jnc" | "jgeu" => jump_cond::CARRY,
                _ => jump_cond::OVERFLOW,
            };
            match args {
                [Arg::Pair(addr)] => asm.jmp_inverted(addr, cond).map_err(wrap),
                _ => Err(wrong("an address pair")),
            }
        }
        "hlt" => match args {
            [] => asm.hlt().map_err(wrap),
            _ => Err(wrong("no operands")),
        },
        other => Err(err(
            path,
            span,
            AsmErrorKind::UnknownMnemonic(other.to_string()),
        )),
    }
}

/// Assemble source for a NOR-family machine into its RAM image.
pub fn assemble_nor(
    path: &str,
    source: &str,
    config: NorConfig,
    append_hlt: bool,
) -> Result<Vec<u8>, AsmError> {
    let statements = parser::parse(path, source)?;
    let mut asm = NorAssembler::new(config);

    for stmt in &statements {
        let span = stmt.span;
        if let Some(name) = &stmt.label {
            let label = asm.label_ref(name, Some(span));
            asm.bind(label).map_err(|kind| err(path, span, kind))?;
        }
        match &stmt.item {
            Some(Item::Op { mnemonic, args }) => {
                nor_op(path, &mut asm, mnemonic, args, span)?;
            }
            Some(Item::Org(addr)) => asm.org(*addr),
            Some(Item::Page { name, target }) => {
                if !config.paged {
                    return Err(err(
                        path,
                        span,
                        AsmErrorKind::Syntax(
                            ".page is only supported on the paged machine".to_string(),
                        ),
                    ));
                }
                asm.page(name, *target);
            }
            None => {}
        }
    }

    if append_hlt {
        asm.hlt()
            .map_err(|kind| AsmError::new(path, None, kind))?;
    }
    asm.finish()
        .map_err(|(span, kind)| AsmError::new(path, span, kind))
}

/// Resolve a NOR operand: a label name, or (where supported) a number
/// interned as a constant cell.
fn nor_operand(
    path: &str,
    asm: &mut NorAssembler,
    mnemonic: &str,
    args: &[Arg],
    span: Span,
) -> Result<crate::nor::LabelRef, AsmError> {
    match args {
        [Arg::Ident(name)] => Ok(asm.label_ref(name, Some(span))),
        [Arg::Number(v)] => asm
            .const_cell(*v as u8)
            .map_err(|kind| err(path, span, kind)),
        _ => Err(err(
            path,
            span,
            AsmErrorKind::WrongOperands {
                op: mnemonic.to_string(),
                expected: "one memory operand",
            },
        )),
    }
}

fn nor_op(
    path: &str,
    asm: &mut NorAssembler,
    mnemonic: &str,
    args: &[Arg],
    span: Span,
) -> Result<(), AsmError> {
    let wrap = |kind| err(path, span, kind);

    // Zero-operand forms first.
    match mnemonic {
        "clr" => {
            let allone = asm.label_ref("allone", None);
            return asm.nor(allone).map_err(wrap);
        }
        "not" => {
            let zero = asm.label_ref("zero", None);
            return asm.nor(zero).map_err(wrap);
        }
        "clrx" => {
            let allone = asm.label_ref("allone", None);
            return asm.norx(allone).map_err(wrap);
        }
        "notx" => {
            let zero = asm.label_ref("zero", None);
            return asm.norx(zero).map_err(wrap);
        }
        "hlt" => return asm.hlt().map_err(wrap),
        "out" => {
            // Latch the accumulator, toggle the trigger cell, and restore
            // the accumulator from the latch.
            let display = asm.label_ref("display", None);
            let trigger = asm.label_ref("trigger", None);
            let one = asm.label_ref("one", None);
            asm.sta(display).map_err(wrap)?;
            asm.lda(trigger).map_err(wrap)?;
            asm.nor(one).map_err(wrap)?;
            asm.sta(trigger).map_err(wrap)?;
            let display = asm.label_ref("display", None);
            return asm.lda(display).map_err(wrap);
        }
        _ => {}
    }

    if mnemonic == "dcb" {
        return match args {
            [Arg::Number(v)] => asm.dcb(*v as u8).map_err(wrap),
            _ => Err(err(
                path,
                span,
                AsmErrorKind::WrongOperands {
                    op: "dcb".to_string(),
                    expected: "a byte value",
                },
            )),
        };
    }

    let operand = nor_operand(path, asm, mnemonic, args, span)?;
    match mnemonic {
        "nor" => asm.nor(operand).map_err(wrap),
        "add" => asm.add(operand).map_err(wrap),
        "sta" => asm.sta(operand).map_err(wrap),
        "lda" => asm.lda(operand).map_err(wrap),
        "jcc" => asm.jcc(operand).map_err(wrap),
        "jcs" => asm.jcs(operand).map_err(wrap),
        "norx" => asm.norx(operand).map_err(wrap),
        "addx" => asm.addx(operand).map_err(wrap),
        "stx" => asm.stx(operand).map_err(wrap),
        "ldx" => asm.ldx(operand).map_err(wrap),
        "jnz" => asm.jnz(operand).map_err(wrap),
        "jz" => asm.jz(operand).map_err(wrap),
        "jmp" => {
            asm.jcc(operand).map_err(wrap)?;
            asm.jcc(operand).map_err(wrap)
        }
        "sub" => {
            let zero = asm.label_ref("zero", None);
            asm.nor(zero).map_err(wrap)?;
            asm.add(operand).map_err(wrap)?;
            let zero = asm.label_ref("zero", None);
            asm.nor(zero).map_err(wrap)
        }
        "subx" => {
            let zero = asm.label_ref("zero", None);
            asm.norx(zero).map_err(wrap)?;
            asm.addx(operand).map_err(wrap)?;
            let zero = asm.label_ref("zero", None);
            asm.norx(zero).map_err(wrap)
        }
        other => Err(err(
            path,
            span,
            AsmErrorKind::UnknownMnemonic(other.to_string()),
        )),
    }
}
