//! Instruction encoder for the NOR-machine family.
//!
//! One encoder covers the three memory layouts:
//! - single-byte instructions, 2-bit opcode over a 6-bit address;
//! - 16-bit big-endian words, 2-bit opcode over a 14-bit address;
//! - 16-bit big-endian words, 3-bit opcode over a 13-bit paged address,
//!   with `.page` directives mapping logical pages onto physical banks.
//!
//! Every instruction operand is a memory cell named by a label. Reserved
//! cells (`one`, `allone`, `zero`, the display and bank-select ports, a
//! scratch stack) occupy the top of page 0; fix-ups OR the resolved
//! address into the stored instruction at scope end.

use std::collections::HashMap;

use crate::error::{AsmErrorKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NorOp {
    Nor,
    Add,
    Sta,
    Jcc,
    Norx,
    Addx,
    Stx,
    Jnz,
}

#[derive(Debug, Clone, Copy)]
pub struct NorConfig {
    pub addr_bits: u32,
    /// 16-bit big-endian instruction words (vs. single bytes).
    pub wide: bool,
    /// X-register ops (`norx`, `addx`, `stx`, `jnz`) are available.
    pub x_ops: bool,
    /// `.page`/bank support; image holds the full physical RAM.
    pub paged: bool,
    /// Numeric operands are interned as `_const_N` cells.
    pub consts: bool,
    /// Binding `foo` also binds `foo_` to the following cell.
    pub shadow_labels: bool,
    image_size: usize,
}

impl NorConfig {
    /// 64-byte machine, single-byte instructions, reserved cells fixed
    /// at the top of RAM.
    pub fn nor6() -> Self {
        Self {
            addr_bits: 6,
            wide: false,
            x_ops: false,
            paged: false,
            consts: false,
            shadow_labels: false,
            image_size: 1 << 6,
        }
    }

    /// 16 KiB machine, word instructions, reserve-downward cells.
    pub fn nor14() -> Self {
        Self {
            addr_bits: 14,
            wide: true,
            x_ops: false,
            paged: false,
            consts: true,
            shadow_labels: true,
            image_size: 1 << 14,
        }
    }

    /// Paged machine: 13-bit logical addresses, two 4 KiB pages over a
    /// 1 MiB physical image, A and X register ops.
    pub fn paged13() -> Self {
        Self {
            addr_bits: 13,
            wide: true,
            x_ops: true,
            paged: true,
            consts: false,
            shadow_labels: false,
            image_size: 1 << 20,
        }
    }
}

struct NorLabel {
    name: String,
    offset: Option<u32>,
    page: Option<usize>,
    fixups: Vec<NorFixup>,
    special: bool,
    span: Option<Span>,
}

struct NorFixup {
    page: Option<usize>,
    offset: u32,
    is_jump: bool,
}

struct PageInfo {
    num: u32,
    target: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRef(usize);

pub struct NorAssembler {
    config: NorConfig,
    image: Vec<u8>,
    offset: u32,
    labels: Vec<NorLabel>,
    by_name: HashMap<String, usize>,
    pages: Vec<PageInfo>,
    page: Option<usize>,
    consts: HashMap<u8, LabelRef>,
    nreserved: u32,
}

impl NorAssembler {
    pub fn new(config: NorConfig) -> Self {
        let mut asm = Self {
            config,
            image: vec![0; config.image_size],
            offset: 0,
            labels: Vec::new(),
            by_name: HashMap::new(),
            pages: Vec::new(),
            page: None,
            consts: HashMap::new(),
            nreserved: 0,
        };
        if config.paged {
            // Every program starts in an implicit page 0 on bank 0.
            asm.page("default", 0);
        } else if config.addr_bits == 14 {
            asm.reserve("one", &[1], true);
            asm.reserve("allone", &[0xff], true);
            asm.reserve("zero", &[0], true);
            asm.reserve("trigger", &[0], true);
            asm.reserve("display", &[0], true);
            asm.reserve("page1", &[0], true);
            asm.reserve("page0", &[0], true);
            asm.reserve("_tmp1", &[0], true);
            asm.reserve("_tmp2", &[0], true);
            asm.reserve("_sp", &[0], true);
            asm.reserve("_stack", &[0; 32], true);
        }
        asm
    }

    fn instr_size(&self) -> u32 {
        if self.config.wide { 2 } else { 1 }
    }

    fn linear(&self, page: Option<usize>, offset: u32) -> usize {
        match page {
            Some(p) => (self.pages[p].num * 0x1000 + offset) as usize,
            None => offset as usize,
        }
    }

    /// Address a label resolves to inside instruction words: the bank
    /// target replaces the page bits on the paged machine.
    fn label_addr(&self, label: &NorLabel) -> u32 {
        match label.page {
            Some(p) => label.offset.unwrap_or(0) | (self.pages[p].target << 12),
            None => label.offset.unwrap_or(0),
        }
    }

    fn opcode(&self, op: NorOp) -> u16 {
        if self.config.paged {
            let bits = match op {
                NorOp::Nor => 0,
                NorOp::Add => 1,
                NorOp::Sta => 2,
                NorOp::Jcc => 3,
                NorOp::Norx => 4,
                NorOp::Addx => 5,
                NorOp::Stx => 6,
                NorOp::Jnz => 7,
            };
            bits << 13
        } else {
            let bits = match op {
                NorOp::Nor => 0,
                NorOp::Add => 1,
                NorOp::Sta => 2,
                NorOp::Jcc => 3,
                // X ops only exist on the paged machine.
                NorOp::Norx | NorOp::Addx | NorOp::Stx | NorOp::Jnz => unreachable!(),
            };
            if self.config.wide { bits << 14 } else { bits << 6 }
        }
    }

    fn write_instr(&mut self, instr: u16) -> Result<(), AsmErrorKind> {
        let at = self.linear(self.page, self.offset);
        if self.config.wide {
            if at + 1 >= self.image.len() {
                return Err(AsmErrorKind::ImageOverflow);
            }
            self.image[at] = (instr >> 8) as u8;
            self.image[at + 1] = (instr & 0xff) as u8;
            self.offset += 2;
        } else {
            if at >= self.image.len() {
                return Err(AsmErrorKind::ImageOverflow);
            }
            self.image[at] = instr as u8;
            self.offset += 1;
        }
        Ok(())
    }

    pub fn dcb(&mut self, v: u8) -> Result<(), AsmErrorKind> {
        let at = self.linear(self.page, self.offset);
        if at >= self.image.len() {
            return Err(AsmErrorKind::ImageOverflow);
        }
        self.image[at] = v;
        self.offset += 1;
        Ok(())
    }

    pub fn org(&mut self, addr: u32) {
        self.offset = addr;
    }

    /// Open a new logical page mapped onto a physical bank. Entering any
    /// bank-0 page lays down the reserved cells at the top of the page;
    /// their labels bind only on the first page.
    pub fn page(&mut self, _name: &str, target: u32) {
        let num = self.pages.len() as u32;
        self.pages.push(PageInfo { num, target });
        self.page = Some(self.pages.len() - 1);

        if target == 0 {
            let reserved: [(&str, u8); 8] = [
                ("random", 0),
                ("bank0", 0),
                ("bank1", 0),
                ("display", 0),
                ("trigger", 0),
                ("zero", 0),
                ("allone", 0xff),
                ("one", 1),
            ];
            self.offset = (1 << 12) - reserved.len() as u32;
            for (name, value) in reserved {
                let label = self.label_ref(name, None);
                let _ = self.bind_special(label);
                let _ = self.dcb(value);
            }
        }
        self.offset = 0;
    }

    // --- labels ----------------------------------------------------------

    pub fn label_ref(&mut self, name: &str, span: Option<Span>) -> LabelRef {
        if let Some(&id) = self.by_name.get(name) {
            return LabelRef(id);
        }
        let id = self.labels.len();
        self.labels.push(NorLabel {
            name: name.to_string(),
            offset: None,
            page: None,
            fixups: Vec::new(),
            special: false,
            span,
        });
        self.by_name.insert(name.to_string(), id);
        LabelRef(id)
    }

    pub fn bind(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        if self.labels[label.0].offset.is_some() {
            return Err(AsmErrorKind::LabelRedefinition(
                self.labels[label.0].name.clone(),
            ));
        }
        self.labels[label.0].offset = Some(self.offset);
        self.labels[label.0].page = self.page;
        if self.config.shadow_labels {
            // `foo_` names the next cell, for two-byte variables.
            let shadow_name = format!("{}_", self.labels[label.0].name);
            let shadow = self.label_ref(&shadow_name, None);
            self.labels[shadow.0].offset = Some(self.offset + 1);
            self.labels[shadow.0].page = self.page;
        }
        Ok(())
    }

    /// Bind a reserved-cell label; on pages after the first the cells
    /// are written but the labels keep pointing at page 0.
    fn bind_special(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        if let Some(p) = self.page
            && self.pages[p].num != 0
        {
            return Ok(());
        }
        self.labels[label.0].special = true;
        self.bind(label)
    }

    /// Place values at the top of memory, growing downward, and bind a
    /// label (plus shadow) to the first cell.
    pub fn reserve(&mut self, name: &str, values: &[u8], _register: bool) -> u32 {
        let saved = self.offset;
        self.offset = (1 << self.config.addr_bits) - values.len() as u32 - self.nreserved;
        self.nreserved += values.len() as u32;
        let label = self.label_ref(name, None);
        let _ = self.bind(label);
        let placed = self.offset;
        for &v in values {
            let _ = self.dcb(v);
        }
        self.offset = saved;
        placed
    }

    /// Intern a numeric operand as a reserved `_const_N` cell.
    pub fn const_cell(&mut self, value: u8) -> Result<LabelRef, AsmErrorKind> {
        if !self.config.consts {
            return Err(AsmErrorKind::NumericOperandUnsupported);
        }
        if let Some(&label) = self.consts.get(&value) {
            return Ok(label);
        }
        let name = format!("_const_{value}");
        let label = self.label_ref(&name, None);
        self.reserve(&name, &[value], false);
        self.consts.insert(value, label);
        Ok(label)
    }

    // --- instruction emitters -------------------------------------------

    fn placeholder(&mut self, label: LabelRef, is_jump: bool) {
        self.labels[label.0].fixups.push(NorFixup {
            page: self.page,
            offset: self.offset,
            is_jump,
        });
    }

    fn emit(&mut self, op: NorOp, label: LabelRef, is_jump: bool) -> Result<(), AsmErrorKind> {
        if !self.config.x_ops
            && matches!(op, NorOp::Norx | NorOp::Addx | NorOp::Stx | NorOp::Jnz)
        {
            return Err(AsmErrorKind::UnknownMnemonic(format!("{op:?}").to_lowercase()));
        }
        self.placeholder(label, is_jump);
        let opcode = self.opcode(op);
        self.write_instr(opcode)
    }

    pub fn nor(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Nor, label, false)
    }

    pub fn add(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Add, label, false)
    }

    pub fn sta(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Sta, label, false)
    }

    pub fn jcc(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Jcc, label, true)
    }

    pub fn norx(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Norx, label, false)
    }

    pub fn addx(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Addx, label, false)
    }

    pub fn stx(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Stx, label, false)
    }

    pub fn jnz(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        self.emit(NorOp::Jnz, label, true)
    }

    /// `lda x`: clear the accumulator (`nor allone`), then add.
    pub fn lda(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        let allone = self.label_ref("allone", None);
        self.nor(allone)?;
        self.add(label)
    }

    /// `ldx x`: clear X, then add into X.
    pub fn ldx(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        let allone = self.label_ref("allone", None);
        self.norx(allone)?;
        self.addx(label)
    }

    /// Address of an instruction `skip` instructions ahead, as encoded
    /// in a jump word.
    fn addr_ahead(&self, skip: u32) -> u32 {
        let offset = self.offset + skip * self.instr_size();
        match self.page {
            Some(p) => offset | (self.pages[p].target << 12),
            None => offset,
        }
    }

    /// Jump if carry set: skip over an unconditional-by-construction
    /// `jcc` (the untaken first `jcc` clears carry).
    pub fn jcs(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        let skip = self.addr_ahead(2);
        self.write_instr(self.opcode(NorOp::Jcc) | skip as u16)?;
        self.jcc(label)
    }

    /// Jump if zero: skip over the `jcc` when the accumulator is
    /// non-zero.
    pub fn jz(&mut self, label: LabelRef) -> Result<(), AsmErrorKind> {
        if !self.config.x_ops {
            return Err(AsmErrorKind::UnknownMnemonic("jz".to_string()));
        }
        let skip = self.addr_ahead(2);
        self.write_instr(self.opcode(NorOp::Jnz) | skip as u16)?;
        self.jcc(label)
    }

    /// Two self-jumps: the first clears a pending carry, the second
    /// loops forever.
    pub fn hlt(&mut self) -> Result<(), AsmErrorKind> {
        let here = self.addr_ahead(0);
        self.write_instr(self.opcode(NorOp::Jcc) | here as u16)?;
        let here = self.addr_ahead(0);
        self.write_instr(self.opcode(NorOp::Jcc) | here as u16)?;
        Ok(())
    }

    // --- finishing -------------------------------------------------------

    /// Bind any machine-fixed reserved cells, check for dangling labels,
    /// and OR every fix-up's resolved address into its instruction.
    pub fn finish(mut self) -> Result<Vec<u8>, (Option<Span>, AsmErrorKind)> {
        if !self.config.paged && self.config.addr_bits == 6 {
            // Reserved cells live at fixed addresses at the top of the
            // 64-byte RAM.
            self.offset = 59;
            for (name, value) in [
                ("display", 0u8),
                ("trigger", 0),
                ("zero", 0),
                ("allone", 0xff),
                ("one", 1),
            ] {
                let label = self.label_ref(name, None);
                self.bind(label).map_err(|kind| (None, kind))?;
                self.dcb(value).map_err(|kind| (None, kind))?;
            }
        }

        for i in 0..self.labels.len() {
            if self.labels[i].offset.is_none() {
                return Err((
                    self.labels[i].span,
                    AsmErrorKind::UndefinedLabel(self.labels[i].name.clone()),
                ));
            }
            let addr = self.label_addr(&self.labels[i]);
            let label_page = self.labels[i].page;
            let special = self.labels[i].special;
            for f in 0..self.labels[i].fixups.len() {
                let fixup_page = self.labels[i].fixups[f].page;
                let offset = self.labels[i].fixups[f].offset;
                let is_jump = self.labels[i].fixups[f].is_jump;
                if let (Some(fp), Some(lp)) = (fixup_page, label_page) {
                    let same_bank = self.pages[fp].target == self.pages[lp].target;
                    let other_page = fp != lp;
                    if is_jump && same_bank && other_page {
                        return Err((
                            self.labels[i].span,
                            AsmErrorKind::SameBankJump(self.labels[i].name.clone()),
                        ));
                    }
                    if !is_jump && same_bank && other_page && !special {
                        return Err((
                            self.labels[i].span,
                            AsmErrorKind::CrossPageReference(self.labels[i].name.clone()),
                        ));
                    }
                }
                let at = self.linear(fixup_page, offset);
                if self.config.wide {
                    let high_mask = (1u32 << (self.config.addr_bits - 8)) - 1;
                    self.image[at] |= ((addr >> 8) & high_mask) as u8;
                    self.image[at + 1] |= (addr & 0xff) as u8;
                } else {
                    self.image[at] |= (addr & ((1u32 << self.config.addr_bits) - 1)) as u8;
                }
            }
        }
        Ok(self.image)
    }
}
