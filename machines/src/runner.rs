//! The top-level run loop: cycle the machine, watch for a PC
//! fixed-point, and stop cleanly on cancellation or a cycle budget.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::machine::Machine;

pub struct RunOptions {
    /// Stop after this many machine cycles (safety net for runaway
    /// programs).
    pub max_cycles: Option<u64>,
    /// Print the per-cycle trace line.
    pub trace: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_cycles: None,
            trace: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The PC stood still long enough to count as a halt.
    Halted { cycles: u64 },
    /// The cancel token was set (e.g. by Ctrl-C).
    Cancelled { cycles: u64 },
    /// The configured cycle budget ran out.
    CycleLimit { cycles: u64 },
}

impl RunOutcome {
    pub fn cycles(&self) -> u64 {
        match *self {
            RunOutcome::Halted { cycles }
            | RunOutcome::Cancelled { cycles }
            | RunOutcome::CycleLimit { cycles } => cycles,
        }
    }
}

/// Reset and run the machine until it halts, is cancelled, or hits the
/// cycle budget. The caller prints the RAM dump afterwards in every
/// case.
pub fn run(machine: &mut dyn Machine, opts: &RunOptions, cancel: &AtomicBool) -> RunOutcome {
    machine.reset();

    let mut cycles = 0u64;
    let mut last_pc = None;
    let mut streak = 0u32;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return RunOutcome::Cancelled { cycles };
        }
        if let Some(limit) = opts.max_cycles
            && cycles >= limit
        {
            return RunOutcome::CycleLimit { cycles };
        }

        machine.machine_cycle();
        cycles += 1;
        if opts.trace {
            println!("{}", machine.trace());
        }

        let pc = machine.pc();
        if last_pc == Some(pc) {
            streak += 1;
        } else {
            streak = 0;
        }
        last_pc = Some(pc);
        if streak >= machine.halt_threshold() {
            return RunOutcome::Halted { cycles };
        }
    }
}
