use std::sync::atomic::AtomicBool;

use filament_machines::runner::{run, RunOptions, RunOutcome};
use filament_machines::Machine;

/// Assemble and run a program to halt, with a generous cycle cap so a
/// broken program fails the test instead of hanging it.
pub fn run_to_halt(machine: &mut dyn Machine, source: &str) -> RunOutcome {
    machine
        .assemble("test.asm", source)
        .unwrap_or_else(|e| panic!("assembly failed: {e}"));
    let cancel = AtomicBool::new(false);
    let outcome = run(
        machine,
        &RunOptions {
            max_cycles: Some(20_000),
            trace: false,
        },
        &cancel,
    );
    assert!(
        matches!(outcome, RunOutcome::Halted { .. }),
        "program did not halt: {outcome:?}"
    );
    outcome
}
