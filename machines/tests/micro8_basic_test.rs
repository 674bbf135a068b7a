use std::sync::atomic::AtomicBool;

use filament_machines::runner::{run, RunOptions};
use filament_machines::{Machine, Micro8System};

mod common;
use common::run_to_halt;

/// Registers load immediates one nibble per machine cycle.
#[test]
fn immediate_nibble_loads() {
    let mut sys = Micro8System::new().unwrap();
    sys.assemble("test.asm", "load al, 1\nload ah, 2\nload bl, 3\nload bh, 4\n")
        .unwrap();
    sys.reset();
    for _ in 0..4 {
        sys.machine_cycle();
    }
    assert_eq!(sys.register(0), 0x21);
    assert_eq!(sys.register(1), 0x43);
    assert_eq!(sys.register(2), 0);
    assert_eq!(sys.register(3), 0);
    assert_eq!(sys.flag_bits(), 0);
}

#[test]
fn mov_copies_through_the_temporary() {
    let mut sys = Micro8System::new().unwrap();
    sys.assemble("test.asm", "load8 a, 0x5a\nmov b, a\nhlt\n").unwrap();
    sys.reset();
    // Two load cycles, then the mov.
    for _ in 0..3 {
        sys.machine_cycle();
    }
    assert_eq!(sys.register(0), 0x5a);
    assert_eq!(sys.register(1), 0x5a);
    // The transfer went through T during the middle phases.
    assert_eq!(sys.temp(), 0x5a);
}

#[test]
fn mov_to_halt_leaves_both_registers() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x5a\nmov b, a\nhlt\n");
    assert_eq!(sys.register(0), 0x5a);
    assert_eq!(sys.register(1), 0x5a);
}

#[test]
fn mov16_copies_both_halves() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load16 c:d, 0x1234\nmov16 g:h, c:d\nhlt\n");
    assert_eq!(sys.register(6), 0x12);
    assert_eq!(sys.register(7), 0x34);
}

#[test]
fn eight_registers_hold_distinct_values() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 1\nload8 b, 2\nload8 c, 3\nload8 d, 4\n\
         mov e, a\nmov f, b\nmov g, c\nmov h, d\n\
         load8 a, 5\nload8 b, 6\nload8 c, 7\nload8 d, 8\nhlt\n",
    );
    // hlt rewrites C:D with the self-jump target.
    assert_eq!(sys.register(0), 5);
    assert_eq!(sys.register(1), 6);
    assert_eq!(sys.register(4), 1);
    assert_eq!(sys.register(5), 2);
    assert_eq!(sys.register(6), 3);
    assert_eq!(sys.register(7), 4);
}

/// A full machine cycle is four clock phases (three on the cold start).
#[test]
fn machine_cycle_advances_one_instruction() {
    let mut sys = Micro8System::new().unwrap();
    sys.assemble("test.asm", "load al, 7\nload bl, 1\n").unwrap();
    sys.reset();
    sys.machine_cycle();
    assert_eq!(sys.register(0), 7);
    assert_eq!(sys.register(1), 0);
    sys.machine_cycle();
    assert_eq!(sys.register(1), 1);
}

#[test]
fn runner_reports_halt_and_updates() {
    let mut sys = Micro8System::new().unwrap();
    sys.assemble("test.asm", "load8 a, 1\nhlt\n").unwrap();
    let cancel = AtomicBool::new(false);
    let outcome = run(
        &mut sys,
        &RunOptions {
            max_cycles: Some(1000),
            trace: false,
        },
        &cancel,
    );
    assert!(outcome.cycles() > 0);
    assert!(sys.net_updates() > 0);
}

#[test]
fn cancellation_stops_the_run() {
    use filament_machines::runner::RunOutcome;

    let mut sys = Micro8System::new().unwrap();
    // An endless counting loop that never halts by itself.
    sys.assemble(
        "test.asm",
        "start: inc a\nload16 c:d, start\njmp c:d\n",
    )
    .unwrap();
    let cancel = AtomicBool::new(true);
    let outcome = run(
        &mut sys,
        &RunOptions {
            max_cycles: None,
            trace: false,
        },
        &cancel,
    );
    assert!(matches!(outcome, RunOutcome::Cancelled { .. }));
}
