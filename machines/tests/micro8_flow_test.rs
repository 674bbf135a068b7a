use filament_machines::{Machine, Micro8System};

mod common;
use common::run_to_halt;

/// The canonical counting loop: five trips through `add` via an
/// unconditional jump through C:D.
#[test]
fn unconditional_jump_loop() {
    let mut sys = Micro8System::new().unwrap();
    sys.assemble(
        "test.asm",
        "load8 a, 0\nload8 b, 1\nloop: add a\nload16 c:d, loop\njmp c:d\n",
    )
    .unwrap();
    sys.reset();
    // Two cycles per load8, then the loop body is add(1) + load16(4) +
    // jmp(1) = six cycles per iteration.
    for _ in 0..4 {
        sys.machine_cycle();
    }
    for _ in 0..5 * 6 {
        sys.machine_cycle();
    }
    assert_eq!(sys.register(0), 5);
}

#[test]
fn jz_taken_when_zero() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 1\nload8 b, 1\nsub a\n\
         load16 c:d, skip\njz c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    // The poison load was jumped over.
    assert_eq!(sys.register(0), 0);
}

#[test]
fn jz_not_taken_when_nonzero() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 2\nload8 b, 1\nsub a\n\
         load16 c:d, skip\njz c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    assert_eq!(sys.register(0), 0x77);
}

#[test]
fn jnz_inverts_the_zero_condition() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 2\nload8 b, 1\nsub a\n\
         load16 c:d, skip\njnz c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    // a - b = 1, non-zero: the inverted condition takes the jump and
    // the `inv` prefix leaves A untouched.
    assert_eq!(sys.register(0), 1);
}

#[test]
fn jc_follows_the_carry() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 0xff\nload8 b, 2\nadd a\n\
         load16 c:d, skip\njc c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    assert_eq!(sys.register(0), 1);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 1\nload8 b, 2\nadd a\n\
         load16 c:d, skip\njc c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    assert_eq!(sys.register(0), 0x77);
}

#[test]
fn jn_follows_the_sign() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 1\nload8 b, 2\nsub a\n\
         load16 c:d, skip\njn c:d\nload8 a, 0x77\nskip: hlt\n",
    );
    assert_eq!(sys.register(0), 0xff);
}

#[test]
fn jump_via_gh_pair() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, skip\nmov16 g:h, c:d\njmp g:h\nload8 a, 0x77\nskip: hlt\n",
    );
    assert_eq!(sys.register(0), 0);
}

/// A countdown loop with a conditional exit.
#[test]
fn countdown_loop_with_conditional_exit() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 5\nload8 b, 1\n\
         again: sub a\nmov e, a\nload16 c:d, again\njnz c:d\nhlt\n",
    );
    assert_eq!(sys.register(0), 0);
    assert_eq!(sys.register(4), 0);
}
