use filament_machines::{Machine, Nor6System};

mod common;
use common::run_to_halt;

/// The display stream test: successive values through `out` appear as
/// one decimal line each.
#[test]
fn out_prints_successive_values() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda one\nout\nadd one\nout\nadd one\nout\nhlt\n",
    );
    let printed: Vec<String> = sys.printed();
    assert_eq!(printed, vec!["1".to_string(), "2".to_string(), "3".to_string()]);
}

#[test]
fn nor_add_sta_roundtrip() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda x\nadd y\nsta r\nhlt\nx: dcb 5\ny: dcb 7\nr: dcb 0\n",
    );
    assert_eq!(sys.acc(), 12);
    // x@6 y@7 r@8: lda is two bytes, the explicit hlt two more.
    assert_eq!(sys.ram_byte(8), 12);
}

#[test]
fn sub_via_nor_decomposition() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(&mut sys, "lda x\nsub y\nhlt\nx: dcb 9\ny: dcb 3\n");
    assert_eq!(sys.acc(), 6);
}

#[test]
fn jcc_not_taken_when_carry_set() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda allone\nadd one\njcc skip\nlda x\nskip: hlt\nx: dcb 9\n",
    );
    // 0xff + 1 set the carry, so the branch fell through and loaded x.
    assert_eq!(sys.acc(), 9);
}

#[test]
fn jcc_taken_when_carry_clear() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda one\njcc skip\nlda x\nskip: hlt\nx: dcb 9\n",
    );
    assert_eq!(sys.acc(), 1);
}

#[test]
fn jcs_jumps_on_carry() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda allone\nadd one\njcs skip\nlda x\nskip: hlt\nx: dcb 9\n",
    );
    assert_eq!(sys.acc(), 0);
}

#[test]
fn shl_doubles_through_self_addition() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(&mut sys, "lda x\nadd x\nhlt\nx: dcb 21\n");
    assert_eq!(sys.acc(), 42);
}

#[test]
fn untaken_jump_clears_carry() {
    let mut sys = Nor6System::new().unwrap();
    run_to_halt(
        &mut sys,
        "lda allone\nadd one\njcc nowhere\nadd one\nnowhere: hlt\n",
    );
    // After the untaken branch the carry is gone, so the final add
    // starts clean: 0 + 1.
    assert_eq!(sys.acc(), 1);
}
