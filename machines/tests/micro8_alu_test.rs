use filament_machines::micro8::alu::flag;
use filament_machines::Micro8System;

mod common;
use common::run_to_halt;

/// Carry chain: 0xff + 0x01 wraps to zero with carry and zero set.
#[test]
fn add_sets_carry_and_zero() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0xff\nload8 b, 0x01\nadd a\nhlt\n");
    assert_eq!(sys.register(0), 0x00);
    assert_ne!(sys.flag_bits() & flag::C, 0);
    assert_ne!(sys.flag_bits() & flag::Z, 0);
    assert_eq!(sys.flag_bits() & flag::N, 0);
}

#[test]
fn add_carry_without_zero() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0xff\nload8 b, 0x02\nadd a\nhlt\n");
    assert_eq!(sys.register(0), 0x01);
    assert_ne!(sys.flag_bits() & flag::C, 0);
    assert_eq!(sys.flag_bits() & flag::Z, 0);
}

/// Signed overflow: 0x7f + 1 flips the sign.
#[test]
fn add_signed_overflow() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x7f\nload8 b, 0x01\nadd a\nhlt\n");
    assert_eq!(sys.register(0), 0x80);
    assert_ne!(sys.flag_bits() & flag::V, 0);
    assert_ne!(sys.flag_bits() & flag::N, 0);
    assert_eq!(sys.flag_bits() & flag::C, 0);
}

#[test]
fn add_consumes_carry_in() {
    let mut sys = Micro8System::new().unwrap();
    // First add leaves carry set; second add includes it.
    run_to_halt(
        &mut sys,
        "load8 a, 0xff\nload8 b, 0x01\nadd a\nload8 b, 0x10\nadd a\nhlt\n",
    );
    assert_eq!(sys.register(0), 0x11);
}

#[test]
fn sub_borrow_and_sign() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x03\nload8 b, 0x05\nsub a\nhlt\n");
    assert_eq!(sys.register(0), 0xfe);
    assert_ne!(sys.flag_bits() & flag::C, 0);
    assert_ne!(sys.flag_bits() & flag::N, 0);
    assert_eq!(sys.flag_bits() & flag::V, 0);
}

#[test]
fn cmp_sets_flags_without_writing() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x42\nload8 b, 0x42\ncmp\nhlt\n");
    assert_eq!(sys.register(0), 0x42);
    assert_ne!(sys.flag_bits() & flag::Z, 0);
    assert_eq!(sys.flag_bits() & flag::C, 0);
}

#[test]
fn alu_destination_c() {
    let mut sys = Micro8System::new().unwrap();
    // C receives the result; hlt rewrites C:D, so capture it in E first.
    run_to_halt(
        &mut sys,
        "load8 a, 0x0f\nload8 b, 0xf0\nor c\nmov e, c\nhlt\n",
    );
    assert_eq!(sys.register(4), 0xff);
    assert_eq!(sys.register(0), 0x0f);
}

#[test]
fn bitwise_ops_preserve_carry() {
    let mut sys = Micro8System::new().unwrap();
    // add sets carry, xor keeps it while clearing v.
    run_to_halt(
        &mut sys,
        "load8 a, 0xff\nload8 b, 0x01\nadd a\nload8 a, 0x0f\nxor a\nhlt\n",
    );
    assert_eq!(sys.register(0), 0x0e);
    assert_ne!(sys.flag_bits() & flag::C, 0);
    assert_eq!(sys.flag_bits() & flag::V, 0);
}

#[test]
fn clf_clears_and_inv_inverts() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load8 a, 0xff\nload8 b, 0x01\nadd a\nclf\nhlt\n",
    );
    assert_eq!(sys.flag_bits(), 0);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "clf\ninv\nhlt\n");
    assert_eq!(sys.flag_bits(), 0xf);
}

#[test]
fn shifts_and_rotates() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x81\nshl a\nhlt\n");
    assert_eq!(sys.register(0), 0x02);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x81\nshr a\nhlt\n");
    assert_eq!(sys.register(0), 0x40);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x81\nrol a\nhlt\n");
    assert_eq!(sys.register(0), 0x03);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x81\nror a\nhlt\n");
    assert_eq!(sys.register(0), 0xc0);
}

#[test]
fn inc_dec_neg() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x0f\ninc a\nhlt\n");
    assert_eq!(sys.register(0), 0x10);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x00\ndec a\nhlt\n");
    assert_eq!(sys.register(0), 0xff);
    assert_ne!(sys.flag_bits() & flag::C, 0);

    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x01\nneg a\nhlt\n");
    assert_eq!(sys.register(0), 0xff);
}

#[test]
fn not_inverts_accumulator() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(&mut sys, "load8 a, 0x5a\nnot a\nhlt\n");
    assert_eq!(sys.register(0), 0xa5);
}
