use filament_machines::{Machine, Micro8System};

mod common;
use common::run_to_halt;

/// Write a byte through C:D, clobber A, read it back.
#[test]
fn memory_write_then_read() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, 0x0100\nload8 a, 0x42\nwmem c:d, a\n\
         load8 a, 0\nrmem a, c:d\nhlt\n",
    );
    assert_eq!(sys.register(0), 0x42);
    assert_eq!(sys.ram_byte(0x0100), 0x42);
}

#[test]
fn memory_via_gh_pair_and_other_registers() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, 0x0200\nmov16 g:h, c:d\n\
         load8 b, 0x99\nwmem g:h, b\n\
         rmem e, g:h\nmov a, e\nhlt\n",
    );
    assert_eq!(sys.ram_byte(0x0200), 0x99);
    assert_eq!(sys.register(0), 0x99);
}

#[test]
fn distinct_addresses_stay_distinct() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, 0x0010\nload8 a, 0x11\nwmem c:d, a\n\
         load16 c:d, 0x0011\nload8 a, 0x22\nwmem c:d, a\nhlt\n",
    );
    assert_eq!(sys.ram_byte(0x0010), 0x11);
    assert_eq!(sys.ram_byte(0x0011), 0x22);
}

/// The two low addresses are the display port: writing the data cell
/// and toggling the trigger cell prints the latched byte.
#[test]
fn display_port_prints_on_trigger_change() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, 0x0000\nload8 a, 7\nwmem c:d, a\n\
         load16 c:d, 0x0001\nload8 a, 1\nwmem c:d, a\n\
         load8 a, 0\nwmem c:d, a\nhlt\n",
    );
    assert_eq!(sys.printed(), vec!["7".to_string(), "7".to_string()]);
    // Display traffic never lands in RAM.
    assert_eq!(sys.ram_byte(0), 0);
    assert_eq!(sys.ram_byte(1), 0);
}

#[test]
fn ram_dump_shows_written_line() {
    let mut sys = Micro8System::new().unwrap();
    run_to_halt(
        &mut sys,
        "load16 c:d, 0x0100\nload8 a, 0x42\nwmem c:d, a\nhlt\n",
    );
    let dump = sys.ram_dump();
    assert!(dump.contains("0100: 42"));
    assert_eq!(dump.lines().count(), 1);
}
