use filament_core::core::sim::Sim;
use filament_core::device::{IORegister, IncRegister, Register};
use filament_core::wire;

mod common;
use common::Probe;

#[test]
fn register_captures_on_write_edge_and_drives_while_enabled() {
    let mut sim = Sim::new();
    let data = sim.add("data", |n, id| Probe::new(n, id, 8));
    let ie = sim.add("ie", |n, id| Probe::new(n, id, 1));
    let oe = sim.add("oe", |n, id| Probe::new(n, id, 1));
    let reg = sim.add("reg", |n, id| Register::new(n, id, 8));

    wire!(sim, sim.get(data).out.view(), sim.get(reg).data.view()).unwrap();
    wire!(sim, sim.get(ie).out.view(), sim.get(reg).ie.view()).unwrap();
    wire!(sim, sim.get(oe).out.view(), sim.get(reg).oe.view()).unwrap();
    sim.with(reg, |r, net| r.state.no_connect(net));

    sim.reset();
    sim.with(oe, |p, net| p.out.drive(net, 0));
    sim.with(ie, |p, net| p.out.drive(net, 0));
    sim.with(data, |p, net| p.out.drive(net, 0x7e));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0);

    sim.with(ie, |p, net| p.out.drive(net, 1));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x7e);

    // Level stays high: no further capture.
    sim.with(data, |p, net| p.out.drive(net, 0x11));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x7e);

    // With the bus released and oe high, the register drives its value.
    sim.with(ie, |p, net| p.out.drive(net, 0));
    sim.with(data, |p, net| p.out.release(net));
    sim.with(oe, |p, net| p.out.drive(net, 1));
    sim.settle();
    assert_eq!(sim.with(reg, |r, net| r.data.value(net)), 0x7e);
}

#[test]
fn split_register_loads_nibbles_independently() {
    let mut sim = Sim::new();
    let data = sim.add("data", |n, id| Probe::new(n, id, 8));
    let ie = sim.add("ie", |n, id| Probe::new(n, id, 2));
    let reg = sim.add("reg", |n, id| Register::split(n, id, 8, 4));

    wire!(sim, sim.get(data).out.view(), sim.get(reg).data.view()).unwrap();
    wire!(sim, sim.get(ie).out.view(), sim.get(reg).ie.view()).unwrap();
    // oe left unwired: an undriven input reads as 0.
    sim.with(reg, |r, net| {
        r.oe.no_connect(net);
        r.state.no_connect(net);
    });

    sim.reset();
    sim.with(data, |p, net| p.out.drive(net, 0x21));
    sim.with(ie, |p, net| p.out.drive(net, 0b01));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x01);

    sim.with(data, |p, net| p.out.drive(net, 0x43));
    sim.with(ie, |p, net| p.out.drive(net, 0b10));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x41);

    // Both halves at once.
    sim.with(ie, |p, net| p.out.drive(net, 0b00));
    sim.with(data, |p, net| p.out.drive(net, 0x9c));
    sim.with(ie, |p, net| p.out.drive(net, 0b11));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x9c);
}

#[test]
fn ioregister_ports_are_independent() {
    let mut sim = Sim::new();
    let inp = sim.add("inp", |n, id| Probe::new(n, id, 8));
    let we = sim.add("we", |n, id| Probe::new(n, id, 1));
    let oe = sim.add("oe", |n, id| Probe::new(n, id, 1));
    let reg = sim.add("reg", |n, id| IORegister::new(n, id, 8));

    wire!(sim, sim.get(inp).out.view(), sim.get(reg).inp.view()).unwrap();
    wire!(sim, sim.get(we).out.view(), sim.get(reg).we.view()).unwrap();
    wire!(sim, sim.get(oe).out.view(), sim.get(reg).oe.view()).unwrap();
    sim.with(reg, |r, net| r.state.no_connect(net));

    sim.reset();
    sim.with(oe, |p, net| p.out.drive(net, 1));
    sim.with(we, |p, net| p.out.drive(net, 0));
    sim.with(inp, |p, net| p.out.drive(net, 0x33));
    sim.settle();
    assert_eq!(sim.with(reg, |r, net| r.out.value(net)), 0);

    sim.with(we, |p, net| p.out.drive(net, 1));
    sim.settle();
    assert_eq!(sim.get(reg).value(), 0x33);
    assert_eq!(sim.with(reg, |r, net| r.out.value(net)), 0x33);
}

#[test]
fn inc_register_carry_chains_into_high_half() {
    let mut sim = Sim::new();
    let inc = sim.add("inc", |n, id| Probe::new(n, id, 1));
    let lo = sim.add("lo", |n, id| IncRegister::new(n, id, 4));
    let hi = sim.add("hi", |n, id| IncRegister::new(n, id, 4));

    wire!(sim, sim.get(inc).out.view(), sim.get(lo).inc.view()).unwrap();
    wire!(sim, sim.get(lo).carry.view(), sim.get(hi).inc.view()).unwrap();
    for h in [lo, hi] {
        sim.with(h, |r, net| {
            r.state.no_connect(net);
            r.out.no_connect(net);
        });
    }
    sim.with(hi, |r, net| r.carry.no_connect(net));

    sim.reset();
    for _ in 0..16 {
        sim.with(inc, |p, net| p.out.drive(net, 1));
        sim.settle();
        sim.with(inc, |p, net| p.out.drive(net, 0));
        sim.settle();
    }

    // 16 pulses wrap the low half exactly once.
    assert_eq!(sim.get(lo).value(), 0);
    assert_eq!(sim.get(hi).value(), 1);
}
