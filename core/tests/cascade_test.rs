//! Randomized combinational netlists: build arbitrary adder/multiplexer
//! DAGs, let the cascade settle, and check every node against a direct
//! evaluation of the same graph. Exercises cascade termination and
//! final-value correctness in one go.

use filament_core::core::signal::SignalView;
use filament_core::core::sim::{Handle, Sim};
use filament_core::device::{Adder, Multiplexer};
use filament_core::wire;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod common;
use common::Probe;

const WIDTH: u32 = 4;

enum Node {
    Input(Handle<Probe>, u32),
    Add(Handle<Adder>, u32),
    Mux(Handle<Multiplexer>, u32),
}

impl Node {
    fn expected(&self) -> u32 {
        match *self {
            Node::Input(_, v) | Node::Add(_, v) | Node::Mux(_, v) => v,
        }
    }

    fn out_view(&self, sim: &Sim) -> SignalView {
        match *self {
            Node::Input(h, _) => sim.get(h).out.view(),
            Node::Add(h, _) => sim.get(h).out.view(),
            Node::Mux(h, _) => sim.get(h).out.view(),
        }
    }

    fn settled(&self, sim: &mut Sim) -> u32 {
        match *self {
            Node::Input(h, _) => sim.with(h, |c, net| c.out.value(net)),
            Node::Add(h, _) => sim.with(h, |c, net| c.out.value(net)),
            Node::Mux(h, _) => sim.with(h, |c, net| c.out.value(net)),
        }
    }
}

#[test]
fn random_combinational_netlists_settle_to_reference_values() {
    let mut rng = StdRng::seed_from_u64(0xF11A);

    for case in 0..40 {
        let mut sim = Sim::new();
        let mut nodes: Vec<Node> = Vec::new();

        let n_inputs = rng.gen_range(2..=4);
        for i in 0..n_inputs {
            let v = rng.gen_range(0..1u32 << WIDTH);
            let h = sim.add(&format!("in{i}"), |n, id| Probe::new(n, id, WIDTH));
            nodes.push(Node::Input(h, v));
        }

        let n_gates = rng.gen_range(3..=12);
        for g in 0..n_gates {
            let a = rng.gen_range(0..nodes.len());
            let b = rng.gen_range(0..nodes.len());
            if rng.gen_bool(0.5) {
                let h = sim.add(&format!("add{g}"), |n, id| Adder::new(n, id, WIDTH));
                let va = nodes[a].out_view(&sim);
                let ia = sim.get(h).a.view();
                sim.netlist().connect(&va, &ia).unwrap();
                let vb = nodes[b].out_view(&sim);
                let ib = sim.get(h).b.view();
                sim.netlist().connect(&vb, &ib).unwrap();
                sim.with(h, |c, net| {
                    c.c.no_connect(net);
                    c.out.no_connect(net);
                });
                let v = (nodes[a].expected() + nodes[b].expected()) & ((1u32 << WIDTH) - 1);
                nodes.push(Node::Add(h, v));
            } else {
                let sel_v = rng.gen_bool(0.5);
                let sel = sim.add(&format!("sel{g}"), |n, id| Probe::new(n, id, 1));
                let h = sim.add(&format!("mux{g}"), |n, id| Multiplexer::new(n, id, WIDTH));
                let va = nodes[a].out_view(&sim);
                let ia = sim.get(h).a.view();
                sim.netlist().connect(&va, &ia).unwrap();
                let vb = nodes[b].out_view(&sim);
                let ib = sim.get(h).b.view();
                sim.netlist().connect(&vb, &ib).unwrap();
                wire!(sim, sim.get(sel).out.view(), sim.get(h).sel.view()).unwrap();
                sim.with(h, |c, net| c.out.no_connect(net));
                sim.with(sel, |p, net| p.out.drive(net, u32::from(sel_v)));
                let v = if sel_v {
                    nodes[b].expected()
                } else {
                    nodes[a].expected()
                };
                nodes.push(Node::Mux(h, v));
            }
        }

        sim.reset();
        for node in &nodes {
            if let Node::Input(h, v) = *node {
                sim.with(h, |p, net| p.out.drive(net, v));
            }
        }
        sim.settle();

        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(
                node.settled(&mut sim),
                node.expected(),
                "case {case}, node {i} diverged from direct evaluation"
            );
        }

        // Quiescence: nothing further may be pending after settle.
        let updates = sim.updates();
        sim.settle();
        assert_eq!(sim.updates(), updates, "case {case} left pending work");
    }
}
