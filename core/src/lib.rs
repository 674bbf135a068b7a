pub mod core;
pub mod device;

/// Connect two signal views in a [`core::sim::Sim`]'s netlist.
///
/// Evaluates both view expressions before touching the netlist, so the
/// usual `wire!(sim, sim.get(a).out.view(), sim.get(b).inp.view())?`
/// form borrows cleanly.
#[macro_export]
macro_rules! wire {
    ($sim:expr, $a:expr, $b:expr) => {{
        let a = $a;
        let b = $b;
        $sim.netlist().connect(&a, &b)
    }};
}

pub mod prelude {
    pub use crate::core::component::Component;
    pub use crate::core::netlist::{ComponentId, Edge, Netlist, SignalId};
    pub use crate::core::signal::{Signal, SignalView};
    pub use crate::core::sim::{Handle, Sim};
    pub use crate::core::NetlistError;
}
