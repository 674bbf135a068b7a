//! Machine registry for front-end discovery.
//!
//! Each machine self-registers via [`inventory::submit!`] with a
//! [`MachineEntry`] containing its CLI name, a short description, and a
//! factory function. The front-end discovers available machines at
//! runtime without any central list.

use filament_core::core::NetlistError;

use crate::machine::Machine;

/// Describes a runnable machine variant.
pub struct MachineEntry {
    /// CLI name used to select this machine (e.g., "micro8").
    pub name: &'static str,
    /// One-line description for the machine listing.
    pub description: &'static str,
    /// Factory: wire the netlist and hand back a fresh machine.
    pub create: fn() -> Result<Box<dyn Machine>, NetlistError>,
}

impl MachineEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        create: fn() -> Result<Box<dyn Machine>, NetlistError>,
    ) -> Self {
        Self {
            name,
            description,
            create,
        }
    }
}

inventory::collect!(MachineEntry);

/// Return all registered machines, sorted by name.
pub fn all() -> Vec<&'static MachineEntry> {
    let mut entries: Vec<_> = inventory::iter::<MachineEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a machine by its CLI name.
pub fn find(name: &str) -> Option<&'static MachineEntry> {
    inventory::iter::<MachineEntry>
        .into_iter()
        .find(|e| e.name == name)
}
