pub mod machine;
pub mod micro8;
pub mod nor6;
pub mod nor14;
pub mod paged13;
pub mod reference;
pub mod registry;
pub mod runner;

pub use machine::Machine;
pub use micro8::Micro8System;
pub use nor6::Nor6System;
pub use nor14::Nor14System;
pub use paged13::Paged13System;
pub use registry::MachineEntry;
pub use runner::{run, RunOptions, RunOutcome};
