pub mod adder;
pub mod bus_connect;
pub mod clock;
pub mod counter;
pub mod memdev;
pub mod mux;
pub mod paged_ram;
pub mod power;
pub mod ram;
pub mod register;
pub mod rom;

pub use adder::Adder;
pub use bus_connect::BusConnect;
pub use clock::Clock;
pub use counter::Counter;
pub use memdev::{DisplayPort, MemDisplay, MemRandom, MemoryDevice, RandomPort};
pub use mux::Multiplexer;
pub use paged_ram::PagedRamController;
pub use power::Power;
pub use ram::Ram;
pub use register::{IORegister, IncRegister, Register};
pub use rom::Rom;
