use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Edge, Netlist, SignalId};
use crate::core::signal::Signal;

/// Byte-wide static RAM. A rising edge on `we` stores `data` at `addr`;
/// while `oe` is high the current cell drives `data`.
pub struct Ram {
    pub ram: Vec<u8>,
    pub addr: Signal,
    pub data: Signal,
    pub oe: Signal,
    pub we: Signal,
}

impl Ram {
    pub fn new(net: &mut Netlist, id: ComponentId, addr_width: u32, data_width: u32) -> Self {
        Self {
            ram: vec![0; 1 << addr_width],
            addr: Signal::notify(net, id, "addr", addr_width),
            data: Signal::new(net, id, "data", data_width),
            oe: Signal::notify(net, id, "oe", 1),
            we: Signal::notify(net, id, "we", 1),
        }
    }

    pub fn load(&mut self, image: &[u8]) {
        self.ram[..image.len()].copy_from_slice(image);
    }

    /// Hex listing of the memory, 16 bytes per line, all-zero lines
    /// elided. This is the dump printed after a run.
    pub fn dump_nonzero(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.ram.chunks(16).enumerate() {
            if line.iter().all(|&b| b == 0) {
                continue;
            }
            let bytes: Vec<String> = line.iter().map(|b| format!("{b:02x}")).collect();
            out.push_str(&format!("{:04x}: {}\n", i * 16, bytes.join(" ")));
        }
        out
    }
}

impl Component for Ram {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        let addr = self.addr.value(net) as usize;
        if self.we.had_edge(net, Edge::Rising) {
            self.ram[addr] = self.data.value(net) as u8;
        }
        if self.oe.value(net) == 1 {
            self.data.drive(net, u32::from(self.ram[addr]));
        } else {
            self.data.release(net);
        }
    }
}
