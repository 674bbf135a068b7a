use crate::core::component::Component;
use crate::core::netlist::{ComponentId, Netlist, SignalId};
use crate::core::signal::Signal;

/// Byte-wide read-only memory. Drives `data = rom[addr]` while `oe` is
/// high, hi-Z otherwise.
pub struct Rom {
    pub rom: Vec<u8>,
    pub addr: Signal,
    pub data: Signal,
    pub oe: Signal,
}

impl Rom {
    pub fn new(net: &mut Netlist, id: ComponentId, addr_width: u32, data_width: u32) -> Self {
        Self {
            rom: vec![0; 1 << addr_width],
            addr: Signal::notify(net, id, "addr", addr_width),
            data: Signal::new(net, id, "data", data_width),
            oe: Signal::notify(net, id, "oe", 1),
        }
    }

    /// Copy an assembled image into the start of the ROM.
    pub fn load(&mut self, image: &[u8]) {
        self.rom[..image.len()].copy_from_slice(image);
    }

    /// Hex listing of the contents with all-zero lines elided.
    pub fn dump_nonzero(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.rom.chunks(16).enumerate() {
            if line.iter().all(|&b| b == 0) {
                continue;
            }
            let bytes: Vec<String> = line.iter().map(|b| format!("{b:02x}")).collect();
            out.push_str(&format!("{:04x}: {}\n", i * 16, bytes.join(" ")));
        }
        out
    }
}

impl Component for Rom {
    fn update(&mut self, net: &mut Netlist, _signal: SignalId) {
        if self.oe.value(net) == 1 {
            let addr = self.addr.value(net) as usize;
            self.data.drive(net, u32::from(self.rom[addr]));
        } else {
            self.data.release(net);
        }
    }
}
