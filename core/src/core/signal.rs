//! Multi-bit signal handles and bus-splicing views.

use std::ops::Range;

use crate::core::netlist::{ComponentId, Edge, Netlist, PinId, SignalId};

/// A named, fixed-width bundle of pins owned by one component.
///
/// Two flavors exist: plain signals are driven (or polled) by their owner,
/// while notify signals additionally queue the owner's `update` callback
/// whenever a contained pin's observed value changes.
pub struct Signal {
    id: SignalId,
    first: PinId,
    width: u32,
}

impl Signal {
    pub fn new(net: &mut Netlist, owner: ComponentId, name: &'static str, width: u32) -> Self {
        let (id, first) = net.alloc_signal(owner, name, width, false);
        Self { id, first, width }
    }

    pub fn notify(net: &mut Netlist, owner: ComponentId, name: &'static str, width: u32) -> Self {
        let (id, first) = net.alloc_signal(owner, name, width, true);
        Self { id, first, width }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    fn pin(&self, bit: u32) -> PinId {
        debug_assert!(bit < self.width);
        PinId(self.first.0 + bit)
    }

    /// Drive all pins to the bits of `value`, least significant first.
    /// Out-of-range values warn once and are masked.
    pub fn drive(&self, net: &mut Netlist, value: u32) {
        let mask = self.mask();
        if value & !mask != 0 {
            let label = net.signal_label(self.id);
            net.warn_once(format!(
                "driving {value:#x} out of range for {}-bit signal {label}",
                self.width
            ));
        }
        for bit in 0..self.width {
            self.drive_pin_level(net, bit, (value >> bit) & 1 == 1);
        }
    }

    fn drive_pin_level(&self, net: &mut Netlist, bit: u32, level: bool) {
        net.drive_pin(self.pin(bit), Some(level));
    }

    /// Release every pin to hi-Z.
    pub fn release(&self, net: &mut Netlist) {
        for bit in 0..self.width {
            net.drive_pin(self.pin(bit), None);
        }
    }

    /// Assemble the observed value from all pins.
    pub fn value(&self, net: &Netlist) -> u32 {
        let mut v = 0;
        for bit in 0..self.width {
            if net.pin_level(self.pin(bit)) {
                v |= 1 << bit;
            }
        }
        v
    }

    /// Edge test on bit 0, for the common 1-bit strobe signals.
    pub fn had_edge(&self, net: &mut Netlist, edge: Edge) -> bool {
        net.take_edge(self.pin(0), edge)
    }

    /// Edge test on an individual bit (split-write enables).
    pub fn had_edge_bit(&self, net: &mut Netlist, bit: u32, edge: Edge) -> bool {
        net.take_edge(self.pin(bit), edge)
    }

    fn mask(&self) -> u32 {
        if self.width == 32 {
            u32::MAX
        } else {
            (1 << self.width) - 1
        }
    }

    // --- views -----------------------------------------------------------

    /// View of the whole signal.
    pub fn view(&self) -> SignalView {
        self.slice(0..self.width)
    }

    /// View of bits `range.start..range.end` (LSB first).
    pub fn slice(&self, range: Range<u32>) -> SignalView {
        assert!(range.end <= self.width, "slice out of range");
        SignalView {
            signal: self.id,
            pins: range.map(|b| self.pin(b)).collect(),
        }
    }

    /// Single-bit view.
    pub fn bit(&self, bit: u32) -> SignalView {
        self.slice(bit..bit + 1)
    }

    /// View with bits rearranged: view bit `i` is signal bit `order[i]`.
    pub fn permute(&self, order: &[u32]) -> SignalView {
        SignalView {
            signal: self.id,
            pins: order
                .iter()
                .map(|&b| {
                    assert!(b < self.width, "permute index out of range");
                    self.pin(b)
                })
                .collect(),
        }
    }

    /// Mark the whole signal as intentionally unwired.
    pub fn no_connect(&self, net: &mut Netlist) {
        let view = self.view();
        net.no_connect(&view);
    }
}

/// A borrowed slice/permutation of a signal's pins, used for wiring.
pub struct SignalView {
    pub(crate) signal: SignalId,
    pub(crate) pins: Vec<PinId>,
}

impl SignalView {
    pub fn width(&self) -> u32 {
        self.pins.len() as u32
    }
}
