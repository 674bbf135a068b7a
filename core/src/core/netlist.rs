//! Pin/net arena and the propagation engine.
//!
//! Every wire-level entity lives in one [`Netlist`] arena and is addressed
//! by index. Components own [`crate::core::signal::Signal`] handles whose
//! pins point into the arena; connecting signals merges the underlying
//! nets. Driving a pin resolves its net immediately and queues an `update`
//! notification for every notify-signal whose observed value changed.
//!
//! Notifications accumulate in a pending batch per component update;
//! [`crate::core::sim::Sim::settle`] drains batches depth-first, so the
//! cascade triggered by a component's first drive completes before its
//! later drives are followed up. That keeps edge-triggered latches from
//! sampling a bus whose driver update is still queued, while arbitrarily
//! deep cascades run in constant call-stack space.

use std::collections::{HashSet, VecDeque};

use crate::core::error::NetlistError;
use crate::core::signal::SignalView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub(crate) u32);

/// Direction of a logic transition on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

struct PinState {
    /// Last value driven (driver) or observed (listener).
    level: bool,
    /// A pin either drives its net or listens to it, never both.
    hi_z: bool,
    /// Most recent transition, consumed by [`Netlist::take_edge`].
    edge: Option<Edge>,
    net: Option<NetId>,
    signal: SignalId,
    notify: bool,
    /// Marked intentionally unwired; suppresses diagnostics.
    no_connect: bool,
}

struct NetState {
    /// Member pins in insertion order. The first non-hi-Z pin is the
    /// driver; iteration order fixes callback order.
    pins: Vec<PinId>,
    /// Value a floating net resolves to, if any.
    pull: Option<bool>,
}

pub(crate) struct SignalMeta {
    pub owner: ComponentId,
    pub name: &'static str,
    pub width: u32,
    pub first_pin: PinId,
}

/// Arena of pins and nets plus the propagation work queue.
pub struct Netlist {
    pins: Vec<PinState>,
    nets: Vec<NetState>,
    signals: Vec<SignalMeta>,
    component_names: Vec<String>,
    pending: VecDeque<(ComponentId, SignalId)>,
    warned: HashSet<String>,
    updates: u64,
}

impl Netlist {
    pub fn new() -> Self {
        Self {
            pins: Vec::new(),
            nets: Vec::new(),
            signals: Vec::new(),
            component_names: Vec::new(),
            pending: VecDeque::new(),
            warned: HashSet::new(),
            updates: 0,
        }
    }

    /// Total net resolutions performed, reported after a run.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub(crate) fn register_component(&mut self, name: &str) -> ComponentId {
        let id = ComponentId(self.component_names.len() as u32);
        self.component_names.push(name.to_string());
        id
    }

    pub fn component_name(&self, id: ComponentId) -> &str {
        &self.component_names[id.0 as usize]
    }

    pub(crate) fn alloc_signal(
        &mut self,
        owner: ComponentId,
        name: &'static str,
        width: u32,
        notify: bool,
    ) -> (SignalId, PinId) {
        assert!(
            (1..=32).contains(&width),
            "signal {name} width {width} out of range"
        );
        let id = SignalId(self.signals.len() as u32);
        let first = PinId(self.pins.len() as u32);
        for _ in 0..width {
            self.pins.push(PinState {
                level: false,
                hi_z: true,
                edge: None,
                net: None,
                signal: id,
                notify,
                no_connect: false,
            });
        }
        self.signals.push(SignalMeta {
            owner,
            name,
            width,
            first_pin: first,
        });
        (id, first)
    }

    fn pin_label(&self, pin: PinId) -> String {
        let meta = &self.signals[self.pins[pin.0 as usize].signal.0 as usize];
        let bit = pin.0 - meta.first_pin.0;
        format!(
            "{}/{}[{}]",
            self.component_name(meta.owner),
            meta.name,
            bit
        )
    }

    pub(crate) fn signal_label(&self, signal: SignalId) -> String {
        let meta = &self.signals[signal.0 as usize];
        format!("{}/{}", self.component_name(meta.owner), meta.name)
    }

    /// Emit a runtime warning at most once per distinct message.
    pub fn warn_once(&mut self, msg: String) {
        if self.warned.insert(msg.clone()) {
            eprintln!("warning: {msg}");
        }
    }

    // --- propagation -----------------------------------------------------

    /// Drive a pin to a level, or release it to hi-Z (`None`). Re-driving
    /// the current state is a no-op; any effective change resolves the net.
    pub fn drive_pin(&mut self, pin: PinId, level: Option<bool>) {
        let p = pin.0 as usize;
        match level {
            None => {
                if self.pins[p].hi_z {
                    return;
                }
                self.pins[p].hi_z = true;
                if let Some(net) = self.pins[p].net {
                    self.resolve(net);
                }
            }
            Some(v) => {
                if !self.pins[p].hi_z && self.pins[p].level == v {
                    return;
                }
                self.pins[p].hi_z = false;
                self.pins[p].level = v;
                match self.pins[p].net {
                    Some(net) => self.resolve(net),
                    None => {
                        if !self.pins[p].no_connect {
                            let label = self.pin_label(pin);
                            self.warn_once(format!("driving unconnected pin {label}"));
                        }
                    }
                }
            }
        }
    }

    /// Propagate the net's effective value to every listening pin,
    /// recording edges and queueing notify callbacks for observed changes.
    fn resolve(&mut self, net: NetId) {
        self.updates += 1;
        let n = net.0 as usize;

        let mut driver: Option<PinId> = None;
        let mut extra_driver = false;
        for i in 0..self.nets[n].pins.len() {
            let pin = self.nets[n].pins[i];
            if !self.pins[pin.0 as usize].hi_z {
                if driver.is_none() {
                    driver = Some(pin);
                } else {
                    extra_driver = true;
                }
            }
        }
        if extra_driver && let Some(pin) = driver {
            // The first driver in insertion order wins; decoders briefly
            // assert conflicting lines while a cascade settles.
            let label = self.pin_label(pin);
            self.warn_once(format!("multiple drivers on net of {label}"));
        }

        let effective = match driver {
            Some(pin) => self.pins[pin.0 as usize].level,
            // A floating net without a pull keeps its listeners unchanged.
            None => match self.nets[n].pull {
                Some(v) => v,
                None => return,
            },
        };

        for i in 0..self.nets[n].pins.len() {
            let pin = self.nets[n].pins[i];
            let p = &mut self.pins[pin.0 as usize];
            if p.hi_z && p.level != effective {
                p.level = effective;
                p.edge = Some(if effective { Edge::Rising } else { Edge::Falling });
                if p.notify {
                    // One callback per affected notify-signal: driving a
                    // multi-bit signal touches several one-bit nets but
                    // queues the owner once.
                    let signal = p.signal;
                    let owner = self.signals[signal.0 as usize].owner;
                    if !self.pending.contains(&(owner, signal)) {
                        self.pending.push_back((owner, signal));
                    }
                }
            }
        }
    }

    /// Notifications produced since the last call, in drive order.
    pub(crate) fn take_pending(&mut self) -> VecDeque<(ComponentId, SignalId)> {
        std::mem::take(&mut self.pending)
    }

    /// Read a pin's logic level: its own level while driving, otherwise
    /// the effective value of its net (driver, else pull, else 0).
    pub fn pin_level(&self, pin: PinId) -> bool {
        let p = &self.pins[pin.0 as usize];
        if !p.hi_z {
            return p.level;
        }
        match p.net {
            Some(net) => self.net_level(net),
            None => p.level,
        }
    }

    fn net_level(&self, net: NetId) -> bool {
        let n = &self.nets[net.0 as usize];
        for &pin in &n.pins {
            if !self.pins[pin.0 as usize].hi_z {
                return self.pins[pin.0 as usize].level;
            }
        }
        n.pull.unwrap_or(false)
    }

    /// True iff the pin transitioned to `edge` since the last call.
    /// The marker is consumed regardless of the direction asked for.
    pub fn take_edge(&mut self, pin: PinId, edge: Edge) -> bool {
        let p = &mut self.pins[pin.0 as usize];
        let hit = p.edge == Some(edge);
        p.edge = None;
        hit
    }

    // --- wiring ----------------------------------------------------------

    fn connect_pins(&mut self, a: PinId, b: PinId) -> Result<(), NetlistError> {
        let na = self.pins[a.0 as usize].net;
        let nb = self.pins[b.0 as usize].net;
        match (na, nb) {
            (None, None) => {
                let id = NetId(self.nets.len() as u32);
                self.nets.push(NetState {
                    pins: vec![a, b],
                    pull: None,
                });
                self.pins[a.0 as usize].net = Some(id);
                self.pins[b.0 as usize].net = Some(id);
            }
            (Some(net), None) => {
                self.nets[net.0 as usize].pins.push(b);
                self.pins[b.0 as usize].net = Some(net);
            }
            (None, Some(net)) => {
                self.nets[net.0 as usize].pins.push(a);
                self.pins[a.0 as usize].net = Some(net);
            }
            (Some(na), Some(nb)) => {
                if na == nb {
                    return Ok(());
                }
                self.merge(na, nb)?;
            }
        }
        Ok(())
    }

    /// Union two nets, keeping `keep` and emptying `from`.
    fn merge(&mut self, keep: NetId, from: NetId) -> Result<(), NetlistError> {
        let pull = match (self.nets[keep.0 as usize].pull, self.nets[from.0 as usize].pull) {
            (Some(a), Some(b)) if a != b => {
                let label = self.pin_label(self.nets[keep.0 as usize].pins[0]);
                return Err(NetlistError::ConflictingPulls { net: label });
            }
            (a, b) => a.or(b),
        };
        let moved = std::mem::take(&mut self.nets[from.0 as usize].pins);
        for &pin in &moved {
            self.pins[pin.0 as usize].net = Some(keep);
        }
        self.nets[keep.0 as usize].pins.extend(moved);
        self.nets[keep.0 as usize].pull = pull;
        Ok(())
    }

    /// Connect two views pin-wise. Widths must match.
    pub fn connect(&mut self, a: &SignalView, b: &SignalView) -> Result<(), NetlistError> {
        if a.pins.len() != b.pins.len() {
            return Err(NetlistError::WidthMismatch {
                a: self.signal_label(a.signal),
                b: self.signal_label(b.signal),
                a_width: a.pins.len() as u32,
                b_width: b.pins.len() as u32,
            });
        }
        for (&pa, &pb) in a.pins.iter().zip(&b.pins) {
            self.connect_pins(pa, pb)?;
        }
        Ok(())
    }

    /// Set a per-bit pull value for every net under the view, creating
    /// single-pin nets for unwired pins.
    pub fn set_pull(&mut self, view: &SignalView, value: u32) {
        for (bit, &pin) in view.pins.iter().enumerate() {
            let net = match self.pins[pin.0 as usize].net {
                Some(net) => net,
                None => {
                    let id = NetId(self.nets.len() as u32);
                    self.nets.push(NetState {
                        pins: vec![pin],
                        pull: None,
                    });
                    self.pins[pin.0 as usize].net = Some(id);
                    id
                }
            };
            self.nets[net.0 as usize].pull = Some((value >> bit) & 1 == 1);
        }
    }

    /// Mark the view's pins as intentionally unwired.
    pub fn no_connect(&mut self, view: &SignalView) {
        for &pin in &view.pins {
            self.pins[pin.0 as usize].no_connect = true;
        }
    }

    /// Describe every signal, flagging pins that were never wired and not
    /// marked no-connect. Used for pre-run netlist review.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for meta in &self.signals {
            let mut loose = Vec::new();
            for bit in 0..meta.width {
                let p = &self.pins[(meta.first_pin.0 + bit) as usize];
                if p.net.is_none() && !p.no_connect {
                    loose.push(bit.to_string());
                }
            }
            if !loose.is_empty() {
                out.push_str(&format!(
                    "  {}/{}({}) unconnected bits: {}\n",
                    self.component_name(meta.owner),
                    meta.name,
                    meta.width,
                    loose.join(",")
                ));
            }
        }
        out
    }
}

impl Default for Netlist {
    fn default() -> Self {
        Self::new()
    }
}
