use std::fmt;

/// Wiring-time netlist errors. These indicate a malformed circuit
/// description and are reported before the simulation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetlistError {
    /// Two signal views of different widths were connected.
    WidthMismatch {
        a: String,
        b: String,
        a_width: u32,
        b_width: u32,
    },
    /// Two nets with conflicting pull values were merged.
    ConflictingPulls { net: String },
    /// A view referenced a bit outside its signal's width.
    BitOutOfRange { signal: String, bit: u32 },
}

impl fmt::Display for NetlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetlistError::WidthMismatch {
                a,
                b,
                a_width,
                b_width,
            } => write!(
                f,
                "width mismatch connecting {a} ({a_width} bits) to {b} ({b_width} bits)"
            ),
            NetlistError::ConflictingPulls { net } => {
                write!(f, "merging nets with conflicting pull values at {net}")
            }
            NetlistError::BitOutOfRange { signal, bit } => {
                write!(f, "bit {bit} out of range for signal {signal}")
            }
        }
    }
}

impl std::error::Error for NetlistError {}
