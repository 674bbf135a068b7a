use filament_asm::AsmError;

/// Machine-agnostic interface for the simulated CPUs.
///
/// Each variant wires its own netlist and exposes the few operations the
/// runner needs: assembling a program into its memory image, advancing
/// one machine cycle, and observing PC, registers, and RAM. The runner
/// is a pure driver that knows nothing about phases, decoders, or
/// memory maps.
pub trait Machine {
    /// CLI name of this machine.
    fn name(&self) -> &'static str;

    /// Assemble `source` into the machine's program memory. `path` is
    /// used for diagnostics only.
    fn assemble(&mut self, path: &str, source: &str) -> Result<(), AsmError>;

    /// Drive every component to its power-on state.
    fn reset(&mut self);

    /// Advance the clock through one machine cycle (one instruction
    /// fetch-execute window; its length in ticks is machine-specific).
    fn machine_cycle(&mut self);

    /// Current program counter, for halt detection and the trace.
    fn pc(&self) -> u16;

    /// Number of consecutive machine cycles the PC must stand still
    /// before the runner declares a halt.
    fn halt_threshold(&self) -> u32;

    /// One-line register/PC trace for the current state.
    fn trace(&self) -> String;

    /// Hex dump of the assembled image, printed before the run.
    fn image_dump(&self) -> String;

    /// Hex dump of RAM, printed after the run.
    fn ram_dump(&self) -> String;

    /// Lines printed by the memory-mapped display so far.
    fn printed(&self) -> Vec<String>;

    /// Net resolutions performed, for the post-run statistics line.
    fn net_updates(&self) -> u64;
}
