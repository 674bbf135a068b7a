use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use filament_machines::registry;
use filament_machines::runner::{run, RunOptions, RunOutcome};

/// Gate-level simulator for the small CPU family. Assembles a source
/// file into the selected machine's memory image and runs it clock
/// tick by clock tick until the program halts.
#[derive(Parser)]
#[command(name = "filament", version)]
struct Args {
    /// Machine variant to simulate; an unknown name lists the choices.
    machine: String,
    /// Assembly source file.
    source: PathBuf,
    /// Stop after this many machine cycles.
    #[arg(long)]
    max_cycles: Option<u64>,
    /// Suppress the per-cycle register trace.
    #[arg(long)]
    quiet: bool,
}

fn list_machines() {
    eprintln!("available machines:");
    for entry in registry::all() {
        eprintln!("  {:8} {}", entry.name, entry.description);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(entry) = registry::find(&args.machine) else {
        eprintln!("unknown machine \"{}\"", args.machine);
        list_machines();
        return ExitCode::from(2);
    };

    let mut machine = match (entry.create)() {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("netlist error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let path = args.source.display().to_string();
    let source = match std::fs::read_to_string(&args.source) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = machine.assemble(&path, &source) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    println!("Loaded image:");
    print!("{}", machine.image_dump());

    // Ctrl-C flips the cancel token; the run loop stops at the next
    // machine cycle and the RAM dump below still happens.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
            eprintln!("warning: could not install interrupt handler: {e}");
        }
    }

    let outcome = run(
        machine.as_mut(),
        &RunOptions {
            max_cycles: args.max_cycles,
            trace: !args.quiet,
        },
        &cancel,
    );

    match outcome {
        RunOutcome::Halted { cycles } => {
            println!(
                "Halted after {cycles} machine cycles and {} net updates.",
                machine.net_updates()
            );
        }
        RunOutcome::Cancelled { cycles } => {
            println!("Interrupted after {cycles} machine cycles.");
        }
        RunOutcome::CycleLimit { cycles } => {
            println!("Cycle limit reached after {cycles} machine cycles.");
        }
    }

    println!("RAM:");
    print!("{}", machine.ram_dump());
    ExitCode::SUCCESS
}
