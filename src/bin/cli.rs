//! Headless memristor simulation.
//!
//! Drives one device with a chosen waveform and writes every tick to CSV, or
//! sweeps the whole material library with the same stimulus.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context};
use clap::Parser;
use memristor_sim::{find_preset, presets, sweep_presets, Memristor, SimConfig, Simulator, StimulusConfig, Waveform};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "memristor-cli")]
#[command(about = "Simulate a single memristive device and export the trace as CSV", long_about = None)]
struct Args {
    /// Material preset key or name (see --list-presets)
    #[arg(short, long, default_value = "tio2")]
    preset: String,

    /// Drive waveform (dc, sine, triangle, pulse, pulse-seq)
    #[arg(short, long, default_value = "sine")]
    waveform: String,

    /// Drive amplitude in volts
    #[arg(short, long, default_value = "2.0", allow_hyphen_values = true)]
    amplitude: f64,

    /// Drive frequency in Hz
    #[arg(short, long, default_value = "1.0")]
    frequency: f64,

    /// Time step in seconds
    #[arg(long, default_value = "0.001")]
    dt: f64,

    /// Number of steps to simulate
    #[arg(short = 'n', long, default_value = "2000")]
    steps: usize,

    /// Noise seed (0 = random)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output CSV path, "-" for stdout
    #[arg(short, long, default_value = "memristor_output.csv")]
    output: String,

    /// JSON config merged on top of the preset and command-line waveform
    #[arg(long)]
    config: Option<String>,

    /// Write the effective configuration to this path
    #[arg(long)]
    save_config: Option<String>,

    /// Run every preset with the same stimulus and print a summary
    #[arg(long)]
    sweep: bool,

    /// List material presets and exit
    #[arg(long)]
    list_presets: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    if args.list_presets {
        for p in presets() {
            println!("{:<8} {:<26} {}", p.key, p.name, p.description);
        }
        return Ok(());
    }

    let Some(preset) = find_preset(&args.preset) else {
        bail!("unknown preset '{}' (try --list-presets)", args.preset);
    };
    let waveform: Waveform = args.waveform.parse().map_err(anyhow::Error::msg)?;

    let mut config = SimConfig::new(preset.params, StimulusConfig::new(waveform, args.amplitude, args.frequency));
    if let Some(path) = &args.config {
        config.load_into(path).with_context(|| format!("loading {path}"))?;
    }
    if let Err(e) = config.params.validate() {
        warn!("parameters outside the sensible domain: {e}");
    }
    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    let seed = if args.seed == 0 { rand::random() } else { args.seed };

    if args.sweep {
        let results = sweep_presets(presets(), &config.stimulus, args.steps, args.dt, seed);
        println!("preset,seed,final_state,final_resistance,peak_power,overheated_ticks");
        for r in results {
            println!(
                "{},{},{:.6},{:.3},{:.6e},{}",
                r.preset, r.seed, r.final_state, r.final_resistance, r.peak_power, r.overheated_ticks
            );
        }
        return Ok(());
    }

    info!(
        "{} | {} {:.3} V @ {:.3} Hz | dt={} steps={} seed={}",
        preset.name, config.stimulus.waveform, config.stimulus.amplitude, config.stimulus.frequency, args.dt, args.steps, seed
    );

    let out: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(&args.output).with_context(|| format!("creating {}", args.output))?;
        Box::new(file)
    };
    let mut out = BufWriter::new(out);

    let mut sim = Simulator::new(Memristor::new(config.params, seed), config.stimulus.clone());
    writeln!(out, "time,voltage,current,state,resistance,power,overheated")?;

    let mut overheated = 0usize;
    let mut write_result = Ok(());
    sim.run(args.steps, args.dt, |s| {
        if s.overheated {
            overheated += 1;
        }
        if write_result.is_ok() {
            write_result = writeln!(
                out,
                "{:.9},{:.6e},{:.6e},{:.6},{:.3},{:.6e},{}",
                s.time, s.voltage, s.current, s.state, s.resistance, s.power, s.overheated as u8
            );
        }
    });
    write_result?;
    out.flush()?;

    if overheated > 0 {
        warn!("thermal override fired on {overheated} of {} ticks", args.steps);
    }
    info!("final w={:.4} R={:.1}Ω", sim.device.w(), sim.device.r());
    if args.output != "-" {
        info!("wrote {} samples to {}", args.steps, args.output);
    }
    Ok(())
}
