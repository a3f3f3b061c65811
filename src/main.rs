use anyhow::{anyhow, bail, Context};
use clap::Parser;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use microscope::path::optical_path;
use microscope::presets::{snap_wavelength, CONDENSER_NA_PRESETS};
use microscope::{
    catalog, GatingPolicy, InstrumentConfig, MethodFactorPolicy, ModelSettings, ObjectivePreset,
    ObservationMethod, OpticalModel,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Microscope optical path in the terminal")]
struct Args {
    #[arg(long, default_value = "halved", help = "Method factor policy: 'halved' or 'uniform'")]
    method_factor: MethodFactorPolicy,

    #[arg(
        long,
        default_value = "method-gated",
        help = "Structure gating policy: 'method-gated' or 'size-only'"
    )]
    gating: GatingPolicy,

    #[arg(long, help = "Print the report for the initial instrument and exit")]
    once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Wavelength(f64),
    Objective(ObjectivePreset),
    Condenser(f64),
    Method(ObservationMethod),
    Show,
    Catalog,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  wavelength <nm>     light source, 400-700 nm in 10 nm steps
  objective <mag>     10, 40, 60 or 100 (100x uses oil immersion)
  condenser <na>      condenser aperture, e.g. 0.5, 0.9, 1.25
  method <name>       brightfield, darkfield, phase, fluorescence
  show                print the current report
  catalog             list every structure and its size
  help                this text
  quit                leave";

fn parse_command(line: &str) -> anyhow::Result<Command> {
    let mut words = line.split_whitespace();
    let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
    let arg = words.next();

    let need = |what: &str| arg.ok_or_else(|| anyhow!("'{name}' needs {what}"));
    let command = match name.to_lowercase().as_str() {
        "wavelength" | "w" => Command::Wavelength(
            need("a wavelength in nm")?
                .parse::<f64>()
                .context("wavelength must be a number")?,
        ),
        "objective" | "o" => {
            let mag = need("a magnification")?;
            let mag = mag
                .trim_end_matches(['x', 'X'])
                .parse::<u32>()
                .context("magnification must be a whole number")?;
            Command::Objective(ObjectivePreset::from_magnification(mag)?)
        }
        "condenser" | "c" => Command::Condenser(
            need("a numerical aperture")?
                .parse::<f64>()
                .context("condenser NA must be a number")?,
        ),
        "method" | "m" => Command::Method(need("a method name")?.parse::<ObservationMethod>()?),
        "show" | "s" => Command::Show,
        "catalog" => Command::Catalog,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}', try 'help'"),
    };
    Ok(command)
}

struct AppState {
    config: InstrumentConfig,
    model: OpticalModel,
}

impl AppState {
    fn new(settings: ModelSettings) -> Self {
        AppState {
            config: InstrumentConfig::default(),
            model: OpticalModel::new(settings),
        }
    }

    /// Apply a change to the instrument. Returns true when the config changed.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Wavelength(nm) => {
                let snapped = snap_wavelength(nm);
                if snapped != nm {
                    warn!(requested = nm, used = snapped, "wavelength snapped to slider range");
                }
                self.config = self.config.with_wavelength(snapped);
            }
            Command::Objective(preset) => {
                self.config = self.config.with_objective(preset);
            }
            Command::Condenser(na) => {
                if !CONDENSER_NA_PRESETS.contains(&na) {
                    info!(na, "condenser NA outside the panel presets");
                }
                self.config = self.config.with_condenser_na(na);
            }
            Command::Method(method) => {
                self.config = self.config.with_method(method);
            }
            Command::Show | Command::Catalog | Command::Help | Command::Quit => return false,
        }
        true
    }

    fn report(&self) -> anyhow::Result<String> {
        let obs = self.model.evaluate(&self.config)?;
        let mut out = String::new();

        let stages = optical_path(&self.config, &obs);
        let path: Vec<String> = stages
            .iter()
            .map(|s| format!("{} [{}]", s.label, s.subtitle))
            .collect();
        writeln!(out, "{}", path.join(" -> "))?;
        writeln!(
            out,
            "Resolution: {:.0} nm | Magnification: {}x | Visible structures: {}",
            obs.resolution_nm,
            obs.total_magnification,
            obs.visible.len()
        )?;
        writeln!(
            out,
            "Light: {} ({}) | Immersion: {}",
            obs.spectral_band.name(),
            obs.light_color,
            if self.config.immersion { "oil" } else { "air" }
        )?;
        writeln!(out, "Condenser: {}", obs.condenser.message())?;
        for s in &obs.visible {
            writeln!(out, "  {} {} ({} nm)", s.symbol, s.name, s.min_size_nm)?;
        }
        write!(out, "Tip: {}", obs.tip.message())?;
        Ok(out)
    }
}

fn catalog_listing() -> String {
    catalog()
        .iter()
        .map(|s| {
            let gate = if s.requires_fluorescence { ", fluorescence" } else { "" };
            format!("  {} {} {} nm ({:?}{gate})", s.symbol, s.name, s.min_size_nm, s.category)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> anyhow::Result<()> {
    microscope::init_logging();
    let args = Args::parse();

    println!("Microscope Optical Path - Rust");
    println!("==============================");

    let mut app_state = AppState::new(ModelSettings {
        method_factor: args.method_factor,
        gating: args.gating,
    });
    println!("{}", app_state.report()?);
    if args.once {
        return Ok(());
    }
    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Catalog => println!("{}", catalog_listing()),
            Command::Show => println!("{}", app_state.report()?),
            change => {
                app_state.apply(change);
                match app_state.report() {
                    Ok(report) => println!("{report}"),
                    Err(e) => warn!(error = %e, "could not evaluate instrument"),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("wavelength 450").unwrap(), Command::Wavelength(450.0));
        assert_eq!(
            parse_command("objective 100x").unwrap(),
            Command::Objective(ObjectivePreset::X100)
        );
        assert_eq!(parse_command("o 60").unwrap(), Command::Objective(ObjectivePreset::X60));
        assert_eq!(parse_command("c 1.25").unwrap(), Command::Condenser(1.25));
        assert_eq!(
            parse_command("method Fluorescence").unwrap(),
            Command::Method(ObservationMethod::Fluorescence)
        );
        assert_eq!(parse_command("  quit \n").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("wavelength").is_err());
        assert!(parse_command("wavelength green").is_err());
        assert!(parse_command("objective 20").is_err());
        assert!(parse_command("method confocal").is_err());
        assert!(parse_command("zoom 3").is_err());
    }

    #[test]
    fn test_apply_updates_instrument() {
        let mut app = AppState::new(ModelSettings::default());
        assert!(app.apply(Command::Objective(ObjectivePreset::X100)));
        assert!(app.config.immersion);
        assert!(app.apply(Command::Wavelength(403.0)));
        assert_eq!(app.config.wavelength_nm, 400.0);
        assert!(app.apply(Command::Method(ObservationMethod::Fluorescence)));
        assert!(!app.apply(Command::Show));

        let report = app.report().unwrap();
        assert!(report.contains("Resolution: 87 nm"));
        assert!(report.contains("Viruses"));
        assert!(!report.contains("Ribosomes"));
        assert!(report.contains("Magnification: 1000x"));
    }

    #[test]
    fn test_default_report() {
        let report = AppState::new(ModelSettings::default()).report().unwrap();
        assert!(report.starts_with("Light source [550 nm] -> Condenser [NA 0.9]"));
        assert!(report.contains("Resolution: 516 nm"));
        assert!(report.contains("Visible structures: 5"));
        assert!(!report.contains("Bacteria"));
    }

    #[test]
    fn test_catalog_listing_marks_gated_entries() {
        let listing = catalog_listing();
        assert_eq!(listing.lines().count(), 8);
        assert!(listing.contains("Ribosomes 25 nm (Macromolecule, fluorescence)"));
    }
}
