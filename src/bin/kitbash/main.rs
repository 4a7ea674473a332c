//! Kitbash CLI - merge a manipulator OBJ into a cockpit OBJ.
//!
//! ```bash
//! kitbash -a plane.acf -p wiper1.obj -m wiper1_manip.obj -c cockpit.obj
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kitbash::prelude::*;

/// Kitbash - merge a manipulator OBJ into a cockpit OBJ
#[derive(Parser, Debug)]
#[command(name = "kitbash")]
#[command(about = "Merge an X-Plane manipulator OBJ into a cockpit OBJ using ACF placement")]
#[command(version)]
struct Cli {
    /// ACF descriptor path
    #[arg(short = 'a', long = "acf")]
    acf: PathBuf,

    /// Name of the positioned object inside the ACF
    #[arg(short = 'p', long = "object")]
    object: String,

    /// Manipulator OBJ to merge
    #[arg(short = 'm', long = "manip")]
    manip: PathBuf,

    /// Cockpit OBJ to merge into (rewritten in place, original kept as .SAVE<NNN>)
    #[arg(short = 'c', long = "cockpit")]
    cockpit: PathBuf,

    /// Skip every prompt and replace an earlier merge of the same object
    #[arg(short = 'o', long = "overwrite")]
    overwrite: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Warnings and errors only
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Settings file to use instead of the one in the config dir
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            _ => "trace",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("** ERROR! {e:#}");
        let code = e.downcast_ref::<Error>().map_or(1, Error::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    println!("\n{}\n", env!("KITBASH_BANNER"));

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let mut opts = MergeOptions::from(&settings);
    opts.overwrite |= cli.overwrite;

    check_exists("ACF file", &cli.acf)?;
    check_exists("manipulator OBJ", &cli.manip)?;
    check_exists("cockpit OBJ", &cli.cockpit)?;

    println!("ACF File:\t\t{}", cli.acf.display());
    println!("Positioned OBJ:\t\t{}", cli.object);
    println!("Manipulator OBJ:\t{}", cli.manip.display());
    println!("Cockpit OBJ:\t\t{}", cli.cockpit.display());

    if !cli.overwrite && !confirm("\nVerify file names and locations and type [Y]es to proceed: ")? {
        bail!("process stopped by user");
    }

    let start = Instant::now();
    println!("\nKitbashing commences! Please stand by...\n");

    let report = match merge(&cli.acf, &cli.object, &cli.manip, &cli.cockpit, &opts) {
        Err(Error::AlreadyMerged(name)) if !opts.overwrite => {
            let prompt = format!("{name} already merged into the cockpit object. Overwrite? (y/N): ");
            if !confirm(&prompt)? {
                bail!("process stopped by user");
            }
            merge(&cli.acf, &cli.object, &cli.manip, &cli.cockpit, &opts.with_overwrite(true))?
        }
        other => other?,
    };

    print_report(cli, &report);
    println!("Completed in: {:.4} seconds.", start.elapsed().as_secs_f64());
    Ok(())
}

fn check_exists(what: &str, path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("unable to find {what}: {}", path.display());
    }
    Ok(())
}

/// Print `prompt` and read one line; only an answer starting with `y` counts.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).context("reading answer")?;
    Ok(answer.trim_start().to_lowercase().starts_with('y'))
}

fn print_report(cli: &Cli, report: &MergeReport) {
    let p = &report.placement;
    println!("{} found in {}", cli.object, cli.acf.display());
    println!("Psi (yaw) rotation:\t{:.6}", p.psi);
    println!("Theta (pitch) rotation:\t{:.6}", p.theta);
    println!("Phi (roll) rotation:\t{:.6}", p.phi);
    println!("X axis offset:\t\t{:.8}", p.offset_x);
    println!("Y axis offset:\t\t{:.8}", p.offset_y);
    println!("Z axis offset:\t\t{:.8}\n", p.offset_z);

    let s = &report.splice;
    println!("{} summary{}", cli.cockpit.display(), if s.replaced { " (replaced earlier merge)" } else { "" });
    println!("Orig VTs:\t\t{}", s.original.vertices);
    println!("Added VTs:\t\t{}", s.added_vertices);
    println!("Total VTs:\t\t{}", s.merged.vertices);
    println!("Orig TRIS:\t\t{}", s.original.indices);
    println!("Added TRIS:\t\t{}", s.added_indices);
    println!("Total TRIS:\t\t{}", s.merged.indices);
    println!("----------------------------------");
    println!("VT block at line:\t{}", s.vertex_block_line);
    println!("IDX block at line:\t{}", s.index_block_line);
    println!("ANIM block at line:\t{}", s.anim_block_line);
    println!("Original saved as:\t{}\n", report.backup.display());
}
