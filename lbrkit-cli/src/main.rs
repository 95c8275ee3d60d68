//! LbrKit CLI - the .LBR library tool.
//!
//! Works with CP/M LU libraries and the squeezed and crunched member
//! formats that usually travel inside them.

mod utils;

use clap::{Parser, Subcommand};
use dialoguer::Input;
use lbrkit_archive::{Compression, ops};
use lbrkit_crunch::{crunch, is_crunched, uncrunch};
use lbrkit_squeeze::{is_squeezed, squeeze, unsqueeze};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use utils::{create_progress_bar, decoded_output_path};

#[derive(Parser)]
#[command(name = "lbrkit")]
#[command(
    author,
    version,
    about = "Pure Rust toolkit for CP/M .LBR libraries",
    arg_required_else_help = true
)]
#[command(long_about = "
LbrKit reads and writes CP/M LU libraries (.LBR) together with the
squeezed (Huffman) and crunched (LZW) member formats that usually
travel inside them. Extraction decodes compressed members
automatically.

Examples:
  lbrkit list -v programs.lbr
  lbrkit extract programs.lbr -o out
  lbrkit extract programs.lbr HELLO.BAS
  lbrkit print programs.lbr README.TXT
  lbrkit add programs.lbr hello.bas notes.txt
  lbrkit delete programs.lbr OLD.BAK
  lbrkit compact programs.lbr
  lbrkit create fresh.lbr --slots 32
  lbrkit unsqueeze hello.bqs
  lbrkit uncrunch notes.tzt
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List members of a library
    #[command(alias = "t")]
    List {
        /// Library file to list
        library: PathBuf,

        /// Members to list (all if empty)
        names: Vec<String>,

        /// Show the full table with slot and sector totals
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Extract members from a library
    #[command(alias = "e")]
    Extract {
        /// Library file to extract from
        library: PathBuf,

        /// Members to extract (all if empty)
        names: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Write squeezed and crunched members as stored, undecoded
        #[arg(short = 'n', long)]
        no_decompress: bool,

        /// Suppress the progress bar and per-member lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print members as text on standard output
    #[command(alias = "p")]
    Print {
        /// Library file to read
        library: PathBuf,

        /// Members to print (all if empty)
        names: Vec<String>,

        /// Stop each member after this many lines
        #[arg(short, long)]
        max_lines: Option<u32>,
    },

    /// Add or update files in a library
    #[command(alias = "u")]
    Add {
        /// Library file to add to (created when missing)
        library: PathBuf,

        /// Files to add
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Slot count if the library must be created (prompts when omitted)
        #[arg(short, long)]
        slots: Option<usize>,

        /// Report each file as it lands
        #[arg(short, long)]
        verbose: bool,

        /// Suppress the progress bar and per-file lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Mark members deleted
    #[command(alias = "d")]
    Delete {
        /// Library file to edit
        library: PathBuf,

        /// Members to delete
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Rebuild a library without its deleted members
    #[command(alias = "r")]
    Compact {
        /// Library file to rebuild
        library: PathBuf,

        /// Name each member carried over
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create an empty library
    Create {
        /// Library file to create
        library: PathBuf,

        /// Directory slots to allocate (rounded down to a whole sector)
        #[arg(short, long)]
        slots: usize,
    },

    /// Squeeze a loose file (Huffman over run-collapsed bytes)
    Squeeze {
        /// File to squeeze
        file: PathBuf,

        /// Output path (input path with .sq extension if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand a squeezed file
    Unsqueeze {
        /// Squeezed file to expand
        file: PathBuf,

        /// Output path (the embedded name if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Crunch a loose file (adaptive LZW over run-collapsed bytes)
    Crunch {
        /// File to crunch
        file: PathBuf,

        /// Output path (input path with .crn extension if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand a crunched file
    Uncrunch {
        /// Crunched file to expand
        file: PathBuf,

        /// Output path (the embedded name if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List {
            library,
            names,
            verbose,
            json,
        } => cmd_list(&library, &names, verbose, json),
        Commands::Extract {
            library,
            names,
            output,
            no_decompress,
            quiet,
        } => cmd_extract(&library, &names, &output, no_decompress, quiet),
        Commands::Print {
            library,
            names,
            max_lines,
        } => cmd_print(&library, &names, max_lines),
        Commands::Add {
            library,
            files,
            slots,
            verbose,
            quiet,
        } => cmd_add(&library, &files, slots, verbose, quiet),
        Commands::Delete { library, names } => cmd_delete(&library, &names),
        Commands::Compact { library, verbose } => cmd_compact(&library, verbose),
        Commands::Create { library, slots } => cmd_create(&library, slots),
        Commands::Squeeze { file, output } => cmd_squeeze(&file, output.as_deref()),
        Commands::Unsqueeze { file, output } => cmd_unsqueeze(&file, output.as_deref()),
        Commands::Crunch { file, output } => cmd_crunch(&file, output.as_deref()),
        Commands::Uncrunch { file, output } => cmd_uncrunch(&file, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct JsonMember<'a> {
    name: &'a str,
    first_sector: u16,
    sectors: u16,
}

#[derive(Serialize)]
struct JsonListing<'a> {
    library: &'a str,
    slots: usize,
    dir_sectors: u16,
    active: usize,
    deleted: usize,
    unused: usize,
    total_sectors: u32,
    members: Vec<JsonMember<'a>>,
    missing: &'a [String],
}

fn cmd_list(
    library: &Path,
    names: &[String],
    verbose: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let listing = ops::list(library, names)?;

    if json {
        let doc = JsonListing {
            library: &listing.library,
            slots: listing.slots,
            dir_sectors: listing.dir_sectors,
            active: listing.active,
            deleted: listing.deleted,
            unused: listing.unused,
            total_sectors: listing.total_sectors,
            members: listing
                .rows
                .iter()
                .map(|row| JsonMember {
                    name: &row.name,
                    first_sector: row.offset,
                    sectors: row.sectors,
                })
                .collect(),
            missing: &listing.missing,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", listing.render(verbose));
    }

    if !listing.missing.is_empty() {
        for name in &listing.missing {
            eprintln!("  {}: not in library", name);
        }
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_extract(
    library: &Path,
    names: &[String],
    output: &Path,
    no_decompress: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(output)?;
    println!("Extracting {} to {}", library.display(), output.display());

    let report = ops::extract(library, names, output, !no_decompress)?;

    let pb = create_progress_bar(report.extracted.len() as u64, !quiet);
    pb.set_message("members");
    for out in &report.extracted {
        let verb = match out.compression {
            Compression::Squeezed => "Unsqueezed",
            Compression::Crunched => "Uncrunched",
            Compression::Stored => "Extracted",
        };
        pb.println(format!(
            "  {}: {} ({} bytes)",
            verb,
            out.path.display(),
            out.written
        ));
        if out.checksum_mismatch == Some(true) {
            pb.println(format!("  Warning: {}: checksum mismatch", out.member));
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    if !report.failures.is_empty() {
        println!();
        println!("Errors:");
        for failure in &report.failures {
            println!("  {}: {}", failure.name, failure.error);
        }
        std::process::exit(2);
    }
    Ok(())
}

/// Member names go to stderr, content to stdout, so the text can be
/// piped while the names stay visible.
fn cmd_print(
    library: &Path,
    names: &[String],
    max_lines: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = ops::print(library, names, max_lines)?;

    for member in &report.printed {
        eprintln!("{}", member.member);
        print!("{}", member.text);
        if member.truncated {
            eprintln!("[{} truncated]", member.member);
        }
        if member.checksum_mismatch == Some(true) {
            eprintln!("Warning: {}: checksum mismatch", member.member);
        }
    }

    if !report.failures.is_empty() {
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.name, failure.error);
        }
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_add(
    library: &Path,
    files: &[PathBuf],
    slots: Option<usize>,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let new_library_slots = if library.exists() {
        None
    } else {
        match slots {
            Some(n) => Some(n),
            None => {
                let n: usize = Input::new()
                    .with_prompt("Number of slots to allocate")
                    .interact_text()?;
                Some(n)
            }
        }
    };

    let report = ops::add(library, files, new_library_slots)?;

    let pb = create_progress_bar(report.added.len() as u64, !quiet);
    pb.set_message("files");
    for added in &report.added {
        if verbose {
            let action = if added.updated { "Updated" } else { "Added" };
            pb.println(format!(
                "  {}: {} ({} sectors)",
                action, added.member, added.sectors
            ));
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    if !report.failures.is_empty() {
        println!();
        println!("Errors:");
        for failure in &report.failures {
            println!("  {}: {}", failure.name, failure.error);
        }
    }

    if !report.saved {
        eprintln!("errors - library not changed");
        std::process::exit(2);
    }
    println!("Added {} files to {}", report.added.len(), library.display());
    Ok(())
}

fn cmd_delete(library: &Path, names: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let report = ops::delete(library, names)?;

    for name in &report.deleted {
        println!("  Deleted: {}", name);
    }
    for name in &report.missing {
        eprintln!("  {}: not in library", name);
    }

    if !report.saved {
        eprintln!("errors - library not updated");
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_compact(library: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = ops::compact(library)?;

    if verbose {
        for name in &report.copied {
            println!("  Kept: {}", name);
        }
    }
    println!(
        "Compacted {}: {} members in {} slots",
        library.display(),
        report.copied.len(),
        report.slots
    );
    Ok(())
}

fn cmd_create(library: &Path, slots: usize) -> Result<(), Box<dyn std::error::Error>> {
    let report = ops::create(library, slots)?;
    println!(
        "Created {} with {} slots ({} directory sectors)",
        library.display(),
        report.slots,
        report.dir_sectors
    );
    Ok(())
}

fn cmd_squeeze(file: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(file).map_err(|err| format!("{}: {}", file.display(), err))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let packed = squeeze(&name, &data)?;
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => file.with_extension("sq"),
    };
    fs::write(&out_path, &packed)?;

    let pct = 100.0 * packed.len() as f64 / data.len().max(1) as f64;
    println!(
        "Squeezed {}: {} bytes in, {} out ({:.1}%)",
        file.display(),
        data.len(),
        packed.len(),
        pct
    );
    println!("Wrote {}", out_path.display());
    Ok(())
}

fn cmd_unsqueeze(file: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(file).map_err(|err| format!("{}: {}", file.display(), err))?;
    if !is_squeezed(&data) {
        return Err(format!("{}: not a squeezed file", file.display()).into());
    }

    let out = unsqueeze(&data)?;
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => decoded_output_path(&out.original_name, file),
    };
    fs::write(&out_path, &out.data)?;

    println!("Unsqueezed {}: {} bytes", file.display(), out.data.len());
    println!("Wrote {}", out_path.display());
    if out.checksum_mismatch {
        eprintln!("Warning: {}: checksum mismatch", file.display());
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_crunch(file: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(file).map_err(|err| format!("{}: {}", file.display(), err))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let packed = crunch(&name, &data)?;
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => file.with_extension("crn"),
    };
    fs::write(&out_path, &packed)?;

    let pct = 100.0 * packed.len() as f64 / data.len().max(1) as f64;
    println!(
        "Crunched {}: {} bytes in, {} out ({:.1}%)",
        file.display(),
        data.len(),
        packed.len(),
        pct
    );
    println!("Wrote {}", out_path.display());
    Ok(())
}

fn cmd_uncrunch(file: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(file).map_err(|err| format!("{}: {}", file.display(), err))?;
    if !is_crunched(&data) {
        return Err(format!("{}: not a crunched file", file.display()).into());
    }

    let out = uncrunch(&data)?;
    let out_path = match output {
        Some(path) => path.to_path_buf(),
        None => decoded_output_path(&out.original_name, file),
    };
    fs::write(&out_path, &out.data)?;

    println!("Uncrunched {}: {} bytes", file.display(), out.data.len());
    println!("Wrote {}", out_path.display());
    if out.checksum_mismatch == Some(true) {
        eprintln!("Warning: {}: checksum mismatch", file.display());
        std::process::exit(2);
    }
    Ok(())
}
