// Manoscope extraction tool
// Discovers sequence archives, extracts per-frame hand geometry, and stores
// it under the frame-indexed hierarchy

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use manoscope::archive::{extract_sequence_id, load_archive};
use manoscope::mano::KinematicHandModel;
use manoscope::pipeline::BatchOrchestrator;

#[derive(Parser)]
#[command(
    name = "manoscope",
    about = "Extract per-frame MANO hand geometry from sequence archives"
)]
struct Args {
    /// Directory scanned for sequence archives
    #[arg(long, default_value = "anno_preview")]
    input_dir: PathBuf,

    /// Storage root for extracted 3D coordinates
    #[arg(long, default_value = "3d_coordinates")]
    out_dir: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let archives = discover_archives(&args.input_dir)?;
    if archives.is_empty() {
        println!("No sequence archives found in {}", args.input_dir.display());
        return Ok(());
    }

    for (index, path) in archives.iter().enumerate() {
        println!("{}. {}", index + 1, file_name(path));
    }

    let Some(selection) = prompt(&format!("\nSelect an archive (1-{}): ", archives.len()))? else {
        return Ok(());
    };
    let selected = match selection.parse::<usize>() {
        Ok(n) if (1..=archives.len()).contains(&n) => &archives[n - 1],
        _ => {
            println!("Invalid selection");
            return Ok(());
        }
    };

    let Some(sequence_id) = extract_sequence_id(&file_name(selected)) else {
        println!("Cannot extract a sequence id from the archive name");
        return Ok(());
    };
    println!("\nProcessing sequence: {}", sequence_id);

    let archive = match load_archive(selected) {
        Ok(archive) => archive,
        Err(e) => {
            log::error!("failed to load archive {}: {}", selected.display(), e);
            return Ok(());
        }
    };
    println!(
        "Loaded: {} frames, {} objects, {} mano records",
        archive.frame_id_list.len(),
        archive.obj_list.len(),
        archive.raw_mano.len()
    );
    if archive.frame_id_list.is_empty() {
        println!("No frames available");
        return Ok(());
    }
    println!("Available frame ids: {:?}", archive.frame_id_list);

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupt);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
    }

    let model = KinematicHandModel::new();
    let orchestrator =
        BatchOrchestrator::new(&model, &args.out_dir).with_interrupt_flag(Arc::clone(&interrupt));

    let Some(batch_choice) = prompt("\nProcess and store every frame? (y/n): ")? else {
        return Ok(());
    };
    if batch_choice.eq_ignore_ascii_case("y") {
        let report = orchestrator.process_sequence(&sequence_id, &archive);
        if report.interrupted {
            println!("Interrupted; partial results kept");
        }
        println!(
            "Batch complete: {}/{} frames written",
            report.succeeded, report.attempted
        );
        return Ok(());
    }

    // Interactive mode: one frame at a time until quit.
    loop {
        if interrupt.load(Ordering::Relaxed) {
            println!("\nInterrupted");
            break;
        }
        let Some(input) = prompt("\nFrame id or 'quit': ")? else {
            break;
        };
        if input.eq_ignore_ascii_case("quit") {
            break;
        }
        let frame_id = match input.parse::<i64>() {
            Ok(frame_id) => frame_id,
            Err(_) => {
                println!("Invalid frame id: {}", input);
                continue;
            }
        };
        if orchestrator.process_single(&sequence_id, &archive, frame_id) {
            println!("Stored frame {}", frame_id);
        } else {
            println!("Frame {} was not stored", frame_id);
        }
    }

    Ok(())
}

/// Candidate archives: the .json files of the input directory, sorted by name.
fn discover_archives(input_dir: &PathBuf) -> io::Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    archives.sort();
    Ok(archives)
}

fn file_name(path: &PathBuf) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Print a message and read one trimmed line; `None` on closed stdin.
fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
