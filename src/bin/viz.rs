// Manoscope visualization tool
// Walks the storage hierarchy and renders stored hand skeletons to SVG

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;

use manoscope::mano::HandSide;
use manoscope::storage::{DataKind, DataRoot};
use manoscope::viz::{render_joints_svg, RenderConfig};

#[derive(Parser)]
#[command(
    name = "manoscope-viz",
    about = "List and render extracted hand data from the storage hierarchy"
)]
struct Args {
    /// Storage root produced by the extraction tool
    #[arg(long, default_value = "3d_coordinates")]
    data_dir: PathBuf,

    /// Directory the rendered SVG files are written to
    #[arg(long, default_value = "hand_renders")]
    out_dir: PathBuf,

    /// Preferred label font, tried in order; repeatable. Defaults to a
    /// built-in fallback chain ending in the generic sans-serif family.
    #[arg(long)]
    font: Vec<String>,
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
    let data = DataRoot::new(&args.data_dir);
    let config = RenderConfig::default().with_fonts(args.font.clone());

    let sequences = data.sequences();
    if sequences.is_empty() {
        println!("No sequences found under {}", args.data_dir.display());
        return Ok(());
    }

    println!("Available sequences:");
    for (index, sequence_id) in sequences.iter().enumerate() {
        print_sequence_overview(&data, index, sequence_id);
    }

    println!("\nOptions:");
    println!("1. Render one frame");
    println!("2. Render every frame in a sequence");
    println!("3. List frames");

    let Some(choice) = prompt("\nSelect an option (1-3): ")? else {
        return Ok(());
    };
    if !matches!(choice.as_str(), "1" | "2" | "3") {
        println!("Invalid selection");
        return Ok(());
    }

    let Some(sequence_id) = choose_sequence(&sequences)? else {
        return Ok(());
    };

    match choice.as_str() {
        "1" => {
            list_frames(&data, &sequence_id);
            let Some(input) = prompt("\nFrame id to render: ")? else {
                return Ok(());
            };
            match input.parse::<i64>() {
                Ok(frame_id) => render_frame(&data, &sequence_id, frame_id, &config, &args.out_dir)?,
                Err(_) => println!("Frame id must be a number"),
            }
        }
        "2" => {
            for frame_id in data.frames(&sequence_id) {
                render_frame(&data, &sequence_id, frame_id, &config, &args.out_dir)?;
            }
        }
        _ => list_frames(&data, &sequence_id),
    }

    Ok(())
}

/// One listing line per sequence: frame count, artifact total, and the data
/// types of a sample manifest.
fn print_sequence_overview(data: &DataRoot, index: usize, sequence_id: &str) {
    let frames = data.frames(sequence_id);
    println!("{}. {}", index + 1, sequence_id);
    println!("   - frame directories: {}", frames.len());

    let total_artifacts: usize = frames
        .iter()
        .map(|&frame_id| data.artifacts(sequence_id, frame_id).len())
        .sum();
    println!("   - npy files: {}", total_artifacts);

    if let Some(&first) = frames.first() {
        if let Some(summary) = data.read_summary(sequence_id, first) {
            println!(
                "   - sample frame: {} data entries",
                summary.available_data.len()
            );
        }
    }
}

/// Per-frame listing with the per-hand data types read from each manifest.
fn list_frames(data: &DataRoot, sequence_id: &str) {
    let frames = data.frames(sequence_id);
    if frames.is_empty() {
        println!("No frames stored for sequence {}", sequence_id);
        return;
    }

    println!("\nFrames in sequence {}:", sequence_id);
    for frame_id in frames {
        let artifacts = data.artifacts(sequence_id, frame_id);
        println!("  frame {}: {} npy files", frame_id, artifacts.len());

        let Some(summary) = data.read_summary(sequence_id, frame_id) else {
            println!("    (no readable manifest)");
            continue;
        };
        let mut by_hand: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for entry in &summary.available_data {
            by_hand
                .entry(entry.hand.label())
                .or_default()
                .push(entry.kind.as_str());
        }
        for (hand, kinds) in by_hand {
            println!("    {}: {}", hand, kinds.join(", "));
        }
    }
}

/// Render each side's joint array, when stored, to one SVG file.
fn render_frame(
    data: &DataRoot,
    sequence_id: &str,
    frame_id: i64,
    config: &RenderConfig,
    out_dir: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame_dir = data.frame_dir(sequence_id, frame_id);
    let mut rendered = 0;

    for side in [HandSide::Right, HandSide::Left] {
        let joints_path = frame_dir.join(DataKind::Joints.file_name(side));
        if !joints_path.exists() {
            continue;
        }

        let joints = match data.load_array(&joints_path) {
            Ok(joints) => joints,
            Err(e) => {
                log::warn!("skipping {}: {}", joints_path.display(), e);
                continue;
            }
        };
        let svg = match render_joints_svg(&joints, side, config) {
            Ok(svg) => svg,
            Err(e) => {
                log::warn!("skipping {}: {}", joints_path.display(), e);
                continue;
            }
        };

        fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join(format!(
            "{}_frame_{}_{}.svg",
            sequence_id,
            frame_id,
            side.prefix()
        ));
        fs::write(&out_path, svg)?;
        println!("Rendered {}", out_path.display());
        rendered += 1;
    }

    if rendered == 0 {
        println!("Frame {} has no joint data to render", frame_id);
    }
    Ok(())
}

fn choose_sequence(sequences: &[String]) -> io::Result<Option<String>> {
    if sequences.len() == 1 {
        println!("Using sequence: {}", sequences[0]);
        return Ok(Some(sequences[0].clone()));
    }

    println!("\nSequences:");
    for (index, sequence_id) in sequences.iter().enumerate() {
        println!("{}. {}", index + 1, sequence_id);
    }
    let Some(input) = prompt(&format!("Select a sequence (1-{}): ", sequences.len()))? else {
        return Ok(None);
    };
    match input.parse::<usize>() {
        Ok(n) if (1..=sequences.len()).contains(&n) => Ok(Some(sequences[n - 1].clone())),
        _ => {
            println!("Invalid selection");
            Ok(None)
        }
    }
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
