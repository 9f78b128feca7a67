use std::env;
use std::fs;
use std::path::PathBuf;

use emk_codec::{ContainerConfig, EmkArchive, CURSOR_TAG, LYRIC_TAG, MIDI_TAG};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-emk-file> [--extract <dir>] [--legacy]", args[0]);
        std::process::exit(1);
    }

    let emk_path = &args[1];
    let mut extract_dir: Option<PathBuf> = None;
    let mut config = ContainerConfig::default();

    // Parse flags
    if let Some(idx) = args.iter().position(|arg| arg == "--extract") {
        match args.get(idx + 1) {
            Some(dir) => extract_dir = Some(PathBuf::from(dir)),
            None => {
                eprintln!("ERROR: --extract flag requires a directory argument.");
                std::process::exit(1);
            }
        }
    }
    if args.iter().any(|arg| arg == "--legacy") {
        config = ContainerConfig::legacy();
    }

    println!("Reading EMK file: {}", emk_path);
    println!("{}", "=".repeat(60));

    let archive = match EmkArchive::open(emk_path, &config) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("\nERROR: Failed to read EMK file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("\nSections:");
    for section in &archive.sections {
        let r = &section.record;
        println!(
            "  {:<12} {:>8} bytes (compressed {:#x}..{:#x})",
            r.tag,
            section.data.len(),
            r.data_begin,
            r.data_end
        );
    }

    if !archive.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        for diag in &archive.diagnostics {
            println!("  [{}] {}", diag.context, diag.error);
        }
    }

    if let Ok(lyrics) = archive.lyrics() {
        println!("\nSong Information:");
        println!("  Title: {}", lyrics.title);
        println!("  Artist: {}", lyrics.artist);
        println!("  Key: {}", lyrics.key);
        println!("  Lyric lines: {}", lyrics.lines.len());

        if let Ok(ticks) = archive.cursor_ticks() {
            println!("  Cursor ticks: {}", ticks.len());
            match lyrics.segment(&ticks) {
                Ok(segments) => {
                    println!("\nFirst lines:");
                    for seg in segments.iter().take(5) {
                        println!(
                            "  [{:>5}..{:>5}] {}",
                            seg.start,
                            seg.end,
                            seg.words.concat()
                        );
                    }
                }
                Err(e) => println!("  (cursor/lyric alignment failed: {})", e),
            }
        }
    }

    if let Some(dir) = extract_dir {
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("ERROR: cannot create {}: {}", dir.display(), e);
            std::process::exit(1);
        }
        let stem = PathBuf::from(emk_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "song".to_string());

        for (tag, ext) in [(MIDI_TAG, "mid"), (LYRIC_TAG, "lyr"), (CURSOR_TAG, "cur")] {
            match archive.section_data(tag) {
                Ok(data) => {
                    let path = dir.join(format!("{}.{}", stem, ext));
                    match fs::write(&path, data) {
                        Ok(()) => println!("Extracted {} -> {}", tag, path.display()),
                        Err(e) => eprintln!("ERROR: cannot write {}: {}", path.display(), e),
                    }
                }
                Err(_) => println!("Skipping {}: not present", tag),
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Done: {} section(s), {} diagnostic(s).",
        archive.sections.len(),
        archive.diagnostics.len()
    );
}
