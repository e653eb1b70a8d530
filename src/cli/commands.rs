//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::info;

use crate::config::PracticeConfig;
use crate::engine::{probe_duration_ms, ManualClock, MediaSource, SystemClock, WavMediaBackend};
use crate::error::{PracticeError, Result};
use crate::practice::{
    format_range, format_timestamp, SectionRoute, SectionSession, TrackSession, Workspace,
};
use crate::recording::WavMicrophone;
use crate::state::{list_saved_tracks, SectionFile};

/// Workspace with `track` selected as a picked file
fn open_track(config: &PracticeConfig, track: &str) -> Result<Workspace> {
    let mut workspace = Workspace::new(config.clone());
    workspace.select_track(MediaSource::picked(track, Some(track)))?;
    Ok(workspace)
}

/// List tracks with saved sections.
pub fn list_tracks(config: &PracticeConfig) -> Result<()> {
    info!("Listing tracks in: {}", config.documents_dir.display());

    let tracks = list_saved_tracks(&config.documents_dir)?;
    if tracks.is_empty() {
        println!("No saved sections.");
        return Ok(());
    }

    for track in tracks {
        println!("{}", track);
    }
    Ok(())
}

/// Print the sections saved for a track.
pub fn show_sections(config: &PracticeConfig, track: &str) -> Result<()> {
    let file = SectionFile::for_track(&config.documents_dir, track);
    info!("Reading sections: {}", file.path().display());

    let store = file.load_strict()?;
    if store.is_empty() {
        println!("No sections for {}.", track);
        return Ok(());
    }

    println!("Sections for {}:", track);
    println!("{:-<60}", "");
    for (i, section) in store.iter().enumerate() {
        let take = if section.has_recording() { " [take]" } else { "" };
        println!("{:>3}  {}{}", i, format_range(section.a, section.b), take);
        if !section.memo.trim().is_empty() {
            println!("     {}", section.memo);
        }
    }
    Ok(())
}

/// Append a section to a track.
pub fn add_section(config: &PracticeConfig, track: &str, a: u64, b: u64) -> Result<()> {
    info!("Adding section {}-{} ms to {}", a, b, track);

    let mut workspace = open_track(config, track)?;
    let index = workspace.append_section(Some(a), Some(b))?;

    println!("Section {} saved: {}", index, format_range(a, b));
    Ok(())
}

/// Replace a section memo.
pub fn set_memo(config: &PracticeConfig, track: &str, index: usize, text: &str) -> Result<()> {
    info!("Updating memo of section {} in {}", index, track);

    let mut workspace = open_track(config, track)?;
    workspace.update_memo(index, text)?;

    println!("Memo saved for section {}.", index);
    Ok(())
}

/// Attach a recording URI to a section.
pub fn attach_recording(config: &PracticeConfig, track: &str, index: usize, uri: &str) -> Result<()> {
    info!("Attaching {} to section {} in {}", uri, index, track);

    let mut workspace = open_track(config, track)?;
    workspace.attach_recording(index, uri)?;

    println!("Recording attached to section {}.", index);
    Ok(())
}

/// Feed a WAV file through the section recorder and attach the take.
pub fn import_take(config: &PracticeConfig, track: &str, index: usize, wav: &Path) -> Result<()> {
    info!("Importing {} as take of section {} in {}", wav.display(), index, track);

    let load_error = |e: hound::Error| PracticeError::MediaLoad {
        source_ref: wav.display().to_string(),
        reason: e.to_string(),
    };
    let mut reader = WavReader::open(wav).map_err(load_error)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(load_error)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(load_error)?
        }
    };

    let mut workspace = open_track(config, track)?;
    let route = SectionRoute {
        index,
        range: workspace.sections().get(index)?.range(),
    };
    let microphone = WavMicrophone::from_config(config).with_format(spec.sample_rate, spec.channels);
    let backend = WavMediaBackend::new(SystemClock::new());

    let mut session = SectionSession::open(&mut workspace, route, backend, microphone)?;
    session.start_recording()?;
    session.recorder_mut().microphone_mut().push_samples(&samples)?;
    let uri = session.stop_recording()?;
    session.save_recording()?;
    session.leave();

    println!("Take saved for section {}: {}", index, uri);
    Ok(())
}

/// Print the duration of a WAV file.
pub fn show_info(path: &Path) -> Result<()> {
    let source = MediaSource::Bundled(path.to_path_buf());
    match probe_duration_ms(&source)? {
        Some(duration) => println!("{}: {} ({} ms)", source, format_timestamp(duration), duration),
        None => println!("{}: duration unknown", source),
    }
    Ok(())
}

/// Dry-run an A/B loop over a WAV file on a simulated clock.
pub fn practice(
    config: &PracticeConfig,
    path: &Path,
    a: u64,
    b: u64,
    rate: f32,
    seconds: u64,
) -> Result<()> {
    info!("Practicing {} between {} and {} ms", path.display(), a, b);

    let clock = ManualClock::new();
    let backend = WavMediaBackend::with_progress_interval(clock.clone(), config.progress_interval_ms);

    let mut workspace = Workspace::new(config.clone());
    workspace.select_track(MediaSource::Bundled(path.to_path_buf()))?;

    let mut session = TrackSession::new(&mut workspace, backend);
    let duration = session.load_and_play()?;
    session.change_rate(rate)?;

    session.seek_to(a as i64)?;
    session.toggle_a();
    session.seek_to(b as i64)?;
    session.toggle_b();
    session.toggle_loop()?;

    println!(
        "Track {} | loop {} at {}",
        format_timestamp(duration),
        format_range(a, b),
        session.player().rate()
    );

    let step = config.progress_interval_ms.max(1);
    let mut jumps = 0;
    for _ in 0..(seconds * 1000 / step) {
        clock.advance(step);
        let report = session.pump()?;
        jumps += report.loop_jumps;
        if report.finished {
            println!("Reached end of track.");
            break;
        }
    }

    println!(
        "{} loop passes, stopped at {}",
        jumps,
        format_timestamp(session.player().position_ms())
    );
    Ok(())
}

/// Write the effective config.
pub fn write_config(config: &PracticeConfig, path: &Path) -> Result<()> {
    config.save(path)?;
    println!("Config written: {}", path.display());
    Ok(())
}
