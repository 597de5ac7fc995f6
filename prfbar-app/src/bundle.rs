//! On-disk stimulus bundle.
//!
//! A bundle is a directory holding
//! - `manifest.json`: frame geometry, counts and the library layout,
//! - `params.json`: the resolved parameters,
//! - `sequence.json`: frame indices, their timestamps and the total duration,
//! - `frames.bin`: every library frame, row-major 8-bit, in library order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use prfbar_core::{Frame, FrameLibrary, LibraryError, LibraryLayout, ResolvedParams};
use prfbar_experiment::{Sequence, SequenceError};
use prfbar_timing::Timeline;
use serde::{Deserialize, Serialize};

use crate::app::Stimulus;

pub const FORMAT_VERSION: u32 = 1;

const MANIFEST: &str = "manifest.json";
const PARAMS: &str = "params.json";
const SEQUENCE: &str = "sequence.json";
const FRAMES: &str = "frames.bin";

pub type BundleResult<T> = Result<T, BundleError>;

#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    #[error("i/o error on '{shown}': {source}", shown = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in '{shown}': {source}", shown = .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "unsupported bundle format version {found} (expected {expected})",
        expected = FORMAT_VERSION
    )]
    Version { found: u32 },

    #[error("bundle mismatch: {0}")]
    Mismatch(String),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

impl BundleError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn mismatch(msg: impl Into<String>) -> Self {
        Self::Mismatch(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: usize,
    pub blank_index: usize,
    pub layout: LibraryLayout,
    pub sequence_len: usize,
}

impl Manifest {
    fn frame_bytes(&self) -> usize {
        self.frame_width as usize * self.frame_height as usize
    }
}

#[derive(Serialize)]
struct SequenceOut<'a> {
    sequence: &'a [usize],
    timing: &'a [f64],
    duration: f64,
}

#[derive(Deserialize)]
struct SequenceIn {
    sequence: Vec<usize>,
    timing: Vec<f64>,
    duration: f64,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> BundleResult<()> {
    let file = File::create(path).map_err(|e| BundleError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| BundleError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| BundleError::io(path, e))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> BundleResult<T> {
    let file = File::open(path).map_err(|e| BundleError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| BundleError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn save_bundle(dir: &Path, stimulus: &Stimulus) -> BundleResult<Manifest> {
    std::fs::create_dir_all(dir).map_err(|e| BundleError::io(dir, e))?;

    let library = &stimulus.library;
    let blank_index = library
        .blank_index()
        .ok_or_else(|| BundleError::mismatch("frame library has no blank frame"))?;
    if stimulus.sequence.len() != stimulus.timeline.len() {
        return Err(BundleError::mismatch(format!(
            "sequence has {} entries, timing has {}",
            stimulus.sequence.len(),
            stimulus.timeline.len()
        )));
    }

    let frames_path = dir.join(FRAMES);
    let file = File::create(&frames_path).map_err(|e| BundleError::io(&frames_path, e))?;
    let mut writer = BufWriter::new(file);
    for frame in library.frames() {
        writer
            .write_all(frame.data())
            .map_err(|e| BundleError::io(&frames_path, e))?;
    }
    writer
        .flush()
        .map_err(|e| BundleError::io(&frames_path, e))?;

    write_json(&dir.join(PARAMS), &stimulus.resolved)?;
    write_json(
        &dir.join(SEQUENCE),
        &SequenceOut {
            sequence: stimulus.sequence.as_slice(),
            timing: stimulus.timeline.timestamps(),
            duration: stimulus.timeline.total_duration(),
        },
    )?;

    let (frame_width, frame_height) = library.dimensions();
    let manifest = Manifest {
        format_version: FORMAT_VERSION,
        frame_width,
        frame_height,
        frame_count: library.len(),
        blank_index,
        layout: *library.layout(),
        sequence_len: stimulus.sequence.len(),
    };
    // Written last: a bundle without a manifest is incomplete.
    write_json(&dir.join(MANIFEST), &manifest)?;
    tracing::info!(frames = manifest.frame_count, "bundle written");
    Ok(manifest)
}

pub fn read_manifest(dir: &Path) -> BundleResult<Manifest> {
    let manifest: Manifest = read_json(&dir.join(MANIFEST))?;
    if manifest.format_version != FORMAT_VERSION {
        return Err(BundleError::Version {
            found: manifest.format_version,
        });
    }
    Ok(manifest)
}

#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_bundle(dir: &Path) -> BundleResult<Stimulus> {
    let manifest = read_manifest(dir)?;
    let resolved: ResolvedParams = read_json(&dir.join(PARAMS))?;

    let frames_path = dir.join(FRAMES);
    let raw = std::fs::read(&frames_path).map_err(|e| BundleError::io(&frames_path, e))?;
    let frame_bytes = manifest.frame_bytes();
    if frame_bytes == 0 || raw.len() != frame_bytes * manifest.frame_count {
        return Err(BundleError::mismatch(format!(
            "{} holds {} bytes, manifest describes {} frames of {} bytes",
            FRAMES,
            raw.len(),
            manifest.frame_count,
            frame_bytes
        )));
    }
    let frames = raw
        .chunks_exact(frame_bytes)
        .enumerate()
        .map(|(index, chunk)| {
            Frame::from_raw(manifest.frame_width, manifest.frame_height, chunk.to_vec())
                .ok_or_else(|| BundleError::mismatch(format!("frame {index} has the wrong size")))
        })
        .collect::<BundleResult<Vec<Frame>>>()?;
    let library = FrameLibrary::from_frames(
        manifest.layout,
        manifest.frame_width,
        manifest.frame_height,
        frames,
    )?;
    if library.blank_index() != Some(manifest.blank_index) {
        return Err(BundleError::mismatch(format!(
            "manifest blank index {} does not close the library",
            manifest.blank_index
        )));
    }

    let SequenceIn {
        sequence,
        timing,
        duration,
    } = read_json(&dir.join(SEQUENCE))?;
    if sequence.len() != manifest.sequence_len || timing.len() != manifest.sequence_len {
        return Err(BundleError::mismatch(format!(
            "manifest expects {} entries, found {} indices and {} timestamps",
            manifest.sequence_len,
            sequence.len(),
            timing.len()
        )));
    }
    let sequence = Sequence::from_indices(sequence, library.len())?;

    Ok(Stimulus {
        resolved,
        library,
        sequence,
        timeline: Timeline::from_parts(timing, duration),
    })
}

/// Read a single frame without loading the whole library.
pub fn read_frame(dir: &Path, index: usize) -> BundleResult<Frame> {
    let manifest = read_manifest(dir)?;
    if index >= manifest.frame_count {
        return Err(BundleError::mismatch(format!(
            "frame {index} requested, bundle holds {}",
            manifest.frame_count
        )));
    }
    let frames_path = dir.join(FRAMES);
    let mut file = File::open(&frames_path).map_err(|e| BundleError::io(&frames_path, e))?;
    let frame_bytes = manifest.frame_bytes();
    file.seek(SeekFrom::Start((index * frame_bytes) as u64))
        .map_err(|e| BundleError::io(&frames_path, e))?;
    let mut data = vec![0u8; frame_bytes];
    file.read_exact(&mut data)
        .map_err(|e| BundleError::io(&frames_path, e))?;
    Frame::from_raw(manifest.frame_width, manifest.frame_height, data)
        .ok_or_else(|| BundleError::mismatch("frame buffer size"))
}
