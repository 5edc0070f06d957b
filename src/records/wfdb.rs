// WFDB record header and MIT-format annotation reader

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::debug;

use super::{GroundTruth, GroundTruthStore};
use crate::error::InputError;

/// Annotator used for reference rhythm annotations.
pub const DEFAULT_ANNOTATOR: &str = "atr";

const CODE_SKIP: u16 = 59;
const CODE_NUM: u16 = 60;
const CODE_SUB: u16 = 61;
const CODE_CHN: u16 = 62;
const CODE_AUX: u16 = 63;

/// Fields of the record line the evaluator cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderInfo {
    pub record_name: String,
    pub signal_count: usize,
    pub sampling_frequency: Option<f64>,
    pub sample_count: usize,
}

/// Directory of `<record>.hea` headers plus `<record>.<annotator>` files.
#[derive(Debug, Clone)]
pub struct WfdbStore {
    root: PathBuf,
    annotator: String,
}

impl WfdbStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            annotator: DEFAULT_ANNOTATOR.to_string(),
        }
    }

    pub fn with_annotator(mut self, annotator: &str) -> Self {
        if !annotator.is_empty() {
            self.annotator = annotator.to_string();
        }
        self
    }

    pub fn annotator(&self) -> &str {
        &self.annotator
    }

    fn read(&self, record_id: &str, extension: &str) -> Result<(PathBuf, Vec<u8>), InputError> {
        let path = self.root.join(format!("{record_id}.{extension}"));
        match fs::read(&path) {
            Ok(bytes) => Ok((path, bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(InputError::MissingRecording {
                record_id: record_id.to_string(),
                path: path.display().to_string(),
            }),
            Err(err) => Err(InputError::Io {
                path: path.display().to_string(),
                details: err.to_string(),
            }),
        }
    }
}

impl GroundTruthStore for WfdbStore {
    fn load(&self, record_id: &str) -> Result<GroundTruth, InputError> {
        let (header_path, header_bytes) = self.read(record_id, "hea")?;
        let header_text = String::from_utf8_lossy(&header_bytes);
        let header = parse_header(&header_text).map_err(|reason| InputError::MalformedHeader {
            path: header_path.display().to_string(),
            reason,
        })?;

        let (ann_path, ann_bytes) = self.read(record_id, &self.annotator)?;
        let samples =
            parse_annotations(&ann_bytes).map_err(|reason| InputError::MalformedAnnotation {
                path: ann_path.display().to_string(),
                reason,
            })?;

        let events: BTreeSet<usize> = samples.into_iter().collect();
        debug!(
            "[WfdbStore] {} (header '{}', {} signals): {} samples, {} distinct annotated samples",
            record_id,
            header.record_name,
            header.signal_count,
            header.sample_count,
            events.len()
        );

        Ok(GroundTruth {
            record_id: record_id.to_string(),
            signal_length: header.sample_count,
            sampling_frequency: header.sampling_frequency,
            events,
        })
    }
}

/// Parse the record line of a WFDB header.
///
/// Layout: `name[/segments] n_signals [fs[/counter][(base)]] [n_samples ...]`.
/// Lines starting with `#` and blank lines are skipped.
pub fn parse_header(text: &str) -> Result<HeaderInfo, String> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| "no record line".to_string())?;

    let mut fields = line.split_whitespace();
    let record_name = fields
        .next()
        .map(|name| name.split('/').next().unwrap_or(name).to_string())
        .ok_or_else(|| "missing record name".to_string())?;

    let signal_count = fields
        .next()
        .ok_or_else(|| "missing signal count".to_string())?
        .parse::<usize>()
        .map_err(|err| format!("bad signal count: {err}"))?;

    let sampling_frequency = match fields.next() {
        Some(token) => {
            let numeric = token.split(['/', '(']).next().unwrap_or(token);
            Some(
                numeric
                    .parse::<f64>()
                    .map_err(|err| format!("bad sampling frequency '{token}': {err}"))?,
            )
        }
        None => None,
    };

    let sample_count = fields
        .next()
        .ok_or_else(|| "missing sample count".to_string())?
        .parse::<usize>()
        .map_err(|err| format!("bad sample count: {err}"))?;
    if sample_count == 0 {
        return Err("sample count is 0".to_string());
    }

    Ok(HeaderInfo {
        record_name,
        signal_count,
        sampling_frequency,
        sample_count,
    })
}

/// Decode an MIT-format annotation stream into annotation sample indices.
///
/// Each 16-bit little-endian word holds a 6-bit code and a 10-bit value.
/// Ordinary codes advance the clock by the value; SKIP carries a 32-bit
/// interval (high half first); NUM/SUB/CHN modify the previous annotation;
/// AUX is followed by `value` bytes padded to an even count. A zero word
/// ends the stream.
pub fn parse_annotations(bytes: &[u8]) -> Result<Vec<usize>, String> {
    let mut samples = Vec::new();
    let mut time: i64 = 0;
    let mut pos = 0usize;

    while pos < bytes.len() {
        let word = read_word(bytes, pos)?;
        pos += 2;
        let code = word >> 10;
        let value = word & 0x03ff;

        match code {
            0 if value == 0 => break,
            CODE_SKIP => {
                let high = read_word(bytes, pos)? as u32;
                let low = read_word(bytes, pos + 2)? as u32;
                pos += 4;
                time += ((high << 16) | low) as i32 as i64;
            }
            CODE_NUM | CODE_SUB | CODE_CHN => {}
            CODE_AUX => {
                let padded = (value as usize + 1) & !1;
                if pos + padded > bytes.len() {
                    return Err(format!("aux payload truncated at byte {pos}"));
                }
                pos += padded;
            }
            _ => {
                time += value as i64;
                let sample = usize::try_from(time)
                    .map_err(|_| format!("negative annotation time {time} at byte {pos}"))?;
                samples.push(sample);
            }
        }
    }

    Ok(samples)
}

fn read_word(bytes: &[u8], pos: usize) -> Result<u16, String> {
    match bytes.get(pos..pos + 2) {
        Some(pair) => Ok(u16::from_le_bytes([pair[0], pair[1]])),
        None => Err(format!("truncated word at byte {pos}")),
    }
}
