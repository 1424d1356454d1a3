//! Writer for synthetic standard-format radar volumes.
//!
//! Produces byte-exact base data (optionally gzip or bzip2 wrapped) so the
//! decoder and the viewer can be exercised without recorded files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use radar_common::Grid2D;

use crate::generators::{
    create_azimuths, create_clutter_fields, create_reflectivity_grid, create_velocity_grid,
};

/// How the written file is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapping {
    Raw,
    Gzip,
    Bzip2,
}

/// One moment of a synthetic cut.
#[derive(Debug, Clone)]
pub struct SyntheticMoment {
    /// Standard-format data type code (2 = REF, 3 = VEL, ...)
    pub code: i32,
    pub scale: i32,
    pub offset: i32,
    /// 1 or 2
    pub bin_length: i16,
    /// `(radials, gates)`; NaN is written as raw 0
    pub values: Grid2D,
}

impl SyntheticMoment {
    /// One-byte reflectivity encoding: scale 2, offset 64.
    pub fn reflectivity(code: i32, values: Grid2D) -> Self {
        Self {
            code,
            scale: 2,
            offset: 64,
            bin_length: 1,
            values,
        }
    }

    /// Two-byte Doppler encoding: scale 100, offset 10000.
    pub fn doppler(code: i32, values: Grid2D) -> Self {
        Self {
            code,
            scale: 100,
            offset: 10_000,
            bin_length: 2,
            values,
        }
    }

    fn encode(&self, radial: usize) -> Vec<u8> {
        let max = if self.bin_length == 1 { u8::MAX as f32 } else { u16::MAX as f32 };
        let codes = self.values.row(radial).iter().map(|&v| {
            if v.is_nan() {
                0.0
            } else {
                (v * self.scale as f32 + self.offset as f32).round().clamp(5.0, max)
            }
        });
        if self.bin_length == 1 {
            codes.map(|c| c as u8).collect()
        } else {
            codes.flat_map(|c| (c as u16).to_le_bytes()).collect()
        }
    }
}

/// One elevation cut of a synthetic volume.
#[derive(Debug, Clone)]
pub struct SyntheticCut {
    pub elevation: f32,
    pub log_resolution: i32,
    pub doppler_resolution: i32,
    pub start_range: i32,
    pub azimuths: Vec<f64>,
    pub moments: Vec<SyntheticMoment>,
}

/// A complete synthetic volume.
#[derive(Debug, Clone)]
pub struct SyntheticVolume {
    pub site_code: String,
    pub site_name: String,
    pub longitude: f32,
    pub latitude: f32,
    pub antenna_height: i32,
    /// Seconds since the Unix epoch
    pub scan_start_time: i32,
    pub task_name: String,
    pub cuts: Vec<SyntheticCut>,
}

impl SyntheticVolume {
    /// Two cuts at 0.5° and 1.5°.
    ///
    /// The 0.5° cut carries REF, VEL and SW at 1 km spacing, with ground
    /// clutter in the first five gates. The 1.5° cut carries only VEL.
    pub fn two_tilt(radials: usize, gates: usize) -> Self {
        let azimuths = create_azimuths(radials);
        let (clutter_vel, clutter_sw) = create_clutter_fields(radials, gates, 5);

        let low = SyntheticCut {
            elevation: 0.5,
            log_resolution: 1000,
            doppler_resolution: 1000,
            start_range: 0,
            azimuths: azimuths.clone(),
            moments: vec![
                SyntheticMoment::reflectivity(2, create_reflectivity_grid(radials, gates)),
                SyntheticMoment::doppler(3, clutter_vel),
                SyntheticMoment::doppler(4, clutter_sw),
            ],
        };
        let high = SyntheticCut {
            elevation: 1.5,
            log_resolution: 1000,
            doppler_resolution: 250,
            start_range: 0,
            azimuths,
            moments: vec![SyntheticMoment::doppler(
                3,
                create_velocity_grid(radials, gates, 12.0),
            )],
        };

        Self {
            site_code: "Z9200".to_string(),
            site_name: "Guangzhou".to_string(),
            longitude: 113.355,
            latitude: 23.004,
            antenna_height: 180,
            scan_start_time: 1_688_000_000,
            task_name: "VCP21D".to_string(),
            cuts: vec![low, high],
        }
    }

    /// Encode as uncompressed base data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        // Generic header
        out.extend_from_slice(&0x4D54_5352u32.to_le_bytes());
        out.extend_from_slice(&1i16.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&[0u8; 16]);

        // Site config
        let start = out.len();
        put_str(&mut out, &self.site_code, 8);
        put_str(&mut out, &self.site_name, 32);
        out.extend_from_slice(&self.latitude.to_le_bytes());
        out.extend_from_slice(&self.longitude.to_le_bytes());
        out.extend_from_slice(&self.antenna_height.to_le_bytes());
        out.extend_from_slice(&(self.antenna_height - 20).to_le_bytes());
        out.extend_from_slice(&2800.0f32.to_le_bytes());
        out.extend_from_slice(&0.95f32.to_le_bytes());
        out.extend_from_slice(&0.95f32.to_le_bytes());
        pad_to(&mut out, start + 128);

        // Task config
        let start = out.len();
        put_str(&mut out, &self.task_name, 32);
        put_str(&mut out, "synthetic volume", 128);
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&1570i32.to_le_bytes());
        out.extend_from_slice(&self.scan_start_time.to_le_bytes());
        out.extend_from_slice(&(self.cuts.len() as i32).to_le_bytes());
        pad_to(&mut out, start + 256);

        // Cut configs
        for cut in &self.cuts {
            let start = out.len();
            out.extend_from_slice(&1i32.to_le_bytes());
            out.extend_from_slice(&0i32.to_le_bytes());
            out.extend_from_slice(&[0u8; 16]);
            out.extend_from_slice(&cut.elevation.to_le_bytes());
            out.extend_from_slice(&[0u8; 16]);
            out.extend_from_slice(&cut.log_resolution.to_le_bytes());
            out.extend_from_slice(&cut.doppler_resolution.to_le_bytes());
            out.extend_from_slice(&[0u8; 8]);
            out.extend_from_slice(&cut.start_range.to_le_bytes());
            out.extend_from_slice(&[0u8; 16]);
            out.extend_from_slice(&27.0f32.to_le_bytes());
            pad_to(&mut out, start + 256);
        }

        // Radials
        let last_cut = self.cuts.len().saturating_sub(1);
        let mut sequence = 1i32;
        for (cut_index, cut) in self.cuts.iter().enumerate() {
            for (radial, &azimuth) in cut.azimuths.iter().enumerate() {
                let blocks: Vec<Vec<u8>> = cut.moments.iter().map(|m| m.encode(radial)).collect();
                let data_len: usize = blocks.iter().map(|b| 32 + b.len()).sum();
                let is_last_radial = radial + 1 == cut.azimuths.len();
                let state: i32 = match (radial, is_last_radial) {
                    (0, _) if cut_index == 0 => 3,
                    (0, _) => 0,
                    (_, true) if cut_index == last_cut => 4,
                    (_, true) => 2,
                    _ => 1,
                };

                let start = out.len();
                out.extend_from_slice(&state.to_le_bytes());
                out.extend_from_slice(&0i32.to_le_bytes());
                out.extend_from_slice(&sequence.to_le_bytes());
                out.extend_from_slice(&(radial as i32 + 1).to_le_bytes());
                out.extend_from_slice(&(cut_index as i32 + 1).to_le_bytes());
                out.extend_from_slice(&(azimuth as f32).to_le_bytes());
                out.extend_from_slice(&cut.elevation.to_le_bytes());
                out.extend_from_slice(&self.scan_start_time.to_le_bytes());
                out.extend_from_slice(&0i32.to_le_bytes());
                out.extend_from_slice(&(data_len as i32).to_le_bytes());
                out.extend_from_slice(&(cut.moments.len() as i32).to_le_bytes());
                pad_to(&mut out, start + 64);

                for (moment, block) in cut.moments.iter().zip(&blocks) {
                    let start = out.len();
                    out.extend_from_slice(&moment.code.to_le_bytes());
                    out.extend_from_slice(&moment.scale.to_le_bytes());
                    out.extend_from_slice(&moment.offset.to_le_bytes());
                    out.extend_from_slice(&moment.bin_length.to_le_bytes());
                    out.extend_from_slice(&0i16.to_le_bytes());
                    out.extend_from_slice(&(block.len() as i32).to_le_bytes());
                    pad_to(&mut out, start + 32);
                    out.extend_from_slice(block);
                }
                sequence += 1;
            }
        }
        out
    }

    /// Encode and wrap.
    pub fn to_wrapped_bytes(&self, wrapping: Wrapping) -> io::Result<Vec<u8>> {
        let raw = self.to_bytes();
        match wrapping {
            Wrapping::Raw => Ok(raw),
            Wrapping::Gzip => {
                let mut encoder =
                    flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
                encoder.write_all(&raw)?;
                encoder.finish()
            }
            Wrapping::Bzip2 => {
                let mut encoder =
                    bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
                encoder.write_all(&raw)?;
                encoder.finish()
            }
        }
    }

    /// Write the volume to `dir/name`, returning the full path.
    pub fn write_to(&self, dir: &Path, name: &str, wrapping: Wrapping) -> io::Result<PathBuf> {
        let path = dir.join(name);
        fs::write(&path, self.to_wrapped_bytes(wrapping)?)?;
        Ok(path)
    }
}

/// Create a temporary folder holding one bzip2-wrapped copy of `volume` per
/// name. The folder is deleted when the returned handle drops.
pub fn create_sequence_dir(volume: &SyntheticVolume, names: &[&str]) -> io::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    let bytes = volume.to_wrapped_bytes(Wrapping::Bzip2)?;
    for name in names {
        fs::write(dir.path().join(name), &bytes)?;
    }
    Ok(dir)
}

fn put_str(out: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    out.extend_from_slice(&bytes[..n]);
    out.resize(out.len() + (width - n), 0);
}

fn pad_to(out: &mut Vec<u8>, len: usize) {
    out.resize(len, 0);
}
