//! Decoder for the radar base-data standard format.
//!
//! All fields are little-endian. A volume is laid out as:
//!
//! | Block            | Size                         |
//! |------------------|------------------------------|
//! | Generic header   | 32 bytes                     |
//! | Site config      | 128 bytes                    |
//! | Task config      | 256 bytes                    |
//! | Cut config       | 256 bytes × `cut_number`     |
//! | Radial           | 64-byte header + moments     |
//!
//! Each radial carries `moment_number` moment blocks, a 32-byte header
//! followed by `block_length` bytes of 1- or 2-byte bins.

use std::collections::BTreeMap;

use bytes::Buf;
use chrono::{DateTime, Utc};
use radar_common::{Grid2D, Product};

use crate::error::{ScanError, ScanResult};
use crate::scan::{Moment, Scan, Site, Tilt};

/// "RSTM" read as a little-endian u32.
pub const MAGIC: u32 = 0x4D54_5352;

pub const GENERIC_HEADER_LEN: usize = 32;
pub const SITE_CONFIG_LEN: usize = 128;
pub const TASK_CONFIG_LEN: usize = 256;
pub const CUT_CONFIG_LEN: usize = 256;
pub const RADIAL_HEADER_LEN: usize = 64;
pub const MOMENT_HEADER_LEN: usize = 32;

/// Raw codes below this are reserved for "no data" flags.
const MIN_VALID_CODE: u32 = 5;

/// Radial state marking the final radial of the volume.
const RADIAL_STATE_VOLUME_END: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct GenericHeader {
    pub magic: u32,
    pub major_version: i16,
    pub minor_version: i16,
    pub generic_type: i32,
    pub product_type: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub name: String,
    pub description: String,
    pub polarization_type: i32,
    pub scan_type: i32,
    pub pulse_width: i32,
    /// Seconds since the Unix epoch
    pub scan_start_time: i32,
    pub cut_number: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CutConfig {
    pub process_mode: i32,
    pub wave_form: i32,
    pub elevation: f32,
    pub log_resolution: i32,
    pub doppler_resolution: i32,
    pub start_range: i32,
    pub nyquist_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialHeader {
    pub radial_state: i32,
    pub radial_number: i32,
    /// 1-based cut index
    pub elevation_number: i32,
    pub azimuth: f32,
    pub elevation: f32,
    pub length_of_data: i32,
    pub moment_number: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentHeader {
    pub data_type: i32,
    pub scale: i32,
    pub offset: i32,
    pub bin_length: i16,
    pub flags: i16,
    pub block_length: i32,
}

/// Split `len` bytes off the front of `buf`.
fn take<'a>(buf: &mut &'a [u8], len: usize, what: &'static str) -> ScanResult<&'a [u8]> {
    let slice: &'a [u8] = *buf;
    if slice.len() < len {
        return Err(ScanError::Truncated {
            what,
            needed: len,
            available: slice.len(),
        });
    }
    let (head, tail) = slice.split_at(len);
    *buf = tail;
    Ok(head)
}

/// Fixed-width string field, NUL padded.
fn fixed_str(block: &mut &[u8], len: usize) -> String {
    let slice: &[u8] = *block;
    let (raw, rest) = slice.split_at(len);
    *block = rest;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

pub fn parse_generic_header(buf: &mut &[u8]) -> ScanResult<GenericHeader> {
    let mut block = take(buf, GENERIC_HEADER_LEN, "generic header")?;
    let magic = block.get_u32_le();
    if magic != MAGIC {
        return Err(ScanError::invalid_format(format!(
            "bad magic 0x{:08X}, expected 0x{:08X}",
            magic, MAGIC
        )));
    }
    let header = GenericHeader {
        magic,
        major_version: block.get_i16_le(),
        minor_version: block.get_i16_le(),
        generic_type: block.get_i32_le(),
        product_type: block.get_i32_le(),
    };
    if header.generic_type != 1 {
        return Err(ScanError::invalid_format(format!(
            "generic type {} is not base data",
            header.generic_type
        )));
    }
    Ok(header)
}

pub fn parse_site_config(buf: &mut &[u8]) -> ScanResult<Site> {
    let mut block = take(buf, SITE_CONFIG_LEN, "site config")?;
    let code = fixed_str(&mut block, 8);
    let name = fixed_str(&mut block, 32);
    let latitude = block.get_f32_le() as f64;
    let longitude = block.get_f32_le() as f64;
    let antenna_height_m = block.get_i32_le() as f64;
    let ground_height_m = block.get_i32_le() as f64;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ScanError::invalid_format(format!(
            "site position ({}, {}) is not a valid lon/lat",
            longitude, latitude
        )));
    }

    Ok(Site {
        code,
        name,
        longitude,
        latitude,
        antenna_height_m,
        ground_height_m,
    })
}

pub fn parse_task_config(buf: &mut &[u8]) -> ScanResult<TaskConfig> {
    let mut block = take(buf, TASK_CONFIG_LEN, "task config")?;
    Ok(TaskConfig {
        name: fixed_str(&mut block, 32),
        description: fixed_str(&mut block, 128),
        polarization_type: block.get_i32_le(),
        scan_type: block.get_i32_le(),
        pulse_width: block.get_i32_le(),
        scan_start_time: block.get_i32_le(),
        cut_number: block.get_i32_le(),
    })
}

pub fn parse_cut_config(buf: &mut &[u8]) -> ScanResult<CutConfig> {
    let mut block = take(buf, CUT_CONFIG_LEN, "cut config")?;
    let process_mode = block.get_i32_le();
    let wave_form = block.get_i32_le();
    // PRF1, PRF2, dealias mode, azimuth
    block.advance(16);
    let elevation = block.get_f32_le();
    // start/end angle, angular resolution, scan speed
    block.advance(16);
    let log_resolution = block.get_i32_le();
    let doppler_resolution = block.get_i32_le();
    // maximum ranges
    block.advance(8);
    let start_range = block.get_i32_le();
    // samples, phase mode, atmospheric loss
    block.advance(16);
    let nyquist_speed = block.get_f32_le();

    Ok(CutConfig {
        process_mode,
        wave_form,
        elevation,
        log_resolution,
        doppler_resolution,
        start_range,
        nyquist_speed,
    })
}

pub fn parse_radial_header(buf: &mut &[u8]) -> ScanResult<RadialHeader> {
    let mut block = take(buf, RADIAL_HEADER_LEN, "radial header")?;
    let radial_state = block.get_i32_le();
    let _spot_blank = block.get_i32_le();
    let _sequence_number = block.get_i32_le();
    let radial_number = block.get_i32_le();
    let elevation_number = block.get_i32_le();
    let azimuth = block.get_f32_le();
    let elevation = block.get_f32_le();
    // seconds, microseconds
    block.advance(8);
    let length_of_data = block.get_i32_le();
    let moment_number = block.get_i32_le();

    Ok(RadialHeader {
        radial_state,
        radial_number,
        elevation_number,
        azimuth,
        elevation,
        length_of_data,
        moment_number,
    })
}

pub fn parse_moment_header(buf: &mut &[u8]) -> ScanResult<MomentHeader> {
    let mut block = take(buf, MOMENT_HEADER_LEN, "moment header")?;
    Ok(MomentHeader {
        data_type: block.get_i32_le(),
        scale: block.get_i32_le(),
        offset: block.get_i32_le(),
        bin_length: block.get_i16_le(),
        flags: block.get_i16_le(),
        block_length: block.get_i32_le(),
    })
}

/// Convert one moment's raw bins to physical values.
pub fn decode_bins(header: &MomentHeader, raw: &[u8]) -> ScanResult<Vec<f32>> {
    if header.scale == 0 {
        return Err(ScanError::invalid_format("moment scale is zero"));
    }
    let scale = header.scale as f32;
    let offset = header.offset as f32;
    let convert = |code: u32| {
        if code < MIN_VALID_CODE {
            f32::NAN
        } else {
            (code as f32 - offset) / scale
        }
    };

    match header.bin_length {
        1 => Ok(raw.iter().map(|&b| convert(b as u32)).collect()),
        2 => Ok(raw
            .chunks_exact(2)
            .map(|c| convert(u16::from_le_bytes([c[0], c[1]]) as u32))
            .collect()),
        other => Err(ScanError::invalid_format(format!(
            "unsupported bin length {}",
            other
        ))),
    }
}

#[derive(Default)]
struct TiltBuilder {
    azimuths: Vec<f64>,
    /// Radial index and decoded bins, per product
    rows: BTreeMap<Product, Vec<(usize, Vec<f32>)>>,
}

impl TiltBuilder {
    fn build(self, cut: &CutConfig) -> ScanResult<Tilt> {
        let radials = self.azimuths.len();
        let mut tilt = Tilt::new(cut.elevation as f64, self.azimuths);
        for (product, rows) in self.rows {
            let gates = rows.iter().map(|(_, bins)| bins.len()).max().unwrap_or(0);
            let mut data = vec![f32::NAN; radials * gates];
            for (radial, bins) in rows {
                let start = radial * gates;
                data[start..start + bins.len()].copy_from_slice(&bins);
            }
            let spacing = if product.is_reflectivity() {
                cut.log_resolution
            } else {
                cut.doppler_resolution
            };
            if spacing <= 0 {
                return Err(ScanError::invalid_format(format!(
                    "non-positive gate spacing {} for {}",
                    spacing, product
                )));
            }
            let moment = Moment {
                data: Grid2D::new(radials, gates, data)
                    .map_err(|e| ScanError::invalid_format(e.to_string()))?,
                gate_spacing_m: spacing as f64,
                first_gate_m: cut.start_range as f64,
            };
            tilt = tilt.with_moment(product, moment)?;
        }
        Ok(tilt)
    }
}

/// Decode an uncompressed standard-format volume.
pub fn decode(data: &[u8]) -> ScanResult<Scan> {
    let mut buf = data;
    let header = parse_generic_header(&mut buf)?;
    let site = parse_site_config(&mut buf)?;
    let task = parse_task_config(&mut buf)?;

    if task.cut_number <= 0 {
        return Err(ScanError::invalid_format(format!(
            "cut number {} is not positive",
            task.cut_number
        )));
    }
    let cuts = (0..task.cut_number)
        .map(|_| parse_cut_config(&mut buf))
        .collect::<ScanResult<Vec<_>>>()?;

    let mut builders: Vec<TiltBuilder> = cuts.iter().map(|_| TiltBuilder::default()).collect();
    let mut radial_total = 0usize;

    while buf.has_remaining() {
        let radial = parse_radial_header(&mut buf)?;
        let index = usize::try_from(radial.elevation_number - 1)
            .ok()
            .filter(|&i| i < builders.len())
            .ok_or_else(|| {
                ScanError::invalid_format(format!(
                    "radial {} references cut {} of {}",
                    radial.radial_number,
                    radial.elevation_number,
                    builders.len()
                ))
            })?;

        let builder = &mut builders[index];
        let row = builder.azimuths.len();
        builder.azimuths.push(radial.azimuth as f64);

        for _ in 0..radial.moment_number.max(0) {
            let moment = parse_moment_header(&mut buf)?;
            let len = usize::try_from(moment.block_length).map_err(|_| {
                ScanError::invalid_format(format!(
                    "negative block length {}",
                    moment.block_length
                ))
            })?;
            let raw = take(&mut buf, len, "moment data")?;
            let Some(product) = u32::try_from(moment.data_type).ok().and_then(Product::from_code)
            else {
                continue;
            };
            let bins = decode_bins(&moment, raw)?;
            builder.rows.entry(product).or_default().push((row, bins));
        }
        radial_total += 1;

        if radial.radial_state == RADIAL_STATE_VOLUME_END {
            break;
        }
    }

    let tilts = builders
        .into_iter()
        .zip(&cuts)
        .map(|(builder, cut)| builder.build(cut))
        .collect::<ScanResult<Vec<_>>>()?;

    let scan_time = DateTime::<Utc>::from_timestamp(task.scan_start_time as i64, 0)
        .ok_or_else(|| {
            ScanError::invalid_format(format!("scan time {} out of range", task.scan_start_time))
        })?;

    tracing::debug!(
        version = %format!("{}.{}", header.major_version, header.minor_version),
        site = %site.code,
        task = %task.name,
        cuts = cuts.len(),
        radials = radial_total,
        "Decoded standard-format volume"
    );

    Ok(Scan {
        site,
        scan_time,
        task_name: task.name,
        tilts,
    })
}
