//! NRRD header model: parsing, validation and text rendering

use crate::error::{NrrdError, Result};
use crate::geometry::Vec3;
use crate::metadata::{VolumeMetadata, WriteOptions};
use crate::types::{AxisKind, Center, DataType, Encoding, Endian, Space};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

/// First seven bytes of every NRRD file
pub const NRRD_MAGIC_PREFIX: &[u8; 7] = b"NRRD000";

/// Format version emitted by the writer
pub const NRRD_WRITE_VERSION: u8 = 4;

const FORMAT_REFERENCE: [&str; 2] = [
    "Complete NRRD file format specification at:",
    "http://teem.sourceforge.net/nrrd/format.html",
];

/// Parsed or generated NRRD header
///
/// Per-axis fields (`sizes`, `kinds`, `space_directions`, ...) are listed in
/// NRRD order: fastest-varying axis first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NrrdHeader {
    /// Digit following the `NRRD000` magic
    pub version: u8,
    pub data_type: DataType,
    pub dimension: usize,
    pub sizes: Vec<usize>,
    pub encoding: Encoding,
    pub endian: Option<Endian>,
    pub content: Option<String>,
    pub space: Option<Space>,
    pub space_dimension: Option<usize>,
    pub space_units: Vec<String>,
    pub space_origin: Option<Vec<f64>>,
    /// One entry per axis; `None` marks a non-spatial axis
    pub space_directions: Vec<Option<Vec<f64>>>,
    pub measurement_frame: Vec<Vec<f64>>,
    pub kinds: Vec<AxisKind>,
    pub spacings: Vec<f64>,
    pub thicknesses: Vec<f64>,
    pub axis_mins: Vec<f64>,
    pub axis_maxs: Vec<f64>,
    pub centers: Vec<Option<Center>>,
    pub labels: Vec<String>,
    pub units: Vec<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub old_min: Option<f64>,
    pub old_max: Option<f64>,
    /// Lines to skip before the payload
    pub line_skip: usize,
    /// Bytes to skip before the payload; `-1` means the payload ends the file
    pub byte_skip: i64,
    pub comments: Vec<String>,
    /// Free `key:=value` pairs
    pub key_values: BTreeMap<String, String>,
}

impl NrrdHeader {
    /// Minimal header for a raster of the given sizes (NRRD order)
    pub fn new(data_type: DataType, sizes: Vec<usize>) -> Self {
        let endian = if data_type.size_in_bytes() > 1 {
            Some(Endian::default())
        } else {
            None
        };
        Self {
            version: NRRD_WRITE_VERSION,
            data_type,
            dimension: sizes.len(),
            sizes,
            encoding: Encoding::Raw,
            endian,
            content: None,
            space: None,
            space_dimension: None,
            space_units: Vec::new(),
            space_origin: None,
            space_directions: Vec::new(),
            measurement_frame: Vec::new(),
            kinds: Vec::new(),
            spacings: Vec::new(),
            thicknesses: Vec::new(),
            axis_mins: Vec::new(),
            axis_maxs: Vec::new(),
            centers: Vec::new(),
            labels: Vec::new(),
            units: Vec::new(),
            min: None,
            max: None,
            old_min: None,
            old_max: None,
            line_skip: 0,
            byte_skip: 0,
            comments: Vec::new(),
            key_values: BTreeMap::new(),
        }
    }

    /// Header for a C-order `(slices, rows, columns)` volume placed in LPS space
    /// by `metadata`.
    ///
    /// `sizes` is written fastest axis first (`columns rows slices`) so that
    /// direction row 0 pairs with the column index.
    pub fn for_volume(
        data_type: DataType,
        shape: [usize; 3],
        metadata: &VolumeMetadata,
        options: &WriteOptions,
    ) -> Self {
        let mut header = Self::new(data_type, vec![shape[2], shape[1], shape[0]]);
        header.kinds = vec![AxisKind::Domain; 3];
        header.space = Some(Space::LeftPosteriorSuperior);
        header.space_origin = Some(metadata.space_origin().to_vec());
        header.space_directions = metadata
            .space_directions()
            .iter()
            .map(|row| Some(row.to_vec()))
            .collect();
        header.encoding = options.encoding;
        header.endian = if options.encoding.is_binary() && data_type.size_in_bytes() > 1 {
            Some(options.endian)
        } else {
            None
        };
        header.content = options.content.clone();
        header.comments = FORMAT_REFERENCE.iter().map(|s| s.to_string()).collect();
        header.comments.extend(options.comments.iter().cloned());
        header.key_values = options.key_values.clone();
        header
    }

    /// Number of samples in the payload
    ///
    /// Saturates at `usize::MAX`; `validate` rejects sizes that overflow.
    pub fn element_count(&self) -> usize {
        self.sizes.iter().fold(1usize, |acc, &size| acc.saturating_mul(size))
    }

    /// Payload size in bytes for binary encodings, saturating like `element_count`
    pub fn payload_len(&self) -> usize {
        self.element_count().saturating_mul(self.data_type.size_in_bytes())
    }

    /// Sample strides per axis, fastest axis stride 1
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.sizes.len());
        let mut stride = 1usize;
        for &size in &self.sizes {
            strides.push(stride);
            stride = stride.saturating_mul(size);
        }
        strides
    }

    /// Sizes in C (row-major) order, slowest axis first
    pub fn array_shape(&self) -> Vec<usize> {
        self.sizes.iter().rev().copied().collect()
    }

    /// Space dimension, stated or implied by `space`
    pub fn effective_space_dimension(&self) -> Option<usize> {
        self.space
            .map(|space| space.dimension())
            .or(self.space_dimension)
    }

    /// Space directions as a 3x3 matrix, when all three axes are spatial 3-vectors
    pub fn direction_matrix(&self) -> Option<[Vec3; 3]> {
        if self.space_directions.len() != 3 {
            return None;
        }
        let mut matrix = [[0.0; 3]; 3];
        for (row, direction) in matrix.iter_mut().zip(&self.space_directions) {
            match direction.as_deref() {
                Some([x, y, z]) => *row = [*x, *y, *z],
                _ => return None,
            }
        }
        Some(matrix)
    }

    /// Check the cross-field invariants of the header
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(NrrdError::invalid_value("dimension", "0"));
        }
        if self.sizes.len() != self.dimension {
            return Err(NrrdError::InvalidFormat(format!(
                "\"sizes\" has {} entries but dimension is {}",
                self.sizes.len(),
                self.dimension
            )));
        }
        if self.sizes.contains(&0) {
            return Err(NrrdError::ShapeMismatch(format!(
                "axis sizes must be positive, got {:?}",
                self.sizes
            )));
        }
        let byte_len = self
            .sizes
            .iter()
            .try_fold(self.data_type.size_in_bytes(), |acc, &size| acc.checked_mul(size));
        if byte_len.is_none() {
            return Err(NrrdError::ShapeMismatch(format!(
                "axis sizes {:?} of {} overflow the addressable payload length",
                self.sizes, self.data_type
            )));
        }
        if !self.kinds.is_empty() {
            if self.kinds.len() != self.sizes.len() {
                return Err(NrrdError::InvalidFormat(
                    "\"kinds\" must have as many elements as \"sizes\"".to_string(),
                ));
            }
            for (kind, &size) in self.kinds.iter().zip(&self.sizes) {
                if let Some(expected) = kind.expected_size() {
                    if expected != size {
                        return Err(NrrdError::InvalidFormat(format!(
                            "kind \"{}\" expects a size of {} but {} found",
                            kind, expected, size
                        )));
                    }
                }
            }
        }
        if let (Some(space), Some(stated)) = (self.space, self.space_dimension) {
            if space.dimension() != stated {
                return Err(NrrdError::InvalidFormat(format!(
                    "space \"{}\" has dimension {} but \"space dimension\" is {}",
                    space,
                    space.dimension(),
                    stated
                )));
            }
        }
        if !self.space_directions.is_empty() {
            if self.space_directions.len() != self.dimension {
                return Err(NrrdError::InvalidFormat(
                    "\"space directions\" must contain as many elements as dimensions; \
                     non-spatial axes are written as \"none\""
                        .to_string(),
                ));
            }
            if let Some(space_dim) = self.effective_space_dimension() {
                let bad = self
                    .space_directions
                    .iter()
                    .flatten()
                    .any(|v| v.len() != space_dim);
                if bad {
                    return Err(NrrdError::InvalidFormat(format!(
                        "\"space directions\" vectors must have {} components",
                        space_dim
                    )));
                }
            }
        }
        if let (Some(origin), Some(space_dim)) =
            (&self.space_origin, self.effective_space_dimension())
        {
            if origin.len() != space_dim {
                return Err(NrrdError::InvalidFormat(format!(
                    "\"space origin\" must have {} components",
                    space_dim
                )));
            }
        }
        Ok(())
    }

    /// Render the header block, including the terminating blank line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "NRRD000{}", self.version)?;
        for comment in &self.comments {
            writeln!(out, "# {}", single_line(comment))?;
        }
        if let Some(content) = &self.content {
            writeln!(out, "content: {}", single_line(content))?;
        }
        writeln!(out, "type: {}", self.data_type)?;
        writeln!(out, "dimension: {}", self.dimension)?;
        match (self.space, self.space_dimension) {
            (Some(space), _) => writeln!(out, "space: {}", space)?,
            (None, Some(dim)) => writeln!(out, "space dimension: {}", dim)?,
            (None, None) => {}
        }
        writeln!(out, "sizes: {}", join(&self.sizes))?;
        if !self.space_directions.is_empty() {
            let rendered: Vec<String> = self
                .space_directions
                .iter()
                .map(|d| d.as_deref().map_or_else(|| "none".to_string(), format_vector))
                .collect();
            writeln!(out, "space directions: {}", rendered.join(" "))?;
        }
        if !self.kinds.is_empty() {
            writeln!(out, "kinds: {}", join(&self.kinds))?;
        }
        if !self.centers.is_empty() {
            let rendered: Vec<&str> = self
                .centers
                .iter()
                .map(|c| c.map_or("???", |c| c.nrrd_name()))
                .collect();
            writeln!(out, "centers: {}", rendered.join(" "))?;
        }
        write_float_list(out, "spacings", &self.spacings)?;
        write_float_list(out, "thicknesses", &self.thicknesses)?;
        write_float_list(out, "axis mins", &self.axis_mins)?;
        write_float_list(out, "axis maxs", &self.axis_maxs)?;
        write_quoted_list(out, "labels", &self.labels)?;
        write_quoted_list(out, "units", &self.units)?;
        if let Some(endian) = self.endian {
            writeln!(out, "endian: {}", endian.nrrd_name())?;
        }
        writeln!(out, "encoding: {}", self.encoding)?;
        write_quoted_list(out, "space units", &self.space_units)?;
        if let Some(origin) = &self.space_origin {
            writeln!(out, "space origin: {}", format_vector(origin))?;
        }
        if !self.measurement_frame.is_empty() {
            let rendered: Vec<String> = self
                .measurement_frame
                .iter()
                .map(|v| format_vector(v))
                .collect();
            writeln!(out, "measurement frame: {}", rendered.join(" "))?;
        }
        for (field, value) in [
            ("min", self.min),
            ("max", self.max),
            ("old min", self.old_min),
            ("old max", self.old_max),
        ] {
            if let Some(value) = value {
                writeln!(out, "{}: {}", field, value)?;
            }
        }
        if self.line_skip != 0 {
            writeln!(out, "line skip: {}", self.line_skip)?;
        }
        if self.byte_skip != 0 {
            writeln!(out, "byte skip: {}", self.byte_skip)?;
        }
        for (key, value) in &self.key_values {
            writeln!(out, "{}:={}", single_line(key), single_line(value))?;
        }
        writeln!(out)
    }

    /// Parse the header at the start of `bytes`.
    ///
    /// Returns the header and the offset of the first payload byte. The header
    /// ends at the first empty line.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < 8 || &bytes[..7] != NRRD_MAGIC_PREFIX {
            return Err(NrrdError::InvalidFormat(
                "this file is not a NRRD file".to_string(),
            ));
        }

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut data_offset = None;
        for (i, &byte) in bytes.iter().enumerate() {
            if byte != b'\n' {
                continue;
            }
            let raw = &bytes[line_start..i];
            let line = raw.strip_suffix(b"\r").unwrap_or(raw);
            if line.is_empty() {
                data_offset = Some(i + 1);
                break;
            }
            lines.push(line);
            line_start = i + 1;
        }
        let data_offset = data_offset
            .ok_or_else(|| NrrdError::InvalidFormat("the NRRD header is corrupted".to_string()))?;

        let mut lines = lines.into_iter().map(|line| {
            std::str::from_utf8(line)
                .map_err(|_| NrrdError::InvalidFormat("header is not valid text".to_string()))
        });
        let magic = lines
            .next()
            .ok_or_else(|| NrrdError::InvalidFormat("missing magic line".to_string()))??;
        let version = magic[7..]
            .trim()
            .parse::<u8>()
            .map_err(|_| NrrdError::InvalidFormat(format!("bad magic line \"{}\"", magic)))?;

        let mut fields = RawFields {
            version,
            ..Default::default()
        };
        for line in lines {
            fields.accept(line?)?;
        }
        let header = fields.finish()?;
        header.validate()?;
        Ok((header, data_offset))
    }
}

/// Header fields collected line by line before required ones are checked
#[derive(Default)]
struct RawFields {
    version: u8,
    data_type: Option<DataType>,
    dimension: Option<usize>,
    sizes: Option<Vec<usize>>,
    encoding: Option<Encoding>,
    rest: Option<NrrdHeader>,
}

impl RawFields {
    fn header(&mut self) -> &mut NrrdHeader {
        self.rest.get_or_insert_with(blank_header)
    }

    fn accept(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        if let Some(comment) = line.strip_prefix('#') {
            self.header().comments.push(comment.trim().to_string());
            return Ok(());
        }
        if let Some((key, value)) = line.split_once(":=") {
            self.header()
                .key_values
                .insert(key.to_string(), value.to_string());
            return Ok(());
        }
        let (field, value) = line
            .split_once(':')
            .ok_or_else(|| NrrdError::InvalidFormat(format!("unreadable header line \"{}\"", line)))?;
        let field = field.trim();
        let value = value.trim();

        match field {
            "type" => {
                self.data_type = Some(
                    DataType::from_nrrd_name(value)
                        .ok_or_else(|| NrrdError::UnsupportedType(value.to_string()))?,
                )
            }
            "dimension" => self.dimension = Some(parse_number(field, value)?),
            "sizes" => self.sizes = Some(parse_numbers(field, value)?),
            "encoding" => self.encoding = Some(Encoding::from_nrrd_name(value)?),
            "endian" => {
                self.header().endian = Some(
                    Endian::from_nrrd_name(value)
                        .ok_or_else(|| NrrdError::invalid_value(field, value))?,
                )
            }
            "content" => self.header().content = Some(value.to_string()),
            "space" => {
                self.header().space = Some(
                    Space::from_nrrd_name(value)
                        .ok_or_else(|| NrrdError::invalid_value(field, value))?,
                )
            }
            "space dimension" => self.header().space_dimension = Some(parse_number(field, value)?),
            "space units" => self.header().space_units = parse_quoted(value),
            "space origin" => {
                let mut vectors = parse_vectors(field, value)?;
                match (vectors.pop(), vectors.is_empty()) {
                    (Some(Some(origin)), true) => self.header().space_origin = Some(origin),
                    _ => return Err(NrrdError::invalid_value(field, value)),
                }
            }
            "space directions" => self.header().space_directions = parse_vectors(field, value)?,
            "measurement frame" => {
                self.header().measurement_frame = parse_vectors(field, value)?
                    .into_iter()
                    .map(|v| v.ok_or_else(|| NrrdError::invalid_value(field, value)))
                    .collect::<Result<_>>()?
            }
            "kinds" => {
                self.header().kinds = value
                    .split_whitespace()
                    .map(|k| {
                        AxisKind::from_nrrd_name(k).ok_or_else(|| NrrdError::invalid_value(field, k))
                    })
                    .collect::<Result<_>>()?
            }
            "spacings" => self.header().spacings = parse_numbers(field, value)?,
            "thicknesses" => self.header().thicknesses = parse_numbers(field, value)?,
            "axis mins" | "axismins" => self.header().axis_mins = parse_numbers(field, value)?,
            "axis maxs" | "axismaxs" => self.header().axis_maxs = parse_numbers(field, value)?,
            "centers" | "centerings" => {
                self.header().centers = value.split_whitespace().map(Center::from_nrrd_name).collect()
            }
            "labels" => self.header().labels = parse_quoted(value),
            "units" => self.header().units = parse_quoted(value),
            "min" => self.header().min = Some(parse_number(field, value)?),
            "max" => self.header().max = Some(parse_number(field, value)?),
            "old min" | "oldmin" => self.header().old_min = Some(parse_number(field, value)?),
            "old max" | "oldmax" => self.header().old_max = Some(parse_number(field, value)?),
            "line skip" | "lineskip" => self.header().line_skip = parse_number(field, value)?,
            "byte skip" | "byteskip" => {
                let skip: i64 = parse_number(field, value)?;
                if skip < -1 {
                    return Err(NrrdError::invalid_value(field, value));
                }
                self.header().byte_skip = skip;
            }
            "data file" | "datafile" => {
                return Err(NrrdError::InvalidFormat(
                    "detached data files are not supported".to_string(),
                ))
            }
            other => log::warn!("ignoring unsupported NRRD field \"{}\"", other),
        }
        Ok(())
    }

    fn finish(mut self) -> Result<NrrdHeader> {
        let data_type = self
            .data_type
            .ok_or_else(|| NrrdError::MissingField("type".to_string()))?;
        let dimension = self
            .dimension
            .ok_or_else(|| NrrdError::MissingField("dimension".to_string()))?;
        let sizes = self
            .sizes
            .take()
            .ok_or_else(|| NrrdError::MissingField("sizes".to_string()))?;
        let encoding = self
            .encoding
            .ok_or_else(|| NrrdError::MissingField("encoding".to_string()))?;

        let mut header = self
            .rest
            .take()
            .unwrap_or_else(blank_header);
        header.version = self.version;
        header.data_type = data_type;
        header.dimension = dimension;
        header.sizes = sizes;
        header.encoding = encoding;
        if !header.encoding.is_binary() || data_type.size_in_bytes() == 1 {
            header.endian = header.endian.filter(|_| header.encoding.is_binary());
        } else if header.endian.is_none() {
            return Err(NrrdError::MissingField("endian".to_string()));
        }
        Ok(header)
    }
}

/// Placeholder for optional fields; carries no endian
fn blank_header() -> NrrdHeader {
    NrrdHeader::new(DataType::U8, Vec::new())
}

fn parse_number<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| NrrdError::invalid_value(field, value))
}

fn parse_numbers<T: FromStr>(field: &str, value: &str) -> Result<Vec<T>> {
    value
        .split_whitespace()
        .map(|token| parse_number(field, token))
        .collect()
}

/// Parse `(x,y,z) none (a, b, c)` style lists
fn parse_vectors(field: &str, value: &str) -> Result<Vec<Option<Vec<f64>>>> {
    let mut vectors = Vec::new();
    let mut rest = value.trim_start();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("none") {
            vectors.push(None);
            rest = after.trim_start();
        } else if let Some(inner) = rest.strip_prefix('(') {
            let close = inner
                .find(')')
                .ok_or_else(|| NrrdError::invalid_value(field, value))?;
            let components = inner[..close]
                .split(',')
                .map(|c| parse_number(field, c))
                .collect::<Result<Vec<f64>>>()?;
            vectors.push(Some(components));
            rest = inner[close + 1..].trim_start();
        } else {
            return Err(NrrdError::invalid_value(field, value));
        }
    }
    Ok(vectors)
}

/// Parse `"a" "b c"` lists, falling back to whitespace splitting when unquoted
fn parse_quoted(value: &str) -> Vec<String> {
    if !value.contains('"') {
        return value.split_whitespace().map(str::to_string).collect();
    }
    value
        .split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(","))
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_float_list(out: &mut String, field: &str, values: &[f64]) -> std::fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}: {}", field, join(values))
}

fn write_quoted_list(out: &mut String, field: &str, values: &[String]) -> std::fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", single_line(v).replace('"', "'")))
        .collect();
    writeln!(out, "{}: {}", field, quoted.join(" "))
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
