use std::{fs, path::Path};

use byteorder::{ByteOrder, LittleEndian};
use npyz::{DType, NpyFile, TypeChar};

use crate::error::{io, AppError};

/// Extensions holding raw little-endian `i32` labels.
const BINARY_LABEL_EXTENSIONS: [&str; 2] = ["label", "bin"];

const NPY_EXTENSION: &str = "npy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelFormat {
    Text,
    Binary,
    Npy,
}

/// Reads one predicted label per point.
///
/// `.npy` arrays may hold any integer or float dtype and are flattened.
/// Text files carry one integer per line. Values stored as floats
/// (`3.000000000000000000e+00`) are accepted when they are integral.
pub fn read_labels(path: &Path) -> Result<Vec<i64>, AppError> {
    let bytes = fs::read(path).map_err(io(path))?;
    match label_format(path) {
        LabelFormat::Npy => parse_npy(path, &bytes),
        LabelFormat::Binary => parse_binary(path, &bytes),
        LabelFormat::Text => parse_text(path, &bytes),
    }
}

fn label_format(path: &Path) -> LabelFormat {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return LabelFormat::Text;
    };
    if ext.eq_ignore_ascii_case(NPY_EXTENSION) {
        LabelFormat::Npy
    } else if BINARY_LABEL_EXTENSIONS
        .iter()
        .any(|binary| ext.eq_ignore_ascii_case(binary))
    {
        LabelFormat::Binary
    } else {
        LabelFormat::Text
    }
}

fn invalid(path: &Path, message: impl Into<String>) -> AppError {
    AppError::Labels {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_npy(path: &Path, bytes: &[u8]) -> Result<Vec<i64>, AppError> {
    let npy = NpyFile::new(bytes).map_err(|err| invalid(path, err.to_string()))?;
    let DType::Plain(type_str) = npy.dtype() else {
        return Err(invalid(path, "structured arrays are not label arrays"));
    };

    fn ints<T: Into<i64>>(values: std::io::Result<Vec<T>>) -> std::io::Result<Vec<i64>> {
        values.map(|values| values.into_iter().map(Into::into).collect())
    }

    let labels = match (type_str.type_char(), type_str.size_field()) {
        (TypeChar::Int, 1) => ints(npy.into_vec::<i8>()),
        (TypeChar::Int, 2) => ints(npy.into_vec::<i16>()),
        (TypeChar::Int, 4) => ints(npy.into_vec::<i32>()),
        (TypeChar::Int, 8) => npy.into_vec::<i64>(),
        (TypeChar::Uint, 1) => ints(npy.into_vec::<u8>()),
        (TypeChar::Uint, 2) => ints(npy.into_vec::<u16>()),
        (TypeChar::Uint, 4) => ints(npy.into_vec::<u32>()),
        (TypeChar::Float, 4) => {
            let values = npy
                .into_vec::<f32>()
                .map_err(|err| invalid(path, err.to_string()))?;
            return float_labels(path, values.into_iter().map(f64::from));
        }
        (TypeChar::Float, 8) => {
            let values = npy
                .into_vec::<f64>()
                .map_err(|err| invalid(path, err.to_string()))?;
            return float_labels(path, values);
        }
        _ => return Err(invalid(path, format!("unsupported dtype {:?}", type_str))),
    };
    labels.map_err(|err| invalid(path, err.to_string()))
}

fn float_labels(
    path: &Path,
    values: impl IntoIterator<Item = f64>,
) -> Result<Vec<i64>, AppError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            float_label(value).ok_or_else(|| {
                invalid(path, format!("element {}: {} is not an integer label", index, value))
            })
        })
        .collect()
}

fn parse_binary(path: &Path, bytes: &[u8]) -> Result<Vec<i64>, AppError> {
    let label_size = std::mem::size_of::<i32>();
    if bytes.len() % label_size != 0 {
        return Err(invalid(
            path,
            format!("{} bytes is not a whole number of i32 labels", bytes.len()),
        ));
    }
    let mut labels = vec![0i32; bytes.len() / label_size];
    LittleEndian::read_i32_into(bytes, &mut labels);
    Ok(labels.into_iter().map(i64::from).collect())
}

fn parse_text(path: &Path, bytes: &[u8]) -> Result<Vec<i64>, AppError> {
    let text = std::str::from_utf8(bytes).map_err(|err| invalid(path, err.to_string()))?;

    text.lines()
        .enumerate()
        .map(|(line, token)| (line, token.trim()))
        .filter(|(_, token)| !token.is_empty())
        .map(|(line, token)| {
            parse_label(token).ok_or_else(|| {
                invalid(
                    path,
                    format!("line {}: '{}' is not an integer label", line + 1, token),
                )
            })
        })
        .collect()
}

fn parse_label(token: &str) -> Option<i64> {
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    float_label(token.parse::<f64>().ok()?)
}

fn float_label(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value <= i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}
