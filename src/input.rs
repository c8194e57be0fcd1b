//! Common routines for handling input data.
use anyhow::{Context, Result};
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

/// Read a TOML file and deserialise it into the requested type.
///
/// # Arguments
///
/// * `file_path`: Path to the TOML file
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path)
        .with_context(|| format!("Could not read file {}", file_path.to_string_lossy()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Could not parse TOML file {}", file_path.to_string_lossy()))
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value is not between 0 and 1"))?;
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Fraction {
        #[serde(deserialize_with = "deserialise_proportion")]
        value: f64,
    }

    #[test]
    fn test_read_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value = 0.25").unwrap();
        let parsed: Fraction = read_toml(file.path()).unwrap();
        assert_eq!(parsed, Fraction { value: 0.25 });
    }

    #[test]
    fn test_read_toml_missing_file() {
        assert!(read_toml::<Fraction>(Path::new("does/not/exist.toml")).is_err());
    }

    #[test]
    fn test_deserialise_proportion_out_of_range() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value = 1.5").unwrap();
        assert!(read_toml::<Fraction>(file.path()).is_err());
    }
}
