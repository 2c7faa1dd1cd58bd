use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// One positional point selection of the `query` subcommand: a single grid
/// point index or a half-open index range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PointSelection {
    Single(usize),
    Range(usize, usize),
}

impl PointSelection {
    pub(crate) fn as_range(&self) -> (usize, usize) {
        match self {
            Self::Single(index) => (*index, *index + 1),
            Self::Range(start, end) => (*start, *end),
        }
    }
}

impl std::str::FromStr for PointSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"(?x)          # insignificant whitespace mode
                ^
                ([0-9]+)        # start index
                (?:
                    \.\.        # separator
                    ([0-9]+)    # end index (exclusive)
                )?
                $",
            )
            .unwrap()
        });
        let cap = RE.captures(s).ok_or_else(|| {
            anyhow::anyhow!("points must be specified as 'INDEX' or 'START..END' in integers")
        })?;
        let start = cap.get(1).unwrap().as_str();
        let start = usize::from_str(start).map_err(|_| anyhow::anyhow!("index too large"))?;
        match cap.get(2) {
            Some(end) => {
                let end = usize::from_str(end.as_str())
                    .map_err(|_| anyhow::anyhow!("index too large"))?;
                Ok(Self::Range(start, end))
            }
            None => Ok(Self::Single(start)),
        }
    }
}

/// The conventional metadata file name next to a GRIB file.
pub(crate) fn default_meta_path<P: AsRef<Path>>(grib_path: P) -> PathBuf {
    let mut path = grib_path.as_ref().as_os_str().to_owned();
    path.push(".bin");
    PathBuf::from(path)
}

macro_rules! module_component {
    () => {
        module_path!().split("::").last().unwrap_or("")
    };
}
pub(crate) use module_component;
