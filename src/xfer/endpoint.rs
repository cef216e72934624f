//! Resolving command line endpoints into a transfer plan.

use std::fs::{
    self,
    File,
};
use std::io::{
    self,
    Read,
    Write,
};
use std::os::unix::fs::FileTypeExt;
use std::path::{
    Path,
    PathBuf,
};

use xfer::Direction;
use {
    Error,
    Result,
};

/// What a path on the command line points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A character special file, i.e. a link device.
    Device,
    /// A regular file.
    File,
    /// Anything else, e.g. a directory or a socket.
    Other,
}

/// Looks up what kind of file a path names.
pub fn classify(path: &Path) -> Result<Kind> {
    let metadata = fs::metadata(path).map_err(|err| {
        Error::Config(format!(
            "Failed to get file status of {}: {}",
            path.display(),
            err
        ))
    })?;

    let file_type = metadata.file_type();
    let kind = if file_type.is_char_device() {
        Kind::Device
    } else if file_type.is_file() {
        Kind::File
    } else {
        Kind::Other
    };

    Ok(kind)
}

/// Parses a direction given on the command line.
pub fn parse_direction(token: &str) -> Option<Direction> {
    match token {
        "s" | "send" | "tx" => Some(Direction::ToLink),
        "r" | "recv" | "receive" | "rx" => Some(Direction::FromLink),
        _ => None,
    }
}

/// The opened data end of a transfer.
pub enum Data {
    /// Read from when transmitting.
    Source(Box<dyn Read>),
    /// Written to when receiving.
    Sink(Box<dyn Write>),
}

/// Where data comes from and goes to, resolved once before the link is
/// touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub direction: Direction,
    /// The link device.
    pub device: PathBuf,
    /// The file at the other end, or None for stdin/stdout.
    pub data: Option<PathBuf>,
}

impl Plan {
    /// Infers the direction from the kind of the first path: a regular file
    /// is sent to the device named second, a device is received from into
    /// the file named second (stdout if there is none).
    pub fn infer(from: &Path, to: Option<&Path>) -> Result<Plan> {
        match classify(from)? {
            Kind::File => {
                let device =
                    to.ok_or_else(|| Error::Config("Not enough arguments".to_string()))?;
                check_device(device)?;
                Ok(Plan {
                    direction: Direction::ToLink,
                    device: device.to_path_buf(),
                    data: Some(from.to_path_buf()),
                })
            }
            Kind::Device => Ok(Plan {
                direction: Direction::FromLink,
                device: from.to_path_buf(),
                data: to.map(Path::to_path_buf),
            }),
            Kind::Other => Err(Error::Config(format!(
                "Unsupported file type: {}",
                from.display()
            ))),
        }
    }

    /// A plan with a direction given up front.
    pub fn explicit(device: &Path, direction: Direction, data: Option<&Path>) -> Result<Plan> {
        check_device(device)?;
        Ok(Plan {
            direction,
            device: device.to_path_buf(),
            data: data.map(Path::to_path_buf),
        })
    }

    /// Builds a plan from the swic-xfer arguments, either `FROM [TO]` or
    /// `DEVICE s|r` with the data file passed separately.
    pub fn from_args(first: &str, second: Option<&str>, file: Option<&str>) -> Result<Plan> {
        match second.and_then(parse_direction) {
            Some(direction) => Plan::explicit(Path::new(first), direction, file.map(Path::new)),
            None if file.is_some() => Err(Error::Config(
                "A data file option needs an explicit direction".to_string(),
            )),
            None => Plan::infer(Path::new(first), second.map(Path::new)),
        }
    }

    /// Opens the data source for transmitting.
    pub fn open_source(&self) -> Result<Box<dyn Read>> {
        match self.data {
            Some(ref path) => {
                let file = File::open(path).map_err(|err| Error::Open(path.clone(), err))?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdin())),
        }
    }

    /// Opens, truncating, the data sink for receiving.
    pub fn open_sink(&self) -> Result<Box<dyn Write>> {
        match self.data {
            Some(ref path) => {
                let file = File::create(path).map_err(|err| Error::Open(path.clone(), err))?;
                Ok(Box::new(file))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    /// Opens whichever data end the direction calls for.
    pub fn open(&self) -> Result<Data> {
        debug!("Opening {} as the {} data end.", self.data_name(), self.direction);
        match self.direction {
            Direction::ToLink => self.open_source().map(Data::Source),
            Direction::FromLink => self.open_sink().map(Data::Sink),
        }
    }

    /// Names the data endpoint for messages.
    pub fn data_name(&self) -> String {
        match (&self.data, self.direction) {
            (&Some(ref path), _) => path.display().to_string(),
            (&None, Direction::ToLink) => "stdin".to_string(),
            (&None, Direction::FromLink) => "stdout".to_string(),
        }
    }
}

fn check_device(path: &Path) -> Result<()> {
    match classify(path)? {
        Kind::Device => Ok(()),
        _ => Err(Error::Config(format!(
            "Unsupported device type: {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{
        self,
        NamedTempFile,
    };

    use super::*;

    // Any character device will do for resolving plans.
    const DEVICE: &str = "/dev/null";

    fn regular_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        file
    }

    #[test]
    fn test_classify() {
        let file = regular_file();
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(classify(Path::new(DEVICE)).unwrap(), Kind::Device);
        assert_eq!(classify(file.path()).unwrap(), Kind::File);
        assert_eq!(classify(dir.path()).unwrap(), Kind::Other);
        assert_matches!(
            classify(&dir.path().join("missing")),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_infer_transmit() {
        let file = regular_file();
        let plan = Plan::infer(file.path(), Some(Path::new(DEVICE))).unwrap();

        assert_eq!(plan.direction, Direction::ToLink);
        assert_eq!(plan.device, Path::new(DEVICE));
        assert_eq!(plan.data.as_ref().map(|p| p.as_path()), Some(file.path()));
    }

    #[test]
    fn test_infer_transmit_needs_device() {
        let file = regular_file();
        let other = regular_file();

        assert_matches!(Plan::infer(file.path(), None), Err(Error::Config(_)));
        assert_matches!(
            Plan::infer(file.path(), Some(other.path())),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_infer_receive() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.bin");

        let plan = Plan::infer(Path::new(DEVICE), Some(out.as_path())).unwrap();
        assert_eq!(plan.direction, Direction::FromLink);
        assert_eq!(plan.data, Some(out));

        let plan = Plan::infer(Path::new(DEVICE), None).unwrap();
        assert_eq!(plan.data, None);
        assert_eq!(plan.data_name(), "stdout");
    }

    #[test]
    fn test_infer_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            Plan::infer(dir.path(), Some(Path::new(DEVICE))),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_parse_direction() {
        for token in ["s", "send", "tx"].iter() {
            assert_eq!(parse_direction(token), Some(Direction::ToLink));
        }
        for token in ["r", "recv", "receive", "rx"].iter() {
            assert_eq!(parse_direction(token), Some(Direction::FromLink));
        }
        assert_eq!(parse_direction("out.bin"), None);
    }

    #[test]
    fn test_from_args_explicit() {
        let plan = Plan::from_args(DEVICE, Some("s"), None).unwrap();
        assert_eq!(plan.direction, Direction::ToLink);
        assert_eq!(plan.data_name(), "stdin");

        let plan = Plan::from_args(DEVICE, Some("r"), Some("/tmp/out.bin")).unwrap();
        assert_eq!(plan.direction, Direction::FromLink);
        assert_eq!(plan.data, Some(PathBuf::from("/tmp/out.bin")));
    }

    #[test]
    fn test_from_args_explicit_needs_device() {
        let file = regular_file();
        let path = file.path().to_str().unwrap();
        assert_matches!(Plan::from_args(path, Some("s"), None), Err(Error::Config(_)));
    }

    #[test]
    fn test_from_args_file_without_direction() {
        assert_matches!(
            Plan::from_args(DEVICE, None, Some("/tmp/out.bin")),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_open_data_endpoints() {
        let file = regular_file();
        let plan = Plan::infer(file.path(), Some(Path::new(DEVICE))).unwrap();

        let mut data = vec![];
        plan.open_source().unwrap().read_to_end(&mut data).unwrap();
        assert_eq!(data, b"payload");

        let dir = tempfile::tempdir().unwrap();
        let plan = Plan {
            direction: Direction::FromLink,
            device: PathBuf::from(DEVICE),
            data: Some(dir.path().join("missing").join("out.bin")),
        };
        assert_matches!(plan.open_sink().err(), Some(Error::Open(_, _)));
        assert_matches!(plan.open().err(), Some(Error::Open(_, _)));
    }
}
