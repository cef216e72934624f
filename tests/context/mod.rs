#![allow(dead_code)]

use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use std::process::{
    Command,
    ExitStatus,
    Output as StdOutput,
};

use rand::{
    self,
    Rng,
};
use tempfile::TempDir;

use swic::link::Loopback;
use swic::time::MockEnv;
use swic::xfer::{
    Config,
    Direction,
    Plan,
    Session,
};

/// Any character device will do where a plan needs one.
pub const DEVICE: &str = "/dev/null";

#[derive(Debug)]
pub struct Output {
    pub stderr: String,
    pub stdout: String,
    pub status: ExitStatus,
}

impl From<StdOutput> for Output {
    fn from(output: StdOutput) -> Output {
        Output {
            stderr: String::from_utf8(output.stderr).unwrap(),
            stdout: String::from_utf8(output.stdout).unwrap(),
            status: output.status,
        }
    }
}

/// Runs one of the crate's binaries to completion.
pub fn run_bin(bin: &str, args: &[&str]) -> Output {
    Command::new(bin).args(args).output().unwrap().into()
}

/// A payload of random bytes.
pub fn payload(len: usize) -> Vec<u8> {
    let mut data = vec![0; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

pub fn random_len(low: usize, high: usize) -> usize {
    rand::thread_rng().gen_range(low, high)
}

/// Writes a payload to a fresh file in the directory.
pub fn data_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

/// A session over a loopback whose link is already running.
pub fn session(link: Loopback, config: Config) -> Session<Loopback, MockEnv> {
    let mut session = Session::with_env(link, config, MockEnv::new());
    session.bring_up().unwrap();
    session
}

pub fn send_plan(data: &Path) -> Plan {
    Plan {
        direction: Direction::ToLink,
        device: PathBuf::from(DEVICE),
        data: Some(data.to_path_buf()),
    }
}

pub fn receive_plan(data: &Path) -> Plan {
    Plan {
        direction: Direction::FromLink,
        device: PathBuf::from(DEVICE),
        data: Some(data.to_path_buf()),
    }
}
