#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate swic;

use std::path::Path;
use std::process;

use swic::link::LvdsLink;
use swic::linux::Swic;
use swic::xfer::endpoint::{
    self,
    Kind,
};
use swic::Error;

/// Runs the LVDS controller self-test on a SpaceWire device.
fn main() {
    env_logger::init();

    let matches = clap_app!(app =>
        (version: crate_version!())
        (about: "Test SWIC LVDS controller")
        (@arg DEVICE: +takes_value +required "SpaceWire device to be used")
        (@arg ITERS: -i --iters +takes_value "Iterations to test on LVDS controller")
    ).bin_name("swic-lvds-test")
        .get_matches();

    if let Err(err) = run(
        matches.value_of("DEVICE").unwrap_or(""),
        matches.value_of("ITERS"),
    ) {
        eprintln!("swic-lvds-test: {}", err);
        process::exit(1);
    }
}

fn run(device: &str, iters: Option<&str>) -> swic::Result<()> {
    let iters = match iters {
        Some(iters) => iters
            .parse::<u32>()
            .map_err(|_| Error::Config(format!("Bad iteration count: {}", iters)))?,
        None => 10000,
    };

    if endpoint::classify(Path::new(device))? != Kind::Device {
        return Err(Error::Config("Unsupported device type.".to_string()));
    }

    let mut swic = Swic::open(device).map_err(|err| Error::Open(device.into(), err))?;
    let report = swic.lvds_test(iters)?;
    println!("{}", report);

    Ok(())
}
