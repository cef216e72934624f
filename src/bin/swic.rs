#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate swic;

use std::path::Path;
use std::process;

use clap::{
    App,
    Arg,
    ArgMatches,
};

use swic::control::{
    self,
    LinkCommand,
    Settings,
};
use swic::link::SpeedCode;
use swic::linux::Swic;
use swic::xfer::endpoint::{
    self,
    Kind,
};
use swic::Error;

/// Shows or configures a SpaceWire interface.
fn main() {
    env_logger::init();

    let matches = App::new("swic")
        .version(crate_version!())
        .about("Show / configure SWIC interface")
        .arg(
            Arg::with_name("DEVICE")
                .help("SpaceWire device to be used")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("link")
                .short("l")
                .long("link")
                .value_name("COMMAND")
                .help(
                    "'up' allows and runs link setting, 'down' disallows link setting \
                     and resets link, 'reset' resets link and link FIFO buffers",
                )
                .possible_values(&["up", "down", "reset"])
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mtu")
                .short("m")
                .long("mtu")
                .value_name("MTU")
                .help("Set link interface MTU")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("speed")
                .short("s")
                .long("speed")
                .value_name("SPEED")
                .help("Set link interface speed, 2.4 | 4.8 | 72 | 120 | ... | 408")
                .takes_value(true),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("swic: {}", err);
        process::exit(1);
    }
}

fn settings(matches: &ArgMatches) -> swic::Result<Settings> {
    let mtu = match matches.value_of("mtu") {
        Some(mtu) => Some(
            mtu.parse::<usize>()
                .map_err(|_| Error::Config(format!("Bad MTU: {}", mtu)))?,
        ),
        None => None,
    };

    let speed = match matches.value_of("speed") {
        Some(speed) => Some(speed.parse::<SpeedCode>()?),
        None => None,
    };

    let link = match matches.value_of("link") {
        Some(link) => Some(link.parse::<LinkCommand>()?),
        None => None,
    };

    Ok(Settings { mtu, speed, link })
}

fn run(matches: &ArgMatches) -> swic::Result<()> {
    let device = matches.value_of("DEVICE").unwrap_or("");
    let settings = settings(matches)?;

    if endpoint::classify(Path::new(device))? != Kind::Device {
        return Err(Error::Config("Unsupported device type.".to_string()));
    }

    let mut swic = Swic::open(device).map_err(|err| Error::Open(device.into(), err))?;

    if settings.is_empty() {
        let info = control::info(&swic)?;
        println!("{}:\t{}", device, info);
        return Ok(());
    }

    control::apply(&mut swic, &settings)
}
