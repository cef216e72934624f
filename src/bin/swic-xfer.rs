#[macro_use]
extern crate clap;
extern crate env_logger;
extern crate swic;

use std::process;
use std::time::{
    Duration,
    Instant,
};

use clap::{
    App,
    Arg,
    ArgMatches,
};

use swic::link::SpeedCode;
use swic::linux::Swic;
use swic::xfer::{
    self,
    Config,
    Direction,
    LinkWait,
    Plan,
    Session,
};
use swic::Error;

/// Streams a file or stdin/stdout across a SpaceWire link.
fn main() {
    let start = Instant::now();

    env_logger::init();

    let matches = App::new("swic-xfer")
        .version(crate_version!())
        .about("Transfer data across a SpaceWire link")
        .after_help(
            "A regular FROM file is sent to the TO device. A FROM device is \
             received from into the TO file, or stdout. Give 's' or 'r' as TO \
             to pick the direction explicitly, with --file as the data file; \
             'send', 'tx', 'recv', 'receive' and 'rx' are accepted as well.",
        )
        .arg(
            Arg::with_name("FROM")
                .help("Input file or device")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("TO")
                .help("Output file or device, or a direction: s|send|tx, r|recv|receive|rx")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("packets")
                .short("n")
                .value_name("N")
                .help("Number of packets")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("speed")
                .short("s")
                .value_name("SPEED")
                .help("TX speed, as a rate (2.4 ... 408) or a driver code")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mtu")
                .short("m")
                .value_name("MTU")
                .help("Maximum transmit unit (packet size)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("file")
                .short("f")
                .long("file")
                .value_name("FILE")
                .help("Data file for an explicit direction")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Print verbose"),
        )
        .arg(
            Arg::with_name("wait-attempts")
                .long("wait-attempts")
                .value_name("N")
                .help("Give up after polling the link state N times")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("wait-timeout")
                .long("wait-timeout")
                .value_name("MS")
                .help("Give up waiting for the link after MS milliseconds")
                .takes_value(true),
        )
        .get_matches();

    if let Err(err) = run(&matches, start) {
        eprintln!("swic-xfer: {}", err);
        process::exit(1);
    }
}

fn number<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> swic::Result<Option<T>> {
    match matches.value_of(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Bad value for {}: {}", name, value))),
        None => Ok(None),
    }
}

fn config(matches: &ArgMatches) -> swic::Result<Config> {
    let tx_speed = match matches.value_of("speed") {
        Some(speed) => speed.parse::<SpeedCode>()?,
        None => SpeedCode::default(),
    };

    let mtu = match number::<usize>(matches, "mtu")? {
        Some(mtu) => Some(xfer::check_mtu(mtu)?),
        None => None,
    };

    let wait = LinkWait {
        max_polls: number::<u64>(matches, "wait-attempts")?,
        deadline: number::<u64>(matches, "wait-timeout")?.map(Duration::from_millis),
        ..LinkWait::default()
    };

    Ok(Config {
        tx_speed,
        mtu,
        packets: number::<u64>(matches, "packets")?,
        verbose: matches.occurrences_of("verbose") > 0,
        wait,
    })
}

fn run(matches: &ArgMatches, start: Instant) -> swic::Result<()> {
    let config = config(matches)?;

    let plan = Plan::from_args(
        matches.value_of("FROM").unwrap_or(""),
        matches.value_of("TO"),
        matches.value_of("file"),
    )?;

    // A bad data path never touches the link.
    let mut data = plan.open()?;

    let swic = Swic::open(&plan.device).map_err(|err| Error::Open(plan.device.clone(), err))?;
    let mut session = Session::new(swic, config);
    let verbose = session.config().verbose;

    if verbose {
        println!("Waiting for link...");
    }
    session.bring_up()?;
    if verbose {
        println!("Link is set");
        println!("Transfer mode: {}", plan.direction);
        match plan.direction {
            Direction::ToLink => println!("Transmission device: {}", plan.device.display()),
            Direction::FromLink => println!("Receiving device: {}", plan.device.display()),
        }
    }

    let report = session.transfer(&mut data)?;

    if verbose {
        println!("{}", report);
        let total = start.elapsed();
        println!("Total time: {:.6} s", total.as_secs_f64());
    }

    Ok(())
}
