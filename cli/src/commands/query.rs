use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{arg, ArgMatches, Command};
use gribjump::{Extractor, SeekableJumpReader};

use crate::cli::PointSelection;

pub fn cli() -> Command {
    Command::new(crate::cli::module_component!())
        .about("Extract values at grid point indices without decoding the whole field")
        .arg(arg!(<FILE> "GRIB file to read from").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<POINTS>... "Grid point index 'INDEX' or range 'START..END'"))
        .arg(
            arg!(-m --meta <META> "Binary metadata file (default: <FILE>.bin)")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--msg <N> "Message index within the file")
                .required(false)
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
}

pub fn exec(args: &ArgMatches) -> anyhow::Result<()> {
    let file_name = args.get_one::<PathBuf>("FILE").unwrap();
    let meta_path = args
        .get_one::<PathBuf>("meta")
        .cloned()
        .unwrap_or_else(|| crate::cli::default_meta_path(file_name));
    let msg_index = *args.get_one::<usize>("msg").unwrap();
    let points = args
        .get_many::<String>("POINTS")
        .unwrap()
        .map(|s| s.parse::<PointSelection>())
        .collect::<Result<Vec<_>, _>>()?;

    let info = gribjump::metadata::read_message(&meta_path, msg_index)?;
    let f = File::open(file_name)?;
    let reader = SeekableJumpReader::new(BufReader::new(f));
    let mut extractor = Extractor::new(&info, reader);

    match points.as_slice() {
        [PointSelection::Single(index)] => {
            println!("{}", extractor.value_at(*index)?);
        }
        _ => {
            let ranges = points
                .iter()
                .map(PointSelection::as_range)
                .collect::<Vec<_>>();
            for value in extractor.values_in_ranges(&ranges)? {
                println!("{value}");
            }
        }
    }
    Ok(())
}
