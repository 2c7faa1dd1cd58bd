use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::{arg, ArgMatches, Command};
use gribjump::GribInfo;

pub fn cli() -> Command {
    Command::new(crate::cli::module_component!())
        .about("Show message records from a binary metadata file")
        .arg(arg!(<META> "Binary metadata file").value_parser(clap::value_parser!(PathBuf)))
}

pub fn exec(args: &ArgMatches) -> anyhow::Result<()> {
    let meta_path = args.get_one::<PathBuf>("META").unwrap();
    let infos = gribjump::metadata::read_file(meta_path)?;
    for (index, info) in infos.iter().enumerate() {
        print!("{}", InfoView(index, info));
    }
    Ok(())
}

struct InfoView<'i>(usize, &'i GribInfo);

impl<'i> Display for InfoView<'i> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let Self(index, info) = self;
        writeln!(f, "Message {index}\n")?;
        for line in info.to_string().lines() {
            writeln!(f, "    {line}")?;
        }
        writeln!(f)
    }
}
