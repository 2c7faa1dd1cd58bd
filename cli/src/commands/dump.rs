use std::io::Write;
use std::path::PathBuf;

use clap::{arg, ArgMatches, Command};

pub fn cli() -> Command {
    Command::new(crate::cli::module_component!())
        .about("Print one message record as JSON")
        .arg(arg!(<META> "Binary metadata file").value_parser(clap::value_parser!(PathBuf)))
        .arg(
            arg!(-m --msg <N> "Message index within the file")
                .required(false)
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
}

pub fn exec(args: &ArgMatches) -> anyhow::Result<()> {
    let meta_path = args.get_one::<PathBuf>("META").unwrap();
    let msg_index = *args.get_one::<usize>("msg").unwrap();
    let info = gribjump::metadata::read_message(meta_path, msg_index)?;

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    info.to_json(&mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}
