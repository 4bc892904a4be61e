use crate::cmd::{parse_hex, read_key, Cmd, Profile, TrapdoorConfig};
use crate::exit_on_error;
use cipher::trapdoor::TrapdoorProcessor;
use cipher::DefaultRand;
use clap::{builder::EnumValueParser, value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::path::PathBuf;

pub struct TransformCmd;

impl TransformCmd {
    fn exe(m: &ArgMatches) -> anyhow::Result<()> {
        let config = TrapdoorConfig::config()?;
        let Some(key) = m.get_one::<PathBuf>("key") else {
            anyhow::bail!("need to specify the key file");
        };
        let options = config.processor_options(m.get_one::<Profile>("profile").copied(), None);
        let processor = TrapdoorProcessor::from_key(read_key(key)?, options, DefaultRand::default())?;

        let out = if let Some(data) = m.get_one::<String>("forward") {
            processor.forward_transform(parse_hex(data)?.as_slice())?
        } else if let Some(data) = m.get_one::<String>("reverse") {
            processor.reverse_transform(parse_hex(data)?.as_slice())?
        } else {
            anyhow::bail!("need to specify `--forward` or `--reverse`");
        };

        println!("{}", hex::encode(out));
        Ok(())
    }
}

impl Cmd for TransformCmd {
    const NAME: &'static str = "transform";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("apply the public or the private permutation to hex encoded data")
            .arg(
                Arg::new("key")
                    .action(ArgAction::Set)
                    .short('k')
                    .long("key")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .help("key file path"),
            )
            .arg(
                Arg::new("forward")
                    .long("forward")
                    .short('f')
                    .value_name("HEX")
                    .action(ArgAction::Set)
                    .help("message, at most `bits / 8 - 3` bytes"),
            )
            .arg(
                Arg::new("reverse")
                    .long("reverse")
                    .short('r')
                    .value_name("HEX")
                    .action(ArgAction::Set)
                    .help("output of a forward transform"),
            )
            .group(
                ArgGroup::new("direction")
                    .args(["forward", "reverse"])
                    .required(true),
            )
            .arg(
                Arg::new("profile")
                    .long("profile")
                    .short('p')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(EnumValueParser::<Profile>::new())
                    .help("whether the padding is applied or discarded"),
            )
    }

    fn run(&self, m: &ArgMatches) {
        exit_on_error(Self::exe(m));
    }
}
