use crate::cmd::{output_writer, Cmd, Profile, TrapdoorConfig};
use crate::exit_on_error;
use cipher::trapdoor::TrapdoorProcessor;
use cipher::DefaultRand;
use clap::{builder::EnumValueParser, value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::Write;
use std::path::PathBuf;

#[derive(Default)]
pub struct KeyCmd;

impl KeyCmd {
    fn exe(m: &ArgMatches) -> anyhow::Result<()> {
        let config = TrapdoorConfig::config()?;
        let bits = m
            .get_one::<usize>("bits")
            .copied()
            .unwrap_or(config.bit_length);
        let options = config.processor_options(
            m.get_one::<Profile>("profile").copied(),
            m.get_one::<usize>("rounds").copied(),
        );

        let processor = TrapdoorProcessor::with_options(bits, options, DefaultRand::default())?;

        let key = serde_json::to_string_pretty(processor.key())?;
        let mut out = output_writer(m)?;
        out.write_all(key.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

impl Cmd for KeyCmd {
    const NAME: &'static str = "key";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("generate trapdoor key material")
            .arg(
                Arg::new("bits")
                    .value_name("BITS")
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("modulus bits length, `bit_length` in the config when absent"),
            )
            .arg(
                Arg::new("profile")
                    .long("profile")
                    .short('p')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(EnumValueParser::<Profile>::new())
                    .help("prime cache and padding behaviour"),
            )
            .arg(
                Arg::new("rounds")
                    .long("rounds")
                    .short('t')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(usize))
                    .help("probable prime test rounds"),
            )
            .arg(
                Arg::new("output")
                    .long("output")
                    .short('o')
                    .action(ArgAction::Set)
                    .required(false)
                    .value_parser(value_parser!(PathBuf))
                    .help("to specify the output file path to save the key"),
            )
    }

    fn run(&self, m: &ArgMatches) {
        exit_on_error(Self::exe(m));
    }
}

#[cfg(test)]
mod tests {
    use super::KeyCmd;
    use crate::cmd::Cmd;

    #[test]
    fn bad_bit_length_fails_the_command() {
        for bits in ["18", "8", "1026"] {
            let m = KeyCmd::cmd().try_get_matches_from(["key", bits]).unwrap();
            assert!(KeyCmd::exe(&m).is_err(), "{bits} accepted");
        }
    }
}
