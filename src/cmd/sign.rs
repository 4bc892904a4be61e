use crate::cmd::{output_writer, read_key, Cmd, TrapdoorConfig};
use crate::exit_on_error;
use cipher::trapdoor::TrapdoorProcessor;
use cipher::DefaultRand;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

pub struct SignCmd;

/// all `k` bytes, leading zeros included
fn signature_hex(sig: &[u8], prefix: bool) -> String {
    if prefix {
        format!("0x{}", hex::encode(sig))
    } else {
        hex::encode(sig)
    }
}

impl SignCmd {
    fn exe(m: &ArgMatches) -> anyhow::Result<()> {
        let config = TrapdoorConfig::config()?;
        let Some(key) = m.get_one::<PathBuf>("key") else {
            anyhow::bail!("need to specify the key file");
        };
        let key = read_key(key)?;
        let processor =
            TrapdoorProcessor::from_key(key, config.processor_options(None, None), DefaultRand::default())?;

        let mut msg = Vec::with_capacity(1024);
        if let Some(f) = m.get_one::<PathBuf>("file") {
            let _len = File::open(f)?.read_to_end(&mut msg)?;
        }

        if let Some(f) = m.get_one::<PathBuf>("verify") {
            let mut sig = Vec::with_capacity(processor.key_len());
            let _len = File::open(f)?.read_to_end(&mut sig)?;
            if processor.verify(msg.as_slice(), sig.as_slice()) {
                println!("Validation success.");
            } else {
                anyhow::bail!("Validation failed.");
            }
        } else {
            let sig = processor.sign(msg.as_slice())?;
            println!("{}", signature_hex(sig.as_slice(), m.get_flag("prefix")));

            if m.contains_id("output") {
                output_writer(m)?.write_all(sig.as_slice())?;
            }
        }

        Ok(())
    }
}

impl Cmd for SignCmd {
    const NAME: &'static str = "sign";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("sign the SHA-256 digest envelope of a file, or verify a detached signature")
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
                Arg::new("file")
                    .short('f')
                    .long("file")
                    .required(true)
                    .value_parser(value_parser!(PathBuf))
                    .action(ArgAction::Set)
                    .help("the message file path"),
            )
            .arg(
                Arg::new("prefix")
                    .long("prefix")
                    .required(false)
                    .action(ArgAction::SetTrue)
                    .help("display prefix with `0x`"),
            )
            .arg(
                Arg::new("verify")
                    .long("verify")
                    .short('v')
                    .required(false)
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .help("the signature file path"),
            )
            .arg(
                Arg::new("output")
                    .long("output")
                    .short('o')
                    .required(false)
                    .action(ArgAction::Set)
                    .value_parser(value_parser!(PathBuf))
                    .conflicts_with("verify")
                    .help("to specify the output file path to save the signature"),
            )
    }

    fn run(&self, m: &ArgMatches) {
        exit_on_error(Self::exe(m));
    }
}

#[cfg(test)]
mod tests {
    use super::signature_hex;

    #[test]
    fn signature_keeps_leading_zeros() {
        let sig = [0x00, 0x00, 0x0a, 0xff];
        assert_eq!(signature_hex(&sig, false), "00000aff");
        assert_eq!(signature_hex(&sig, true), "0x00000aff");
    }
}
