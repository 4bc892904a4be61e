use crate::cmd::{Cmd, Profile, TrapdoorConfig};
use crate::exit_on_error;
use cipher::trapdoor::{SecureChannel, TrapdoorProcessor};
use cipher::DefaultRand;
use clap::{builder::EnumValueParser, value_parser, Arg, ArgAction, ArgMatches, Command};

const CONFIDENTIAL: &[u8] = b"Sensitive information requiring mathematical protection";
const DOCUMENT: &[u8] = b"Important contract requiring mathematical verification";
const TAMPERED: &[u8] = b"Important contract requiring mathematical verification (modified)";

pub struct DemoCmd;

impl DemoCmd {
    fn exe(m: &ArgMatches) -> anyhow::Result<()> {
        let config = TrapdoorConfig::config()?;
        let bits = m
            .get_one::<usize>("bits")
            .copied()
            .unwrap_or(config.bit_length);
        let options = config.processor_options(m.get_one::<Profile>("profile").copied(), None);

        log::info!(
            "generating a {bits}-bit key, cache {:?}, padding {:?}",
            options.cache,
            options.padding
        );
        let processor =
            TrapdoorProcessor::with_options(bits, options.clone(), DefaultRand::default())?;
        Self::transform(&processor)?;
        Self::signature(&processor)?;

        let channel = TrapdoorProcessor::with_options(bits, options, DefaultRand::default())?;
        Self::session(channel, config.session_secret_len)
    }

    fn transform(processor: &TrapdoorProcessor) -> anyhow::Result<()> {
        let transformed = processor.forward_transform(CONFIDENTIAL)?;
        log::info!("forward transform: {} bytes", transformed.len());

        match processor.reverse_transform(transformed.as_slice()) {
            Ok(recovered) => log::info!("original recovered: {}", recovered == CONFIDENTIAL),
            Err(e) => log::warn!("reverse transform failed: {e}"),
        }
        Ok(())
    }

    fn signature(processor: &TrapdoorProcessor) -> anyhow::Result<()> {
        let tag = processor.sign(DOCUMENT)?;
        log::info!("document verified: {}", processor.verify(DOCUMENT, &tag));
        log::info!("tampered document verified: {}", processor.verify(TAMPERED, &tag));
        Ok(())
    }

    fn session(processor: TrapdoorProcessor, secret_len: usize) -> anyhow::Result<()> {
        let mut channel = SecureChannel::with_processor(processor).with_secret_len(secret_len);
        let protected = channel.establish_secure_session("peer_001")?;
        let established = channel.decrypt_session_key("peer_002", &protected);
        log::info!("secure session established: {established}");

        if established {
            log::info!(
                "peer_002 holds the secret of peer_001: {}",
                channel.session_key("peer_001") == channel.session_key("peer_002")
            );
        }
        Ok(())
    }
}

impl Cmd for DemoCmd {
    const NAME: &'static str = "demo";

    fn cmd() -> Command {
        Command::new(Self::NAME)
            .about("run transform, signature and session establishment on a fresh key")
            .arg(
                Arg::new("bits")
                    .long("bits")
                    .short('b')
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
    }

    fn run(&self, m: &ArgMatches) {
        exit_on_error(Self::exe(m));
    }
}
