use clap::{value_parser, Arg, ArgAction, Command};
use log::LevelFilter;
use std::path::PathBuf;
use trapdoor::cmd::{Cmd, DemoCmd, KeyCmd, SignCmd, TransformCmd, TrapdoorConfig};
use trapdoor::exit_on_error;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let version = env!("TRAPDOOR_VERSION_INFO");
    let app = Command::new("trapdoor")
        .version(version)
        .about("trapdoor modular permutation, signatures and local session establishment")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .action(ArgAction::Set)
                .required(false)
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON config file, overridden by `TRAPDOOR__*` environment variables"),
        )
        .subcommand(KeyCmd::cmd())
        .subcommand(SignCmd::cmd())
        .subcommand(TransformCmd::cmd())
        .subcommand(DemoCmd::cmd())
        .get_matches();

    // globals only propagate down
    let cfg = app
        .subcommand()
        .and_then(|(_, m)| m.get_one::<PathBuf>("config"))
        .or_else(|| app.get_one::<PathBuf>("config"))
        .map(|p| p.as_path());
    exit_on_error(TrapdoorConfig::config_with_file(cfg));

    if let Some((s, m)) = app.subcommand() {
        match s {
            KeyCmd::NAME => KeyCmd.run(m),
            SignCmd::NAME => SignCmd.run(m),
            TransformCmd::NAME => TransformCmd.run(m),
            DemoCmd::NAME => DemoCmd.run(m),
            name => unreachable!("clap accepted the unregistered subcommand `{name}`"),
        }
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), version);
    }
}
