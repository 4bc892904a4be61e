use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use cipher::trapdoor::KeyMaterial;
use clap::{ArgMatches, Command};

use crate::TrapdoorError;

pub trait Cmd {
    const NAME: &'static str;

    fn cmd() -> Command;

    fn run(&self, m: &ArgMatches);
}

pub mod config;
pub use config::{Profile, TrapdoorConfig};

mod key;
pub use key::KeyCmd;

mod sign;
pub use sign::SignCmd;

mod transform;
pub use transform::TransformCmd;

mod demo;
pub use demo::DemoCmd;

#[cfg(feature = "sec-zeroize")]
type KeyBuf = zeroize::Zeroizing<Vec<u8>>;
#[cfg(not(feature = "sec-zeroize"))]
type KeyBuf = Vec<u8>;

/// Reads and validates JSON key material written by `key`.
fn read_key(p: &Path) -> anyhow::Result<KeyMaterial> {
    let mut buf = KeyBuf::from(Vec::with_capacity(4096));
    let _len = File::open(p)?.read_to_end(&mut buf)?;

    let key: KeyMaterial = serde_json::from_slice(&buf)
        .map_err(|e| TrapdoorError::InvalidKeyFile(p.display().to_string(), e.to_string()))?;
    key.validate()
        .map_err(|e| TrapdoorError::InvalidKeyFile(p.display().to_string(), e.to_string()))?;

    Ok(key)
}

fn parse_hex(s: &str) -> anyhow::Result<Vec<u8>> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    Ok(hex::decode(s).map_err(|_| TrapdoorError::InvalidHex(s.to_string()))?)
}

/// stdout unless `output` is given, existing files are never overwritten
fn output_writer(m: &ArgMatches) -> anyhow::Result<Box<dyn Write>> {
    Ok(match m.get_one::<PathBuf>("output") {
        Some(p) => Box::new(OpenOptions::new().create_new(true).write(true).open(p)?),
        None => Box::new(std::io::stdout().lock()),
    })
}

#[cfg(test)]
mod tests {
    use super::parse_hex;

    #[test]
    fn hex_input() {
        assert_eq!(parse_hex("0x00ff10").unwrap(), vec![0, 0xff, 0x10]);
        assert_eq!(parse_hex(" 0AbC\n").unwrap(), vec![0x0a, 0xbc]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
