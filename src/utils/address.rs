// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/address.rs
// Version: 1.0.0
//
// Wallet address checks run once before mining starts. Addresses are bech32
// strings whose human-readable part names the network; an optional `.worker`
// suffix used by pools for rig identification is ignored.

use thiserror::Error;

const CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 6;
const GENERATORS: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

const MAINNET_PREFIXES: [&str; 2] = ["dero", "deroi"];
const TESTNET_PREFIXES: [&str; 2] = ["deto", "detoi"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("wallet address is empty")]
    Empty,

    #[error("wallet address mixes upper and lower case")]
    MixedCase,

    #[error("wallet address has no separator")]
    MissingSeparator,

    #[error("invalid DERO address")]
    UnknownNetwork,

    #[error("wallet address contains invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("wallet address is too short")]
    TooShort,

    #[error("wallet address checksum mismatch")]
    BadChecksum,

    #[error("address belongs to DERO testnet and is invalid on current network")]
    TestnetOnMainnet,

    #[error("address belongs to DERO mainnet and is invalid on current network")]
    MainnetOnTestnet,
}

/// Validate `address` (optionally `address.worker`) for the selected network
pub fn validate_address(address: &str, testnet: bool) -> Result<(), AddressError> {
    let address = address.split('.').next().unwrap_or_default();
    if address.is_empty() {
        return Err(AddressError::Empty);
    }
    if address.chars().any(|c| c.is_ascii_uppercase()) && address.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AddressError::MixedCase);
    }
    let address = address.to_ascii_lowercase();

    let (hrp, data) = address.rsplit_once('1').ok_or(AddressError::MissingSeparator)?;
    let mainnet = if MAINNET_PREFIXES.contains(&hrp) {
        true
    } else if TESTNET_PREFIXES.contains(&hrp) {
        false
    } else {
        return Err(AddressError::UnknownNetwork);
    };

    let values = data
        .chars()
        .map(|c| {
            CHARSET
                .find(c)
                .map(|v| v as u8)
                .ok_or(AddressError::InvalidCharacter(c))
        })
        .collect::<Result<Vec<u8>, _>>()?;
    if values.len() <= CHECKSUM_LEN {
        return Err(AddressError::TooShort);
    }
    if !verify_checksum(hrp, &values) {
        return Err(AddressError::BadChecksum);
    }

    match (mainnet, testnet) {
        (false, false) => Err(AddressError::TestnetOnMainnet),
        (true, true) => Err(AddressError::MainnetOnTestnet),
        _ => Ok(()),
    }
}

fn polymod(values: impl Iterator<Item = u8>) -> u32 {
    values.fold(1u32, |chk, v| {
        let top = chk >> 25;
        let chk = ((chk & 0x1ff_ffff) << 5) ^ u32::from(v);
        GENERATORS
            .iter()
            .enumerate()
            .filter(|(i, _)| (top >> i) & 1 == 1)
            .fold(chk, |acc, (_, g)| acc ^ g)
    })
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let expanded = hrp
        .bytes()
        .map(|b| b >> 5)
        .chain(std::iter::once(0))
        .chain(hrp.bytes().map(|b| b & 0x1f));
    polymod(expanded.chain(data.iter().copied())) == 1
}
