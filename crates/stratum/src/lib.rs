use {
    bitcoin::hashes::{Hash, sha256d},
    byteorder::{ByteOrder, LittleEndian},
    derive_more::Display,
    primitive_types::{U256, U512},
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::{ResultExt, Snafu},
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

pub use {
    authorize::Authorize,
    difficulty::Difficulty,
    error::{InternalError, JsonRpcError, Result},
    event::Event,
    extranonce::Extranonce,
    hash::{DoubleHash, Sha256d},
    job_id::JobId,
    merkle::{MerkleNode, coinbase_hash, merkle_root},
    message::{Id, Message},
    nbits::Nbits,
    nonce::Nonce,
    notify::Notify,
    ntime::Ntime,
    prevhash::PrevHash,
    set_difficulty::SetDifficulty,
    submit::{Rejection, Submit, SubmitResponse},
    subscribe::{Subscribe, SubscribeResult},
    target::{Target, hash_difficulty},
    version::Version,
};

#[cfg(feature = "client")]
pub use client::{Client, ClientConfig, ClientError, EventReceiver, connect_with_retry};

pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;

/// Error code pools use to reject a share that does not meet the share target.
pub const LOW_DIFFICULTY_SHARE: i32 = 23;

mod authorize;
mod difficulty;
mod error;
mod event;
mod extranonce;
mod hash;
mod job_id;
mod merkle;
mod message;
mod nbits;
mod nonce;
mod notify;
mod ntime;
mod prevhash;
mod set_difficulty;
mod submit;
mod subscribe;
mod target;
mod version;

#[cfg(feature = "client")]
mod client;

/// Decode exactly `N` bytes of hex, reporting the offending job field on failure.
fn decode_fixed<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N]> {
    if s.len() != N * 2 {
        return Err(InternalError::MalformedJob {
            field,
            reason: format!("expected {} hex characters, got {}", N * 2, s.len()),
        });
    }

    let mut bytes = [0u8; N];
    hex::decode_to_slice(s, &mut bytes).map_err(|err| InternalError::MalformedJob {
        field,
        reason: err.to_string(),
    })?;

    Ok(bytes)
}
