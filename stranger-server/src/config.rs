use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use stranger_core::IceServerConfig;

/// How a `join` without a usable room id is matched with another participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PairingPolicy {
    /// Pair with whoever has been waiting the longest.
    #[default]
    Random,
    /// Only pair participants that name the same room.
    Explicit,
}

/// Which side of a fresh pair is told to produce the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InitiatorPolicy {
    /// The participant that was already waiting in the room.
    #[default]
    Occupant,
    /// The participant whose join completed the pair.
    Joiner,
}

/// Settings the signaling library needs; independent of how they were obtained.
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    pub pairing: PairingPolicy,
    pub initiator: InitiatorPolicy,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            pairing: PairingPolicy::default(),
            initiator: InitiatorPolicy::default(),
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_URL.to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}

pub const DEFAULT_STUN_URL: &str = "stun:stun.l.google.com:19302";

#[derive(Parser, Debug, Clone)]
#[command(name = "stranger-server")]
#[command(about = "Pairs two anonymous participants and relays their WebRTC signaling")]
pub struct ServerConfig {
    #[arg(long, env = "STRANGER_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    #[arg(long, env = "STRANGER_PAIRING", value_enum, default_value_t = PairingPolicy::Random)]
    pub pairing: PairingPolicy,

    #[arg(long, env = "STRANGER_INITIATOR", value_enum, default_value_t = InitiatorPolicy::Occupant)]
    pub initiator: InitiatorPolicy,

    /// STUN server handed to clients; repeat the flag for several.
    #[arg(long = "stun-url", env = "STRANGER_STUN_URLS", value_delimiter = ',', default_value = DEFAULT_STUN_URL)]
    pub stun_urls: Vec<String>,

    #[arg(long, env = "TURN_URL")]
    pub turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    pub turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    pub turn_credential: Option<String>,
}

impl ServerConfig {
    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = Vec::new();

        if !self.stun_urls.is_empty() {
            servers.push(IceServerConfig {
                urls: self.stun_urls.clone(),
                username: None,
                credential: None,
            });
        }

        if let Some(turn_url) = &self.turn_url {
            servers.push(IceServerConfig {
                urls: vec![turn_url.clone()],
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }

        servers
    }

    pub fn signaling(&self) -> SignalingConfig {
        SignalingConfig {
            pairing: self.pairing,
            initiator: self.initiator,
            ice_servers: self.ice_servers(),
        }
    }
}
