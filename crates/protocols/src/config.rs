use std::env;
use thiserror::Error;

/// Well-known mainnet swap router.
pub const DEFAULT_SWAP_ROUTER: &str = "0xE592427A0AEce92De3Edee1F18E0157C05861564";
/// Well-known mainnet wrapped-native token.
pub const DEFAULT_WRAPPED_NATIVE: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Ropsten,
    ArbitrumRinkeby,
    Local,
}

impl Network {
    pub fn from_chain_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(Self::Mainnet),
            3 => Some(Self::Ropsten),
            421611 => Some(Self::ArbitrumRinkeby),
            31337 => Some(Self::Local),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Ropsten => 3,
            Self::ArbitrumRinkeby => 421611,
            Self::Local => 31337,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("unsupported chain id {0}")]
    UnknownNetwork(u64),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Addresses and endpoints for one deployment.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub network: Network,
    pub rpc_url: String,
    /// The derivative/wrapped-native pool.
    pub pool: String,
    pub swap_router: String,
    pub wrapped_native: String,
    pub power_token: String,
    /// The automated yield strategy vault, when deployed.
    pub strategy: Option<String>,
}

impl DeploymentConfig {
    /// Loads the deployment from the environment. `RPC_URL`,
    /// `POOL_ADDRESS` and `POWER_TOKEN_ADDRESS` are required; the router
    /// and wrapped-native addresses default to the mainnet deployments.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chain_id = match env::var("CHAIN_ID") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                var: "CHAIN_ID",
                value: raw,
            })?,
            Err(_) => 1,
        };
        let network =
            Network::from_chain_id(chain_id).ok_or(ConfigError::UnknownNetwork(chain_id))?;

        Ok(Self {
            network,
            rpc_url: require("RPC_URL")?,
            pool: require("POOL_ADDRESS")?,
            swap_router: env::var("SWAP_ROUTER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_SWAP_ROUTER.to_string()),
            wrapped_native: env::var("WRAPPED_NATIVE_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_WRAPPED_NATIVE.to_string()),
            power_token: require("POWER_TOKEN_ADDRESS")?,
            strategy: env::var("STRATEGY_ADDRESS").ok(),
        })
    }

    /// Whether the wrapped-native token sorts as token0 in the pool.
    pub fn wrapped_native_is_token0(&self) -> bool {
        self.wrapped_native.to_lowercase() < self.power_token.to_lowercase()
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_round_trip() {
        for network in [
            Network::Mainnet,
            Network::Ropsten,
            Network::ArbitrumRinkeby,
            Network::Local,
        ] {
            assert_eq!(Network::from_chain_id(network.chain_id()), Some(network));
        }
        assert_eq!(Network::from_chain_id(999), None);
    }

    #[test]
    fn test_token_ordering() {
        let config = DeploymentConfig {
            network: Network::Mainnet,
            rpc_url: "http://localhost:8545".to_string(),
            pool: "0x0001".to_string(),
            swap_router: DEFAULT_SWAP_ROUTER.to_string(),
            wrapped_native: "0xaaaa".to_string(),
            power_token: "0xBBBB".to_string(),
            strategy: None,
        };
        assert!(config.wrapped_native_is_token0());
    }
}
