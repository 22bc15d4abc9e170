/// Seed roster of well-known Ethereum addresses
///
/// These are public, widely-tracked wallets (protocol treasuries, exchange
/// hot wallets, one famous individual). They give a fresh arena a populated
/// leaderboard before anyone registers.
pub struct KnownWallet {
    pub address: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const KNOWN_WALLETS: &[KnownWallet] = &[
    KnownWallet {
        address: "0x9f8f72aa9304c8b593d555f12ef6589cc3a579a2",
        name: "MakerDAO",
        description: "DeFi Protocol - MakerDAO",
    },
    KnownWallet {
        address: "0x3cd751e6b0078be393132286c442345e5dc49699",
        name: "Compound Finance",
        description: "DeFi Protocol - Compound",
    },
    KnownWallet {
        address: "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
        name: "Uniswap",
        description: "DEX Protocol - Uniswap",
    },
    KnownWallet {
        address: "0x514910771af9ca656af840dff83e8264ecf986ca",
        name: "Chainlink",
        description: "Oracle Network - Chainlink",
    },
    KnownWallet {
        address: "0x7d1afa7b718fb893db30a3abc0cfc608aacfebb0",
        name: "Polygon",
        description: "Layer 2 - Polygon",
    },
    KnownWallet {
        address: "0x6b175474e89094c44da98b954eedeac495271d0f",
        name: "Dai Stablecoin",
        description: "Stablecoin - Dai",
    },
    KnownWallet {
        address: "0xd8da6bf26964af9d7eed9e03e53415d37aa96045",
        name: "Vitalik Buterin",
        description: "Ethereum Founder",
    },
    KnownWallet {
        address: "0x28c6c06298d514db089934071355e5743bf21d60",
        name: "Binance Hot Wallet",
        description: "Binance Exchange",
    },
    KnownWallet {
        address: "0x47ac0fb4f2d84898e4d9e7b4dab3c24507a6d503",
        name: "Binance Cold Wallet",
        description: "Binance Cold Storage",
    },
    KnownWallet {
        address: "0x503828976d22510aad0201ac7ec88293211d23da",
        name: "Coinbase Pro",
        description: "Coinbase Exchange",
    },
];
