use ethers::abi::Token;
use ethers::types::{Address, U256};
use log::{debug, info};

use crate::binding::ContractBinding;
use crate::errors::Result;
use crate::exchange::ExchangeAdapter;
use crate::multicall::Multicall;

/// A pool address reported by a factory for one (token, token, fee) lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolCandidate {
    pub address: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub fee_tier: u32,
}

/// Looks up every (pair, fee tier) combination on a factory in batched calls.
///
/// Zero addresses (no pool deployed) and lookups whose sub-call failed are
/// dropped. Adapters without a factory lookup fail with `Unsupported` before
/// any call is made.
pub async fn scan_factory(
    adapter: &dyn ExchangeAdapter,
    factory: &ContractBinding,
    multicall: &Multicall,
    pairs: &[(Address, Address)],
    fee_tiers: &[u32],
) -> Result<Vec<PoolCandidate>> {
    let get_pool = adapter.get_pool_function(factory)?;

    let mut lookups = Vec::with_capacity(pairs.len() * fee_tiers.len());
    let mut calls = Vec::with_capacity(pairs.len() * fee_tiers.len());
    for &(token_a, token_b) in pairs {
        for &fee_tier in fee_tiers {
            calls.push(get_pool.encode(&[
                Token::Address(token_a),
                Token::Address(token_b),
                Token::Uint(U256::from(fee_tier)),
            ])?);
            lookups.push((token_a, token_b, fee_tier));
        }
    }

    let results = multicall.run(calls).await?;

    let mut candidates = Vec::new();
    for ((token_a, token_b, fee_tier), data) in lookups.into_iter().zip(results) {
        match get_pool.decode_address(&data) {
            Ok(address) if address != Address::zero() => candidates.push(PoolCandidate {
                address,
                token_a,
                token_b,
                fee_tier,
            }),
            Ok(_) => {}
            Err(e) => debug!(
                "getPool({:?}, {:?}, {}) dropped: {}",
                token_a, token_b, fee_tier, e
            ),
        }
    }

    info!(
        "{} factory {:?}: {} pools from {} lookups",
        adapter.exchange_name(),
        factory.address(),
        candidates.len(),
        pairs.len() * fee_tiers.len()
    );
    Ok(candidates)
}

/// Candidate addresses with duplicates removed, first occurrence kept.
pub fn candidate_addresses(candidates: &[PoolCandidate]) -> Vec<Address> {
    let mut seen = indexmap::IndexSet::new();
    for candidate in candidates {
        seen.insert(candidate.address);
    }
    seen.into_iter().collect()
}
