//! ERC-20 `transfer(address,uint256)` calldata construction.
//!
//! This is the one piece of token-standard knowledge the otherwise
//! token-agnostic core needs; spec.md §1 places richer calldata
//! construction (permit2, multicall, non-standard tokens) out of scope and
//! into the collaborator.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::sol;

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Encodes a standard ERC-20 `transfer(to, amount)` call.
#[must_use]
pub fn erc20_transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn selector_matches_standard_transfer() {
        let calldata = erc20_transfer_calldata(
            address!("000000000000000000000000000000000000aa"),
            U256::from(1_000u64),
        );
        // `transfer(address,uint256)` selector.
        assert_eq!(&calldata[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(calldata.len(), 4 + 32 + 32);
    }
}
