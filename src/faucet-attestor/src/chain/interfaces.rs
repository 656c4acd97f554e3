//! Solidity ABI of the verifying faucet contract.
//!
//! Only the surface this service reads or submits is declared here.

use alloy_sol_types::sol;

sol! {
    interface IFaucet {
        function claimAmount() external view returns (uint256);
        function cooldownTime() external view returns (uint256);

        function canClaim(uint256 fid) external view returns (bool);
        function hasClaimed(uint256 fid) external view returns (bool);
        function getNextClaimTime(uint256 fid) external view returns (uint256);
        function getTimeUntilNextClaim(uint256 fid) external view returns (uint256);
        function fidLastClaimTime(uint256 fid) external view returns (uint256);
        function lastClaimTime(address user) external view returns (uint256);

        function getContribution(address user) external view returns (uint256);
        function isEligibleForOGNFT(address user) external view returns (bool);
        function hasOGNFT(address user) external view returns (bool);
        function hasClaimerNFT(uint256 fid) external view returns (bool);

        function claim(bytes32 identityHash, uint256 expiry, bytes signature) external;
        function claimFor(bytes32 identityHash, address recipient, uint256 expiry, bytes signature) external;
        function mintOGNFT(address to) external;
        function mintClaimerNFT(uint256 fid, address to) external;
        function setClaimAmount(uint256 newAmount) external;
    }
}
