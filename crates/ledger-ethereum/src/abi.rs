//! Land-registry contract bindings

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ILandRegistry {
        struct LandInfo {
            string blockInfo;
            string parcelInfo;
            string blockParcelTokenURI;
            uint256 totalSupply;
            uint256[] plotAllocation;
        }

        struct PlotAccountInfo {
            address plotAccount;
            address plotOwner;
            string plotName;
            uint256[] parcelIds;
            uint256[] parcelAmounts;
        }

        struct TransferRequest {
            address from;
            address to;
            uint256 parcelId;
            uint256 parcelAmount;
            bool isPlotTransfer;
            uint256 plotId;
            uint256 timestamp;
            bool landAuthorityApproved;
            bool lawyerApproved;
            bool bankApproved;
        }

        event TokenCreated(uint256 indexed tokenId);
        event PlotInitiated(uint256 indexed plotId);
        event TransferRequestCreated(uint256 indexed requestId);

        function treasuryWallet() external view returns (address);
        function getBlockParcelTokenURI(uint256 tokenId) external view returns (string memory);
        function getLandInfo(uint256 tokenId) external view returns (LandInfo memory);
        function getAllLandInfo() external view returns (LandInfo[] memory);
        function getPlotAccountInfo(uint256 plotId) external view returns (PlotAccountInfo memory);
        function getAllPlotAccountInfo() external view returns (PlotAccountInfo[] memory);
        function getAllTransferRequestInfo() external view returns (TransferRequest[] memory);
        function requestStatus(uint256 requestId) external view returns (TransferRequest memory);
        function getCurrentPlotAndTokenIdInfo() external view returns (uint256, uint256);

        function getPlotAccountParcelShareholders(
            uint256 plotId,
            uint256 parcelId
        ) external view returns (address[] memory);

        function getPlotAccountUserShares(
            uint256 plotId,
            uint256 parcelId,
            address user
        ) external view returns (uint256);

        function getPlotAccountParcelTotalShares(
            uint256 plotId,
            uint256 parcelId
        ) external view returns (uint256);

        function getPlotAccountUserParcels(
            uint256 plotId,
            address user,
            uint256 parcelFilter
        ) external view returns (uint256[] memory);

        function getOwnershipPercentage(
            uint256 plotId,
            address user
        ) external view returns (uint256);

        function createBlockParcelToken(
            string memory blockInfo,
            string memory parcelInfo,
            string memory tokenURI,
            uint256 totalSupply
        ) external;

        function plotInitiate(
            string memory plotName,
            uint256[] memory parcelIds,
            uint256[] memory parcelAmounts
        ) external;

        function requestForWholePlotTransfer(uint256 plotId, address to) external;

        function requestForParcelTransfer(
            uint256 parcelId,
            uint256 parcelAmount,
            address to,
            uint256 plotId
        ) external;

        function delegateApproveAndTransfer(
            address signerWallet,
            uint256 requestId,
            uint8 role
        ) external;
    }
}
