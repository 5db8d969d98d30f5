//! 3-D Secure: flow selection, challenges and confirmation

mod host;
mod messages;
mod resolver;

pub use host::{
    AuthenticationRequestParameters, ChallengeParameters, ChallengeSdk, ChallengeStatus,
    ChallengeStatusReceiver, ChallengeTransaction, DeviceInfo, DeviceInfoProvider,
    StaticDeviceInfoProvider, ThreeDsMethodData, ThreeDsMethodResult, ThreeDsWebFlowHost,
    WebChallenge, WebChallengeResult, directory_server_id,
};
pub use messages::{cres, creq};
pub use resolver::{
    Confirmation, Resolution, ThreeDsCollaborators, ThreeDsFlow, ThreeDsResolver, ThreeDsState,
};
