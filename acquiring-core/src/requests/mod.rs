//! One request type per endpoint

mod cards;
mod methods;
mod payment;
mod threeds;

pub use cards::{
    AddCardData, AddCardRequest, AttachCardData, AttachCardRequest, GetCardListRequest,
    RemoveCardData, RemoveCardRequest,
};
pub use methods::{
    GetQrData, GetQrRequest, GetSbpBanksRequest, GetTerminalPayMethodsRequest,
    GetTinkoffPayLinkRequest, GetTinkoffPayStatusRequest,
};
pub use payment::{
    ChargeData, ChargeRequest, FinishAuthorizeData, FinishAuthorizeRequest, FinishPaymentSource,
    GetPaymentStateData, GetPaymentStateRequest, InitRequest,
};
pub use threeds::{
    Check3DSVersionData, Check3DSVersionRequest, CresData, Submit3DSAuthorizationData,
    Submit3DSAuthorizationRequest, Submit3DSAuthorizationV2Request,
};
