//! Request data and response payloads

mod cards;
mod methods;
mod options;
mod payment;
mod source;
mod threeds;

pub use cards::{
    AddCardPayload, AttachCardPayload, CardStatus, CheckType, PaymentCard, RemoveCardPayload,
};
pub use methods::{
    GetQrPayload, GetSbpBanksPayload, GetTerminalPayMethodsPayload, PayMethod, QrDataType,
    SbpBank, TerminalInfo, TinkoffPayLinkParams, TinkoffPayLinkPayload, TinkoffPayStatusPayload,
};
pub use options::{CustomerOptions, OrderOptions, PayType, PaymentInitData, PaymentOptions};
pub use payment::{GetPaymentStatePayload, InitPayload, PaymentId, PaymentStatus};
pub use source::{
    Base64CardDataEncoder, CardData, CardDataEncoder, PaymentFlow, PaymentSourceData, WalletKind,
};
pub use threeds::{
    ChargePayload, Check3DSVersionPayload, Confirmation3DS2AppBasedData, Confirmation3DSData,
    Confirmation3DSDataACS, FinishAuthorizePayload, FinishAuthorizeStatus, SdkInterface,
    ThreeDSDeviceInfo,
};
