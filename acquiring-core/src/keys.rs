//! Wire names of request and response parameters.

pub const TERMINAL_KEY: &str = "TerminalKey";
pub const TOKEN: &str = "Token";
pub const PASSWORD: &str = "Password";

pub const SUCCESS: &str = "Success";
pub const ERROR_CODE: &str = "ErrorCode";
pub const ERROR_MESSAGE: &str = "Message";
pub const ERROR_DETAILS: &str = "Details";

pub const AMOUNT: &str = "Amount";
pub const ORDER_ID: &str = "OrderId";
pub const PAYMENT_ID: &str = "PaymentId";
pub const STATUS: &str = "Status";
pub const CUSTOMER_KEY: &str = "CustomerKey";
pub const REBILL_ID: &str = "RebillId";
pub const CARD_ID: &str = "CardId";
pub const CARD_DATA: &str = "CardData";

pub const DATA: &str = "DATA";
pub const RECEIPT: &str = "Receipt";
pub const RECEIPTS: &str = "Receipts";
pub const SHOPS: &str = "Shops";

/// `DATA` entries used by the recurring repeat-Init recovery.
pub const FAIL_MAPI_SESSION_ID: &str = "failMapiSessionId";
pub const RECURRING_TYPE: &str = "recurringType";
