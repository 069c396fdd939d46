//! The closed vocabulary of the SCA protocol.

/// SCA status of one authorisation, as defined by the Berlin Group API.
///
/// The status only ever moves forward along the transition graph; the only
/// backward move allowed anywhere in the engine is the side exit to
/// [`ScaStatus::Failed`].
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ScaStatus {
    Started,
    Received,
    PsuIdentified,
    PsuAuthenticated,
    ScaMethodSelected,
    Finalised,
    Failed,
    Exempted,
}

impl ScaStatus {
    /// Whether this status is terminal.
    pub const fn is_finalised(self) -> bool {
        matches!(self, Self::Finalised | Self::Failed | Self::Exempted)
    }
}

/// SCA delivery approach declared for an authorisation.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaApproach {
    Embedded,
    Decoupled,
    Redirect,
}

/// Status of an account-information consent.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ConsentStatus {
    Received,
    Rejected,
    Valid,
    RevokedByPsu,
    Expired,
    TerminatedByTpp,
    PartiallyAuthorised,
}

/// ISO 20022 transaction status of a payment.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Received
    Rcvd,
    /// Pending
    Pdng,
    /// Accepted customer profile
    Accp,
    /// Accepted technical validation
    Actc,
    /// Accepted with change
    Acwc,
    /// Accepted without posting
    Acwp,
    /// Accepted settlement completed
    Acsc,
    /// Partially accepted, more authorisations expected (multilevel SCA)
    Patc,
    /// Rejected
    Rjct,
    /// Cancelled
    Canc,
}

/// Kind of payment a PIS authorisation refers to.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Single,
    Bulk,
    Periodic,
}

/// Which authorisation family an authorisation belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorisationType {
    Ais,
    PisCreation,
    PisCancellation,
}

/// Error-namespace family, chosen by the call site.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceKind {
    Ais,
    Pis,
}

/// Kind of a single SCA authentication method.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    SmsOtp,
    ChipOtp,
    PhotoOtp,
    PushOtp,
}

/// Format of the OTP the PSU is asked to enter.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OtpFormat {
    Characters,
    Integer,
}

/// HTTP-like severity class an error code canonically belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StatusClass {
    BadRequest,
    Unauthorised,
    Forbidden,
    NotFound,
    Conflict,
}

/// Machine-readable error codes surfaced to the TPP.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageErrorCode {
    FormatError,
    FormatErrorNoPsu,
    PsuCredentialsInvalid,
    #[serde(rename = "CONSENT_UNKNOWN_400")]
    #[strum(serialize = "CONSENT_UNKNOWN_400")]
    ConsentUnknown400,
    #[serde(rename = "RESOURCE_UNKNOWN_400")]
    #[strum(serialize = "RESOURCE_UNKNOWN_400")]
    ResourceUnknown400,
    #[serde(rename = "RESOURCE_UNKNOWN_404")]
    #[strum(serialize = "RESOURCE_UNKNOWN_404")]
    ResourceUnknown404,
    #[serde(rename = "RESOURCE_EXPIRED_403")]
    #[strum(serialize = "RESOURCE_EXPIRED_403")]
    ResourceExpired403,
    ScaMethodUnknown,
    ScaInvalid,
    StatusInvalid,
    Unauthorized,
    UnauthorizedNoPsu,
    ServiceBlocked,
}

impl MessageErrorCode {
    /// The severity class this code canonically maps to.
    pub const fn status_class(self) -> StatusClass {
        match self {
            Self::FormatError
            | Self::FormatErrorNoPsu
            | Self::ConsentUnknown400
            | Self::ResourceUnknown400
            | Self::ScaMethodUnknown
            | Self::ScaInvalid => StatusClass::BadRequest,
            Self::PsuCredentialsInvalid | Self::Unauthorized | Self::UnauthorizedNoPsu => {
                StatusClass::Unauthorised
            }
            Self::ResourceExpired403 | Self::ServiceBlocked => StatusClass::Forbidden,
            Self::ResourceUnknown404 => StatusClass::NotFound,
            Self::StatusInvalid => StatusClass::Conflict,
        }
    }
}

/// What a credential failure reported by the bank does to the authorisation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialFailurePolicy {
    /// The authorisation moves to `FAILED` (terminal).
    HardFail,
    /// The current status is kept and the PSU may retry.
    KeepStatus,
}
