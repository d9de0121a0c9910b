pub mod credentials;
pub mod masking;

pub use credentials::{
    CompleteCredentials, CredentialKeys, CredentialSet, EnvCredentialProvider, PASSWORD_KEY,
    RELEASE_URL_KEY, SNAPSHOT_URL_KEY, StaticCredentialProvider, USERNAME_KEY,
};
pub use masking::{mask_secret, redact_url_userinfo};
