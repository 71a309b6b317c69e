//! Client-facing error messages shared by the service and the HTTP layer.

pub const MISSING_REGISTRATION_KEYS: &str =
    "The create user must contains: name, email, password and isAdm";
pub const EMAIL_ALREADY_REGISTERED: &str = "E-mail already registered";
pub const WRONG_CREDENTIALS: &str = "Wrong email/password";
pub const MISSING_AUTHORIZATION: &str = "Missing authorization headers";
pub const MISSING_ADMIN_PERMISSIONS: &str = "Missing admin permissions";
pub const UNKNOWN_TOKEN_SUBJECT: &str = "Token subject does not exist";
