use serde::Deserialize;

// Missing fields deserialize as empty strings so they are reported through the
// same error page as any other bad input.

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DonateForm {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Kept raw so a parse failure gets its own message.
    #[serde(default)]
    pub amount: String,
}
