use serde::{Deserialize, Serialize};

/// User account document — created before patient registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Raw sign-up form values.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub phone: String,
}
